use crate::api::types::{User, ROLE_AGENT};
use crate::collection::CollectionQuery;
use crate::context::Ctx;
use crate::mutation::Mutation;
use crate::query::QueryState;
use crate::ui::components::{KeyResult, Picker, PickerEvent, PickerItem, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, ShortcutProvider, View, ViewAction};
use crate::ui::views::UserDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Agent roster with the approval workflow
pub struct AgentsView {
  ctx: Ctx,
  collection: CollectionQuery<User>,
  list_state: ListState,
  search: SearchInput,
  approval_picker: Picker,
  action_picker: Picker,
  action: Mutation,
  pending_action: Option<User>,
}

/// Actions available for one agent. Approval is one-way per direction:
/// an approved agent can still be rejected and vice versa, but repeating
/// the current state is off.
fn agent_actions(user: &User) -> Vec<PickerItem> {
  vec![
    PickerItem::new("Approve", "approve").disabled(user.agent_approved == Some(true)),
    PickerItem::new("Reject", "reject").disabled(user.agent_approved == Some(false)),
    PickerItem::new("View details", "details"),
  ]
}

fn approval_label(user: &User) -> (&'static str, Color) {
  match user.agent_approved {
    Some(true) => ("approved", Color::Green),
    Some(false) => ("rejected", Color::Red),
    None => ("pending", Color::Yellow),
  }
}

impl AgentsView {
  pub fn new(ctx: Ctx) -> Self {
    let api = ctx.api.clone();
    let mut collection = CollectionQuery::new(
      "user/all-user",
      ctx.cache.clone(),
      ctx.debounce,
      move |params| {
        let api = api.clone();
        async move { api.users(&params).await.map_err(|e| e.to_string()) }
      },
    )
    .with_page_size(ctx.page_size)
    .with_filter("role", ROLE_AGENT);
    collection.start();

    let action = Mutation::new(ctx.cache.clone(), ctx.notifier.clone(), "user");

    Self {
      ctx,
      collection,
      list_state: ListState::default(),
      search: SearchInput::new().with_placeholder("name or email"),
      approval_picker: Picker::new(),
      action_picker: Picker::new(),
      action,
      pending_action: None,
    }
  }

  fn agents(&self) -> &[User] {
    self.collection.items()
  }

  fn selected_agent(&self) -> Option<&User> {
    self.list_state.selected().and_then(|idx| self.agents().get(idx))
  }

  fn open_approval_filter(&mut self) {
    self.approval_picker.show(
      "Filter by approval",
      vec![
        PickerItem::new("All agents", "all"),
        PickerItem::new("Approved", "true"),
        PickerItem::new("Rejected", "false"),
      ],
    );
  }

  fn open_actions(&mut self) {
    if self.action.is_running() {
      return;
    }
    let Some(agent) = self.selected_agent().cloned() else {
      return;
    };
    let items = agent_actions(&agent);
    self
      .action_picker
      .show(truncate(&agent.full_name, 24), items);
    self.pending_action = Some(agent);
  }

  fn run_action(&mut self, verb: &str, agent: User) -> ViewAction {
    let api = self.ctx.api.clone();
    let id = agent.id.clone();
    match verb {
      "approve" => {
        self.action.run("Agent Approved Successfully!", async move {
          api.approve_agent(&id).await.map_err(|e| e.to_string())
        });
        ViewAction::None
      }
      "reject" => {
        self.action.run("Agent Rejected Successfully!", async move {
          api.reject_agent(&id).await.map_err(|e| e.to_string())
        });
        ViewAction::None
      }
      "details" => ViewAction::Push(Box::new(UserDetailView::new(
        agent.id,
        agent.full_name,
        self.ctx.clone(),
      ))),
      _ => ViewAction::None,
    }
  }

  fn title(&self) -> String {
    match self.collection.state() {
      QueryState::Loading => " Agents (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Agents (error: {}) ", e),
      _ => {
        let mut title = format!(
          " Agents ({}) page {}/{} ",
          self.collection.total(),
          self.collection.page(),
          self.collection.total_pages().max(1)
        );
        match self.collection.filter("agentApproved") {
          Some("true") => title.push_str("[approved] "),
          Some("false") => title.push_str("[rejected] "),
          _ => {}
        }
        if !self.collection.search().is_empty() {
          title.push_str(&format!("[/{}] ", self.collection.search()));
        }
        title
      }
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.agents().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.agents().is_empty() && !self.collection.is_loading() {
      let content = if self.collection.error().is_some() {
        "Failed to load agents. Press 'r' to retry."
      } else {
        "No agents found."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .agents()
      .iter()
      .map(|agent| {
        let (approval, color) = approval_label(agent);
        let verified = if agent.verified == Some(true) { "yes" } else { "no" };
        let line = Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&agent.full_name, 24)),
            Style::default().fg(Color::White),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<28}", truncate(&agent.email, 28)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::styled(format!("{:<10}", approval), Style::default().fg(color)),
          Span::raw(" "),
          Span::styled(
            format!("verified: {}", verified),
            Style::default().fg(Color::DarkGray),
          ),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for AgentsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(text)) => {
        self.collection.set_search(text);
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) => {
        self.collection.commit_search();
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.approval_picker.handle_key(key) {
      KeyResult::Event(PickerEvent::Picked(value)) => {
        let value = if value == "all" { None } else { Some(value) };
        self.collection.set_filter("agentApproved", value);
        return ViewAction::None;
      }
      KeyResult::Event(PickerEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.action_picker.handle_key(key) {
      KeyResult::Event(PickerEvent::Picked(verb)) => {
        if let Some(agent) = self.pending_action.take() {
          return self.run_action(&verb, agent);
        }
        return ViewAction::None;
      }
      KeyResult::Event(PickerEvent::Cancelled) => {
        self.pending_action = None;
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('n') | KeyCode::Right => {
        self.collection.next_page();
      }
      KeyCode::Char('p') | KeyCode::Left => {
        self.collection.prev_page();
      }
      KeyCode::Char('f') => {
        self.open_approval_filter();
      }
      KeyCode::Char('r') => {
        self.collection.refresh();
      }
      KeyCode::Enter => {
        self.open_actions();
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
    self.approval_picker.render_overlay(frame, area);
    self.action_picker.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Agents".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.collection.tick();
    self.action.poll();
    ViewAction::None
  }

  fn wants_text_input(&self) -> bool {
    self.search.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("f", "filter").with_priority(30),
      ShortcutInfo::new("Enter", "actions").with_priority(40),
      ShortcutInfo::new("n/p", "page").with_priority(50),
      ShortcutInfo::new("q", "back").with_priority(60),
    ];

    shortcuts.extend(self.search.shortcuts());

    shortcuts
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn agent(approved: Option<bool>) -> User {
    User {
      id: "a1".to_string(),
      full_name: "Ben Okafor".to_string(),
      email: "ben@example.com".to_string(),
      role: ROLE_AGENT.to_string(),
      phone: None,
      profile_image: None,
      verified: Some(true),
      agent_approved: approved,
      created_at: None,
      updated_at: None,
    }
  }

  fn enabled_map(items: &[PickerItem]) -> Vec<(&str, bool)> {
    items.iter().map(|i| (i.value.as_str(), i.enabled)).collect()
  }

  #[test]
  fn test_pending_agent_offers_both_verdicts() {
    let items = agent_actions(&agent(None));
    assert_eq!(
      enabled_map(&items),
      vec![("approve", true), ("reject", true), ("details", true)]
    );
  }

  #[test]
  fn test_approved_agent_cannot_be_approved_again() {
    let items = agent_actions(&agent(Some(true)));
    assert_eq!(
      enabled_map(&items),
      vec![("approve", false), ("reject", true), ("details", true)]
    );
  }

  #[test]
  fn test_rejected_agent_cannot_be_rejected_again() {
    let items = agent_actions(&agent(Some(false)));
    assert_eq!(
      enabled_map(&items),
      vec![("approve", true), ("reject", false), ("details", true)]
    );
  }
}
