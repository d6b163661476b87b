use crate::api::types::{User, ROLE_ADMIN, ROLE_AGENT, ROLE_USER};
use crate::collection::CollectionQuery;
use crate::context::Ctx;
use crate::mutation::Mutation;
use crate::query::QueryState;
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, KeyResult, Picker, PickerEvent, PickerItem, SearchEvent,
  SearchInput,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{fmt_date, truncate};
use crate::ui::view::{ShortcutInfo, ShortcutProvider, View, ViewAction};
use crate::ui::views::UserDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Paginated user directory with search, role filter, and delete
pub struct UsersView {
  ctx: Ctx,
  collection: CollectionQuery<User>,
  list_state: ListState,
  search: SearchInput,
  role_picker: Picker,
  confirm: ConfirmDialog,
  delete: Mutation,
  pending_delete: Option<String>,
}

pub(super) fn role_color(role: &str) -> Color {
  match role {
    ROLE_ADMIN => Color::Yellow,
    ROLE_AGENT => Color::Cyan,
    _ => Color::White,
  }
}

impl UsersView {
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
    .with_page_size(ctx.page_size);
    collection.start();

    let delete = Mutation::new(ctx.cache.clone(), ctx.notifier.clone(), "user");

    Self {
      ctx,
      collection,
      list_state: ListState::default(),
      search: SearchInput::new().with_placeholder("name or email"),
      role_picker: Picker::new(),
      confirm: ConfirmDialog::new(),
      delete,
      pending_delete: None,
    }
  }

  fn users(&self) -> &[User] {
    self.collection.items()
  }

  fn selected_user(&self) -> Option<&User> {
    self.list_state.selected().and_then(|idx| self.users().get(idx))
  }

  fn open_role_filter(&mut self) {
    self.role_picker.show(
      "Filter by role",
      vec![
        PickerItem::new("All roles", "all"),
        PickerItem::new("Admins", ROLE_ADMIN),
        PickerItem::new("Agents", ROLE_AGENT),
        PickerItem::new("Users", ROLE_USER),
      ],
    );
  }

  fn request_delete(&mut self) {
    if self.delete.is_running() {
      return;
    }
    let Some(user) = self.selected_user() else {
      return;
    };
    let id = user.id.clone();
    let name = user.full_name.clone();
    self.pending_delete = Some(id);
    self.confirm.show("Delete user", format!("Delete {}?", name));
  }

  fn run_delete(&mut self, id: String) {
    let api = self.ctx.api.clone();
    self.delete.run("User Deleted Successfully!", async move {
      api.delete_user(&id).await.map_err(|e| e.to_string())
    });
  }

  fn title(&self) -> String {
    match self.collection.state() {
      QueryState::Loading => " Users (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Users (error: {}) ", e),
      _ => {
        let mut title = format!(
          " Users ({}) page {}/{} ",
          self.collection.total(),
          self.collection.page(),
          self.collection.total_pages().max(1)
        );
        if let Some(role) = self.collection.filter("role") {
          title.push_str(&format!("[{}] ", role));
        }
        if !self.collection.search().is_empty() {
          title.push_str(&format!("[/{}] ", self.collection.search()));
        }
        title
      }
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.users().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.users().is_empty() && !self.collection.is_loading() {
      let content = if self.collection.error().is_some() {
        "Failed to load users. Press 'r' to retry."
      } else {
        "No users found."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .users()
      .iter()
      .map(|user| {
        let joined = user.created_at.as_deref().map(fmt_date).unwrap_or_default();
        let line = Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&user.full_name, 24)),
            Style::default().fg(Color::White),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<28}", truncate(&user.email, 28)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<8}", user.role),
            Style::default().fg(role_color(&user.role)),
          ),
          Span::raw(" "),
          Span::styled(joined, Style::default().fg(Color::DarkGray)),
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

impl View for UsersView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Overlays first, in the order they stack
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

    match self.role_picker.handle_key(key) {
      KeyResult::Event(PickerEvent::Picked(role)) => {
        let value = if role == "all" { None } else { Some(role) };
        self.collection.set_filter("role", value);
        return ViewAction::None;
      }
      KeyResult::Event(PickerEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed) => {
        if let Some(id) = self.pending_delete.take() {
          self.run_delete(id);
        }
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) => {
        self.pending_delete = None;
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
        self.open_role_filter();
      }
      KeyCode::Char('d') => {
        self.request_delete();
      }
      KeyCode::Char('r') => {
        self.collection.refresh();
      }
      KeyCode::Enter => {
        if let Some(user) = self.selected_user() {
          return ViewAction::Push(Box::new(UserDetailView::new(
            user.id.clone(),
            user.full_name.clone(),
            self.ctx.clone(),
          )));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
    self.role_picker.render_overlay(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Users".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.collection.tick();
    self.delete.poll();
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
      ShortcutInfo::new("d", "delete").with_priority(40),
      ShortcutInfo::new("n/p", "page").with_priority(50),
      ShortcutInfo::new("q", "back").with_priority(60),
    ];

    shortcuts.extend(self.search.shortcuts());

    shortcuts
  }
}
