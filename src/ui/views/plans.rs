use crate::api::types::{Plan, PlanDraft};
use crate::context::Ctx;
use crate::mutation::Mutation;
use crate::query::{Query, QueryKey, QueryState};
use crate::ui::components::{Form, FormEvent, FormField, KeyResult};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{fmt_amount, status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Subscription plans with editing and activation toggling
pub struct PlansView {
  ctx: Ctx,
  query: Query<Vec<Plan>>,
  list_state: ListState,
  form: Form,
  mutation: Mutation,
  editing_id: Option<String>,
}

/// Turn raw form values into a draft, or a message for the toast line.
/// The backend only knows monthly and yearly billing.
fn parse_draft(name: &str, amount: &str, kind: &str, description: &str) -> Result<PlanDraft, String> {
  let name = name.trim();
  if name.is_empty() {
    return Err("Name is required".to_string());
  }
  let amount: f64 = amount
    .trim()
    .parse()
    .map_err(|_| "Amount must be a number".to_string())?;
  let kind = kind.trim().to_ascii_lowercase();
  if kind != "monthly" && kind != "yearly" {
    return Err("Type must be monthly or yearly".to_string());
  }
  Ok(PlanDraft {
    name: name.to_string(),
    amount,
    kind,
    description: description.trim().to_string(),
  })
}

impl PlansView {
  pub fn new(ctx: Ctx) -> Self {
    let api = ctx.api.clone();
    let mut query = Query::keyed(QueryKey::new("subscription"), ctx.cache.clone(), move || {
      let api = api.clone();
      async move { api.plans().await.map_err(|e| e.to_string()) }
    });
    query.fetch();

    let mutation = Mutation::new(ctx.cache.clone(), ctx.notifier.clone(), "subscription");

    Self {
      ctx,
      query,
      list_state: ListState::default(),
      form: Form::new(),
      mutation,
      editing_id: None,
    }
  }

  fn plans(&self) -> &[Plan] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn selected_plan(&self) -> Option<&Plan> {
    self.list_state.selected().and_then(|idx| self.plans().get(idx))
  }

  fn plan_fields(plan: Option<&Plan>) -> Vec<FormField> {
    match plan {
      Some(plan) => vec![
        FormField::new("Name").with_value(plan.name.clone()),
        FormField::new("Amount").with_value(format!("{}", plan.amount)),
        FormField::new("Type (monthly/yearly)").with_value(plan.kind.clone()),
        FormField::new("Description").with_value(plan.description.clone()),
      ],
      None => vec![
        FormField::new("Name"),
        FormField::new("Amount"),
        FormField::new("Type (monthly/yearly)"),
        FormField::new("Description"),
      ],
    }
  }

  fn open_add(&mut self) {
    if self.mutation.is_running() {
      return;
    }
    self.editing_id = None;
    self.form.show("Add plan", Self::plan_fields(None));
  }

  fn open_edit(&mut self) {
    if self.mutation.is_running() {
      return;
    }
    let Some(plan) = self.selected_plan() else {
      return;
    };
    let id = plan.id.clone();
    let fields = Self::plan_fields(Some(plan));
    self.editing_id = Some(id);
    self.form.show("Edit plan", fields);
  }

  fn submit_form(&mut self) {
    let draft = parse_draft(
      self.form.value(0),
      self.form.value(1),
      self.form.value(2),
      self.form.value(3),
    );
    let draft = match draft {
      Ok(draft) => draft,
      Err(message) => {
        // Leave the form up so the values can be fixed in place
        self.ctx.notifier.error(message);
        return;
      }
    };
    self.form.hide();

    let api = self.ctx.api.clone();
    match self.editing_id.take() {
      Some(id) => {
        self
          .mutation
          .run("Subscription saved successfully!", async move {
            api.update_plan(&id, &draft).await.map_err(|e| e.to_string())
          });
      }
      None => {
        self
          .mutation
          .run("Subscription saved successfully!", async move {
            api.create_plan(&draft).await.map_err(|e| e.to_string())
          });
      }
    }
  }

  fn toggle_status(&mut self) {
    if self.mutation.is_running() {
      return;
    }
    let Some(plan) = self.selected_plan() else {
      return;
    };
    let id = plan.id.clone();
    let activate = !plan.is_active();
    let api = self.ctx.api.clone();
    self
      .mutation
      .run("Subscription status updated successfully!", async move {
        api.set_plan_status(&id, activate).await.map_err(|e| e.to_string())
      });
  }

  fn title(&self) -> String {
    match self.query.state() {
      QueryState::Loading => " Plans (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Plans (error: {}) ", e),
      _ => format!(" Plans ({}) ", self.plans().len()),
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.plans().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.plans().is_empty() && !self.query.is_loading() {
      let content = if self.query.is_error() {
        "Failed to load plans. Press 'r' to retry."
      } else {
        "No plans yet. Press 'a' to add one."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .plans()
      .iter()
      .map(|plan| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<20}", truncate(&plan.name, 20)),
            Style::default().fg(Color::White),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:>10}", fmt_amount(plan.amount, "usd")),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<8}", plan.kind),
            Style::default().fg(Color::Magenta),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<10}", plan.status),
            Style::default().fg(status_color(&plan.status)),
          ),
          Span::raw(" "),
          Span::styled(
            truncate(&plan.description, 32),
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

impl View for PlansView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted) => {
        self.submit_form();
        return ViewAction::None;
      }
      KeyResult::Event(FormEvent::Cancelled) => {
        self.editing_id = None;
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
      KeyCode::Char('a') => {
        self.open_add();
      }
      KeyCode::Char('e') => {
        self.open_edit();
      }
      KeyCode::Char('s') => {
        self.toggle_status();
      }
      KeyCode::Char('r') => {
        self.query.refetch();
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.form.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Plans".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.tick();
    self.mutation.poll();
    ViewAction::None
  }

  fn wants_text_input(&self) -> bool {
    self.form.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("a", "add").with_priority(20),
      ShortcutInfo::new("e", "edit").with_priority(30),
      ShortcutInfo::new("s", "toggle status").with_priority(40),
      ShortcutInfo::new("q", "back").with_priority(50),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_draft_accepts_valid_values() {
    let draft = parse_draft("Gold", "49.99", "Monthly", " premium tier ").unwrap();
    assert_eq!(draft.name, "Gold");
    assert_eq!(draft.amount, 49.99);
    assert_eq!(draft.kind, "monthly");
    assert_eq!(draft.description, "premium tier");
  }

  #[test]
  fn test_parse_draft_rejects_bad_amount() {
    let err = parse_draft("Gold", "cheap", "monthly", "").unwrap_err();
    assert_eq!(err, "Amount must be a number");
  }

  #[test]
  fn test_parse_draft_rejects_unknown_billing_period() {
    let err = parse_draft("Gold", "10", "weekly", "").unwrap_err();
    assert_eq!(err, "Type must be monthly or yearly");
  }

  #[test]
  fn test_parse_draft_requires_name() {
    let err = parse_draft("  ", "10", "yearly", "").unwrap_err();
    assert_eq!(err, "Name is required");
  }
}
