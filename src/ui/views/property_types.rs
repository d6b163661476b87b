use crate::api::types::PropertyType;
use crate::collection::CollectionQuery;
use crate::context::Ctx;
use crate::mutation::Mutation;
use crate::query::QueryState;
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, Form, FormEvent, FormField, KeyResult, SearchEvent, SearchInput,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{fmt_date, truncate};
use crate::ui::view::{ShortcutInfo, ShortcutProvider, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Property categories with add, rename, and delete
pub struct PropertyTypesView {
  ctx: Ctx,
  collection: CollectionQuery<PropertyType>,
  list_state: ListState,
  search: SearchInput,
  form: Form,
  confirm: ConfirmDialog,
  mutation: Mutation,
  editing_id: Option<String>,
  pending_delete: Option<String>,
}

impl PropertyTypesView {
  pub fn new(ctx: Ctx) -> Self {
    let api = ctx.api.clone();
    let mut collection = CollectionQuery::new(
      "propertytype",
      ctx.cache.clone(),
      ctx.debounce,
      move |params| {
        let api = api.clone();
        async move { api.property_types(&params).await.map_err(|e| e.to_string()) }
      },
    )
    .with_page_size(ctx.page_size);
    collection.start();

    let mutation = Mutation::new(ctx.cache.clone(), ctx.notifier.clone(), "propertytype");

    Self {
      ctx,
      collection,
      list_state: ListState::default(),
      search: SearchInput::new().with_placeholder("type name"),
      form: Form::new(),
      confirm: ConfirmDialog::new(),
      mutation,
      editing_id: None,
      pending_delete: None,
    }
  }

  fn types(&self) -> &[PropertyType] {
    self.collection.items()
  }

  fn selected_type(&self) -> Option<&PropertyType> {
    self.list_state.selected().and_then(|idx| self.types().get(idx))
  }

  fn open_add(&mut self) {
    if self.mutation.is_running() {
      return;
    }
    self.editing_id = None;
    self.form.show("Add property type", vec![FormField::new("Name")]);
  }

  fn open_edit(&mut self) {
    if self.mutation.is_running() {
      return;
    }
    let Some(existing) = self.selected_type() else {
      return;
    };
    let id = existing.id.clone();
    let name = existing.name.clone();
    self.editing_id = Some(id);
    self
      .form
      .show("Edit property type", vec![FormField::new("Name").with_value(name)]);
  }

  fn request_delete(&mut self) {
    if self.mutation.is_running() {
      return;
    }
    let Some(existing) = self.selected_type() else {
      return;
    };
    let id = existing.id.clone();
    let name = existing.name.clone();
    self.pending_delete = Some(id);
    self
      .confirm
      .show("Delete property type", format!("Delete {}?", name));
  }

  fn submit_form(&mut self) {
    let name = self.form.value(0).trim().to_string();
    // An empty name is never sent; the form stays up for another try
    if name.is_empty() {
      return;
    }
    self.form.hide();

    let api = self.ctx.api.clone();
    match self.editing_id.take() {
      Some(id) => {
        self
          .mutation
          .run("Property type updated successfully", async move {
            api.rename_property_type(&id, &name).await.map_err(|e| e.to_string())
          });
      }
      None => {
        self
          .mutation
          .run("Property type added successfully", async move {
            api.create_property_type(&name).await.map_err(|e| e.to_string())
          });
      }
    }
  }

  fn run_delete(&mut self, id: String) {
    let api = self.ctx.api.clone();
    self
      .mutation
      .run("Property type deleted successfully", async move {
        api.delete_property_type(&id).await.map_err(|e| e.to_string())
      });
  }

  fn title(&self) -> String {
    match self.collection.state() {
      QueryState::Loading => " Property types (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Property types (error: {}) ", e),
      _ => format!(
        " Property types ({}) page {}/{} ",
        self.collection.total(),
        self.collection.page(),
        self.collection.total_pages().max(1)
      ),
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.types().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.types().is_empty() && !self.collection.is_loading() {
      let content = if self.collection.error().is_some() {
        "Failed to load property types. Press 'r' to retry."
      } else {
        "No property types yet. Press 'a' to add one."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .types()
      .iter()
      .map(|property_type| {
        let created = property_type
          .created_at
          .as_deref()
          .map(fmt_date)
          .unwrap_or_default();
        let line = Line::from(vec![
          Span::styled(
            format!("{:<28}", truncate(&property_type.name, 28)),
            Style::default().fg(Color::White),
          ),
          Span::raw(" "),
          Span::styled(created, Style::default().fg(Color::DarkGray)),
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

impl View for PropertyTypesView {
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
      KeyCode::Char('a') => {
        self.open_add();
      }
      KeyCode::Char('e') => {
        self.open_edit();
      }
      KeyCode::Char('d') => {
        self.request_delete();
      }
      KeyCode::Char('r') => {
        self.collection.refresh();
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
    self.form.render_overlay(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Property types".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.collection.tick();
    self.mutation.poll();
    ViewAction::None
  }

  fn wants_text_input(&self) -> bool {
    self.search.is_active() || self.form.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("a", "add").with_priority(30),
      ShortcutInfo::new("e", "edit").with_priority(40),
      ShortcutInfo::new("d", "delete").with_priority(50),
      ShortcutInfo::new("q", "back").with_priority(60),
    ];

    shortcuts.extend(self.search.shortcuts());

    shortcuts
  }
}
