use crate::api::types::{ListParams, Listing, PropertyType};
use crate::collection::CollectionQuery;
use crate::context::Ctx;
use crate::query::{Query, QueryKey, QueryState};
use crate::ui::components::{KeyResult, Picker, PickerEvent, PickerItem, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{fmt_amount, truncate};
use crate::ui::view::{ShortcutInfo, ShortcutProvider, View, ViewAction};
use crate::ui::views::ListingDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Paginated property listings with search and a category filter
pub struct ListingsView {
  ctx: Ctx,
  collection: CollectionQuery<Listing>,
  categories: Query<Vec<PropertyType>>,
  list_state: ListState,
  search: SearchInput,
  category_picker: Picker,
}

impl ListingsView {
  pub fn new(ctx: Ctx) -> Self {
    let api = ctx.api.clone();
    let mut collection = CollectionQuery::new(
      "listing/",
      ctx.cache.clone(),
      ctx.debounce,
      move |params| {
        let api = api.clone();
        async move { api.listings(&params).await.map_err(|e| e.to_string()) }
      },
    )
    .with_page_size(ctx.page_size);
    collection.start();

    // The filter picker needs every category at once, not a page of ten
    let api = ctx.api.clone();
    let key = QueryKey::new("propertytype").param("page", "1").param("limit", "100");
    let mut categories = Query::keyed(key, ctx.cache.clone(), move || {
      let api = api.clone();
      async move {
        let params = ListParams {
          limit: 100,
          ..ListParams::default()
        };
        api
          .property_types(&params)
          .await
          .map(|page| page.items)
          .map_err(|e| e.to_string())
      }
    });
    categories.fetch();

    Self {
      ctx,
      collection,
      categories,
      list_state: ListState::default(),
      search: SearchInput::new().with_placeholder("title or address"),
      category_picker: Picker::new(),
    }
  }

  fn listings(&self) -> &[Listing] {
    self.collection.items()
  }

  fn selected_listing(&self) -> Option<&Listing> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.listings().get(idx))
  }

  fn open_category_filter(&mut self) {
    let mut items = vec![PickerItem::new("All categories", "all")];
    if let Some(categories) = self.categories.data() {
      for category in categories {
        items.push(PickerItem::new(category.name.clone(), category.id.clone()));
      }
    }
    self.category_picker.show("Filter by category", items);
  }

  fn category_name(&self, id: &str) -> Option<String> {
    self
      .categories
      .data()?
      .iter()
      .find(|c| c.id == id)
      .map(|c| c.name.clone())
  }

  fn title(&self) -> String {
    match self.collection.state() {
      QueryState::Loading => " Listings (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Listings (error: {}) ", e),
      _ => {
        let mut title = format!(
          " Listings ({}) page {}/{} ",
          self.collection.total(),
          self.collection.page(),
          self.collection.total_pages().max(1)
        );
        if let Some(id) = self.collection.filter("type") {
          let name = self.category_name(id).unwrap_or_else(|| id.to_string());
          title.push_str(&format!("[{}] ", name));
        }
        if !self.collection.search().is_empty() {
          title.push_str(&format!("[/{}] ", self.collection.search()));
        }
        title
      }
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.listings().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.listings().is_empty() && !self.collection.is_loading() {
      let content = if self.collection.error().is_some() {
        "Failed to load listings. Press 'r' to retry."
      } else {
        "No listings found."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .listings()
      .iter()
      .map(|listing| {
        let category = listing
          .category
          .as_ref()
          .map(|c| c.name.as_str())
          .unwrap_or("-");
        let place = if listing.city.is_empty() {
          listing.country.clone()
        } else {
          format!("{}, {}", listing.city, listing.country)
        };
        let provider = listing
          .provider
          .as_ref()
          .map(|p| p.full_name.as_str())
          .unwrap_or("-");
        let line = Line::from(vec![
          Span::styled(
            format!("{:<28}", truncate(&listing.title, 28)),
            Style::default().fg(Color::White),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<12}", truncate(category, 12)),
            Style::default().fg(Color::Magenta),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:>10}", fmt_amount(listing.price, "usd")),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<20}", truncate(&place, 20)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::styled(
            truncate(provider, 16),
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

impl View for ListingsView {
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

    match self.category_picker.handle_key(key) {
      KeyResult::Event(PickerEvent::Picked(id)) => {
        let value = if id == "all" { None } else { Some(id) };
        self.collection.set_filter("type", value);
        return ViewAction::None;
      }
      KeyResult::Event(PickerEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
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
        self.open_category_filter();
      }
      KeyCode::Char('r') => {
        self.collection.refresh();
      }
      KeyCode::Enter => {
        if let Some(listing) = self.selected_listing() {
          return ViewAction::Push(Box::new(ListingDetailView::new(
            listing.id.clone(),
            listing.title.clone(),
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
    self.category_picker.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Listings".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.collection.tick();
    self.categories.tick();
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
      ShortcutInfo::new("n/p", "page").with_priority(40),
      ShortcutInfo::new("q", "back").with_priority(50),
    ];

    shortcuts.extend(self.search.shortcuts());

    shortcuts
  }
}
