use crate::api::types::Listing;
use crate::context::Ctx;
use crate::query::{Query, QueryKey};
use crate::ui::renderfns::fmt_amount;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Full record for one property listing
pub struct ListingDetailView {
  title: String,
  query: Query<Listing>,
}

impl ListingDetailView {
  pub fn new(id: String, title: String, ctx: Ctx) -> Self {
    let api = ctx.api.clone();
    let endpoint = format!("listing/{}", id);
    let mut query = Query::keyed(QueryKey::new(endpoint), ctx.cache.clone(), move || {
      let api = api.clone();
      let id = id.clone();
      async move { api.listing(&id).await.map_err(|e| e.to_string()) }
    });
    query.fetch();

    Self { title, query }
  }

  fn detail_lines(listing: &Listing) -> Vec<Line<'static>> {
    let field = |label: &str, value: String| {
      Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
      ])
    };

    let mut lines = vec![
      Line::from(vec![
        Span::styled(
          listing.title.clone(),
          Style::default().fg(Color::Cyan).bold(),
        ),
        Span::raw("  "),
        Span::styled(
          fmt_amount(listing.price, "usd"),
          Style::default().fg(Color::Green).bold(),
        ),
      ]),
      Line::from(""),
    ];

    if let Some(category) = &listing.category {
      lines.push(field("Category", category.name.clone()));
    }
    if !listing.address.is_empty() {
      lines.push(field("Address", listing.address.clone()));
    }
    let place: Vec<&str> = [listing.city.as_str(), listing.country.as_str()]
      .into_iter()
      .filter(|part| !part.is_empty())
      .collect();
    if !place.is_empty() {
      lines.push(field("Place", place.join(", ")));
    }
    if !listing.size.is_empty() {
      lines.push(field("Size", listing.size.clone()));
    }
    if !listing.area.is_empty() {
      lines.push(field("Area", listing.area.clone()));
    }
    if !listing.month.is_empty() {
      lines.push(field("Month", listing.month.clone()));
    }
    if let Some(point) = &listing.location {
      if let (Some(longitude), Some(latitude)) = (point.longitude(), point.latitude()) {
        lines.push(field("Coords", format!("{:.5}, {:.5}", latitude, longitude)));
      }
    }

    if let Some(provider) = &listing.provider {
      lines.push(Line::from(""));
      lines.push(Line::from(Span::styled(
        "Listed by",
        Style::default().fg(Color::DarkGray).bold(),
      )));
      lines.push(field("Name", provider.full_name.clone()));
      lines.push(field("Email", provider.email.clone()));
      if let Some(phone) = &provider.phone {
        lines.push(field("Phone", phone.clone()));
      }
    }

    if !listing.description.is_empty() {
      lines.push(Line::from(""));
      lines.push(Line::from(Span::styled(
        listing.description.clone(),
        Style::default().fg(Color::White),
      )));
    }

    lines
  }
}

impl View for ListingDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.query.refetch();
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", truncate(&self.title, 50)))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let content = if let Some(listing) = self.query.data() {
      Paragraph::new(Self::detail_lines(listing))
        .block(block)
        .wrap(Wrap { trim: true })
    } else if let Some(error) = self.query.error() {
      Paragraph::new(format!("Failed to load listing: {}", error))
        .block(block)
        .style(Style::default().fg(Color::Red))
    } else {
      Paragraph::new("Loading...")
        .block(block)
        .style(Style::default().fg(Color::DarkGray))
    };

    frame.render_widget(content, area);
  }

  fn breadcrumb_label(&self) -> String {
    truncate(&self.title, 20)
  }

  fn tick(&mut self) -> ViewAction {
    self.query.tick();
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("r", "refresh").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}
