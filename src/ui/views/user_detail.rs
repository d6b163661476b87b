use crate::api::types::{User, ROLE_AGENT};
use crate::context::Ctx;
use crate::query::{Query, QueryKey};
use crate::ui::renderfns::{fmt_date, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::users::role_color;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Read-only record card for one user
pub struct UserDetailView {
  name: String,
  query: Query<User>,
}

impl UserDetailView {
  pub fn new(id: String, name: String, ctx: Ctx) -> Self {
    let api = ctx.api.clone();
    let endpoint = format!("user/{}", id);
    let mut query = Query::keyed(QueryKey::new(endpoint), ctx.cache.clone(), move || {
      let api = api.clone();
      let id = id.clone();
      async move { api.user(&id).await.map_err(|e| e.to_string()) }
    });
    query.fetch();

    Self { name, query }
  }

  fn detail_lines(user: &User) -> Vec<Line<'static>> {
    let field = |label: &str, value: String, color: Color| {
      Line::from(vec![
        Span::styled(format!("{:<14}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(color)),
      ])
    };

    let mut lines = vec![
      Line::from(Span::styled(
        user.full_name.clone(),
        Style::default().fg(Color::Cyan).bold(),
      )),
      Line::from(""),
      field("Email", user.email.clone(), Color::White),
      field("Role", user.role.clone(), role_color(&user.role)),
      field(
        "Verified",
        if user.verified == Some(true) { "yes" } else { "no" }.to_string(),
        Color::White,
      ),
    ];

    if let Some(phone) = &user.phone {
      lines.push(field("Phone", phone.clone(), Color::White));
    }

    if user.role == ROLE_AGENT {
      let (label, color) = match user.agent_approved {
        Some(true) => ("approved", Color::Green),
        Some(false) => ("rejected", Color::Red),
        None => ("pending", Color::Yellow),
      };
      lines.push(field("Approval", label.to_string(), color));
    }

    if let Some(created) = &user.created_at {
      lines.push(field("Member since", fmt_date(created), Color::White));
    }
    if let Some(updated) = &user.updated_at {
      lines.push(field("Updated", fmt_date(updated), Color::White));
    }
    lines.push(Line::from(""));
    lines.push(field("Id", user.id.clone(), Color::DarkGray));

    lines
  }
}

impl View for UserDetailView {
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
      .title(format!(" {} ", truncate(&self.name, 40)))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let content = if let Some(user) = self.query.data() {
      Paragraph::new(Self::detail_lines(user)).block(block)
    } else if let Some(error) = self.query.error() {
      Paragraph::new(format!("Failed to load user: {}", error))
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
    truncate(&self.name, 20)
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
