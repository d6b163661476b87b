use crate::api::types::{MonthEarning, Overview, Transaction};
use crate::context::Ctx;
use crate::query::{Query, QueryKey, QueryState};
use crate::ui::renderfns::{fmt_amount, fmt_date, status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};

const YEARS: [&str; 3] = ["2023", "2024", "2025"];

/// Dashboard with headline counters, the earnings chart, and recent payments
pub struct OverviewView {
  ctx: Ctx,
  stats: Query<Overview>,
  earnings: Query<Vec<MonthEarning>>,
  recent: Query<Vec<Transaction>>,
  year: String,
}

impl OverviewView {
  pub fn new(ctx: Ctx) -> Self {
    let api = ctx.api.clone();
    let mut stats = Query::keyed(QueryKey::new("dashboard/"), ctx.cache.clone(), move || {
      let api = api.clone();
      async move { api.overview().await.map_err(|e| e.to_string()) }
    });
    stats.fetch();

    let api = ctx.api.clone();
    let mut recent = Query::keyed(QueryKey::new("payment/"), ctx.cache.clone(), move || {
      let api = api.clone();
      async move { api.transactions().await.map_err(|e| e.to_string()) }
    });
    recent.fetch();

    // The chart opens on the configured year, or the newest one we list.
    let year = ctx
      .earnings_year
      .clone()
      .unwrap_or_else(|| YEARS[YEARS.len() - 1].to_string());
    let earnings = Self::earnings_query(&ctx, &year);

    Self {
      ctx,
      stats,
      earnings,
      recent,
      year,
    }
  }

  fn earnings_query(ctx: &Ctx, year: &str) -> Query<Vec<MonthEarning>> {
    let api = ctx.api.clone();
    let key = QueryKey::new("dashboard/monthly-earnings").param("year", year);
    let year = year.to_string();
    let mut query = Query::keyed(key, ctx.cache.clone(), move || {
      let api = api.clone();
      let year = year.clone();
      async move { api.monthly_earnings(&year).await.map_err(|e| e.to_string()) }
    });
    query.fetch();
    query
  }

  fn cycle_year(&mut self) {
    // An off-list configured year joins the cycle at its start.
    let next = match YEARS.iter().position(|y| *y == self.year) {
      Some(at) => (at + 1) % YEARS.len(),
      None => 0,
    };
    self.year = YEARS[next].to_string();
    // A fresh cached year renders instantly, the rest go out on the wire
    self.earnings = Self::earnings_query(&self.ctx, &self.year);
  }

  fn render_stats(&self, frame: &mut Frame, area: Rect) {
    let stats = self.stats.data().cloned().unwrap_or_default();
    let loading = self.stats.is_loading();

    let value = |n: String| if loading { "...".to_string() } else { n };
    let cells = [
      ("Users", value(stats.total_user.to_string())),
      ("Listings", value(stats.total_listing.to_string())),
      ("Active properties", value(stats.total_active_property.to_string())),
      ("Subscriptions", value(stats.subscription_data.to_string())),
      ("Revenue", value(fmt_amount(stats.total_revenue, "usd"))),
    ];

    let chunks = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Ratio(1, 5); 5])
      .split(area);

    for (i, (title, value)) in cells.iter().enumerate() {
      let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
      let para = Paragraph::new(Line::from(Span::styled(
        value.clone(),
        Style::default().fg(Color::White).bold(),
      )))
      .alignment(Alignment::Center)
      .block(block);
      frame.render_widget(para, chunks[i]);
    }
  }

  fn render_chart(&self, frame: &mut Frame, area: Rect) {
    let title = match self.earnings.state() {
      QueryState::Loading => format!(" Earnings {} (loading...) ", self.year),
      QueryState::Error(e) => format!(" Earnings {} (error: {}) ", self.year, e),
      _ => format!(" Earnings {} ", self.year),
    };
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let months = self.earnings.data().map(|v| v.as_slice()).unwrap_or(&[]);
    if months.is_empty() {
      let content = if self.earnings.is_loading() {
        ""
      } else {
        "No earnings recorded for this year."
      };
      let para = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(para, area);
      return;
    }

    let bars: Vec<Bar> = months
      .iter()
      .map(|m| {
        let label: String = m.month.chars().take(3).collect();
        Bar::default()
          .label(label.into())
          .value(m.total_earnings.round() as u64)
      })
      .collect();

    let chart = BarChart::default()
      .block(block)
      .data(BarGroup::default().bars(&bars))
      .bar_width(5)
      .bar_gap(1)
      .bar_style(Style::default().fg(Color::Cyan))
      .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    frame.render_widget(chart, area);
  }

  fn render_recent(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Recent payments ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let transactions = self.recent.data().map(|v| v.as_slice()).unwrap_or(&[]);
    if transactions.is_empty() {
      let content = if self.recent.is_loading() {
        "Loading..."
      } else {
        "No payments yet."
      };
      let para = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(para, area);
      return;
    }

    let lines: Vec<Line> = transactions
      .iter()
      .take(5)
      .map(|tx| {
        let date = tx.created_at.as_deref().map(fmt_date).unwrap_or_default();
        Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&tx.user.full_name, 24)),
            Style::default().fg(Color::White),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:>10}", fmt_amount(tx.amount, &tx.currency)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<10}", truncate(&tx.status, 10)),
            Style::default().fg(status_color(&tx.status)),
          ),
          Span::raw(" "),
          Span::styled(date, Style::default().fg(Color::DarkGray)),
        ])
      })
      .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
  }
}

impl View for OverviewView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('y') => {
        self.cycle_year();
      }
      KeyCode::Char('r') => {
        self.stats.refetch();
        self.earnings.refetch();
        self.recent.refetch();
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(7),
      ])
      .split(area);

    self.render_stats(frame, chunks[0]);
    self.render_chart(frame, chunks[1]);
    self.render_recent(frame, chunks[2]);
  }

  fn breadcrumb_label(&self) -> String {
    "Overview".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.stats.tick();
    self.earnings.tick();
    self.recent.tick();
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("y", "year").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "quit").with_priority(40),
    ]
  }
}
