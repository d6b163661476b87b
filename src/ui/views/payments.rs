use crate::api::types::Transaction;
use crate::context::Ctx;
use crate::query::{Query, QueryKey, QueryState};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{fmt_amount, fmt_date, status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Payment history. The backend returns the whole ledger at once, so the
/// paging here is local.
pub struct PaymentsView {
  query: Query<Vec<Transaction>>,
  list_state: ListState,
  page: u64,
  page_size: u64,
}

/// Index range of one page, clamped to the collection
fn page_bounds(len: usize, page: u64, page_size: u64) -> (usize, usize) {
  let start = ((page.saturating_sub(1)) * page_size) as usize;
  let start = start.min(len);
  let end = (start + page_size as usize).min(len);
  (start, end)
}

fn page_count(len: usize, page_size: u64) -> u64 {
  if page_size == 0 {
    return 1;
  }
  ((len as u64).div_ceil(page_size)).max(1)
}

impl PaymentsView {
  pub fn new(ctx: Ctx) -> Self {
    let api = ctx.api.clone();
    let mut query = Query::keyed(QueryKey::new("payment/"), ctx.cache.clone(), move || {
      let api = api.clone();
      async move { api.transactions().await.map_err(|e| e.to_string()) }
    });
    query.fetch();

    Self {
      query,
      list_state: ListState::default(),
      page: 1,
      page_size: ctx.page_size.max(1),
    }
  }

  fn all(&self) -> &[Transaction] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn visible(&self) -> &[Transaction] {
    let all = self.all();
    let (start, end) = page_bounds(all.len(), self.page, self.page_size);
    &all[start..end]
  }

  fn total_pages(&self) -> u64 {
    page_count(self.all().len(), self.page_size)
  }

  fn can_next(&self) -> bool {
    self.query.data().is_some() && self.page < self.total_pages()
  }

  fn can_prev(&self) -> bool {
    self.query.data().is_some() && self.page > 1
  }

  fn title(&self) -> String {
    match self.query.state() {
      QueryState::Loading => " Payments (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Payments (error: {}) ", e),
      _ => format!(
        " Payments ({}) page {}/{} ",
        self.all().len(),
        self.page,
        self.total_pages()
      ),
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.visible().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.all().is_empty() && !self.query.is_loading() {
      let content = if self.query.is_error() {
        "Failed to load payments. Press 'r' to retry."
      } else {
        "No payments recorded."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .visible()
      .iter()
      .map(|tx| {
        let plan = tx
          .subscription
          .as_ref()
          .map(|p| p.name.as_str())
          .unwrap_or("-");
        let date = tx.created_at.as_deref().map(fmt_date).unwrap_or_default();
        let line = Line::from(vec![
          Span::styled(
            format!("{:<22}", truncate(&tx.user.full_name, 22)),
            Style::default().fg(Color::White),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<26}", truncate(&tx.user.email, 26)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<14}", truncate(plan, 14)),
            Style::default().fg(Color::Magenta),
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

impl View for PaymentsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('n') | KeyCode::Right => {
        if self.can_next() {
          self.page += 1;
          self.list_state.select(None);
        }
      }
      KeyCode::Char('p') | KeyCode::Left => {
        if self.can_prev() {
          self.page -= 1;
          self.list_state.select(None);
        }
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
  }

  fn breadcrumb_label(&self) -> String {
    "Payments".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.tick();
    // A refetch can shrink the ledger under the current page
    let last = self.total_pages();
    if self.page > last {
      self.page = last;
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("n/p", "page").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(40),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_page_bounds_inside_collection() {
    assert_eq!(page_bounds(25, 1, 10), (0, 10));
    assert_eq!(page_bounds(25, 2, 10), (10, 20));
    assert_eq!(page_bounds(25, 3, 10), (20, 25));
  }

  #[test]
  fn test_page_bounds_past_the_end_is_empty() {
    assert_eq!(page_bounds(25, 9, 10), (25, 25));
  }

  #[test]
  fn test_page_count_rounds_up() {
    assert_eq!(page_count(25, 10), 3);
    assert_eq!(page_count(30, 10), 3);
    assert_eq!(page_count(0, 10), 1);
  }
}
