use crate::api::ApiError;
use crate::context::Ctx;
use crate::ui::components::TextInput;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::OverviewView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tokio::sync::mpsc;

/// Sign-in screen shown until an admin session exists
pub struct LoginView {
  ctx: Ctx,
  email: TextInput,
  password: TextInput,
  focused: usize,
  submitting: bool,
  error: Option<String>,
  receiver: Option<mpsc::UnboundedReceiver<Result<(), ApiError>>>,
}

impl LoginView {
  pub fn new(ctx: Ctx) -> Self {
    Self {
      ctx,
      email: TextInput::new(),
      password: TextInput::new(),
      focused: 0,
      submitting: false,
      error: None,
      receiver: None,
    }
  }

  fn submit(&mut self) {
    if self.submitting {
      return;
    }
    self.submitting = true;
    self.error = None;

    let session = self.ctx.session.clone();
    let api = self.ctx.api.clone();
    let email = self.email.value().to_string();
    let password = self.password.value().to_string();

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);

    tokio::spawn(async move {
      let _ = tx.send(session.login(&api, &email, &password).await);
    });
  }

  fn field_line<'a>(&self, value: String, focused: bool) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    Line::from(vec![
      Span::styled(marker, Style::default().fg(Color::Cyan)),
      Span::raw(value),
      if focused {
        Span::styled("_", Style::default().fg(Color::Yellow))
      } else {
        Span::raw("")
      },
    ])
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // A submit in flight owns the keyboard
    if self.submitting {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focused = (self.focused + 1) % 2;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focused = if self.focused == 0 { 1 } else { 0 };
      }
      KeyCode::Enter => {
        self.submit();
      }
      _ => {
        let input = if self.focused == 0 {
          &mut self.email
        } else {
          &mut self.password
        };
        input.handle_key(key);
      }
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let width = 52.min(area.width.saturating_sub(2));
    let height = 11.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let box_area = Rect::new(x, y, width, height);

    let block = Block::default()
      .title(" Sign in ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let label = |text: &str, focused: bool| {
      let style = if focused {
        Style::default().fg(Color::Cyan).bold()
      } else {
        Style::default().fg(Color::DarkGray)
      };
      Line::from(Span::styled(text.to_string(), style))
    };

    let masked = "\u{2022}".repeat(self.password.value().chars().count());

    let status = if self.submitting {
      Line::from(Span::styled(
        "Signing in...",
        Style::default().fg(Color::Yellow),
      ))
    } else if let Some(error) = &self.error {
      Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else {
      Line::from("")
    };

    let lines = vec![
      label("Email", self.focused == 0),
      self.field_line(self.email.value().to_string(), self.focused == 0),
      Line::from(""),
      label("Password", self.focused == 1),
      self.field_line(masked, self.focused == 1),
      Line::from(""),
      status,
      Line::from(Span::styled(
        "Tab to switch, Enter to sign in",
        Style::default().fg(Color::DarkGray),
      )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
  }

  fn breadcrumb_label(&self) -> String {
    "Login".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    let Some(receiver) = self.receiver.as_mut() else {
      return ViewAction::None;
    };
    match receiver.try_recv() {
      Ok(Ok(())) => {
        self.receiver = None;
        self.submitting = false;
        ViewAction::Replace(Box::new(OverviewView::new(self.ctx.clone())))
      }
      Ok(Err(error)) => {
        self.receiver = None;
        self.submitting = false;
        self.password.clear();
        self.error = Some(error.to_string());
        ViewAction::None
      }
      Err(mpsc::error::TryRecvError::Empty) => ViewAction::None,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        self.receiver = None;
        self.submitting = false;
        ViewAction::None
      }
    }
  }

  fn wants_text_input(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Tab", "switch field").with_priority(10),
      ShortcutInfo::new("Enter", "sign in").with_priority(20),
    ]
  }
}
