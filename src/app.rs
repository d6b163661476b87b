use crate::commands;
use crate::config::Config;
use crate::context::Ctx;
use crate::event::{Event, EventHandler};
use crate::ui::components::draw_command_overlay;
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{
  AgentsView, ListingsView, LoginView, OverviewView, PaymentsView, PlansView, ProfileView,
  PropertyTypesView, UsersView,
};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Current input mode
  mode: Mode,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// Application configuration
  config: Config,

  /// Shared service handles passed into every view
  ctx: Ctx,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, ctx: Ctx) -> Self {
    let root: Box<dyn View> = if ctx.session.is_authenticated() {
      Box::new(OverviewView::new(ctx.clone()))
    } else {
      Box::new(LoginView::new(ctx.clone()))
    };

    Self {
      view_stack: vec![root],
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      config,
      ctx,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      if let Some(event) = events.next().await {
        match event {
          Event::Key(key) => self.handle_key(key),
          // Redraw happens at the top of the loop.
          Event::Resize => {}
          Event::Tick => self.on_tick(),
        }
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Min(1),    // Main content
        Constraint::Length(1), // Footer
      ])
      .split(frame.area());

    let shortcuts = self
      .view_stack
      .last()
      .map(|view| view.shortcuts())
      .unwrap_or_default();
    let admin = self.ctx.session.admin_name().unwrap_or_default();
    draw_header(
      frame,
      chunks[0],
      &self.config.api.base_url,
      self.config.title.as_deref(),
      &admin,
      &shortcuts,
    );

    if let Some(view) = self.view_stack.last_mut() {
      view.render(frame, chunks[1]);
    }

    let breadcrumb: Vec<String> = self
      .view_stack
      .iter()
      .map(|view| view.breadcrumb_label())
      .collect();
    let toast = self.ctx.notifier.current();
    draw_footer(frame, chunks[2], &breadcrumb, toast.as_ref());

    // Command overlay sits above everything
    if self.mode == Mode::Command {
      let suggestions = commands::get_suggestions(&self.command_input);
      draw_command_overlay(
        frame,
        chunks[1],
        &self.command_input,
        &suggestions,
        self.selected_suggestion,
      );
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    // Ctrl-C quits from anywhere, even mid-typing
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: KeyEvent) {
    let typing = self
      .view_stack
      .last()
      .map(|view| view.wants_text_input())
      .unwrap_or(false);

    // The command line needs a session to act on, and a ':' typed into an
    // open form belongs to the form
    if key.code == KeyCode::Char(':') && !typing && self.ctx.session.is_authenticated() {
      self.mode = Mode::Command;
      self.command_input.clear();
      self.selected_suggestion = 0;
      return;
    }

    if let Some(view) = self.view_stack.last_mut() {
      let action = view.handle_key(key);
      self.apply_action(action);
    }
  }

  fn handle_command_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        // Navigate autocomplete suggestions
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        // Navigate autocomplete suggestions backwards
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0; // Reset selection on input change
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0; // Reset selection on input change
      }
      _ => {}
    }
  }

  fn execute_command(&mut self) {
    // Get the command to execute - either from selected suggestion or direct input
    let suggestions = commands::get_suggestions(&self.command_input);
    let cmd = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      suggestions[self.selected_suggestion].name.to_string()
    } else {
      self.command_input.trim().to_lowercase()
    };
    self.command_input.clear();

    match cmd.as_str() {
      "logout" => {
        self.logout();
        return;
      }
      "quit" => {
        self.should_quit = true;
        return;
      }
      _ => {}
    }

    if let Some(root) = self.root_view(&cmd) {
      self.view_stack[0] = root;
      self.view_stack.truncate(1);
    } else if !cmd.is_empty() {
      self.ctx.notifier.error(format!("Unknown command: {}", cmd));
    }
  }

  fn root_view(&self, name: &str) -> Option<Box<dyn View>> {
    let ctx = self.ctx.clone();
    let view: Box<dyn View> = match name {
      "overview" => Box::new(OverviewView::new(ctx)),
      "users" => Box::new(UsersView::new(ctx)),
      "agents" => Box::new(AgentsView::new(ctx)),
      "listings" => Box::new(ListingsView::new(ctx)),
      "types" => Box::new(PropertyTypesView::new(ctx)),
      "plans" => Box::new(PlansView::new(ctx)),
      "payments" => Box::new(PaymentsView::new(ctx)),
      "profile" => Box::new(ProfileView::new(ctx)),
      _ => return None,
    };
    Some(view)
  }

  fn apply_action(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Replace(view) => {
        self.view_stack.pop();
        self.view_stack.push(view);
      }
      ViewAction::Logout => {
        self.logout();
      }
    }
  }

  fn logout(&mut self) {
    self.ctx.session.logout();
    // Cached responses belong to the closed session
    self.ctx.cache.clear();
    self.ctx.notifier.info("Signed out");
    self.mode = Mode::Normal;
    self.view_stack.clear();
    self.view_stack.push(Box::new(LoginView::new(self.ctx.clone())));
  }

  fn on_tick(&mut self) {
    // Only the visible view polls; covered views pick their results up
    // when they resurface
    if let Some(view) = self.view_stack.last_mut() {
      let action = view.tick();
      self.apply_action(action);
    }
  }
}
