use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// When the header shows a shortcut hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortcutVisibility {
  #[default]
  Always,
  /// Only while the owning component has the keyboard.
  WhenActive,
}

/// One `key label` hint in the header. Lower priority sorts first.
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub visibility: ShortcutVisibility,
  pub priority: u8,
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      visibility: ShortcutVisibility::Always,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }

  pub const fn when_active(mut self) -> Self {
    self.visibility = ShortcutVisibility::WhenActive;
    self
  }
}

/// Components that contribute shortcut hints to whichever view embeds them.
pub trait ShortcutProvider {
  fn shortcuts(&self) -> Vec<ShortcutInfo>;
}

/// What a view wants the app to do after handling input or a tick.
pub enum ViewAction {
  /// Nothing to do.
  None,
  /// Open a new view on top of this one.
  Push(Box<dyn View>),
  /// Close this view and return to the one below.
  Pop,
  /// Swap the current view in place (login handing over to the dashboard)
  Replace(Box<dyn View>),
  /// Tear down the session and return to the login screen
  Logout,
}

/// One screen of the console.
///
/// A view owns its input modes (search, forms, pickers) and hands the app a
/// [`ViewAction`] instead of reaching into the stack itself. Data-backed
/// views hold a `Query` or `CollectionQuery` and pump it from `tick`.
pub trait View {
  /// Handle one key press; the app executes whatever comes back.
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Draw this view into `area`.
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Short name for the breadcrumb trail in the footer.
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to poll async queries. May request navigation,
  /// for results that land outside a keypress (a login finishing, say).
  fn tick(&mut self) -> ViewAction {
    ViewAction::None
  }

  /// Whether an overlay or field inside this view currently owns the
  /// keyboard. While true, App passes ':' through instead of opening the
  /// command line.
  fn wants_text_input(&self) -> bool {
    false
  }

  /// Shortcut hints for the header. Every view lists its own; there is no
  /// meaningful shared default.
  fn shortcuts(&self) -> Vec<ShortcutInfo>;
}
