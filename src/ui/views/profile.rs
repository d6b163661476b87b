use crate::api::types::{Profile, ProfileUpdate};
use crate::context::Ctx;
use crate::mutation::{Mutation, MutationOutcome};
use crate::query::{Query, QueryKey};
use crate::ui::components::{Form, FormEvent, FormField, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

const PASSWORD_MISMATCH: &str = "New password and confirm password do not match";

#[derive(Debug, PartialEq)]
enum PasswordCheck {
  /// A field is still blank; keep the form open and wait.
  Incomplete,
  /// Shown as an error toast before anything goes over the wire.
  Mismatch,
  Ok,
}

fn check_password_form(old: &str, new: &str, confirm: &str) -> PasswordCheck {
  if old.is_empty() || new.is_empty() || confirm.is_empty() {
    PasswordCheck::Incomplete
  } else if new != confirm {
    PasswordCheck::Mismatch
  } else {
    PasswordCheck::Ok
  }
}

/// The signed-in admin's own account
pub struct ProfileView {
  ctx: Ctx,
  query: Query<Profile>,
  edit_form: Form,
  password_form: Form,
  save: Mutation,
  change_password: Mutation,
}

impl ProfileView {
  pub fn new(ctx: Ctx) -> Self {
    let api = ctx.api.clone();
    let mut query = Query::keyed(QueryKey::new("user/profile"), ctx.cache.clone(), move || {
      let api = api.clone();
      async move { api.profile().await.map_err(|e| e.to_string()) }
    });
    query.fetch();

    let save = Mutation::new(ctx.cache.clone(), ctx.notifier.clone(), "user/profile");
    let change_password = Mutation::new(ctx.cache.clone(), ctx.notifier.clone(), "user/profile");

    Self {
      ctx,
      query,
      edit_form: Form::new(),
      password_form: Form::new(),
      save,
      change_password,
    }
  }

  fn open_edit(&mut self) {
    if self.save.is_running() {
      return;
    }
    let Some(profile) = self.query.data() else {
      return;
    };
    let fields = vec![
      FormField::new("Full name").with_value(profile.full_name.clone()),
      FormField::new("Email").with_value(profile.email.clone()),
      FormField::new("Username").with_value(profile.username.clone().unwrap_or_default()),
      FormField::new("Phone").with_value(profile.phone.clone().unwrap_or_default()),
      FormField::new("Bio").with_value(profile.bio.clone().unwrap_or_default()),
    ];
    self.edit_form.show("Edit profile", fields);
  }

  fn open_change_password(&mut self) {
    if self.change_password.is_running() {
      return;
    }
    self.password_form.show(
      "Change password",
      vec![
        FormField::new("Current password").masked(),
        FormField::new("New password").masked(),
        FormField::new("Confirm password").masked(),
      ],
    );
  }

  fn submit_edit(&mut self) {
    let full_name = self.edit_form.value(0).trim().to_string();
    let email = self.edit_form.value(1).trim().to_string();
    // Name and email are the identity; without them there is nothing to save
    if full_name.is_empty() || email.is_empty() {
      return;
    }
    let update = ProfileUpdate {
      full_name,
      email,
      username: self.edit_form.value(2).trim().to_string(),
      phone: self.edit_form.value(3).trim().to_string(),
      bio: self.edit_form.value(4).trim().to_string(),
    };
    self.edit_form.hide();

    let api = self.ctx.api.clone();
    self.save.run("Profile updated successfully!", async move {
      api.update_profile(&update).await.map_err(|e| e.to_string())
    });
  }

  fn submit_password(&mut self) {
    let old = self.password_form.value(0).to_string();
    let new = self.password_form.value(1).to_string();
    let confirm = self.password_form.value(2).to_string();

    match check_password_form(&old, &new, &confirm) {
      PasswordCheck::Incomplete => return,
      PasswordCheck::Mismatch => {
        // Caught locally; nothing goes over the wire
        self.ctx.notifier.error(PASSWORD_MISMATCH);
        return;
      }
      PasswordCheck::Ok => {}
    }
    self.password_form.hide();

    let api = self.ctx.api.clone();
    self
      .change_password
      .run("Password changed successfully!", async move {
        api.change_password(&old, &new).await.map_err(|e| e.to_string())
      });
  }

  fn detail_lines(profile: &Profile) -> Vec<Line<'static>> {
    let field = |label: &str, value: String| {
      Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
      ])
    };

    let mut lines = vec![
      Line::from(Span::styled(
        profile.full_name.clone(),
        Style::default().fg(Color::Cyan).bold(),
      )),
      Line::from(""),
      field("Email", profile.email.clone()),
    ];
    if let Some(username) = &profile.username {
      if !username.is_empty() {
        lines.push(field("Username", username.clone()));
      }
    }
    if let Some(phone) = &profile.phone {
      if !phone.is_empty() {
        lines.push(field("Phone", phone.clone()));
      }
    }
    if let Some(bio) = &profile.bio {
      if !bio.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
          bio.clone(),
          Style::default().fg(Color::White),
        )));
      }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      "e: edit profile   c: change password",
      Style::default().fg(Color::DarkGray),
    )));

    lines
  }
}

impl View for ProfileView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.edit_form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted) => {
        self.submit_edit();
        return ViewAction::None;
      }
      KeyResult::Event(FormEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.password_form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted) => {
        self.submit_password();
        return ViewAction::None;
      }
      KeyResult::Event(FormEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('e') => {
        self.open_edit();
      }
      KeyCode::Char('c') => {
        self.open_change_password();
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
    let block = Block::default()
      .title(" Profile ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let content = if let Some(profile) = self.query.data() {
      Paragraph::new(Self::detail_lines(profile))
        .block(block)
        .wrap(Wrap { trim: true })
    } else if let Some(error) = self.query.error() {
      Paragraph::new(format!("Failed to load profile: {}", error))
        .block(block)
        .style(Style::default().fg(Color::Red))
    } else {
      Paragraph::new("Loading...")
        .block(block)
        .style(Style::default().fg(Color::DarkGray))
    };

    frame.render_widget(content, area);
    self.edit_form.render_overlay(frame, area);
    self.password_form.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Profile".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.tick();
    self.save.poll();
    // A changed password invalidates the token server-side; force a
    // fresh sign-in rather than limping on until the first 401
    if self.change_password.poll() == Some(MutationOutcome::Success) {
      return ViewAction::Logout;
    }
    ViewAction::None
  }

  fn wants_text_input(&self) -> bool {
    self.edit_form.is_active() || self.password_form.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("e", "edit").with_priority(20),
      ShortcutInfo::new("c", "password").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(40),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_password_form_waits_for_all_fields() {
    assert_eq!(check_password_form("", "new", "new"), PasswordCheck::Incomplete);
    assert_eq!(check_password_form("old", "new", ""), PasswordCheck::Incomplete);
  }

  #[test]
  fn test_password_mismatch_is_caught_locally() {
    assert_eq!(
      check_password_form("old", "new", "other"),
      PasswordCheck::Mismatch
    );
  }

  #[test]
  fn test_matching_passwords_pass_the_gate() {
    assert_eq!(check_password_form("old", "new", "new"), PasswordCheck::Ok);
  }
}
