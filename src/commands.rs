//! The `:` command table and its autocomplete matcher.

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "overview",
    aliases: &["o", "dash", "dashboard"],
    description: "Dashboard overview",
  },
  Command {
    name: "users",
    aliases: &["u", "user"],
    description: "Browse user accounts",
  },
  Command {
    name: "agents",
    aliases: &["a", "agent"],
    description: "Review agent approvals",
  },
  Command {
    name: "listings",
    aliases: &["l", "listing"],
    description: "Browse property listings",
  },
  Command {
    name: "types",
    aliases: &["t", "propertytype"],
    description: "Manage property types",
  },
  Command {
    name: "plans",
    aliases: &["pl", "plan", "subscriptions"],
    description: "Manage subscription plans",
  },
  Command {
    name: "payments",
    aliases: &["pay", "payment", "tx"],
    description: "Payment history",
  },
  Command {
    name: "profile",
    aliases: &["me", "account"],
    description: "Your admin profile",
  },
  Command {
    name: "logout",
    aliases: &[],
    description: "Sign out and return to login",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit p9s",
  },
];

/// Match quality, lower is better. A name hit outranks an alias hit of the
/// same kind, exact beats prefix beats substring.
fn score(cmd: &Command, needle: &str) -> Option<u32> {
  if cmd.name == needle {
    return Some(0);
  }
  if cmd.aliases.contains(&needle) {
    return Some(1);
  }
  if cmd.name.starts_with(needle) {
    return Some(2);
  }
  if cmd.aliases.iter().any(|a| a.starts_with(needle)) {
    return Some(3);
  }
  if cmd.name.contains(needle) {
    return Some(4);
  }
  if cmd.aliases.iter().any(|a| a.contains(needle)) {
    return Some(5);
  }
  None
}

/// Commands matching `input`, best first. Ties keep table order; the sort
/// is stable.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let needle = input.to_lowercase();
  if needle.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut ranked: Vec<(u32, &'static Command)> = COMMANDS
    .iter()
    .filter_map(|cmd| score(cmd, &needle).map(|rank| (rank, cmd)))
    .collect();
  ranked.sort_by_key(|(rank, _)| *rank);
  ranked.into_iter().map(|(_, cmd)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("users");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "users");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("a");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "agents");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("over");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "overview");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("ment");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "payments");
  }

  #[test]
  fn test_name_beats_alias() {
    // "plan" is an alias of plans but also a prefix of nothing else
    let suggestions = get_suggestions("plans");
    assert_eq!(suggestions[0].name, "plans");
  }
}
