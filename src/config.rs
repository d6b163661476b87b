use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for header (defaults to API domain if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the marketplace backend, e.g. https://api.example.com/api/v1
  pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  /// Rows per page in list views
  #[serde(default = "default_page_size")]
  pub page_size: u64,
  /// How long a search field stays quiet before it queries, in milliseconds
  #[serde(default = "default_search_debounce_ms")]
  pub search_debounce_ms: u64,
  /// Year the earnings chart opens on (defaults to the newest)
  #[serde(default)]
  pub earnings_year: Option<String>,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      page_size: default_page_size(),
      search_debounce_ms: default_search_debounce_ms(),
      earnings_year: None,
    }
  }
}

fn default_page_size() -> u64 {
  10
}

fn default_search_debounce_ms() -> u64 {
  500
}

impl Config {
  /// Load configuration, looking at the explicit path first, then
  /// `./p9s.yaml`, then `$XDG_CONFIG_HOME/p9s/config.yaml` and its
  /// platform equivalents.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = match explicit_path {
      Some(p) if p.exists() => p.to_path_buf(),
      Some(p) => return Err(eyre!("Config file not found: {}", p.display())),
      None => Self::find_config_file().ok_or_else(|| {
        eyre!(
          "No configuration file found. Create one at ~/.config/p9s/config.yaml\n\
           See config.example.yaml for the format."
        )
      })?,
    };
    Self::load_from_path(&path).map(Self::apply_env)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("p9s.yaml");
    if local.exists() {
      return Some(local);
    }
    let xdg = dirs::config_dir()?.join("p9s").join("config.yaml");
    xdg.exists().then_some(xdg)
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;
    Ok(config)
  }

  /// Apply environment overrides. P9S_API_URL replaces the configured base URL.
  fn apply_env(mut self) -> Self {
    if let Ok(url) = std::env::var("P9S_API_URL") {
      self.api.base_url = url;
    }
    self
  }

  /// Where runtime state lives: $XDG_DATA_HOME/p9s (or the platform
  /// equivalent). Holds the session file and logs.
  pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("p9s"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_gets_ui_defaults() {
    let config: Config = serde_yaml::from_str(
      "api:\n  base_url: https://api.example.com/api/v1\n",
    )
    .unwrap();
    assert_eq!(config.api.base_url, "https://api.example.com/api/v1");
    assert_eq!(config.title, None);
    assert_eq!(config.ui.page_size, 10);
    assert_eq!(config.ui.search_debounce_ms, 500);
    assert_eq!(config.ui.earnings_year, None);
  }

  #[test]
  fn test_ui_overrides_parse() {
    let config: Config = serde_yaml::from_str(
      "api:\n  base_url: http://localhost:5000\n\
       title: staging\n\
       ui:\n  page_size: 25\n  search_debounce_ms: 200\n",
    )
    .unwrap();
    assert_eq!(config.title.as_deref(), Some("staging"));
    assert_eq!(config.ui.page_size, 25);
    assert_eq!(config.ui.search_debounce_ms, 200);
  }

  #[test]
  fn test_missing_base_url_rejected() {
    let result: std::result::Result<Config, _> = serde_yaml::from_str("title: p9s\n");
    assert!(result.is_err());
  }
}
