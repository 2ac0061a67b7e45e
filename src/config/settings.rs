//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and handed to a pipeline
//! run as an owned snapshot.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use super::history::HistoryEntry;
use super::AppPaths;

// ---------------------------------------------------------------------------
// ProviderKind
// ---------------------------------------------------------------------------

/// Selects which API dialect the provider client speaks.
///
/// | Variant            | Completion endpoint        | Auth          |
/// |--------------------|----------------------------|---------------|
/// | `Local`            | `POST /api/generate`       | none          |
/// | `OpenAiCompatible` | `POST /v1/chat/completions`| Bearer header |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Local generation service (Ollama-style API), no authentication.
    #[serde(alias = "ollama")]
    Local,
    /// Any OpenAI-compatible chat-completions API.
    #[serde(alias = "openai")]
    OpenAiCompatible,
}

impl Default for ProviderKind {
    fn default() -> Self {
        Self::Local
    }
}

// ---------------------------------------------------------------------------
// ProviderConfig
// ---------------------------------------------------------------------------

/// Connection settings for the language-model backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Which dialect to speak.
    pub kind: ProviderKind,
    /// Base URL of the API, without the endpoint path.
    ///
    /// - Local default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key; only sent for [`ProviderKind::OpenAiCompatible`].
    pub api_key: Option<String>,
    /// Model identifier. Empty means "not configured" and blocks every run.
    pub model: String,
    /// Per-request timeout in seconds; `0` leaves the transport default.
    pub timeout_secs: u64,
    /// Seconds between background health probes.
    pub status_poll_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: String::new(),
            timeout_secs: 120,
            status_poll_secs: 5,
        }
    }
}

impl ProviderConfig {
    /// `base_url` with a single trailing slash removed.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.strip_suffix('/').unwrap_or(&self.base_url)
    }

    /// `true` once a model has been selected.
    pub fn has_model(&self) -> bool {
        !self.model.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global hotkey binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Modifier+key combination, e.g. `"CommandOrControl+Shift+F9"`.
    ///
    /// The listener observes keys without consuming them, so the combo also
    /// reaches the focused application. Pick one that applications leave
    /// unbound.
    pub shortcut: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            shortcut: "CommandOrControl+Shift+F9".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TranslationConfig
// ---------------------------------------------------------------------------

/// Language settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Target language used when the selection carries no recognised suffix.
    pub default_target_language: String,
    /// Language code of the notification string table (`locales/<code>.json`).
    pub app_language: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            default_target_language: "English".into(),
            app_language: "en".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// How results are handed back to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Leave the result in the clipboard without simulating a paste.
    pub copy_only: bool,
    /// Play start / success / error sound cues.
    pub sound_enabled: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            copy_only: false,
            sound_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Timing for the simulated copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Milliseconds to wait after the copy chord before reading the
    /// clipboard. Slow applications may need more.
    pub settle_delay_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use glotkey::config::AppConfig;
///
/// let mut config = AppConfig::load().unwrap();
/// config.output.copy_only = true;
/// config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Global hotkey binding.
    pub hotkey: HotkeyConfig,
    /// Default target and UI language.
    pub translation: TranslationConfig,
    /// Backend connection settings.
    pub provider: ProviderConfig,
    /// Delivery and sound settings.
    pub output: OutputConfig,
    /// Copy timing.
    pub capture: CaptureConfig,
    /// User-defined `::key` → prompt template. Templates may reference the
    /// selection with `${text}`.
    pub custom_actions: BTreeMap<String, String>,
    /// Most-recent-first processing history, at most 20 entries.
    pub history: Vec<HistoryEntry>,
}

impl AppConfig {
    /// Read `<config_dir>/glotkey/settings.toml`.
    ///
    /// A missing file is a first run and yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Read settings from `path`; missing file means defaults.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Write `<config_dir>/glotkey/settings.toml`.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Write settings to `path`, creating its directory first.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Look up a custom action template by suffix token, ignoring case.
    pub fn custom_action(&self, token: &str) -> Option<&str> {
        let token = token.to_lowercase();
        self.custom_actions
            .iter()
            .find(|(key, _)| key.to_lowercase() == token)
            .map(|(_, template)| template.as_str())
    }

    /// Insert or replace a custom action.
    ///
    /// The key is normalised with [`normalize_action_key`]; the stored key is
    /// returned so callers can show the user the `::key` to type.
    ///
    /// # Errors
    ///
    /// Fails when the key has no alphanumeric characters or the template is
    /// blank.
    pub fn add_custom_action(&mut self, key: &str, template: &str) -> Result<String> {
        let key = normalize_action_key(key);
        if key.is_empty() {
            bail!("action key must contain at least one letter or digit");
        }
        if template.trim().is_empty() {
            bail!("action template must not be empty");
        }
        self.custom_actions.insert(key.clone(), template.to_string());
        Ok(key)
    }

    /// Remove a custom action. Returns `true` if one was removed.
    pub fn remove_custom_action(&mut self, key: &str) -> bool {
        self.custom_actions
            .remove(&normalize_action_key(key))
            .is_some()
    }
}

// ---------------------------------------------------------------------------
// Dotted-key access
// ---------------------------------------------------------------------------

/// Keys accepted by [`AppConfig::set_value`], in display order.
pub const SETTING_KEYS: &[&str] = &[
    "hotkey.shortcut",
    "translation.default_target_language",
    "translation.app_language",
    "provider.kind",
    "provider.base_url",
    "provider.api_key",
    "provider.model",
    "provider.timeout_secs",
    "provider.status_poll_secs",
    "output.copy_only",
    "output.sound_enabled",
    "capture.settle_delay_ms",
];

impl AppConfig {
    /// Set one scalar setting from its dotted key and a string value.
    ///
    /// `provider.api_key` accepts an empty value to remove the key.
    ///
    /// ```
    /// use glotkey::config::AppConfig;
    ///
    /// let mut config = AppConfig::default();
    /// config.set_value("output.copy_only", "true").unwrap();
    /// assert!(config.output.copy_only);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on an unknown key or a value that does not parse for it.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "hotkey.shortcut" => self.hotkey.shortcut = non_empty(key, value)?,
            "translation.default_target_language" => {
                self.translation.default_target_language = non_empty(key, value)?;
            }
            "translation.app_language" => self.translation.app_language = non_empty(key, value)?,
            "provider.kind" => {
                self.provider.kind = match value.to_lowercase().as_str() {
                    "local" | "ollama" => ProviderKind::Local,
                    "open_ai_compatible" | "openai" => ProviderKind::OpenAiCompatible,
                    other => bail!("unknown provider kind {other:?} (expected local or openai)"),
                };
            }
            "provider.base_url" => self.provider.base_url = non_empty(key, value)?,
            "provider.api_key" => {
                self.provider.api_key = (!value.is_empty()).then(|| value.to_string());
            }
            "provider.model" => self.provider.model = value.to_string(),
            "provider.timeout_secs" => self.provider.timeout_secs = parse(key, value)?,
            "provider.status_poll_secs" => self.provider.status_poll_secs = parse(key, value)?,
            "output.copy_only" => self.output.copy_only = parse(key, value)?,
            "output.sound_enabled" => self.output.sound_enabled = parse(key, value)?,
            "capture.settle_delay_ms" => self.capture.settle_delay_ms = parse(key, value)?,
            _ => bail!("unknown setting {key:?}; known settings: {}", SETTING_KEYS.join(", ")),
        }
        Ok(())
    }
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        bail!("{key} must not be empty");
    }
    Ok(value.to_string())
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow!("invalid value {value:?} for {key}: {e}"))
}

/// Reduce a user-typed action key to lowercase ASCII alphanumerics.
///
/// ```
/// use glotkey::config::normalize_action_key;
///
/// assert_eq!(normalize_action_key("Dev-Log!"), "devlog");
/// ```
pub fn normalize_action_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
