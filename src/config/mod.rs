//! Configuration module for glotkey.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! the bounded processing history, `AppPaths` for cross-platform directories,
//! TOML persistence via `AppConfig::load` / `AppConfig::save`, and the
//! snapshotting [`ConfigStore`] shared by the daemon. [`spawn_settings_watcher`]
//! reloads the store when another process edits the file.

pub mod history;
pub mod paths;
pub mod settings;
pub mod store;
pub mod watch;

pub use history::{push_history, HistoryEntry, HISTORY_LIMIT};
pub use paths::AppPaths;
pub use settings::{
    normalize_action_key, AppConfig, CaptureConfig, HotkeyConfig, OutputConfig, ProviderConfig,
    ProviderKind, TranslationConfig, SETTING_KEYS,
};
pub use store::ConfigStore;
pub use watch::{spawn_settings_watcher, RELOAD_INTERVAL};
