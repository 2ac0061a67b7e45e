//! Shared settings handle.
//!
//! [`ConfigStore`] is the one place settings live while the daemon runs.
//! Readers take an owned [`AppConfig`] snapshot; a pipeline run keeps that
//! snapshot for its whole lifetime, so saves that land mid-run never leak
//! into it. Writes go through [`ConfigStore::update`], which applies them to
//! the file as it is on disk so that the daemon and the CLI can both write
//! it. [`ConfigStore::reload`] picks up edits made elsewhere.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;

use super::history::{push_history, HistoryEntry};
use super::{AppConfig, AppPaths};

/// Cheap-to-clone handle to the live settings.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<AppConfig>>,
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Load from the platform `settings.toml`; updates are written back there.
    pub fn load() -> Result<Self> {
        Self::load_from(AppPaths::new().settings_file)
    }

    /// Load from an explicit path; updates are written back to it.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = AppConfig::load_from(&path)?;
        Ok(Self::new(config, Some(path)))
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, None)
    }

    /// Wrap `config`, persisting updates to `path` when given.
    pub fn new(config: AppConfig, path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            path,
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Owned copy of the current settings.
    pub fn snapshot(&self) -> AppConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `f` to the settings and persist them.
    ///
    /// With a backing file the change is applied to what is on disk *now*,
    /// not to this store's copy, so edits saved by another process since
    /// this store loaded are kept. The write lock is held from the read to
    /// the save, which keeps concurrent updates from reaching disk out of
    /// order. The merged result becomes the live settings.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, parsed or written. If it cannot
    /// be read or parsed, `f` is applied to the live settings only.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let Some(path) = &self.path else {
            f(&mut guard);
            return Ok(());
        };

        let mut config = match AppConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                f(&mut guard);
                return Err(e.context(format!("cannot re-read {}", path.display())));
            }
        };
        f(&mut config);
        let saved = config.save_to(path);
        *guard = config;
        saved
    }

    /// Prepend a history entry (bounded to 20) to the on-disk history and
    /// persist it. Nothing else in the file is touched.
    pub fn record_history(&self, entry: HistoryEntry) -> Result<()> {
        self.update(|config| push_history(&mut config.history, entry))
    }

    /// Re-read the backing file.
    ///
    /// Returns the settings that were live before when the file differs
    /// from them, and `None` when nothing changed or there is no file.
    pub fn reload(&self) -> Result<Option<AppConfig>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let config = AppConfig::load_from(path)?;
        if *guard == config {
            return Ok(None);
        }
        Ok(Some(std::mem::replace(&mut *guard, config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::history::HISTORY_LIMIT;
    use tempfile::tempdir;

    #[test]
    fn snapshot_is_isolated_from_later_updates() {
        let store = ConfigStore::in_memory(AppConfig::default());
        let before = store.snapshot();

        store
            .update(|c| c.provider.model = "llama3".into())
            .unwrap();

        assert!(before.provider.model.is_empty());
        assert_eq!(store.snapshot().provider.model, "llama3");
    }

    #[test]
    fn clones_share_state() {
        let store = ConfigStore::in_memory(AppConfig::default());
        let other = store.clone();
        other.update(|c| c.output.copy_only = true).unwrap();
        assert!(store.snapshot().output.copy_only);
    }

    #[test]
    fn record_history_persists_and_bounds() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        let store = ConfigStore::load_from(&path).expect("load");

        for n in 0..25 {
            store
                .record_history(HistoryEntry {
                    original: format!("in {n}"),
                    result: format!("out {n}"),
                    timestamp_ms: n,
                    model: "m".into(),
                })
                .unwrap();
        }

        let reloaded = AppConfig::load_from(&path).expect("reload");
        assert_eq!(reloaded.history.len(), HISTORY_LIMIT);
        assert_eq!(reloaded.history[0].original, "in 24");
        assert_eq!(reloaded.history, store.snapshot().history);
    }

    #[test]
    fn in_memory_store_has_no_path() {
        let store = ConfigStore::in_memory(AppConfig::default());
        assert!(store.path().is_none());
        store.record_history(HistoryEntry::now("a", "b", "m")).unwrap();
        assert_eq!(store.snapshot().history.len(), 1);
    }

    #[test]
    fn history_write_keeps_changes_from_another_process() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        let daemon = ConfigStore::load_from(&path).expect("daemon load");
        let cli = ConfigStore::load_from(&path).expect("cli load");

        cli.update(|c| {
            c.add_custom_action("dev", "Commit message: ${text}").unwrap();
            c.provider.model = "llama3".into();
        })
        .unwrap();

        daemon
            .record_history(HistoryEntry::now("hola", "hello", "llama3"))
            .unwrap();

        let on_disk = AppConfig::load_from(&path).expect("reload");
        assert_eq!(on_disk.custom_action("dev"), Some("Commit message: ${text}"));
        assert_eq!(on_disk.provider.model, "llama3");
        assert_eq!(on_disk.history.len(), 1);
        assert_eq!(on_disk.history[0].result, "hello");
        assert_eq!(daemon.snapshot(), on_disk);
    }

    #[test]
    fn concurrent_updates_all_reach_disk() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        let store = ConfigStore::load_from(&path).expect("load");

        let workers: Vec<_> = (0..8)
            .map(|n| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .update(|c| {
                            c.custom_actions.insert(format!("a{n}"), "t".into());
                        })
                        .unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let on_disk = AppConfig::load_from(&path).expect("reload");
        assert_eq!(on_disk.custom_actions.len(), 8);
        assert_eq!(on_disk, store.snapshot());
    }

    #[test]
    fn reload_reports_external_edits_once() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        let daemon = ConfigStore::load_from(&path).expect("daemon load");
        assert!(daemon.reload().unwrap().is_none());

        let cli = ConfigStore::load_from(&path).expect("cli load");
        cli.update(|c| c.hotkey.shortcut = "Alt+F2".into()).unwrap();

        let previous = daemon.reload().unwrap().expect("change detected");
        assert_eq!(previous.hotkey, crate::config::HotkeyConfig::default());
        assert_eq!(daemon.snapshot().hotkey.shortcut, "Alt+F2");
        assert!(daemon.reload().unwrap().is_none());
    }

    #[test]
    fn reload_keeps_live_settings_when_file_is_malformed() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        let store = ConfigStore::load_from(&path).expect("load");
        store.update(|c| c.provider.model = "llama3".into()).unwrap();

        std::fs::write(&path, "[provider\nmodel = ").unwrap();
        assert!(store.reload().is_err());
        assert_eq!(store.snapshot().provider.model, "llama3");
    }
}
