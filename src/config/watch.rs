//! Picking up settings changed by another process.
//!
//! The CLI writes `settings.toml` while the daemon runs. The watcher
//! re-reads the file on a fixed interval and hands every change to a
//! callback, which is where the daemon re-registers the hot-key.

use std::time::Duration;

use tokio::task::JoinHandle;

use super::{AppConfig, ConfigStore};

/// How often the daemon looks at `settings.toml`.
pub const RELOAD_INTERVAL: Duration = Duration::from_secs(2);

/// Spawn the reload loop on the current tokio runtime.
///
/// `on_change(previous, current)` runs whenever the live settings differ
/// from what the watcher last saw. That includes changes a daemon-side
/// [`ConfigStore::update`] pulled in from disk before the next tick.
pub fn spawn_settings_watcher<F>(
    store: ConfigStore,
    interval: Duration,
    mut on_change: F,
) -> JoinHandle<()>
where
    F: FnMut(&AppConfig, &AppConfig) + Send + 'static,
{
    let mut seen = store.snapshot();
    tokio::spawn(async move {
        let mut failing = false;

        loop {
            tokio::time::sleep(interval).await;

            match store.reload() {
                Ok(_) => failing = false,
                Err(e) => {
                    // A half-written file fixes itself on the next tick; say so once.
                    if !failing {
                        log::warn!("config: cannot reload settings: {e:#}");
                    }
                    failing = true;
                }
            }

            let current = store.snapshot();
            if current != seen {
                log::info!("config: settings changed");
                on_change(&seen, &current);
                seen = current;
            }
        }
    })
}
