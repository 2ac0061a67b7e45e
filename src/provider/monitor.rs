//! Background provider health polling.
//!
//! Probes the configured backend on a fixed interval and reports
//! [`ProviderStatus`] changes on the pipeline event channel. Unchanged
//! results are not re-sent, so subscribers only see transitions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ConfigStore;
use crate::pipeline::{PipelineEvent, ProviderStatus};

use super::ProviderClient;

/// Spawn the polling task on the current tokio runtime.
///
/// Settings are re-read from `store` before every probe so a changed base
/// URL or provider kind is picked up on the next tick. The task ends when
/// the event receiver is dropped.
pub fn spawn_status_monitor(
    provider: Arc<dyn ProviderClient>,
    store: ConfigStore,
    events: mpsc::Sender<PipelineEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last: Option<ProviderStatus> = None;

        loop {
            let settings = store.snapshot().provider;
            let status = match provider.probe_health(&settings).await {
                Ok(()) => ProviderStatus::Online,
                Err(e) => {
                    log::debug!("provider: health probe failed: {e}");
                    ProviderStatus::Offline
                }
            };

            if last != Some(status) {
                log::info!("provider: status changed to {status:?}");
                last = Some(status);
                if events.send(PipelineEvent::ProviderStatus(status)).await.is_err() {
                    break;
                }
            }

            let interval = Duration::from_secs(settings.status_poll_secs.max(1));
            tokio::time::sleep(interval).await;
        }

        log::debug!("provider: status monitor stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::config::{AppConfig, ProviderConfig};
    use crate::provider::ProviderError;

    /// Healthy on the first probe, unreachable afterwards.
    struct FlakyProvider {
        probes: AtomicUsize,
    }

    #[async_trait]
    impl ProviderClient for FlakyProvider {
        async fn list_models(&self, _: &ProviderConfig) -> Result<Vec<String>, ProviderError> {
            Ok(Vec::new())
        }

        async fn probe_health(&self, _: &ProviderConfig) -> Result<(), ProviderError> {
            if self.probes.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(())
            } else {
                Err(ProviderError::Transport("connection refused".into()))
            }
        }

        async fn complete(&self, _: &ProviderConfig, _: &str) -> Result<String, ProviderError> {
            Ok(String::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reports_only_transitions() {
        let provider = Arc::new(FlakyProvider {
            probes: AtomicUsize::new(0),
        });
        let store = ConfigStore::in_memory(AppConfig::default());
        let (tx, mut rx) = mpsc::channel(8);

        let handle = spawn_status_monitor(provider.clone(), store, tx);

        assert_eq!(
            rx.recv().await,
            Some(PipelineEvent::ProviderStatus(ProviderStatus::Online))
        );
        assert_eq!(
            rx.recv().await,
            Some(PipelineEvent::ProviderStatus(ProviderStatus::Offline))
        );

        // Several more offline probes must not produce further events.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(provider.probes.load(Ordering::SeqCst) > 3);
        assert!(rx.try_recv().is_err());

        handle.abort();
    }
}
