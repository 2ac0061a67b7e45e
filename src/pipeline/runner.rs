//! Pipeline orchestrator: capture → resolve → request → deliver → record.
//!
//! [`PipelineOrchestrator`] consumes [`HotkeyEvent`]s from a
//! `tokio::sync::mpsc` channel and runs one selection-processing cycle per
//! trigger, strictly one at a time.
//!
//! # Pipeline flow
//!
//! ```text
//! HotkeyEvent::Triggered
//!   └─▶ suspend gate, snapshot settings
//!         └─▶ spawn_blocking(bridge.capture_selection)      [Capturing]
//!               ├─ copy chord Err → CaptureInjectionFailed (no restore)
//!               ├─ clipboard Err  → ClipboardUnavailable (bridge restored)
//!               ├─ blank          → NoTextCaptured (restore)
//!               └─ no model       → NoModelConfigured (restore)
//!         └─▶ intent::resolve                               [Resolving]
//!         └─▶ provider.complete (async)                     [Requesting]
//!               ├─ Err            → Provider (no restore)
//!               └─ ""             → silent no-op
//!         └─▶ spawn_blocking(bridge.deliver_result)         [Delivering]
//!         └─▶ store.record_history                          [Recording]
//!   └─▶ resume gate, drop queued triggers                   [Idle]
//! ```
//!
//! Feedback (sounds, notifications, processing status) leaves through the
//! [`PipelineEvent`] channel; the orchestrator never touches audio or the
//! desktop notification service itself.

use std::sync::{Arc, PoisonError};

use thiserror::Error;
use tokio::sync::mpsc;

use crate::bridge::{BridgeError, Capture, SelectionBridge};
use crate::config::{AppConfig, ConfigStore, HistoryEntry};
use crate::feedback::Locale;
use crate::hotkey::{HotkeyEvent, TriggerGate};
use crate::intent::{resolve, Directive};
use crate::provider::{ProviderClient, ProviderError};

use super::events::{PipelineEvent, ProcessingStatus, SoundCue};
use super::state::{PipelineState, SharedState};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Why a run ended early.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// The copy chord could not be sent.
    #[error("capture failed: {0}")]
    CaptureInjectionFailed(String),

    /// The clipboard could not be read or written during capture.
    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// The clipboard was still empty (or blank) after the settle delay.
    #[error("no text was captured")]
    NoTextCaptured,

    /// No model is selected in the provider settings.
    #[error("no model configured")]
    NoModelConfigured,

    /// The backend could not be reached or rejected the request.
    #[error("provider request failed: {0}")]
    Provider(#[from] ProviderError),

    /// Writing or pasting the result failed.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl PipelineError {
    /// Locale key and English default of the notification body.
    pub fn message(&self) -> (&'static str, &'static str) {
        match self {
            PipelineError::CaptureInjectionFailed(_) => {
                ("copyError", "Failed to copy selected text.")
            }
            PipelineError::ClipboardUnavailable(_) => {
                ("clipboardError", "Could not access the clipboard.")
            }
            PipelineError::NoTextCaptured => ("noTextError", "No text was copied."),
            PipelineError::NoModelConfigured => ("noModelError", "No Model selected."),
            PipelineError::Provider(_) => ("apiError", "Failed to connect to API."),
            PipelineError::Delivery(_) => ("deliverError", "Failed to deliver the result."),
        }
    }

    /// Locale key and English default of the notification title.
    pub fn title(&self) -> (&'static str, &'static str) {
        match self {
            // Nothing selected is routine, not an error.
            PipelineError::NoTextCaptured => APP_TITLE,
            _ => ERROR_TITLE,
        }
    }
}

const APP_TITLE: (&str, &str) = ("appTitle", "Glotkey");
const ERROR_TITLE: (&str, &str) = ("errorTitle", "Glotkey Error");

/// How a run that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The result was written to the clipboard (and pasted unless copy-only).
    Delivered(String),
    /// The model answered with nothing; the clipboard was left untouched.
    EmptyResponse,
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Drives the selection-processing pipeline.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use glotkey::bridge::SystemBridge;
/// use glotkey::config::ConfigStore;
/// use glotkey::feedback::Locale;
/// use glotkey::hotkey::TriggerGate;
/// use glotkey::pipeline::{new_shared_state, PipelineOrchestrator};
/// use glotkey::provider::HttpProvider;
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = ConfigStore::load()?;
/// let (events_tx, _events_rx) = tokio::sync::mpsc::channel(64);
/// let (_hotkey_tx, hotkey_rx) = tokio::sync::mpsc::channel(4);
///
/// let orchestrator = PipelineOrchestrator::new(
///     store,
///     Arc::new(SystemBridge::new(200)),
///     Arc::new(HttpProvider::new()),
///     Arc::new(Locale::default()),
///     events_tx,
///     TriggerGate::new(),
///     new_shared_state(),
/// );
/// orchestrator.run(hotkey_rx).await;
/// # Ok(())
/// # }
/// ```
pub struct PipelineOrchestrator {
    store: ConfigStore,
    bridge: Arc<dyn SelectionBridge>,
    provider: Arc<dyn ProviderClient>,
    locale: Arc<Locale>,
    events: mpsc::Sender<PipelineEvent>,
    gate: TriggerGate,
    state: SharedState,
}

impl PipelineOrchestrator {
    pub fn new(
        store: ConfigStore,
        bridge: Arc<dyn SelectionBridge>,
        provider: Arc<dyn ProviderClient>,
        locale: Arc<Locale>,
        events: mpsc::Sender<PipelineEvent>,
        gate: TriggerGate,
        state: SharedState,
    ) -> Self {
        Self {
            store,
            bridge,
            provider,
            locale,
            events,
            gate,
            state,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `hotkey_rx` is closed.
    ///
    /// Triggers that piled up in the channel while a run was in flight are
    /// discarded once it finishes.
    pub async fn run(self, mut hotkey_rx: mpsc::Receiver<HotkeyEvent>) {
        while let Some(event) = hotkey_rx.recv().await {
            match event {
                HotkeyEvent::Triggered => {
                    match self.handle_trigger().await {
                        Ok(outcome) => log::debug!("pipeline: run finished: {outcome:?}"),
                        Err(e) => log::debug!("pipeline: run aborted: {e}"),
                    }

                    let mut dropped = 0usize;
                    while hotkey_rx.try_recv().is_ok() {
                        dropped += 1;
                    }
                    if dropped > 0 {
                        log::debug!("pipeline: dropped {dropped} trigger(s) received mid-run");
                    }
                }
            }
        }

        log::info!("pipeline: hotkey channel closed, orchestrator shutting down");
    }

    /// Process one trigger end to end.
    ///
    /// Failures are reported (log, error sound, notification) before being
    /// returned; the caller only needs the result for diagnostics.
    pub async fn handle_trigger(&self) -> Result<RunOutcome, PipelineError> {
        self.gate.suspend();
        let config = self.store.snapshot();

        let result = self.execute(&config).await;

        if let Err(e) = &result {
            self.report_error(&config, e).await;
        }

        self.set_pipeline(PipelineState::Idle);
        self.gate.resume();
        result
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    async fn execute(&self, config: &AppConfig) -> Result<RunOutcome, PipelineError> {
        // ── 1. Capture ───────────────────────────────────────────────────
        self.set_pipeline(PipelineState::Capturing);

        let capture: Capture = self
            .on_bridge(|bridge| bridge.capture_selection())
            .await
            .map_err(|e| match e {
                BridgeError::KeySimulation(msg) => PipelineError::CaptureInjectionFailed(msg),
                other => PipelineError::ClipboardUnavailable(other.to_string()),
            })?;

        let Some(selection) = capture.text().map(str::to_owned) else {
            self.restore(capture.snapshot).await;
            return Err(PipelineError::NoTextCaptured);
        };

        if !config.provider.has_model() {
            self.restore(capture.snapshot).await;
            return Err(PipelineError::NoModelConfigured);
        }

        // ── 2. Resolve ───────────────────────────────────────────────────
        self.set_pipeline(PipelineState::Resolving);

        let directive = resolve(&selection, config);
        log::debug!("pipeline: resolved {:?}", directive.kind);

        if directive.payload.trim().is_empty() {
            self.restore(capture.snapshot).await;
            return Err(PipelineError::NoTextCaptured);
        }

        // ── 3. Request, deliver, record ──────────────────────────────────
        self.set_pipeline(PipelineState::Requesting);

        self.emit(PipelineEvent::ProcessingStatus(ProcessingStatus::Start))
            .await;
        if config.output.sound_enabled {
            self.emit(PipelineEvent::PlaySound(SoundCue::Start)).await;
        }
        self.notify(APP_TITLE, ("processingText", "Processing text..."), true)
            .await;

        let outcome = self.request_and_deliver(config, &directive).await;

        self.emit(PipelineEvent::ProcessingStatus(ProcessingStatus::End))
            .await;
        outcome
    }

    async fn request_and_deliver(
        &self,
        config: &AppConfig,
        directive: &Directive,
    ) -> Result<RunOutcome, PipelineError> {
        let reply = self
            .provider
            .complete(&config.provider, &directive.prompt)
            .await
            .map_err(|e| {
                log::error!("pipeline: provider request failed: {e}");
                PipelineError::Provider(e)
            })?;

        if reply.is_empty() {
            log::info!("pipeline: model returned an empty reply, nothing to deliver");
            return Ok(RunOutcome::EmptyResponse);
        }

        // ── Deliver ──────────────────────────────────────────────────────
        self.set_pipeline(PipelineState::Delivering);

        let auto_paste = !config.output.copy_only;
        let text = reply.clone();
        self.on_bridge(move |bridge| bridge.deliver_result(&text, auto_paste))
            .await
            .map_err(|e| PipelineError::Delivery(e.to_string()))?;

        // ── Record ───────────────────────────────────────────────────────
        self.set_pipeline(PipelineState::Recording);

        let entry = HistoryEntry::now(&directive.payload, &reply, &config.provider.model);
        match self.store.record_history(entry) {
            Ok(()) => self.emit(PipelineEvent::HistoryUpdated).await,
            Err(e) => log::warn!("pipeline: history not persisted: {e:#}"),
        }

        if config.output.sound_enabled {
            self.emit(PipelineEvent::PlaySound(SoundCue::Success)).await;
        }
        let body = if config.output.copy_only {
            ("textCopied", "Text processed and copied to clipboard!")
        } else {
            ("processedText", "Text processed and pasted!")
        };
        self.notify(APP_TITLE, body, false).await;

        Ok(RunOutcome::Delivered(reply))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Run a blocking bridge call on the blocking thread pool.
    async fn on_bridge<T, F>(&self, f: F) -> Result<T, BridgeError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SelectionBridge) -> Result<T, BridgeError> + Send + 'static,
    {
        let bridge = Arc::clone(&self.bridge);
        tokio::task::spawn_blocking(move || f(bridge.as_ref()))
            .await
            .unwrap_or_else(|e| Err(BridgeError::Task(e.to_string())))
    }

    async fn restore(&self, snapshot: Option<String>) {
        let result = self
            .on_bridge(move |bridge| bridge.restore_original(snapshot.as_deref()))
            .await;
        if let Err(e) = result {
            log::warn!("pipeline: clipboard restore failed: {e}");
        }
    }

    async fn report_error(&self, config: &AppConfig, error: &PipelineError) {
        log::error!("pipeline error: {error}");

        if config.output.sound_enabled {
            self.emit(PipelineEvent::PlaySound(SoundCue::Error)).await;
        }
        self.notify(error.title(), error.message(), false).await;
    }

    async fn notify(&self, title: (&str, &str), body: (&str, &str), silent: bool) {
        let event = PipelineEvent::Notify {
            title: self.locale.text(title.0, title.1),
            body: self.locale.text(body.0, body.1),
            silent,
        };
        self.emit(event).await;
    }

    async fn emit(&self, event: PipelineEvent) {
        if self.events.send(event).await.is_err() {
            log::debug!("pipeline: event receiver gone");
        }
    }

    fn set_pipeline(&self, state: PipelineState) {
        log::debug!("pipeline: {}", state.label());
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        st.pipeline = state;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
