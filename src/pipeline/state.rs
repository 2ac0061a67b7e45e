//! Pipeline state machine and shared application state.
//!
//! [`PipelineState`] is the orchestrator's current phase. The daemon reads
//! it through [`SharedState`] at shutdown so a run in flight can finish and
//! leave the clipboard in order.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// Phases of one selection-processing run.
///
/// ```text
/// Idle ──trigger──▶ Capturing ──▶ Resolving ──▶ Requesting
///                                                 ──▶ Delivering ──▶ Recording ──▶ Idle
/// any phase ──failure──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Waiting for the hot-key.
    #[default]
    Idle,

    /// Copy chord sent; waiting for the clipboard to settle.
    Capturing,

    /// Parsing the `::suffix` and building the prompt.
    Resolving,

    /// Waiting for the model.
    Requesting,

    /// Writing the result to the clipboard (and pasting).
    Delivering,

    /// Appending the history entry.
    Recording,
}

impl PipelineState {
    /// `true` for every phase except [`PipelineState::Idle`].
    ///
    /// ```
    /// use glotkey::pipeline::PipelineState;
    ///
    /// assert!(!PipelineState::Idle.is_busy());
    /// assert!(PipelineState::Capturing.is_busy());
    /// assert!(PipelineState::Requesting.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        !matches!(self, PipelineState::Idle)
    }

    /// Short label for status output.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Capturing => "Capturing",
            PipelineState::Resolving => "Resolving",
            PipelineState::Requesting => "Requesting",
            PipelineState::Delivering => "Delivering",
            PipelineState::Recording => "Recording",
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// What observers can see of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Current phase.
    pub pipeline: PipelineState,
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`]. Do **not** hold the lock across
/// `.await` points.
pub type SharedState = Arc<Mutex<AppState>>;

/// Construct a new [`SharedState`] in the idle phase.
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(AppState::default()))
}

const IDLE_POLL: Duration = Duration::from_millis(50);

/// Wait until the pipeline is idle or `limit` has passed.
///
/// Returns the phase it was left in, [`PipelineState::Idle`] on success.
pub async fn wait_until_idle(state: &SharedState, limit: Duration) -> PipelineState {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        let phase = state.lock().unwrap_or_else(PoisonError::into_inner).pipeline;
        if !phase.is_busy() || tokio::time::Instant::now() >= deadline {
            return phase;
        }
        tokio::time::sleep(IDLE_POLL).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
