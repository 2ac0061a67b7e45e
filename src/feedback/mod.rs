//! Feedback host: turns [`PipelineEvent`]s into sounds and notifications.
//!
//! Runs on its own OS thread because the `rodio` output stream is not
//! `Send`. The thread exits when every event sender has been dropped.

pub mod locale;
pub mod notification;
pub mod sound;

pub use locale::{Locale, FALLBACK_LANGUAGE};
pub use sound::{SoundError, SoundPlayer};

use tokio::sync::mpsc;

use crate::pipeline::{PipelineEvent, ProcessingStatus, SoundCue};

/// Where dispatched feedback ends up.
pub trait FeedbackOutput {
    fn play(&mut self, cue: SoundCue);
    fn notify(&mut self, title: &str, body: &str, silent: bool);
}

/// Speakers and the desktop notification service.
pub struct DesktopOutput {
    /// `None` when no audio device could be opened.
    player: Option<SoundPlayer>,
}

impl DesktopOutput {
    pub fn new() -> Self {
        let player = match SoundPlayer::new() {
            Ok(player) => Some(player),
            Err(e) => {
                log::warn!("feedback: sound cues disabled: {e}");
                None
            }
        };
        Self { player }
    }
}

impl Default for DesktopOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackOutput for DesktopOutput {
    fn play(&mut self, cue: SoundCue) {
        if let Some(player) = &self.player {
            if let Err(e) = player.play(cue) {
                log::warn!("feedback: {e}");
            }
        }
    }

    fn notify(&mut self, title: &str, body: &str, silent: bool) {
        notification::send(title, body, silent);
    }
}

/// Act on one event.
pub fn dispatch(event: PipelineEvent, output: &mut impl FeedbackOutput) {
    match event {
        PipelineEvent::PlaySound(cue) => output.play(cue),
        PipelineEvent::Notify {
            title,
            body,
            silent,
        } => output.notify(&title, &body, silent),
        PipelineEvent::ProcessingStatus(ProcessingStatus::Start) => {
            log::info!("feedback: processing...");
        }
        PipelineEvent::ProcessingStatus(ProcessingStatus::End) => {
            log::info!("feedback: done");
        }
        PipelineEvent::HistoryUpdated => log::debug!("feedback: history updated"),
        PipelineEvent::ProviderStatus(status) => {
            log::info!("feedback: provider is {status:?}");
        }
    }
}

/// Spawn the feedback thread.
///
/// # Errors
///
/// Returns the I/O error if the OS refuses to create the thread.
pub fn spawn_feedback_thread(
    mut rx: mpsc::Receiver<PipelineEvent>,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("feedback".into())
        .spawn(move || {
            let mut output = DesktopOutput::new();
            while let Some(event) = rx.blocking_recv() {
                dispatch(event, &mut output);
            }
            log::debug!("feedback: event channel closed");
        })
}
