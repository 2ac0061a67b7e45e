//! Audible cues, synthesised with `rodio` sine waves.
//!
//! `OutputStream` is not `Send`; a [`SoundPlayer`] must be created and used
//! on the same thread (the feedback thread).

use std::time::Duration;

use rodio::source::SineWave;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use thiserror::Error;

use crate::pipeline::SoundCue;

#[derive(Debug, Error)]
pub enum SoundError {
    #[error("cannot open audio output: {0}")]
    Output(String),
    #[error("cannot create audio sink: {0}")]
    Sink(String),
}

/// `(frequency Hz, duration ms)` steps of a cue, played back to back.
pub fn tones(cue: SoundCue) -> &'static [(f32, u64)] {
    match cue {
        SoundCue::Start => &[(880.0, 70)],
        SoundCue::Success => &[(660.0, 70), (990.0, 110)],
        SoundCue::Error => &[(300.0, 110), (200.0, 160)],
    }
}

const VOLUME: f32 = 0.2;

/// Default output device plus a handle to play on it.
pub struct SoundPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl SoundPlayer {
    /// Open the default output device.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| SoundError::Output(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Queue `cue` and return immediately.
    pub fn play(&self, cue: SoundCue) -> Result<(), SoundError> {
        let sink = Sink::try_new(&self.handle).map_err(|e| SoundError::Sink(e.to_string()))?;

        for &(freq, ms) in tones(cue) {
            sink.append(
                SineWave::new(freq)
                    .take_duration(Duration::from_millis(ms))
                    .amplify(VOLUME),
            );
        }
        sink.detach();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_cue_has_audible_tones() {
        for cue in [SoundCue::Start, SoundCue::Success, SoundCue::Error] {
            let steps = tones(cue);
            assert!(!steps.is_empty());
            for &(freq, ms) in steps {
                assert!((20.0..20_000.0).contains(&freq));
                assert!(ms > 0 && ms < 1_000);
            }
        }
    }

    #[test]
    fn success_rises_and_error_falls() {
        let success = tones(SoundCue::Success);
        assert!(success[0].0 < success[success.len() - 1].0);
        let error = tones(SoundCue::Error);
        assert!(error[0].0 > error[error.len() - 1].0);
    }
}
