//! Dedicated OS-thread hotkey listener using `rdev::listen`.
//!
//! `rdev::listen` is a blocking call that must live on its own OS thread.
//! [`HotkeyListener`] owns that thread and a stop flag; dropping it sets the
//! flag so the callback silently ignores further events.
//!
//! `rdev::listen` observes keys without consuming them: the focused
//! application sees the combo too. The default binding is one applications
//! leave alone, and the copy chord releases Shift and Alt first so a
//! still-held modifier cannot change what the chord means.
//!
//! # Shutdown caveat
//!
//! `rdev::listen` has **no graceful shutdown API**.  Setting the stop flag
//! prevents events from being forwarded, but the OS thread itself stays
//! blocked in the rdev event loop until the process exits.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use super::{ComboMatcher, HotkeyEvent, HotkeyRegistry, TriggerGate};

// ---------------------------------------------------------------------------
// HotkeyListener
// ---------------------------------------------------------------------------

/// Handle to a running hotkey listener thread.
///
/// Construct one with [`HotkeyListener::start`].  Drop it to stop forwarding
/// events.
pub struct HotkeyListener {
    /// Shared stop flag, set on [`Drop`].
    stop: Arc<AtomicBool>,
    /// Never joined: `rdev::listen` does not return.
    _thread: std::thread::JoinHandle<()>,
}

impl HotkeyListener {
    /// Spawn the listener thread.
    ///
    /// Every key event is fed to a [`ComboMatcher`] against whatever combo
    /// `registry` currently holds. A completed combo is forwarded as
    /// [`HotkeyEvent::Triggered`] unless `gate` is suspended.
    ///
    /// `try_send` is used so a busy or full channel drops the trigger
    /// instead of stalling the OS event hook.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the OS refuses to create the thread.
    pub fn start(
        registry: HotkeyRegistry,
        gate: TriggerGate,
        tx: mpsc::Sender<HotkeyEvent>,
    ) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let mut matcher = ComboMatcher::new();

                let result = rdev::listen(move |event| {
                    if stop_clone.load(Ordering::Relaxed) {
                        return;
                    }

                    let combo = registry.current();
                    if !matcher.feed(&event.event_type, combo.as_ref()) {
                        return;
                    }

                    if gate.is_suspended() {
                        log::debug!("hotkey-listener: run in progress, trigger dropped");
                        return;
                    }

                    if let Err(e) = tx.try_send(HotkeyEvent::Triggered) {
                        log::warn!("hotkey-listener: trigger not delivered: {e}");
                    }
                });

                if let Err(e) = result {
                    log::error!("hotkey-listener: rdev::listen exited with error: {:?}", e);
                }
            })?;

        Ok(Self {
            stop,
            _thread: thread,
        })
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
