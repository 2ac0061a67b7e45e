//! Glotkey: translate or rewrite the selected text in any application with
//! one global hot-key, using a local or OpenAI-compatible language model.

pub mod bridge;
pub mod config;
pub mod feedback;
pub mod hotkey;
pub mod intent;
pub mod pipeline;
pub mod provider;
