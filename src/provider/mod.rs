//! Language-model provider client.
//!
//! This module provides:
//! * [`ProviderClient`]: async trait: complete, list models, probe health.
//! * [`HttpProvider`]: `reqwest` implementation of the local generation
//!   dialect and the OpenAI-compatible chat dialect.
//! * [`ProviderError`]: transport / protocol / parse failures.
//! * [`spawn_status_monitor`]: background health polling.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use glotkey::config::AppConfig;
//! use glotkey::provider::{HttpProvider, ProviderClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut config = AppConfig::default();
//!     config.provider.model = "llama3".into();
//!
//!     let provider = HttpProvider::new();
//!     let reply = provider
//!         .complete(&config.provider, "Translate into English: Bom dia")
//!         .await
//!         .unwrap();
//!     println!("{reply}");
//! }
//! ```

pub mod client;
pub mod monitor;
pub mod wire;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{HttpProvider, ProviderClient, ProviderError};
pub use monitor::spawn_status_monitor;
