//! Localized user-facing strings.
//!
//! A locale file is a flat JSON object of `key -> text` stored at
//! `<config_dir>/locales/<lang>.json`. Missing keys fall back to the English
//! literal supplied at the call site.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Language loaded when the configured one has no file.
pub const FALLBACK_LANGUAGE: &str = "en";

/// A loaded string table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locale {
    strings: HashMap<String, String>,
}

impl Locale {
    /// Load `<dir>/<lang>.json`, then `<dir>/en.json`, then give up and use
    /// the built-in English defaults. Never fails.
    pub fn load(dir: &Path, lang: &str) -> Self {
        let lang = lang.trim().to_lowercase();
        let mut candidates = vec![lang.as_str()];
        if lang != FALLBACK_LANGUAGE {
            candidates.push(FALLBACK_LANGUAGE);
        }

        for candidate in candidates {
            let path = dir.join(format!("{candidate}.json"));
            if !path.exists() {
                continue;
            }
            match Self::load_file(&path) {
                Ok(locale) => {
                    log::debug!("locale: loaded {}", path.display());
                    return locale;
                }
                Err(e) => log::warn!("locale: {e:#}"),
            }
        }

        log::debug!("locale: no file for {lang:?}, using built-in English");
        Self::default()
    }

    fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let strings: HashMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        Ok(Self { strings })
    }

    /// Build a table directly.
    pub fn from_map(strings: HashMap<String, String>) -> Self {
        Self { strings }
    }

    /// Translated text for `key`, or `default` when the table lacks it.
    pub fn text(&self, key: &str, default: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}
