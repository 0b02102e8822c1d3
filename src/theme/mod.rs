//! Light/dark mode
//!
//! The mode is process-wide. [`ColorMode::init`] reads the persisted value
//! once, readers get a [`ThemeHandle`], and [`ColorMode::toggle`] is the only
//! way to change it.

mod palette;
mod store;

pub use palette::{stylesheet, Palette, TYPOGRAPHY_SCALE};
pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};

/// Color mode of the site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }

    pub fn toggled(self) -> Self {
        Self::from_dark(!self.is_dark())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Read a stored preference: a boolean "is dark" or a mode name
    fn from_stored(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(is_dark) => Some(Self::from_dark(*is_dark)),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(Error::Config(format!("Unknown theme mode: {}", other))),
        }
    }
}

/// Read-only view of the current mode
#[derive(Debug, Clone)]
pub struct ThemeHandle {
    state: Arc<RwLock<ThemeMode>>,
}

impl ThemeHandle {
    pub fn mode(&self) -> ThemeMode {
        *self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_dark(&self) -> bool {
        self.mode().is_dark()
    }

    pub fn palette(&self) -> Palette {
        Palette::for_mode(self.mode())
    }
}

/// Owner of the process-wide mode and its persisted preference. Clones
/// share the same state.
#[derive(Clone)]
pub struct ColorMode {
    state: Arc<RwLock<ThemeMode>>,
    store: Arc<dyn PreferenceStore>,
    key: String,
}

impl fmt::Debug for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorMode")
            .field("mode", &self.mode())
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl ColorMode {
    /// Load the persisted mode from `key`, or use `fallback` when nothing
    /// usable is stored
    pub fn init(store: Arc<dyn PreferenceStore>, key: impl Into<String>, fallback: ThemeMode) -> Self {
        let key = key.into();
        let mode = match store.get(&key) {
            Ok(Some(value)) => ThemeMode::from_stored(&value).unwrap_or_else(|| {
                tracing::warn!("Ignoring unreadable theme preference {:?}", value);
                fallback
            }),
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!("Cannot read theme preference: {}", e);
                fallback
            }
        };
        tracing::debug!("Theme mode initialized to {}", mode);

        Self {
            state: Arc::new(RwLock::new(mode)),
            store,
            key,
        }
    }

    pub fn handle(&self) -> ThemeHandle {
        ThemeHandle {
            state: Arc::clone(&self.state),
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.handle().mode()
    }

    /// Flip the mode and persist it. Readers see the new mode right away,
    /// even when writing the preference fails.
    pub fn toggle(&self) -> Result<ThemeMode> {
        let mode = {
            let mut state = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            *state = state.toggled();
            *state
        };
        self.store
            .set(&self.key, serde_json::Value::Bool(mode.is_dark()))?;
        tracing::info!("Theme mode is now {}", mode);
        Ok(mode)
    }
}
