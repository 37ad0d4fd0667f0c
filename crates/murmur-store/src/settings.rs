//! Persisted player preferences.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{StoreError, StoreResult};
use crate::store::KeyValueStore;

/// Display theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light text on a dark background.
    #[default]
    Dark,
    /// Dark text on a light background.
    Light,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dark => write!(f, "dark"),
            Self::Light => write!(f, "light"),
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(()),
        }
    }
}

/// The settings namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Selected text-generation provider identity.
    pub ai_provider: Option<String>,
    /// Credential for the provider.
    pub ai_api_key: Option<String>,
    /// Alternate endpoint for the provider.
    pub ai_api_url: Option<String>,
    /// Whether text generation is enabled.
    pub use_ai: bool,
    /// Whether waits follow the wall clock rather than a fixed pause.
    pub use_real_time: bool,
    /// Display theme.
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ai_provider: None,
            ai_api_key: None,
            ai_api_url: None,
            use_ai: false,
            use_real_time: true,
            theme: Theme::Dark,
        }
    }
}

/// Names accepted by [`Settings::set`], in display order.
pub const SETTING_KEYS: [&str; 6] = [
    "ai_provider",
    "ai_api_key",
    "ai_api_url",
    "use_ai",
    "use_real_time",
    "theme",
];

fn read<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> StoreResult<Option<T>> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

fn write<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &Option<T>) -> StoreResult<()> {
    match value {
        Some(v) => store.set(key, &serde_json::to_string(v)?),
        None => store.remove(key),
    }
}

fn parse_bool(key: &str, value: &str) -> StoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(StoreError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Settings {
    /// Load settings, using defaults for anything not stored.
    pub fn load(store: &dyn KeyValueStore) -> StoreResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            ai_provider: read(store, "ai_provider")?,
            ai_api_key: read(store, "ai_api_key")?,
            ai_api_url: read(store, "ai_api_url")?,
            use_ai: read(store, "use_ai")?.unwrap_or(defaults.use_ai),
            use_real_time: read(store, "use_real_time")?.unwrap_or(defaults.use_real_time),
            theme: read(store, "theme")?.unwrap_or(defaults.theme),
        })
    }

    /// Write every setting. Unset optional values are removed.
    pub fn save(&self, store: &dyn KeyValueStore) -> StoreResult<()> {
        write(store, "ai_provider", &self.ai_provider)?;
        write(store, "ai_api_key", &self.ai_api_key)?;
        write(store, "ai_api_url", &self.ai_api_url)?;
        write(store, "use_ai", &Some(self.use_ai))?;
        write(store, "use_real_time", &Some(self.use_real_time))?;
        write(store, "theme", &Some(self.theme))
    }

    /// Set one setting from its textual form. An empty value clears the
    /// optional string settings.
    pub fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        match key {
            "ai_provider" => self.ai_provider = optional(value),
            "ai_api_key" => self.ai_api_key = optional(value),
            "ai_api_url" => self.ai_api_url = optional(value),
            "use_ai" => self.use_ai = parse_bool(key, value)?,
            "use_real_time" => self.use_real_time = parse_bool(key, value)?,
            "theme" => {
                self.theme = value.parse().map_err(|()| StoreError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            }
            _ => return Err(StoreError::UnknownSetting(key.to_string())),
        }
        Ok(())
    }

    /// Display pairs for every setting. The API key is masked.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(not set)".to_string());
        let key = match &self.ai_api_key {
            Some(k) => {
                let count = k.chars().count();
                let tail: String = k.chars().skip(count.saturating_sub(4)).collect();
                if count > 4 {
                    format!("****{tail}")
                } else {
                    "****".to_string()
                }
            }
            None => "(not set)".to_string(),
        };
        vec![
            ("ai_provider", show(&self.ai_provider)),
            ("ai_api_key", key),
            ("ai_api_url", show(&self.ai_api_url)),
            ("use_ai", self.use_ai.to_string()),
            ("use_real_time", self.use_real_time.to_string()),
            ("theme", self.theme.to_string()),
        ]
    }
}
