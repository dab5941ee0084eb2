//! # Dialog Configuration
//!
//! Settings for [`crate::dialog::DialogHost`]: the default title shown for
//! each [`DialogStyle`] when a dialog has none of its own, and the prefix used
//! to generate dialog ids.
//!
//! ## Usage
//!
//! ```
//! use apice_core::config::DialogConfig;
//! use apice_core::dialog::DialogStyle;
//!
//! let config = DialogConfig::builder()
//!     .title(DialogStyle::Error, "Something went wrong")
//!     .id_prefix("modal")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.title_for(DialogStyle::Error), "Something went wrong");
//! assert_eq!(config.title_for(DialogStyle::Info), "Information");
//! ```
//!
//! Configuration can also be loaded from JSON; missing fields keep their
//! defaults:
//!
//! ```
//! use apice_core::config::DialogConfig;
//!
//! let config = DialogConfig::from_json(r#"{ "titles": { "warn": "Careful" } }"#).unwrap();
//! assert_eq!(config.titles.warn, "Careful");
//! assert_eq!(config.id_prefix, "dialog");
//! ```

use crate::dialog::DialogStyle;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default titles per dialog style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogTitles {
    pub error: String,
    pub warn: String,
    pub info: String,
    pub success: String,
}

impl Default for DialogTitles {
    fn default() -> Self {
        Self {
            error: "Attention!".to_string(),
            warn: "Warning!".to_string(),
            info: "Information".to_string(),
            success: "Success!".to_string(),
        }
    }
}

impl DialogTitles {
    pub fn get(&self, style: DialogStyle) -> &str {
        match style {
            DialogStyle::Error => &self.error,
            DialogStyle::Warn => &self.warn,
            DialogStyle::Info => &self.info,
            DialogStyle::Success => &self.success,
        }
    }

    fn slot(&mut self, style: DialogStyle) -> &mut String {
        match style {
            DialogStyle::Error => &mut self.error,
            DialogStyle::Warn => &mut self.warn,
            DialogStyle::Info => &mut self.info,
            DialogStyle::Success => &mut self.success,
        }
    }
}

/// Configuration for a dialog host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Titles used when a dialog does not define one
    pub titles: DialogTitles,
    /// Prefix for generated dialog ids (`<prefix>_<short id>`)
    pub id_prefix: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            titles: DialogTitles::default(),
            id_prefix: "dialog".to_string(),
        }
    }
}

impl DialogConfig {
    pub fn builder() -> DialogConfigBuilder {
        DialogConfigBuilder::default()
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid dialog configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn title_for(&self, style: DialogStyle) -> &str {
        self.titles.get(style)
    }

    /// Rejects blank titles and a blank id prefix.
    pub fn validate(&self) -> Result<()> {
        for style in DialogStyle::ALL {
            if self.titles.get(style).trim().is_empty() {
                return Err(Error::Config(format!(
                    "Default title for '{}' dialogs cannot be empty",
                    style
                )));
            }
        }

        if self.id_prefix.trim().is_empty() {
            return Err(Error::Config(
                "Dialog id prefix cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`DialogConfig`].
#[derive(Debug, Default)]
pub struct DialogConfigBuilder {
    config: DialogConfig,
}

impl DialogConfigBuilder {
    /// Overrides the default title for `style`.
    pub fn title(mut self, style: DialogStyle, title: impl Into<String>) -> Self {
        *self.config.titles.slot(style) = title.into();
        self
    }

    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.id_prefix = prefix.into();
        self
    }

    pub fn build(self) -> Result<DialogConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
