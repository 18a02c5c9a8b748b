// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter configuration.
//!
//! Defaults are embedded in the binary (`default-config.toml`). A user config file, if given,
//! overrides individual keys:
//!
//! ```toml
//! [ui]
//! status-line = "append"
//! unicode = "never"
//! ```

use crate::errors::ConfigError;
use camino::Utf8Path;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// How the status line is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusLineMode {
    /// Decide based on whether the output is an interactive terminal.
    #[default]
    Auto,

    /// Always clear and rewrite the line in place.
    Rewrite,

    /// Always append one line per update.
    Append,
}

/// Whether to use Unicode glyphs in output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnicodeMode {
    /// Use Unicode if the output supports it.
    #[default]
    Auto,

    /// Always use Unicode.
    Always,

    /// Never use Unicode.
    Never,
}

/// UI configuration after user settings have been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiConfig {
    /// How the status line is drawn.
    pub status_line: StatusLineMode,

    /// Whether to use Unicode glyphs.
    pub unicode: UnicodeMode,
}

/// Reporter configuration after user settings have been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReporterConfig {
    /// Resolved UI configuration.
    pub ui: UiConfig,
}

impl ReporterConfig {
    const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Returns the built-in defaults.
    pub fn defaults() -> Self {
        let default = DefaultConfig::from_embedded();
        Self {
            ui: UiConfig {
                status_line: default.ui.status_line,
                unicode: default.ui.unicode,
            },
        }
    }

    /// Loads configuration, applying the file at `path` over the defaults if one is given.
    ///
    /// Unlike the defaults, an explicitly specified file must exist.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let mut config = Self::defaults();
        if let Some(path) = path {
            let user = DeserializedConfig::from_path(path)?;
            config.apply(user);
        }
        Ok(config)
    }

    /// Applies user settings from a TOML string over the defaults.
    ///
    /// `source` is only used in messages.
    pub fn from_toml_str(source: &Utf8Path, contents: &str) -> Result<Self, ConfigError> {
        let mut config = Self::defaults();
        let user = DeserializedConfig::from_str(source, contents)?;
        config.apply(user);
        Ok(config)
    }

    fn apply(&mut self, user: DeserializedConfig) {
        if let Some(status_line) = user.ui.status_line {
            self.ui.status_line = status_line;
        }
        if let Some(unicode) = user.ui.unicode {
            self.ui.unicode = unicode;
        }
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

/// User configuration (deserialized form). All fields are optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedConfig {
    #[serde(default)]
    ui: DeserializedUiConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedUiConfig {
    status_line: Option<StatusLineMode>,
    unicode: Option<UnicodeMode>,
}

impl DeserializedConfig {
    fn from_path(path: &Utf8Path) -> Result<Self, ConfigError> {
        debug!("config: loading from {path}");
        let contents = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_owned(),
            error,
        })?;
        Self::from_str(path, &contents)
    }

    fn from_str(path: &Utf8Path, contents: &str) -> Result<Self, ConfigError> {
        let (config, unknown) =
            Self::deserialize_toml(contents).map_err(|error| ConfigError::Parse {
                path: path.to_owned(),
                error,
            })?;

        if !unknown.is_empty() {
            let keys = unknown.into_iter().collect::<Vec<_>>().join(", ");
            warn!("in config file {path}, ignoring unknown configuration keys: {keys}");
        }

        debug!("config: loaded successfully from {path}");
        Ok(config)
    }

    /// Deserializes TOML content and returns the config along with any unknown keys.
    fn deserialize_toml(contents: &str) -> Result<(Self, BTreeSet<String>), toml::de::Error> {
        let deserializer = toml::Deserializer::parse(contents)?;
        let mut unknown = BTreeSet::new();
        let config: DeserializedConfig = serde_ignored::deserialize(deserializer, |path| {
            unknown.insert(path.to_string());
        })?;
        Ok((config, unknown))
    }
}

/// Default configuration with all values required.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultConfig {
    ui: DefaultUiConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultUiConfig {
    status_line: StatusLineMode,
    unicode: UnicodeMode,
}

impl DefaultConfig {
    /// Parses the embedded default config.
    ///
    /// Panics if the embedded TOML is invalid or contains unknown keys.
    fn from_embedded() -> Self {
        let deserializer = toml::Deserializer::parse(ReporterConfig::DEFAULT_CONFIG)
            .expect("embedded default config should parse");
        let mut unknown = BTreeSet::new();
        let config: DefaultConfig =
            serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
                unknown.insert(path.to_string());
            })
            .expect("embedded default config should be valid");

        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default config: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        config
    }
}
