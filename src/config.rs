// Construction settings for reaction data
use crate::error::{ReactionError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Mutex;

// Process-wide default construction settings
pub static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::new()));

/// How much of a reaction node is materialized during construction.
///
/// `Outline` and `ReadOnly` skip threshold resolution entirely, and
/// `MultiGroupOnly` never consults the gridded cross section style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ParseMode {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "multiGroupOnly")]
    MultiGroupOnly,
    #[serde(rename = "readOnly")]
    ReadOnly,
    #[serde(rename = "outline")]
    Outline,
}

impl ParseMode {
    /// True when numeric data (and therefore thresholds) must be resolved.
    pub fn requires_full_data(self) -> bool {
        !matches!(self, ParseMode::Outline | ParseMode::ReadOnly)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ParseMode::All => "all",
            ParseMode::MultiGroupOnly => "multiGroupOnly",
            ParseMode::ReadOnly => "readOnly",
            ParseMode::Outline => "outline",
        }
    }
}

impl FromStr for ParseMode {
    type Err = ReactionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(ParseMode::All),
            "multiGroupOnly" => Ok(ParseMode::MultiGroupOnly),
            "readOnly" => Ok(ParseMode::ReadOnly),
            "outline" => Ok(ParseMode::Outline),
            other => Err(ReactionError::InvalidParseMode(other.to_string())),
        }
    }
}

/// Options handed to every constructor while a document is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    pub parse_mode: ParseMode,
}

impl Settings {
    pub fn new(parse_mode: ParseMode) -> Self {
        Settings { parse_mode }
    }
}

/// Global configuration container.
///
/// Holds the construction settings used when a caller does not pass its own,
/// e.g. [`crate::Protare::from_json_file`]. Obtain a guard with
/// [`Config::global`] rather than locking [`CONFIG`] directly.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Default parse mode for document loading.
    pub parse_mode: ParseMode,
}

impl Config {
    pub fn new() -> Self {
        Config {
            parse_mode: ParseMode::All,
        }
    }

    /// Set the default parse mode from its document keyword.
    pub fn set_parse_mode(&mut self, keyword: &str) -> Result<()> {
        self.parse_mode = keyword.parse()?;
        Ok(())
    }

    /// Construction settings derived from this configuration.
    pub fn settings(&self) -> Settings {
        Settings::new(self.parse_mode)
    }

    /// Restore defaults
    pub fn clear(&mut self) {
        self.parse_mode = ParseMode::All;
    }

    /// Get the global configuration instance
    pub fn global() -> std::sync::MutexGuard<'static, Self> {
        CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_keywords() {
        assert_eq!("all".parse::<ParseMode>().unwrap(), ParseMode::All);
        assert_eq!(
            "multiGroupOnly".parse::<ParseMode>().unwrap(),
            ParseMode::MultiGroupOnly
        );
        assert_eq!("readOnly".parse::<ParseMode>().unwrap(), ParseMode::ReadOnly);
        assert_eq!("outline".parse::<ParseMode>().unwrap(), ParseMode::Outline);
        for mode in [
            ParseMode::All,
            ParseMode::MultiGroupOnly,
            ParseMode::ReadOnly,
            ParseMode::Outline,
        ] {
            assert_eq!(mode.keyword().parse::<ParseMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_invalid_parse_mode() {
        let err = "everything".parse::<ParseMode>().unwrap_err();
        assert!(matches!(err, ReactionError::InvalidParseMode(ref s) if s == "everything"));
    }

    #[test]
    fn test_requires_full_data() {
        assert!(ParseMode::All.requires_full_data());
        assert!(ParseMode::MultiGroupOnly.requires_full_data());
        assert!(!ParseMode::ReadOnly.requires_full_data());
        assert!(!ParseMode::Outline.requires_full_data());
    }

    #[test]
    fn test_config_set_parse_mode() {
        let mut config = Config::new();
        assert_eq!(config.settings().parse_mode, ParseMode::All);
        config.set_parse_mode("outline").unwrap();
        assert_eq!(config.settings().parse_mode, ParseMode::Outline);
        assert!(config.set_parse_mode("bogus").is_err());
        // failed update leaves the previous value
        assert_eq!(config.parse_mode, ParseMode::Outline);
        config.clear();
        assert_eq!(config.parse_mode, ParseMode::All);
    }
}
