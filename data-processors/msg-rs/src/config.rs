//! Facilities for reading decoding configuration values
use crate::error::MsgError;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::*;

/// The `time` format description used by default for dates in header blocks
///
/// Renders as e.g. `Mon, 01 Jan 2024 09:30 +0000`
pub const DEFAULT_DATETIME_FORMAT: &str = "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute] [offset_hour sign:mandatory][offset_minute]";

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
/// What to do with an attachment which cannot be decoded
pub enum AttachErrorBehavior {
    /// Fail the whole message
    Throw,
    /// Keep the attachment, flagged as broken, and report a diagnostic
    #[default]
    Broken,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
/// Message decoding configuration
pub struct DecodeConfig {
    /// Windows codepage for narrow strings when the object declares none
    pub default_codepage: u16,
    /// `time` format description for dates rendered in header blocks
    pub datetime_format: String,
    /// Maximum nesting of embedded messages
    pub max_embedding_depth: u32,
    /// Handling of attachments which fail to decode
    pub attachment_errors: AttachErrorBehavior,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            default_codepage: 1252,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            max_embedding_depth: 16,
            attachment_errors: AttachErrorBehavior::default(),
        }
    }
}

impl DecodeConfig {
    /// Loads the configuration from `msg.toml` and `MSG__` environment variables
    ///
    /// Missing values take their defaults
    pub fn new() -> Result<Self, MsgError> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("msg.toml"))
                .merge(Env::prefixed("MSG__").split("__")),
        )
    }

    /// Extracts the configuration from an arbitrary figment
    pub fn from_figment(figment: Figment) -> Result<Self, MsgError> {
        let config: Self = figment.extract().map_err(|err| {
            error!("Failed to validate configuration: {}", err);
            Box::new(err)
        })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let config = DecodeConfig::from_figment(Figment::new()).unwrap();
        assert_eq!(config.default_codepage, 1252);
        assert_eq!(config.datetime_format, DEFAULT_DATETIME_FORMAT);
        assert_eq!(config.max_embedding_depth, 16);
        assert_eq!(config.attachment_errors, AttachErrorBehavior::Broken);
    }

    #[test]
    fn toml_overrides() {
        let config = DecodeConfig::from_figment(Figment::new().merge(Toml::string(
            "default_codepage = 1251\nattachment_errors = \"throw\"\n",
        )))
        .unwrap();
        assert_eq!(config.default_codepage, 1251);
        assert_eq!(config.attachment_errors, AttachErrorBehavior::Throw);
        assert_eq!(config.max_embedding_depth, 16);
    }

    #[test]
    fn rejects_bad_values() {
        let res = DecodeConfig::from_figment(
            Figment::new().merge(Toml::string("attachment_errors = \"explode\"\n")),
        );
        assert!(matches!(res, Err(MsgError::Config(_))));
    }
}
