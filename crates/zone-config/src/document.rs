//! Zone config documents
//!
//! Entry points for turning a [`ZoneConfig`] into YAML or JSON text and for
//! applying a (possibly partial) document on top of an existing config.
//!
//! The two formats differ only in subzone handling: JSON carries `subzones`
//! and `subzone_spans`, YAML leaves them out in both directions so that a YAML
//! patch never disturbs them.

use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeSeed;

use crate::error::{ZoneConfigError, ZoneConfigResult};
use crate::marshal::{MarshalableZoneConfig, ZoneConfigSeed};
use crate::zone::ZoneConfig;

/// Textual document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentFormat {
    /// YAML; subzones stay out of the document
    #[default]
    Yaml,
    /// JSON; carries every field, subzones included
    Json,
}

impl DocumentFormat {
    /// Whether `subzones` / `subzone_spans` are part of the document
    #[inline]
    #[must_use]
    pub fn includes_subzones(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Supported file extensions (without dot)
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Yaml => &["yaml", "yml"],
            Self::Json => &["json"],
        }
    }

    /// Detect format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        [Self::Yaml, Self::Json]
            .into_iter()
            .find(|format| format.extensions().contains(&ext))
    }
}

impl Display for DocumentFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => f.write_str("yaml"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = ZoneConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(ZoneConfigError::UnknownFormat(other.to_string())),
        }
    }
}

/// Encode a config as a document
///
/// # Errors
/// Returns error if the backend fails to emit the document
pub fn encode(config: &ZoneConfig, format: DocumentFormat) -> ZoneConfigResult<String> {
    tracing::debug!(%format, "encoding zone config");
    let marshalable = MarshalableZoneConfig::from_zone_config(config, format);
    let text = match format {
        DocumentFormat::Yaml => serde_yaml::to_string(&marshalable)?,
        DocumentFormat::Json => serde_json::to_string_pretty(&marshalable)?,
    };
    tracing::trace!(%format, bytes = text.len(), "encoded zone config");
    Ok(text)
}

/// Decode a document on top of `existing`
///
/// Fields the document leaves out keep their value from `existing`. On error
/// nothing is returned and `existing` is unchanged.
///
/// # Errors
/// Returns [`ZoneConfigError::InvalidYaml`] / [`ZoneConfigError::InvalidJson`]
/// if the document is malformed or contains an invalid constraint
pub fn decode(
    existing: &ZoneConfig,
    document: &str,
    format: DocumentFormat,
) -> ZoneConfigResult<ZoneConfig> {
    tracing::debug!(%format, bytes = document.len(), "decoding zone config");
    let seed = ZoneConfigSeed::new(existing, format);
    let result = match format {
        DocumentFormat::Yaml => seed
            .deserialize(serde_yaml::Deserializer::from_str(document))
            .map_err(ZoneConfigError::from),
        DocumentFormat::Json => {
            let mut de = serde_json::Deserializer::from_str(document);
            seed.deserialize(&mut de)
                .and_then(|config| de.end().map(|()| config))
                .map_err(ZoneConfigError::from)
        }
    };
    if let Err(err) = &result {
        tracing::debug!(%format, error = %err, "zone config document rejected");
    }
    result
}

/// Encode as YAML
///
/// # Errors
/// See [`encode`]
pub fn to_yaml(config: &ZoneConfig) -> ZoneConfigResult<String> {
    encode(config, DocumentFormat::Yaml)
}

/// Encode as JSON
///
/// # Errors
/// See [`encode`]
pub fn to_json(config: &ZoneConfig) -> ZoneConfigResult<String> {
    encode(config, DocumentFormat::Json)
}

/// Decode a YAML document onto an empty config
///
/// # Errors
/// See [`decode`]
pub fn from_yaml(document: &str) -> ZoneConfigResult<ZoneConfig> {
    decode(&ZoneConfig::default(), document, DocumentFormat::Yaml)
}

/// Decode a JSON document onto an empty config
///
/// # Errors
/// See [`decode`]
pub fn from_json(document: &str) -> ZoneConfigResult<ZoneConfig> {
    decode(&ZoneConfig::default(), document, DocumentFormat::Json)
}

impl ZoneConfig {
    /// Apply a partial document in place
    ///
    /// `self` is only replaced once the whole document decoded successfully.
    ///
    /// # Errors
    /// See [`decode`]
    pub fn apply_document(&mut self, document: &str, format: DocumentFormat) -> ZoneConfigResult<()> {
        *self = decode(self, document, format)?;
        Ok(())
    }
}
