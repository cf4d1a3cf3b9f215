//! Error types for the zone config codec
//!
//! Provides error handling for:
//! - Constraint token parsing (short form -> [`Constraint`](crate::Constraint))
//! - Document decoding and encoding (YAML / JSON)

/// Errors while parsing a constraint from its short string form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Empty token
    #[error("the empty string is not a valid constraint")]
    Empty,

    /// Token does not have the `(key=)value` structure
    #[error("constraint needs to be in the form \"(key=)value\", not {input:?}")]
    Malformed {
        /// Offending token, without its prefix
        input: String,
    },

    /// Token contains a character outside the constraint alphabet
    #[error("invalid character {ch:?} in constraint {input:?}")]
    InvalidCharacter {
        /// Offending token
        input: String,
        /// First character outside the alphabet
        ch: char,
    },
}

impl ParseError {
    /// Create malformed-token error
    pub fn malformed(input: impl Into<String>) -> Self {
        Self::Malformed {
            input: input.into(),
        }
    }

    /// Create invalid-character error
    pub fn invalid_character(input: impl Into<String>, ch: char) -> Self {
        Self::InvalidCharacter {
            input: input.into(),
            ch,
        }
    }
}

/// Errors at the document level
#[derive(Debug, thiserror::Error)]
pub enum ZoneConfigError {
    /// YAML syntax or shape error, including bad constraint tokens
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// JSON syntax or shape error, including bad constraint tokens
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Format name that is neither YAML nor JSON
    #[error("unknown document format: '{0}'")]
    UnknownFormat(String),
}

/// Result type alias for document operations
pub type ZoneConfigResult<T> = Result<T, ZoneConfigError>;
