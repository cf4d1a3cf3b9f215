//! Placement constraints and their short string form
//!
//! Provides [`Constraint`], the atomic placement directive, with a canonical
//! textual form used by every document shape:
//!
//! - `+key=value` / `+value`: required
//! - `-key=value` / `-value`: prohibited
//! - `key=value` / `value`: deprecated positive (no prefix)

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::ParseError;

/// How a constraint applies to replica placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ConstraintType {
    /// Positive constraint without a prefix, kept for old documents
    #[default]
    DeprecatedPositive,
    /// Replicas must be placed on matching stores (`+`)
    Required,
    /// Replicas must not be placed on matching stores (`-`)
    Prohibited,
}

impl ConstraintType {
    /// Prefix used in the short form
    #[inline]
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::DeprecatedPositive => "",
            Self::Required => "+",
            Self::Prohibited => "-",
        }
    }
}

/// Atomic placement directive
///
/// # Examples
/// ```
/// use zone_config::{Constraint, ConstraintType};
///
/// let c: Constraint = "+region=us-east1".parse().unwrap();
/// assert_eq!(c.kind(), ConstraintType::Required);
/// assert_eq!(c.key(), Some("region"));
/// assert_eq!(c.value(), "us-east1");
/// assert_eq!(c.to_string(), "+region=us-east1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Constraint {
    kind: ConstraintType,
    key: String,
    value: String,
}

impl Constraint {
    /// Create constraint with a key
    #[inline]
    #[must_use]
    pub fn new(kind: ConstraintType, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create keyless constraint (matches a store attribute)
    #[inline]
    #[must_use]
    pub fn attribute(kind: ConstraintType, value: impl Into<String>) -> Self {
        Self::new(kind, String::new(), value)
    }

    /// Required `key=value` constraint
    #[inline]
    #[must_use]
    pub fn required(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ConstraintType::Required, key, value)
    }

    /// Prohibited `key=value` constraint
    #[inline]
    #[must_use]
    pub fn prohibited(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ConstraintType::Prohibited, key, value)
    }

    /// Whether the constraint is required, prohibited or deprecated positive
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ConstraintType {
        self.kind
    }

    /// Key, if the constraint targets a locality tier
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        if self.key.is_empty() {
            None
        } else {
            Some(&self.key)
        }
    }

    /// Value to match against the store's locality or attributes
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.prefix())?;
        if !self.key.is_empty() {
            write!(f, "{}=", self.key)?;
        }
        f.write_str(&self.value)
    }
}

impl FromStr for Constraint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        let (kind, rest) = match s.as_bytes()[0] {
            b'+' => (ConstraintType::Required, &s[1..]),
            b'-' => (ConstraintType::Prohibited, &s[1..]),
            _ => (ConstraintType::DeprecatedPositive, s),
        };

        let parts: Vec<&str> = rest.split('=').collect();
        let (key, value) = match parts.as_slice() {
            [value] => ("", *value),
            [key, value] if !key.is_empty() => (*key, *value),
            _ => return Err(ParseError::malformed(rest)),
        };
        if value.is_empty() {
            return Err(ParseError::malformed(rest));
        }

        if let Some(ch) = key.chars().chain(value.chars()).find(|c| !is_token_char(*c)) {
            return Err(ParseError::invalid_character(s, ch));
        }

        Ok(Self::new(kind, key, value))
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '/')
}
