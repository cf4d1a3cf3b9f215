//! Zone Config Codec
//!
//! Backward-compatible YAML/JSON serialization for zone configurations:
//! replica counts, range size limits, GC policy, placement constraints and
//! lease preferences.
//!
//! # Compatibility rules
//!
//! - **Constraints** are read in either the legacy flat-list shape or the
//!   per-replica mapping shape, and written in the legacy shape whenever it
//!   can express the value ([`ConstraintsList`]).
//! - **Lease preferences** are read from `lease_preferences` or the deprecated
//!   `experimental_lease_preferences`; only the former is ever written.
//! - **Partial documents** patch an existing config ([`ZoneConfigSeed`],
//!   [`decode`]): fields the document omits keep their previous value.
//!
//! # Architecture
//!
//! ```text
//! document text -> serde_yaml / serde_json -> ZoneConfigSeed(existing)
//!                                               |  ConstraintsList / LeasePreference
//!                                               v
//!                                     MarshalableZoneConfig -> ZoneConfig
//! ```
//!
//! # Example
//!
//! ```rust
//! use zone_config::{decode, to_yaml, DocumentFormat, ZoneConfig};
//!
//! let existing = ZoneConfig::default_zone_config();
//! let patched = decode(
//!     &existing,
//!     "num_replicas: 5\nconstraints: {'+region=east': 2, '+region=west': 3}\n",
//!     DocumentFormat::Yaml,
//! )
//! .unwrap();
//!
//! assert_eq!(patched.num_replicas, 5);
//! assert_eq!(patched.constraints.len(), 2);
//! assert_eq!(patched.gc, existing.gc);
//!
//! let yaml = to_yaml(&patched).unwrap();
//! assert!(!yaml.contains("experimental_lease_preferences"));
//! ```

#![warn(missing_docs)]

// Core modules
pub mod constraint;
pub mod constraints;
pub mod document;
pub mod error;
pub mod lease;
pub mod marshal;
pub mod zone;

// Re-exports
pub use constraint::{Constraint, ConstraintType};
pub use constraints::{constraints_less, Constraints, ConstraintsList};
pub use document::{decode, encode, from_json, from_yaml, to_json, to_yaml, DocumentFormat};
pub use error::{ParseError, ZoneConfigError, ZoneConfigResult};
pub use lease::LeasePreference;
pub use marshal::{MarshalableZoneConfig, ZoneConfigSeed};
pub use zone::{GcPolicy, Subzone, SubzoneSpan, ZoneConfig};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with zone config documents
    pub use crate::{
        Constraint, ConstraintType, Constraints, ConstraintsList, DocumentFormat, LeasePreference,
        ZoneConfig, ZoneConfigError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
