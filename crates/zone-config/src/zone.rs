//! Zone configuration
//!
//! [`ZoneConfig`] describes data-placement policy for a span of data:
//! replica counts, range size limits, GC policy, placement constraints and
//! lease preferences. Its serde impls go through
//! [`MarshalableZoneConfig`](crate::marshal::MarshalableZoneConfig).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constraints::Constraints;
use crate::document::DocumentFormat;
use crate::lease::LeasePreference;
use crate::marshal::{MarshalableZoneConfig, ZoneConfigSeed};

/// Garbage collection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GcPolicy {
    /// Seconds overwritten values are retained before GC
    #[serde(rename = "ttlseconds", default)]
    pub ttl_seconds: i32,
}

impl GcPolicy {
    /// Policy with the given TTL
    #[inline]
    #[must_use]
    pub fn new(ttl_seconds: i32) -> Self {
        Self { ttl_seconds }
    }
}

/// Zone config override for one index or partition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subzone {
    /// Index the override applies to
    #[serde(default)]
    pub index_id: u32,
    /// Partition within the index; empty for the whole index
    #[serde(default)]
    pub partition_name: String,
    /// Override settings
    #[serde(default)]
    pub config: ZoneConfig,
}

/// Key span governed by a subzone
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubzoneSpan {
    /// Inclusive start
    #[serde(default)]
    pub key: Vec<u8>,
    /// Exclusive end; empty means the span covers `key` alone
    #[serde(default)]
    pub end_key: Vec<u8>,
    /// Position in the owning config's `subzones`
    #[serde(default)]
    pub subzone_index: i32,
}

/// Data-placement policy for a zone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneConfig {
    /// Ranges smaller than this are merged
    pub range_min_bytes: i64,
    /// Ranges larger than this are split
    pub range_max_bytes: i64,
    /// Garbage collection policy
    pub gc: GcPolicy,
    /// Total replica count
    pub num_replicas: i32,
    /// Placement constraint groups
    pub constraints: Vec<Constraints>,
    /// Lease placement preferences, most preferred first
    pub lease_preferences: Vec<LeasePreference>,
    /// Per-index and per-partition overrides
    pub subzones: Vec<Subzone>,
    /// Key spans mapped onto `subzones`
    pub subzone_spans: Vec<SubzoneSpan>,
}

/// Default minimum range size (1 MiB)
pub const DEFAULT_RANGE_MIN_BYTES: i64 = 1 << 20;
/// Default maximum range size (64 MiB)
pub const DEFAULT_RANGE_MAX_BYTES: i64 = 64 << 20;
/// Default GC TTL (25 hours)
pub const DEFAULT_GC_TTL_SECONDS: i32 = 25 * 60 * 60;
/// Default replication factor
pub const DEFAULT_NUM_REPLICAS: i32 = 3;

impl ZoneConfig {
    /// Empty config (every field zero)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock defaults applied to zones without explicit settings
    #[must_use]
    pub fn default_zone_config() -> Self {
        Self {
            range_min_bytes: DEFAULT_RANGE_MIN_BYTES,
            range_max_bytes: DEFAULT_RANGE_MAX_BYTES,
            gc: GcPolicy::new(DEFAULT_GC_TTL_SECONDS),
            num_replicas: DEFAULT_NUM_REPLICAS,
            ..Self::default()
        }
    }

    /// With replica count
    #[inline]
    #[must_use]
    pub fn with_num_replicas(mut self, num_replicas: i32) -> Self {
        self.num_replicas = num_replicas;
        self
    }

    /// With range size limits
    #[inline]
    #[must_use]
    pub fn with_range_bytes(mut self, min: i64, max: i64) -> Self {
        self.range_min_bytes = min;
        self.range_max_bytes = max;
        self
    }

    /// With constraint groups
    #[inline]
    #[must_use]
    pub fn with_constraints(mut self, constraints: Vec<Constraints>) -> Self {
        self.constraints = constraints;
        self
    }

    /// With lease preferences
    #[inline]
    #[must_use]
    pub fn with_lease_preferences(mut self, lease_preferences: Vec<LeasePreference>) -> Self {
        self.lease_preferences = lease_preferences;
        self
    }
}

// Serde impls carry every field (JSON policy). Use `crate::document` to pick
// the YAML policy, which leaves subzones out.
impl Serialize for ZoneConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MarshalableZoneConfig::from_zone_config(self, DocumentFormat::Json).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ZoneConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::DeserializeSeed;

        let empty = Self::default();
        ZoneConfigSeed::new(&empty, DocumentFormat::Json).deserialize(deserializer)
    }
}
