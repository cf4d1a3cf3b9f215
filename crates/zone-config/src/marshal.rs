//! Document-shaped intermediate form for [`ZoneConfig`]
//!
//! [`MarshalableZoneConfig`] mirrors [`ZoneConfig`] with the constraint field
//! typed as [`ConstraintsList`] for backward-compatible encoding, plus the
//! deprecated `experimental_lease_preferences` field which is read but never
//! written.
//!
//! Decoding is seeded: [`ZoneConfigSeed`] starts from an existing config and
//! only overwrites the fields present in the incoming document, so partial
//! documents patch a stored config instead of resetting it.

use std::fmt::{self, Formatter};

use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::constraints::ConstraintsList;
use crate::document::DocumentFormat;
use crate::lease::LeasePreference;
use crate::zone::{GcPolicy, Subzone, SubzoneSpan, ZoneConfig};

const STRUCT_NAME: &str = "ZoneConfig";

const FIELDS: &[&str] = &[
    "range_min_bytes",
    "range_max_bytes",
    "gc",
    "num_replicas",
    "constraints",
    "lease_preferences",
    "experimental_lease_preferences",
    "subzones",
    "subzone_spans",
];

/// Transient document form of a zone config, built per encode/decode call
#[derive(Debug, Clone, PartialEq)]
pub struct MarshalableZoneConfig {
    /// Same as [`ZoneConfig::range_min_bytes`]
    pub range_min_bytes: i64,
    /// Same as [`ZoneConfig::range_max_bytes`]
    pub range_max_bytes: i64,
    /// Same as [`ZoneConfig::gc`]
    pub gc: GcPolicy,
    /// Same as [`ZoneConfig::num_replicas`]
    pub num_replicas: i32,
    /// Dual-shape constraint groups
    pub constraints: ConstraintsList,
    /// Same as [`ZoneConfig::lease_preferences`]
    pub lease_preferences: Vec<LeasePreference>,
    /// Deprecated spelling of `lease_preferences`; `None` means absent
    pub experimental_lease_preferences: Option<Vec<LeasePreference>>,
    /// Same as [`ZoneConfig::subzones`]
    pub subzones: Vec<Subzone>,
    /// Same as [`ZoneConfig::subzone_spans`]
    pub subzone_spans: Vec<SubzoneSpan>,
    /// Decides whether subzones are part of the document
    pub format: DocumentFormat,
}

impl MarshalableZoneConfig {
    /// Build the outgoing form. The deprecated field is never populated.
    #[must_use]
    pub fn from_zone_config(config: &ZoneConfig, format: DocumentFormat) -> Self {
        let mut num_replicas = 0;
        if config.num_replicas != 0 {
            num_replicas = config.num_replicas;
        }
        Self {
            range_min_bytes: config.range_min_bytes,
            range_max_bytes: config.range_max_bytes,
            gc: config.gc,
            num_replicas,
            constraints: ConstraintsList::new(config.constraints.clone()),
            lease_preferences: config.lease_preferences.clone(),
            experimental_lease_preferences: None,
            subzones: config.subzones.clone(),
            subzone_spans: config.subzone_spans.clone(),
            format,
        }
    }

    /// Collapse back into a [`ZoneConfig`]
    ///
    /// A present `experimental_lease_preferences` wins over
    /// `lease_preferences`: it can only have come from the incoming document,
    /// while `lease_preferences` may still hold the stored value.
    #[must_use]
    pub fn into_zone_config(self) -> ZoneConfig {
        let lease_preferences = match self.experimental_lease_preferences {
            Some(experimental) => experimental,
            None => self.lease_preferences,
        };
        ZoneConfig {
            range_min_bytes: self.range_min_bytes,
            range_max_bytes: self.range_max_bytes,
            gc: self.gc,
            num_replicas: self.num_replicas,
            constraints: self.constraints.into_inner(),
            lease_preferences,
            subzones: self.subzones,
            subzone_spans: self.subzone_spans,
        }
    }
}

impl Serialize for MarshalableZoneConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let with_subzones = self.format.includes_subzones();
        let len = 6
            + usize::from(self.experimental_lease_preferences.is_some())
            + if with_subzones { 2 } else { 0 };

        let mut state = serializer.serialize_struct(STRUCT_NAME, len)?;
        state.serialize_field("range_min_bytes", &self.range_min_bytes)?;
        state.serialize_field("range_max_bytes", &self.range_max_bytes)?;
        state.serialize_field("gc", &self.gc)?;
        state.serialize_field("num_replicas", &self.num_replicas)?;
        state.serialize_field("constraints", &self.constraints)?;
        state.serialize_field("lease_preferences", &self.lease_preferences)?;
        if let Some(experimental) = &self.experimental_lease_preferences {
            state.serialize_field("experimental_lease_preferences", experimental)?;
        }
        if with_subzones {
            state.serialize_field("subzones", &self.subzones)?;
            state.serialize_field("subzone_spans", &self.subzone_spans)?;
        }
        state.end()
    }
}

/// Decodes a document on top of an existing [`ZoneConfig`]
///
/// Fields missing from the document keep their value from `existing`.
/// `existing` is only read; the merged config is returned as a new value.
///
/// # Example
/// ```
/// use serde::de::DeserializeSeed;
/// use zone_config::{DocumentFormat, ZoneConfig, ZoneConfigSeed};
///
/// let existing = ZoneConfig::default_zone_config();
/// let mut de = serde_json::Deserializer::from_str(r#"{"num_replicas": 5}"#);
/// let merged = ZoneConfigSeed::new(&existing, DocumentFormat::Json)
///     .deserialize(&mut de)
///     .unwrap();
/// assert_eq!(merged.num_replicas, 5);
/// assert_eq!(merged.range_max_bytes, existing.range_max_bytes);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ZoneConfigSeed<'a> {
    existing: &'a ZoneConfig,
    format: DocumentFormat,
}

impl<'a> ZoneConfigSeed<'a> {
    /// Seed that patches `existing` using the `format` field policy
    #[inline]
    #[must_use]
    pub fn new(existing: &'a ZoneConfig, format: DocumentFormat) -> Self {
        Self { existing, format }
    }
}

impl<'de> DeserializeSeed<'de> for ZoneConfigSeed<'_> {
    type Value = ZoneConfig;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        let base = MarshalableZoneConfig::from_zone_config(self.existing, self.format);
        let merged = deserializer.deserialize_struct(STRUCT_NAME, FIELDS, SeededVisitor { base })?;
        Ok(merged.into_zone_config())
    }
}

#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "snake_case")]
enum Field {
    RangeMinBytes,
    RangeMaxBytes,
    Gc,
    NumReplicas,
    Constraints,
    LeasePreferences,
    ExperimentalLeasePreferences,
    Subzones,
    SubzoneSpans,
    #[serde(other)]
    Unknown,
}

struct SeededVisitor {
    base: MarshalableZoneConfig,
}

impl<'de> Visitor<'de> for SeededVisitor {
    type Value = MarshalableZoneConfig;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("a zone config mapping")
    }

    // An empty document changes nothing.
    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(self.base)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut m = self.base;
        let with_subzones = m.format.includes_subzones();

        while let Some(field) = map.next_key::<Field>()? {
            match field {
                // Explicit nulls zero the field.
                Field::RangeMinBytes => {
                    m.range_min_bytes = map.next_value::<Option<i64>>()?.unwrap_or_default();
                }
                Field::RangeMaxBytes => {
                    m.range_max_bytes = map.next_value::<Option<i64>>()?.unwrap_or_default();
                }
                Field::Gc => m.gc = map.next_value_seed(GcPolicySeed { base: m.gc })?,
                Field::NumReplicas => {
                    m.num_replicas = map.next_value::<Option<i32>>()?.unwrap_or_default();
                }
                Field::Constraints => {
                    m.constraints = map.next_value::<Option<ConstraintsList>>()?.unwrap_or_default();
                }
                Field::LeasePreferences => {
                    m.lease_preferences = map
                        .next_value::<Option<Vec<LeasePreference>>>()?
                        .unwrap_or_default();
                }
                Field::ExperimentalLeasePreferences => {
                    m.experimental_lease_preferences = map.next_value()?;
                }
                Field::Subzones if with_subzones => {
                    m.subzones = map.next_value::<Option<Vec<Subzone>>>()?.unwrap_or_default();
                }
                Field::SubzoneSpans if with_subzones => {
                    m.subzone_spans = map
                        .next_value::<Option<Vec<SubzoneSpan>>>()?
                        .unwrap_or_default();
                }
                Field::Subzones | Field::SubzoneSpans | Field::Unknown => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(m)
    }
}

/// Patches a stored [`GcPolicy`] with the keys present in a nested mapping
struct GcPolicySeed {
    base: GcPolicy,
}

impl<'de> DeserializeSeed<'de> for GcPolicySeed {
    type Value = GcPolicy;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_option(self)
    }
}

#[derive(Deserialize)]
#[serde(field_identifier)]
enum GcField {
    #[serde(rename = "ttlseconds")]
    TtlSeconds,
    #[serde(other)]
    Unknown,
}

impl<'de> Visitor<'de> for GcPolicySeed {
    type Value = GcPolicy;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("a gc policy mapping")
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(GcPolicy::default())
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(GcPolicy::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_struct("GcPolicy", &["ttlseconds"], self)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut gc = self.base;
        while let Some(field) = map.next_key::<GcField>()? {
            match field {
                GcField::TtlSeconds => {
                    gc.ttl_seconds = map.next_value::<Option<i32>>()?.unwrap_or_default();
                }
                GcField::Unknown => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(gc)
    }
}
