//! Generic resource contract and soft-delete visibility tag.
//!
//! # Invariants
//! - `Visibility` only moves `Active -> Retired`.
//! - A patch never carries identity into a merge; see [`ResourcePatch::without_id`].

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Backend-assigned primary key shared by all resources.
pub type ResourceId = i64;

/// Two-state visibility tag implementing soft deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to reads and eligible for updates.
    Active,
    /// Logically deleted. Hidden from every read path.
    Retired,
}

impl Visibility {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Maps the persisted/wire `available` flag to a visibility tag.
    pub fn from_available(available: bool) -> Self {
        if available {
            Self::Active
        } else {
            Self::Retired
        }
    }

    /// Maps the visibility tag back to the `available` flag.
    pub fn as_available(self) -> bool {
        self.is_active()
    }
}

/// Serde adapter exposing [`Visibility`] as the boolean `available` field.
pub mod available_flag {
    use super::Visibility;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Visibility, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(value.as_available())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Visibility, D::Error> {
        bool::deserialize(deserializer).map(Visibility::from_available)
    }
}

/// Field-level validation failure for create/update payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

impl Error for FieldError {}

/// Partial-update payload for a resource.
pub trait ResourcePatch {
    /// Returns the patch with any identity field removed.
    fn without_id(self) -> Self;

    /// Returns `true` when no field would be merged.
    fn is_empty(&self) -> bool;
}

/// Entity managed by a soft-delete resource store.
pub trait Resource: Sized {
    /// Human-readable entity name used in error messages.
    const KIND: &'static str;

    /// Full payload supplied at creation.
    type Fields;
    /// Partial payload supplied at update.
    type Patch: ResourcePatch;

    fn id(&self) -> ResourceId;

    fn visibility(&self) -> Visibility;

    /// Validates a create payload before it reaches storage.
    fn validate_fields(fields: &Self::Fields) -> Result<(), FieldError>;

    /// Validates only the fields present in an update payload.
    fn validate_patch(patch: &Self::Patch) -> Result<(), FieldError>;
}
