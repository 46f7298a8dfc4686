//! Pet domain model.
//!
//! # Responsibility
//! - Define the canonical pet record returned by reads and built by writes.
//! - Validate required text fields at construction and on mutation.
//!
//! # Invariants
//! - `pet_id`, `name` and `kind` are never empty. Whitespace is kept as given.
//! - `pet_id` is immutable once constructed.
//! - Equality and hashing use `pet_id` only.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Stable identifier of a pet row (`pets.pet_id`).
pub type PetId = String;

/// Numeric identifier of the owning person (`people.id`).
pub type OwnerId = i32;

/// Validation failures raised while building or mutating a [`Pet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetValidationError {
    EmptyPetId,
    EmptyName,
    EmptyType,
}

impl Display for PetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPetId => write!(f, "pet ID can't be empty"),
            Self::EmptyName => write!(f, "name can't be empty"),
            Self::EmptyType => write!(f, "type can't be empty"),
        }
    }
}

impl Error for PetValidationError {}

/// Canonical pet record.
///
/// Serialized as `{petId, name, type, ownerId}`. Deserialization runs the same
/// checks as [`Pet::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PetWire", rename_all = "camelCase")]
pub struct Pet {
    pet_id: PetId,
    name: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    kind: String,
    owner_id: OwnerId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PetWire {
    pet_id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    owner_id: OwnerId,
}

impl TryFrom<PetWire> for Pet {
    type Error = PetValidationError;

    fn try_from(value: PetWire) -> Result<Self, Self::Error> {
        Pet::new(value.pet_id, value.name, value.kind, value.owner_id)
    }
}

impl Pet {
    /// Creates a pet after validating the three required text fields.
    ///
    /// Fields are checked in declaration order, so the first empty one wins.
    pub fn new(
        pet_id: impl Into<PetId>,
        name: impl Into<String>,
        kind: impl Into<String>,
        owner_id: OwnerId,
    ) -> Result<Self, PetValidationError> {
        let pet_id = pet_id.into();
        if is_empty(&pet_id) {
            return Err(PetValidationError::EmptyPetId);
        }

        let mut pet = Self {
            pet_id,
            name: String::new(),
            kind: String::new(),
            owner_id,
        };
        pet.set_name(name)?;
        pet.set_kind(kind)?;
        Ok(pet)
    }

    pub fn pet_id(&self) -> &str {
        &self.pet_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Species/kind label, stored in the `type` column.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    /// Replaces the name, rejecting empty input without touching current state.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), PetValidationError> {
        let name = name.into();
        if is_empty(&name) {
            return Err(PetValidationError::EmptyName);
        }
        self.name = name;
        Ok(())
    }

    /// Replaces the kind, rejecting empty input without touching current state.
    pub fn set_kind(&mut self, kind: impl Into<String>) -> Result<(), PetValidationError> {
        let kind = kind.into();
        if is_empty(&kind) {
            return Err(PetValidationError::EmptyType);
        }
        self.kind = kind;
        Ok(())
    }

    pub fn set_owner_id(&mut self, owner_id: OwnerId) {
        self.owner_id = owner_id;
    }

    /// Compares every field, not only identity.
    pub fn same_state(&self, other: &Pet) -> bool {
        self.pet_id == other.pet_id
            && self.name == other.name
            && self.kind == other.kind
            && self.owner_id == other.owner_id
    }
}

impl PartialEq for Pet {
    fn eq(&self, other: &Self) -> bool {
        self.pet_id == other.pet_id
    }
}

impl Eq for Pet {}

impl Hash for Pet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pet_id.hash(state);
    }
}

fn is_empty(value: &str) -> bool {
    value.is_empty()
}
