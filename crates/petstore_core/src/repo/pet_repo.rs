//! Pet repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide get/list/add/modify/delete over the `pets` table.
//! - Enforce owner existence before inserts and updates.
//! - Map stored rows to `Pet` values.
//!
//! # Invariants
//! - Each operation acquires exactly one connection and drops it before returning.
//! - No explicit transaction wraps the owner check and the write; a person
//!   removed in between surfaces as a storage error through the foreign key.
//! - Storage failures are logged at error level before being returned.

use crate::db::schema::ensure_connection_ready;
use crate::db::{ConnectionSource, DbError};
use crate::logging::CoreLogger;
use crate::model::pet::{OwnerId, Pet, PetId, PetValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const OWNER_EXISTS_SQL: &str = "SELECT 1 FROM people WHERE id = ?";
const PET_SELECT_ONE_SQL: &str = "SELECT * FROM pets WHERE pet_id = ?";
const PET_SELECT_ALL_SQL: &str = "SELECT * FROM pets";
const PET_INSERT_SQL: &str = "INSERT INTO pets (pet_id, name, type, owner_id) VALUES (?, ?, ?, ?)";
const PET_UPDATE_SQL: &str = "UPDATE pets SET name = ?, type = ?, owner_id = ? WHERE pet_id = ?";
const PET_DELETE_SQL: &str = "DELETE FROM pets WHERE pet_id = ?";

pub type PetResult<T> = Result<T, PetStoreError>;

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetErrorKind {
    /// Caller-supplied data was rejected (empty field, unknown owner).
    InvalidInput,
    /// The target pet row does not exist.
    NotFound,
    /// The storage collaborator failed or returned inconsistent data.
    Store,
}

/// Error returned by pet repository operations.
#[derive(Debug)]
pub enum PetStoreError {
    Validation(PetValidationError),
    OwnerNotFound(OwnerId),
    NotFound(PetId),
    Db(DbError),
    InvalidData(String),
    UnexpectedRowCount {
        operation: &'static str,
        affected: usize,
    },
}

impl PetStoreError {
    pub fn kind(&self) -> PetErrorKind {
        match self {
            Self::Validation(_) | Self::OwnerNotFound(_) => PetErrorKind::InvalidInput,
            Self::NotFound(_) => PetErrorKind::NotFound,
            Self::Db(_) | Self::InvalidData(_) | Self::UnexpectedRowCount { .. } => {
                PetErrorKind::Store
            }
        }
    }
}

impl Display for PetStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::OwnerNotFound(owner_id) => write!(f, "owner ID does not exist: {owner_id}"),
            Self::NotFound(pet_id) => write!(f, "invalid pet ID: {pet_id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
            Self::UnexpectedRowCount {
                operation,
                affected,
            } => write!(
                f,
                "error on pet {operation}: expected 1 affected row, got {affected}"
            ),
        }
    }
}

impl Error for PetStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::OwnerNotFound(_)
            | Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::UnexpectedRowCount { .. } => None,
        }
    }
}

impl From<PetValidationError> for PetStoreError {
    fn from(value: PetValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for PetStoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PetStoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data-access operations over stored pets.
pub trait PetRepository {
    /// Returns the pet with `pet_id`, or `NotFound`.
    fn get(&self, pet_id: &str) -> PetResult<Pet>;
    /// Returns every stored pet in retrieval order.
    fn list(&self) -> PetResult<Vec<Pet>>;
    /// Validates, checks the owner, inserts, and returns the constructed pet.
    fn add(&self, pet_id: &str, name: &str, kind: &str, owner_id: OwnerId) -> PetResult<Pet>;
    /// Replaces name, kind and owner of the pet identified by `pet.pet_id()`.
    fn modify(&self, pet: &Pet) -> PetResult<()>;
    /// Removes the pet with `pet_id`, or fails with `NotFound`.
    fn delete(&self, pet_id: &str) -> PetResult<()>;
}

/// SQLite-backed pet repository.
pub struct SqlitePetRepository<S: ConnectionSource> {
    source: S,
    logger: CoreLogger,
}

impl<S: ConnectionSource> SqlitePetRepository<S> {
    /// Constructs a repository after checking the source serves a ready schema.
    pub fn try_new(source: S, logger: CoreLogger) -> PetResult<Self> {
        {
            let conn = source.acquire()?;
            ensure_connection_ready(&conn)?;
        }
        Ok(Self {
            source,
            logger: logger.with_target("petstore_core::repo::pet_repo"),
        })
    }

    fn observe<T>(
        &self,
        operation: &'static str,
        pet_id: &str,
        run: impl FnOnce() -> PetResult<T>,
    ) -> PetResult<T> {
        let started_at = Instant::now();
        let result = run();

        match &result {
            Ok(_) => self.logger.debug(format_args!(
                "event=pet_{operation} module=repo status=ok pet_id={pet_id} duration_ms={}",
                started_at.elapsed().as_millis()
            )),
            Err(err) if err.kind() == PetErrorKind::Store => self.logger.error(format_args!(
                "event=pet_{operation} module=repo status=error pet_id={pet_id} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            )),
            Err(err) => self.logger.debug(format_args!(
                "event=pet_{operation} module=repo status=rejected pet_id={pet_id} kind={:?} error={err}",
                err.kind()
            )),
        }

        result
    }
}

impl<S: ConnectionSource> PetRepository for SqlitePetRepository<S> {
    fn get(&self, pet_id: &str) -> PetResult<Pet> {
        self.observe("get", pet_id, || {
            let conn = self.source.acquire()?;
            let mut stmt = conn.prepare(PET_SELECT_ONE_SQL)?;
            let mut rows = stmt.query([pet_id])?;
            if let Some(row) = rows.next()? {
                return parse_pet_row(row);
            }

            Err(PetStoreError::NotFound(pet_id.to_string()))
        })
    }

    fn list(&self) -> PetResult<Vec<Pet>> {
        self.observe("list", "*", || {
            let conn = self.source.acquire()?;
            let mut stmt = conn.prepare(PET_SELECT_ALL_SQL)?;
            let mut rows = stmt.query([])?;
            let mut pets = Vec::new();

            while let Some(row) = rows.next()? {
                pets.push(parse_pet_row(row)?);
            }

            Ok(pets)
        })
    }

    fn add(&self, pet_id: &str, name: &str, kind: &str, owner_id: OwnerId) -> PetResult<Pet> {
        self.observe("add", pet_id, || {
            let pet = Pet::new(pet_id, name, kind, owner_id)?;

            let conn = self.source.acquire()?;
            ensure_owner_exists(&conn, owner_id)?;

            let inserted = conn.execute(
                PET_INSERT_SQL,
                params![pet.pet_id(), pet.name(), pet.kind(), pet.owner_id()],
            )?;
            if inserted != 1 {
                return Err(PetStoreError::UnexpectedRowCount {
                    operation: "insert",
                    affected: inserted,
                });
            }

            Ok(pet)
        })
    }

    fn modify(&self, pet: &Pet) -> PetResult<()> {
        self.observe("modify", pet.pet_id(), || {
            let conn = self.source.acquire()?;
            ensure_owner_exists(&conn, pet.owner_id())?;

            let changed = conn.execute(
                PET_UPDATE_SQL,
                params![pet.name(), pet.kind(), pet.owner_id(), pet.pet_id()],
            )?;
            if changed == 0 {
                return Err(PetStoreError::NotFound(pet.pet_id().to_string()));
            }

            Ok(())
        })
    }

    fn delete(&self, pet_id: &str) -> PetResult<()> {
        self.observe("delete", pet_id, || {
            let conn = self.source.acquire()?;
            let changed = conn.execute(PET_DELETE_SQL, [pet_id])?;
            if changed == 0 {
                return Err(PetStoreError::NotFound(pet_id.to_string()));
            }

            Ok(())
        })
    }
}

fn ensure_owner_exists(conn: &Connection, owner_id: OwnerId) -> PetResult<()> {
    let mut stmt = conn.prepare(OWNER_EXISTS_SQL)?;
    if !stmt.exists([owner_id])? {
        return Err(PetStoreError::OwnerNotFound(owner_id));
    }
    Ok(())
}

// Empty or NULL columns are storage bugs, so they map to `InvalidData`/`Db`
// and never to a caller-facing validation error.
fn parse_pet_row(row: &Row<'_>) -> PetResult<Pet> {
    let pet_id: String = row.get("pet_id")?;
    let name: String = row.get("name")?;
    let kind: String = row.get("type")?;
    let owner_id: OwnerId = row.get("owner_id")?;

    Pet::new(pet_id.as_str(), name, kind, owner_id)
        .map_err(|err| PetStoreError::InvalidData(format!("pets row `{pet_id}`: {err}")))
}
