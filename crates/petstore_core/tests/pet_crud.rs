use log::{Level, Log, Metadata, Record};
use petstore_core::db::{ConnectionSource, DbResult};
use petstore_core::{
    CoreLogger, Pet, PetErrorKind, PetRepository, PetStoreError, PetValidationError,
    SqliteConnectionSource, SqlitePetRepository,
};
use rusqlite::{params, Connection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct CountingSource {
    inner: SqliteConnectionSource,
    acquired: AtomicUsize,
}

impl CountingSource {
    fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

impl ConnectionSource for CountingSource {
    fn acquire(&self) -> DbResult<Connection> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.inner.acquire()
    }
}

#[derive(Default)]
struct Capture {
    events: Mutex<Vec<(Level, String)>>,
}

impl Capture {
    fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.events
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

struct Fixture {
    _dir: TempDir,
    source: Arc<CountingSource>,
    capture: Arc<Capture>,
    repo: SqlitePetRepository<Arc<CountingSource>>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_schema(None)
    }

    fn with_schema(schema: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pets.db");
        if let Some(sql) = schema {
            Connection::open(&path).unwrap().execute_batch(sql).unwrap();
        }

        let inner = SqliteConnectionSource::open(&path, &CoreLogger::discard()).unwrap();
        let source = Arc::new(CountingSource {
            inner,
            acquired: AtomicUsize::new(0),
        });
        let capture = Arc::new(Capture::default());
        let repo =
            SqlitePetRepository::try_new(source.clone(), CoreLogger::new(capture.clone())).unwrap();

        Self {
            _dir: dir,
            source,
            capture,
            repo,
        }
    }

    fn insert_person(&self, id: i32) {
        self.source
            .inner
            .acquire()
            .unwrap()
            .execute(
                "INSERT INTO people (id, name, surname) VALUES (?1, ?2, ?3);",
                params![id, format!("name-{id}"), format!("surname-{id}")],
            )
            .unwrap();
    }

    fn raw_execute(&self, sql: &str) {
        self.source.inner.acquire().unwrap().execute_batch(sql).unwrap();
    }
}

fn assert_same(actual: &Pet, pet_id: &str, name: &str, kind: &str, owner_id: i32) {
    assert_eq!(actual.pet_id(), pet_id);
    assert_eq!(actual.name(), name);
    assert_eq!(actual.kind(), kind);
    assert_eq!(actual.owner_id(), owner_id);
}

#[test]
fn add_then_get_returns_all_fields() {
    let fx = Fixture::new();
    fx.insert_person(1);

    let created = fx.repo.add("p1", "Rex", "dog", 1).unwrap();
    assert_same(&created, "p1", "Rex", "dog", 1);

    let loaded = fx.repo.get("p1").unwrap();
    assert_same(&loaded, "p1", "Rex", "dog", 1);
}

#[test]
fn full_lifecycle_scenario() {
    let fx = Fixture::new();
    fx.insert_person(1);

    let created = fx.repo.add("p1", "Rex", "dog", 1).unwrap();
    assert_same(&created, "p1", "Rex", "dog", 1);
    assert_same(&fx.repo.get("p1").unwrap(), "p1", "Rex", "dog", 1);

    let modified = Pet::new("p1", "Max", "cat", 1).unwrap();
    fx.repo.modify(&modified).unwrap();
    assert_same(&fx.repo.get("p1").unwrap(), "p1", "Max", "cat", 1);

    fx.repo.delete("p1").unwrap();
    let err = fx.repo.get("p1").unwrap_err();
    assert_eq!(err.kind(), PetErrorKind::NotFound);
}

#[test]
fn add_with_unknown_owner_is_invalid_input_and_inserts_nothing() {
    let fx = Fixture::new();
    fx.insert_person(1);
    fx.repo.add("p1", "Rex", "dog", 1).unwrap();
    let before = fx.repo.list().unwrap();

    let err = fx.repo.add("p2", "Tom", "cat", 42).unwrap_err();
    assert!(matches!(err, PetStoreError::OwnerNotFound(42)));
    assert_eq!(err.kind(), PetErrorKind::InvalidInput);

    let after = fx.repo.list().unwrap();
    assert_eq!(after.len(), before.len());
    assert!(matches!(
        fx.repo.get("p2").unwrap_err(),
        PetStoreError::NotFound(_)
    ));
}

#[test]
fn add_with_empty_fields_fails_before_acquiring_a_connection() {
    let fx = Fixture::new();
    fx.insert_person(1);
    let acquired_before = fx.source.acquired();

    for (pet_id, name, kind, expected) in [
        ("", "Rex", "dog", PetValidationError::EmptyPetId),
        ("p1", "", "dog", PetValidationError::EmptyName),
        ("p1", "Rex", "", PetValidationError::EmptyType),
    ] {
        let err = fx.repo.add(pet_id, name, kind, 1).unwrap_err();
        assert!(matches!(err, PetStoreError::Validation(actual) if actual == expected));
        assert_eq!(err.kind(), PetErrorKind::InvalidInput);
    }

    assert_eq!(fx.source.acquired(), acquired_before);
    assert!(fx.repo.list().unwrap().is_empty());
}

#[test]
fn add_duplicate_pet_id_is_store_error_and_logged() {
    let fx = Fixture::new();
    fx.insert_person(1);
    fx.repo.add("p1", "Rex", "dog", 1).unwrap();

    let err = fx.repo.add("p1", "Other", "cat", 1).unwrap_err();
    assert_eq!(err.kind(), PetErrorKind::Store);
    assert!(matches!(err, PetStoreError::Db(_)));

    let errors = fx.capture.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("event=pet_add"), "{}", errors[0]);
    assert!(errors[0].contains("pet_id=p1"), "{}", errors[0]);

    assert_same(&fx.repo.get("p1").unwrap(), "p1", "Rex", "dog", 1);
}

#[test]
fn client_errors_are_not_logged_as_errors() {
    let fx = Fixture::new();

    fx.repo.get("missing").unwrap_err();
    fx.repo.delete("missing").unwrap_err();
    fx.repo.add("p1", "Rex", "dog", 9).unwrap_err();

    assert!(fx.capture.errors().is_empty());
}

#[test]
fn get_unknown_id_is_not_found() {
    let fx = Fixture::new();

    let err = fx.repo.get("ghost").unwrap_err();
    assert!(matches!(err, PetStoreError::NotFound(ref id) if id == "ghost"));
    assert_eq!(err.to_string(), "invalid pet ID: ghost");
}

#[test]
fn list_on_empty_store_is_empty() {
    let fx = Fixture::new();
    assert!(fx.repo.list().unwrap().is_empty());
}

#[test]
fn list_grows_by_one_on_add_and_shrinks_by_one_on_delete() {
    let fx = Fixture::new();
    fx.insert_person(1);
    fx.insert_person(2);

    fx.repo.add("a", "Rex", "dog", 1).unwrap();
    fx.repo.add("b", "Tom", "cat", 2).unwrap();
    let before = fx.repo.list().unwrap().len();

    fx.repo.add("c", "Nemo", "fish", 2).unwrap();
    assert_eq!(fx.repo.list().unwrap().len(), before + 1);

    fx.repo.delete("a").unwrap();
    let remaining = fx.repo.list().unwrap();
    assert_eq!(remaining.len(), before);
    assert!(remaining.iter().all(|pet| pet.pet_id() != "a"));
}

#[test]
fn modify_changes_only_mutable_fields() {
    let fx = Fixture::new();
    fx.insert_person(1);
    fx.insert_person(2);
    fx.repo.add("p1", "Rex", "dog", 1).unwrap();
    fx.repo.add("p2", "Tom", "cat", 1).unwrap();

    fx.repo
        .modify(&Pet::new("p1", "Max", "wolf", 2).unwrap())
        .unwrap();

    assert_same(&fx.repo.get("p1").unwrap(), "p1", "Max", "wolf", 2);
    assert_same(&fx.repo.get("p2").unwrap(), "p2", "Tom", "cat", 1);
    assert_eq!(fx.repo.list().unwrap().len(), 2);
}

#[test]
fn modify_unknown_pet_is_not_found() {
    let fx = Fixture::new();
    fx.insert_person(1);

    let err = fx
        .repo
        .modify(&Pet::new("ghost", "Max", "cat", 1).unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), PetErrorKind::NotFound);
    assert!(fx.repo.list().unwrap().is_empty());
}

#[test]
fn modify_with_unknown_owner_is_invalid_input_and_keeps_row() {
    let fx = Fixture::new();
    fx.insert_person(1);
    fx.repo.add("p1", "Rex", "dog", 1).unwrap();

    let err = fx
        .repo
        .modify(&Pet::new("p1", "Max", "cat", 77).unwrap())
        .unwrap_err();
    assert!(matches!(err, PetStoreError::OwnerNotFound(77)));
    assert_eq!(err.kind(), PetErrorKind::InvalidInput);
    assert_same(&fx.repo.get("p1").unwrap(), "p1", "Rex", "dog", 1);
}

#[test]
fn delete_unknown_id_fails_without_side_effects() {
    let fx = Fixture::new();
    fx.insert_person(1);
    fx.repo.add("p1", "Rex", "dog", 1).unwrap();

    let err = fx.repo.delete("ghost").unwrap_err();
    assert_eq!(err.kind(), PetErrorKind::NotFound);
    assert_eq!(fx.repo.list().unwrap().len(), 1);
}

#[test]
fn each_operation_acquires_one_connection() {
    let fx = Fixture::new();
    fx.insert_person(1);

    let start = fx.source.acquired();
    fx.repo.add("p1", "Rex", "dog", 1).unwrap();
    fx.repo.get("p1").unwrap();
    fx.repo.list().unwrap();
    fx.repo
        .modify(&Pet::new("p1", "Max", "cat", 1).unwrap())
        .unwrap();
    fx.repo.delete("p1").unwrap();

    assert_eq!(fx.source.acquired() - start, 5);
}

#[test]
fn null_column_in_stored_row_is_store_error() {
    let fx = Fixture::with_schema(Some(
        "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, surname TEXT);
         CREATE TABLE pets (pet_id TEXT PRIMARY KEY, name TEXT, type TEXT, owner_id INTEGER);",
    ));
    fx.raw_execute("INSERT INTO pets (pet_id, name, type, owner_id) VALUES ('p1', NULL, 'dog', 1);");

    let err = fx.repo.get("p1").unwrap_err();
    assert_eq!(err.kind(), PetErrorKind::Store);
    assert!(matches!(err, PetStoreError::Db(_)));
    assert_eq!(fx.capture.errors().len(), 1);
}

#[test]
fn empty_text_in_stored_row_is_invalid_data() {
    let fx = Fixture::with_schema(Some(
        "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, surname TEXT);
         CREATE TABLE pets (pet_id TEXT PRIMARY KEY, name TEXT, type TEXT, owner_id INTEGER);",
    ));
    fx.raw_execute("INSERT INTO pets (pet_id, name, type, owner_id) VALUES ('p1', 'Rex', '', 1);");

    let err = fx.repo.list().unwrap_err();
    assert!(matches!(err, PetStoreError::InvalidData(_)));
    assert_eq!(err.kind(), PetErrorKind::Store);
}

#[test]
fn repository_rejects_source_without_pets_table() {
    struct BareSource;

    impl ConnectionSource for BareSource {
        fn acquire(&self) -> DbResult<Connection> {
            Ok(Connection::open_in_memory()?)
        }
    }

    let result = SqlitePetRepository::try_new(BareSource, CoreLogger::discard());
    assert!(matches!(
        result,
        Err(PetStoreError::Db(petstore_core::DbError::MissingRequiredTable("people")))
    ));
}

#[test]
fn whitespace_text_in_stored_row_is_listed() {
    let fx = Fixture::new();
    fx.insert_person(1);
    fx.raw_execute("INSERT INTO pets (pet_id, name, type, owner_id) VALUES ('p1', ' ', 'dog', 1);");

    let pets = fx.repo.list().unwrap();
    assert_eq!(pets.len(), 1);
    assert_same(&pets[0], "p1", " ", "dog", 1);
}

#[test]
fn owner_deleted_before_insert_is_store_error_without_dangling_row() {
    let fx = Fixture::new();
    fx.insert_person(1);
    fx.raw_execute(
        "CREATE TRIGGER drop_owner_before_insert BEFORE INSERT ON pets
         BEGIN
             DELETE FROM people WHERE id = NEW.owner_id;
         END;",
    );

    let err = fx.repo.add("p1", "Rex", "dog", 1).unwrap_err();
    assert_eq!(err.kind(), PetErrorKind::Store);
    assert!(matches!(err, PetStoreError::Db(_)));
    assert!(fx.repo.list().unwrap().is_empty());
    assert_eq!(fx.capture.errors().len(), 1);
}

#[test]
fn owner_deleted_before_update_is_store_error_and_keeps_row() {
    let fx = Fixture::new();
    fx.insert_person(1);
    fx.insert_person(2);
    fx.repo.add("p1", "Rex", "dog", 1).unwrap();
    fx.raw_execute(
        "CREATE TRIGGER drop_owner_before_update BEFORE UPDATE ON pets
         BEGIN
             DELETE FROM people WHERE id = NEW.owner_id;
         END;",
    );

    let moved = Pet::new("p1", "Max", "cat", 2).unwrap();
    let err = fx.repo.modify(&moved).unwrap_err();
    assert_eq!(err.kind(), PetErrorKind::Store);
    assert!(matches!(err, PetStoreError::Db(_)));

    assert_same(&fx.repo.get("p1").unwrap(), "p1", "Rex", "dog", 1);
    assert_eq!(fx.capture.errors().len(), 1);
}
