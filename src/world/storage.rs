//! Persistence tier for world objects.
//!
//! The access service only ever talks to [`WorldStore`]: an asynchronous
//! get/create/save surface with cancellation support. [`SledWorldStore`] is
//! the embedded reference implementation; tests that need to script failures
//! use [`crate::world::memory::MemoryWorldStore`] instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sled::IVec;
use tokio_util::sync::CancellationToken;

use crate::world::errors::StoreError;
use crate::world::types::{ObjRef, ObjectKind, ObjectRecord, OBJECT_SCHEMA_VERSION};

const TREE_OBJECTS: &str = "world_objects";

/// Asynchronous world-object store consumed by the access service.
///
/// `fetch` and `save` honor the caller-supplied cancellation signal and
/// return [`StoreError::Cancelled`] once it has fired. Identifier allocation
/// is monotonic; identifiers are never reused.
#[async_trait]
pub trait WorldStore: Send + Sync {
    /// Fetch an object by reference. `Ok(None)` means the object does not
    /// exist; transport problems surface as errors.
    async fn fetch(
        &self,
        id: ObjRef,
        cancel: &CancellationToken,
    ) -> Result<Option<ObjectRecord>, StoreError>;

    /// Allocate a fresh identifier and return a new unsaved room record.
    async fn create_room(&self, name: &str) -> Result<ObjectRecord, StoreError>;

    /// Allocate a fresh identifier and return a new unsaved thing record.
    async fn create_thing(&self, name: &str) -> Result<ObjectRecord, StoreError>;

    /// Persist the record under its identifier, overwriting any prior state.
    async fn save(
        &self,
        object: &ObjectRecord,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError>;
}

/// Helper builder so tests can easily open throwaway stores with custom paths.
pub struct SledWorldStoreBuilder {
    path: PathBuf,
}

impl SledWorldStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(self) -> Result<SledWorldStore, StoreError> {
        SledWorldStore::open(self.path)
    }
}

/// Sled-backed persistence for world objects.
///
/// Records are bincode-encoded under `objects:<zero-padded id>` in a single
/// tree; identifiers come from sled's monotonic id generator, so they are
/// unique for the lifetime of the database and never handed out twice.
pub struct SledWorldStore {
    db: sled::Db,
    objects: sled::Tree,
}

impl SledWorldStore {
    /// Open (or create) the object store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let objects = db.open_tree(TREE_OBJECTS)?;
        Ok(Self { db, objects })
    }

    fn object_key(id: ObjRef) -> Vec<u8> {
        format!("objects:{:020}", id.0).into_bytes()
    }

    fn serialize(record: &ObjectRecord) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(record)?)
    }

    fn deserialize(bytes: IVec) -> Result<ObjectRecord, StoreError> {
        let record: ObjectRecord = bincode::deserialize(&bytes)?;
        if record.schema_version != OBJECT_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                entity: "object",
                expected: OBJECT_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    fn next_ref(&self) -> Result<ObjRef, StoreError> {
        let id = self.db.generate_id()?;
        Ok(ObjRef(id as i64))
    }

    fn fresh(&self, kind: ObjectKind, name: &str) -> Result<ObjectRecord, StoreError> {
        let id = self.next_ref()?;
        Ok(ObjectRecord::new(id, kind, name))
    }
}

#[async_trait]
impl WorldStore for SledWorldStore {
    async fn fetch(
        &self,
        id: ObjRef,
        cancel: &CancellationToken,
    ) -> Result<Option<ObjectRecord>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let Some(bytes) = self.objects.get(Self::object_key(id))? else {
            return Ok(None);
        };
        Ok(Some(Self::deserialize(bytes)?))
    }

    async fn create_room(&self, name: &str) -> Result<ObjectRecord, StoreError> {
        self.fresh(ObjectKind::Room, name)
    }

    async fn create_thing(&self, name: &str) -> Result<ObjectRecord, StoreError> {
        self.fresh(ObjectKind::Thing, name)
    }

    async fn save(
        &self,
        object: &ObjectRecord,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let key = Self::object_key(object.id);
        let bytes = Self::serialize(object)?;
        self.objects.insert(key, bytes)?;
        self.objects.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::world::types::Property;
    use tempfile::TempDir;

    #[test]
    fn store_round_trip_object() {
        let dir = TempDir::new().expect("tempdir");
        let store = SledWorldStoreBuilder::new(dir.path()).open().expect("store");
        let cancel = CancellationToken::new();

        tokio_test::block_on(async {
            let mut room = store.create_room("Lobby").await.expect("create");
            room.owner = ObjRef(1);
            room.properties
                .push(Property::new("motd", json!("welcome"), ObjRef(1)));
            store.save(&room, &cancel).await.expect("save");

            let fetched = store
                .fetch(room.id, &cancel)
                .await
                .expect("fetch")
                .expect("present");
            assert_eq!(fetched, room);
            assert_eq!(fetched.schema_version, OBJECT_SCHEMA_VERSION);
        });
    }

    #[test]
    fn missing_object_is_absent_not_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let store = SledWorldStoreBuilder::new(dir.path()).open().expect("store");
        let cancel = CancellationToken::new();

        tokio_test::block_on(async {
            let fetched = store.fetch(ObjRef(4242), &cancel).await.expect("fetch");
            assert!(fetched.is_none());
        });
    }

    #[test]
    fn created_references_are_distinct() {
        let dir = TempDir::new().expect("tempdir");
        let store = SledWorldStoreBuilder::new(dir.path()).open().expect("store");

        tokio_test::block_on(async {
            let a = store.create_thing("sword").await.expect("create");
            let b = store.create_thing("sword").await.expect("create");
            let c = store.create_room("armory").await.expect("create");
            assert_ne!(a.id, b.id);
            assert_ne!(b.id, c.id);
            assert!(!a.id.is_nothing());
        });
    }

    #[test]
    fn cancelled_token_aborts_store_calls() {
        let dir = TempDir::new().expect("tempdir");
        let store = SledWorldStoreBuilder::new(dir.path()).open().expect("store");
        let cancel = CancellationToken::new();
        cancel.cancel();

        tokio_test::block_on(async {
            let err = store.fetch(ObjRef(1), &cancel).await.unwrap_err();
            assert!(matches!(err, StoreError::Cancelled));
        });
    }
}
