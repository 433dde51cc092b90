//! In-process world store used by tests and embedded hosts.
//!
//! Besides plain storage it can stall fetches or saves for chosen objects
//! (the call then parks until the operation's cancellation signal fires),
//! which is how the deadline path and the `create_thing` partial-failure
//! window are exercised deterministically. Operation counters let tests
//! assert that an operation never reached the persistence tier at all.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::world::errors::StoreError;
use crate::world::storage::WorldStore;
use crate::world::types::{ObjRef, ObjectKind, ObjectRecord};

#[derive(Default)]
pub struct MemoryWorldStore {
    objects: Mutex<HashMap<ObjRef, ObjectRecord>>,
    next_id: AtomicI64,
    stalled_fetches: Mutex<HashSet<ObjRef>>,
    stalled_saves: Mutex<HashSet<ObjRef>>,
    fetch_calls: AtomicUsize,
    create_calls: AtomicUsize,
    save_calls: AtomicUsize,
}

impl MemoryWorldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing the async surface. Intended for
    /// test fixtures and world bootstrap.
    pub fn put(&self, record: ObjectRecord) {
        let mut objects = self.objects.lock().unwrap();
        // Keep the id allocator ahead of seeded identifiers.
        let floor = record.id.0 + 1;
        if self.next_id.load(Ordering::SeqCst) < floor {
            self.next_id.store(floor, Ordering::SeqCst);
        }
        objects.insert(record.id, record);
    }

    /// Read an object directly, bypassing the async surface.
    pub fn get(&self, id: ObjRef) -> Option<ObjectRecord> {
        self.objects.lock().unwrap().get(&id).cloned()
    }

    /// Make every `fetch` of `id` park until the operation cancels.
    pub fn stall_fetches_for(&self, id: ObjRef) {
        self.stalled_fetches.lock().unwrap().insert(id);
    }

    /// Make every `save` of `id` park until the operation cancels.
    pub fn stall_saves_for(&self, id: ObjRef) {
        self.stalled_saves.lock().unwrap().insert(id);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    fn fresh(&self, kind: ObjectKind, name: &str) -> ObjectRecord {
        let id = ObjRef(self.next_id.fetch_add(1, Ordering::SeqCst));
        ObjectRecord::new(id, kind, name)
    }
}

#[async_trait]
impl WorldStore for MemoryWorldStore {
    async fn fetch(
        &self,
        id: ObjRef,
        cancel: &CancellationToken,
    ) -> Result<Option<ObjectRecord>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.stalled_fetches.lock().unwrap().contains(&id) {
            cancel.cancelled().await;
            return Err(StoreError::Cancelled);
        }
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Ok(self.objects.lock().unwrap().get(&id).cloned())
    }

    async fn create_room(&self, name: &str) -> Result<ObjectRecord, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fresh(ObjectKind::Room, name))
    }

    async fn create_thing(&self, name: &str) -> Result<ObjectRecord, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fresh(ObjectKind::Thing, name))
    }

    async fn save(
        &self,
        object: &ObjectRecord,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.stalled_saves.lock().unwrap().contains(&object.id) {
            cancel.cancelled().await;
            return Err(StoreError::Cancelled);
        }
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.objects
            .lock()
            .unwrap()
            .insert(object.id, object.clone());
        Ok(())
    }
}
