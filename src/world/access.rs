//! Permission-checked, deadline-bounded object access for script code.
//!
//! [`ObjectAccess`] is built once per acting object ("caller") and presents a
//! synchronous surface to the script interpreter. Internally every operation
//! issues asynchronous store calls, all bounded by a single per-operation
//! deadline carried as a cancellation signal: when the deadline expires the
//! whole in-flight operation is cancelled and the caller gets the failure
//! sentinel for that operation's return type. Script code never sees an
//! exception for a domain condition: a missing object, a timeout and a
//! refused mutation all come back as ordinary values.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;

use crate::logutil::escape_log;
use crate::world::storage::WorldStore;
use crate::world::types::{ObjRef, ObjectRecord, PropRead, Property};

/// Deadline shared by every store call within one operation.
pub const DEFAULT_OP_DEADLINE: Duration = Duration::from_millis(5000);

/// One operation's timing window: a shared cancellation token plus the
/// absolute instant after which no sub-call may continue. Expiry of any
/// sub-call cancels the token, aborting whatever else is still in flight.
struct OpWindow {
    cancel: CancellationToken,
    deadline: Instant,
}

impl OpWindow {
    fn open(budget: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Instant::now() + budget,
        }
    }

    /// Fetch within the window. Absence, store failure and deadline expiry
    /// all collapse to `None`.
    async fn fetch(&self, store: &dyn WorldStore, id: ObjRef) -> Option<ObjectRecord> {
        if id.is_nothing() {
            return None;
        }
        match timeout_at(self.deadline, store.fetch(id, &self.cancel)).await {
            Ok(Ok(found)) => found,
            Ok(Err(err)) => {
                debug!("fetch of {} failed: {}", id, err);
                None
            }
            Err(_) => {
                self.cancel.cancel();
                debug!("fetch of {} hit the operation deadline", id);
                None
            }
        }
    }

    /// Save within the window; reports whether the save completed in time.
    async fn save(&self, store: &dyn WorldStore, object: &ObjectRecord) -> bool {
        match timeout_at(self.deadline, store.save(object, &self.cancel)).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                debug!("save of {} failed: {}", object.id, err);
                false
            }
            Err(_) => {
                self.cancel.cancel();
                debug!("save of {} hit the operation deadline", object.id);
                false
            }
        }
    }
}

/// Synchronous, permission-enforced CRUD surface over persistent world
/// objects, bound to one acting object.
pub struct ObjectAccess {
    caller: ObjectRecord,
    store: Arc<dyn WorldStore>,
    handle: Handle,
    op_deadline: Duration,
}

impl ObjectAccess {
    /// Build an access service for `caller` on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if `caller` carries the `NOTHING` identity (a defect in the
    /// calling runtime, not a scriptable condition) or when called outside a
    /// Tokio runtime context.
    pub fn new(caller: ObjectRecord, store: Arc<dyn WorldStore>) -> Self {
        let handle = Handle::current();
        Self::with_handle(caller, store, handle)
    }

    /// Build an access service driving its store calls on `handle`. The
    /// script thread itself must not be a runtime worker thread.
    ///
    /// # Panics
    ///
    /// Panics if `caller` carries the `NOTHING` identity.
    pub fn with_handle(caller: ObjectRecord, store: Arc<dyn WorldStore>, handle: Handle) -> Self {
        assert!(
            !caller.id.is_nothing(),
            "ObjectAccess requires a real caller identity"
        );
        Self {
            caller,
            store,
            handle,
            op_deadline: DEFAULT_OP_DEADLINE,
        }
    }

    /// Override the per-operation deadline (hosts wire this from config;
    /// tests shrink it).
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.op_deadline = deadline;
        self
    }

    /// Reference of the acting object.
    pub fn caller(&self) -> ObjRef {
        self.caller.id
    }

    /// Create a room placed alongside the caller's current location: the new
    /// room copies location and parent from the caller's location object and
    /// takes the caller's owner. Returns the new room's reference, or
    /// `NOTHING` on a blank name, an unreachable location, or a failed save.
    pub fn create_room(&self, name: &str) -> ObjRef {
        if name.trim().is_empty() {
            debug!("create_room rejected: blank name");
            return ObjRef::NOTHING;
        }
        self.handle.block_on(self.create_room_op(name))
    }

    async fn create_room_op(&self, name: &str) -> ObjRef {
        let window = OpWindow::open(self.op_deadline);
        let Some(location) = window.fetch(self.store.as_ref(), self.caller.location).await else {
            debug!(
                "create_room by {} failed: location {} unreachable",
                self.caller.id, self.caller.location
            );
            return ObjRef::NOTHING;
        };
        let Some(mut room) = self.create_record(&window, name, true).await else {
            return ObjRef::NOTHING;
        };
        room.location = location.location;
        room.parent = location.parent;
        room.owner = self.caller.owner;
        if !window.save(self.store.as_ref(), &room).await {
            return ObjRef::NOTHING;
        }
        debug!(
            "create_room: {} \"{}\" owned by {}",
            room.id,
            escape_log(name),
            room.owner
        );
        room.id
    }

    /// Create a thing in the caller's inventory. The thing is saved first;
    /// the caller's contents are updated and saved second. The two writes are
    /// independent: if the second save times out the thing still exists with
    /// correct owner and location, but the caller's stored contents will not
    /// list it yet.
    pub fn create_thing(&mut self, name: &str) -> ObjRef {
        if name.trim().is_empty() {
            debug!("create_thing rejected: blank name");
            return ObjRef::NOTHING;
        }
        let window = OpWindow::open(self.op_deadline);
        let handle = self.handle.clone();
        handle.block_on(async {
            if window
                .fetch(self.store.as_ref(), self.caller.location)
                .await
                .is_none()
            {
                debug!(
                    "create_thing by {} failed: location {} unreachable",
                    self.caller.id, self.caller.location
                );
                return ObjRef::NOTHING;
            }
            let Some(mut thing) = self.create_record(&window, name, false).await else {
                return ObjRef::NOTHING;
            };
            thing.location = self.caller.id;
            thing.owner = self.caller.owner;
            if !window.save(self.store.as_ref(), &thing).await {
                return ObjRef::NOTHING;
            }
            self.caller.contents.insert(thing.id);
            if !window.save(self.store.as_ref(), &self.caller).await {
                warn!(
                    "create_thing: {} saved but contents update of caller {} did not complete",
                    thing.id, self.caller.id
                );
            }
            debug!(
                "create_thing: {} \"{}\" into {}",
                thing.id,
                escape_log(name),
                self.caller.id
            );
            thing.id
        })
    }

    async fn create_record(
        &self,
        window: &OpWindow,
        name: &str,
        room: bool,
    ) -> Option<ObjectRecord> {
        let created = if room {
            timeout_at(window.deadline, self.store.create_room(name)).await
        } else {
            timeout_at(window.deadline, self.store.create_thing(name)).await
        };
        match created {
            Ok(Ok(record)) => Some(record),
            Ok(Err(err)) => {
                debug!("object creation failed: {}", err);
                None
            }
            Err(_) => {
                window.cancel.cancel();
                debug!("object creation hit the operation deadline");
                None
            }
        }
    }

    /// Rename `target`. Only the target's owner may rename it. Returns
    /// whether the renamed object was persisted within the deadline.
    pub fn rename(&self, target: ObjRef, new_name: &str) -> bool {
        if new_name.trim().is_empty() {
            debug!("rename of {} rejected: blank name", target);
            return false;
        }
        self.handle.block_on(async {
            let window = OpWindow::open(self.op_deadline);
            let Some(mut object) = window.fetch(self.store.as_ref(), target).await else {
                return false;
            };
            if object.owner != self.caller.id {
                debug!(
                    "rename of {} denied: caller {} is not owner {}",
                    target, self.caller.id, object.owner
                );
                return false;
            }
            object.name = new_name.to_string();
            window.save(self.store.as_ref(), &object).await
        })
    }

    /// Fetch `target`. Non-owners always get *something* rather than a
    /// permission error: a reduced view with non-public properties stripped.
    pub fn get_object(&self, target: ObjRef) -> Option<ObjectRecord> {
        self.handle.block_on(async {
            let window = OpWindow::open(self.op_deadline);
            let object = window.fetch(self.store.as_ref(), target).await?;
            if object.owner == self.caller.id {
                Some(object)
            } else {
                Some(object.sanitized())
            }
        })
    }

    /// Read a property by exact name match.
    ///
    /// Returns [`PropRead::Absent`] when the object is unreachable within the
    /// deadline or carries no such property, [`PropRead::Denied`] when the
    /// property exists but is not public-readable and the caller does not own
    /// it, and the value otherwise.
    ///
    /// # Panics
    ///
    /// Panics on a blank property name; that is a defect in the calling
    /// runtime, not a domain condition.
    pub fn get_property(&self, target: ObjRef, name: &str) -> PropRead {
        assert!(
            !name.trim().is_empty(),
            "get_property requires a non-blank property name"
        );
        self.handle.block_on(async {
            let window = OpWindow::open(self.op_deadline);
            let Some(object) = window.fetch(self.store.as_ref(), target).await else {
                return PropRead::Absent;
            };
            let Some(prop) = object.property(name) else {
                return PropRead::Absent;
            };
            if !prop.readable && prop.owner != self.caller.id {
                debug!(
                    "get_property {} on {} denied for {}",
                    escape_log(name),
                    target,
                    self.caller.id
                );
                return PropRead::Denied;
            }
            PropRead::Value(prop.value.clone())
        })
    }

    /// Write, create or remove a property, matching the name ASCII
    /// case-insensitively.
    ///
    /// A null `value` removes an existing property and is a failing no-op on
    /// a missing one. A missing property is created owned by the caller with
    /// both visibility flags off; note that any caller able to reach the
    /// object may originate a new property on it. Updating or removing an
    /// existing property requires the caller to own the *object* or the
    /// property to be public-writeable. Returns whether the object was
    /// persisted within the deadline.
    pub fn set_property(&self, target: ObjRef, name: &str, value: Value) -> bool {
        self.handle.block_on(async {
            let window = OpWindow::open(self.op_deadline);
            let Some(mut object) = window.fetch(self.store.as_ref(), target).await else {
                return false;
            };
            match object.property_position_ci(name) {
                None if value.is_null() => {
                    debug!(
                        "set_property {} on {}: nothing to remove",
                        escape_log(name),
                        target
                    );
                    false
                }
                None => {
                    object
                        .properties
                        .push(Property::new(name, value, self.caller.id));
                    window.save(self.store.as_ref(), &object).await
                }
                Some(pos) => {
                    let prop = &mut object.properties[pos];
                    if object.owner != self.caller.id && !prop.writeable {
                        debug!(
                            "set_property {} on {} denied for {}",
                            escape_log(name),
                            target,
                            self.caller.id
                        );
                        return false;
                    }
                    if value.is_null() {
                        object.properties.remove(pos);
                    } else {
                        prop.value = value;
                    }
                    window.save(self.store.as_ref(), &object).await
                }
            }
        })
    }
}
