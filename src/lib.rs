//! # Mushcore - Scripting Runtime Core for a MUSH-style World
//!
//! Mushcore is the bridge between a script-execution thread and the two
//! asynchronous worlds around it: text a remote player types arrives on a
//! network-input thread, and persistent world objects live in an
//! asynchronous store. Script code sees neither: it performs blocking,
//! line-oriented reads of player input and synchronous, bounded-latency
//! object operations.
//!
//! ## Components
//!
//! - **Synchronized Line Channel** ([`channel`]): single-producer /
//!   single-consumer text channel. The producer mirrors player keystrokes
//!   into a shared buffer; the consumer blocks until a complete line
//!   (`\r\n`-terminated) has been signaled through a single-slot gate.
//! - **Permissioned Object Access** ([`world::access`]): a per-caller façade
//!   over the object store. Create rooms and things, rename, and read or
//!   write properties, each operation deadline-bounded and checked against
//!   object ownership and per-property visibility flags. Domain failures
//!   come back as sentinel values, never as errors or panics.
//! - **Persistence tier** ([`world::storage`]): the asynchronous
//!   get/create/save contract the service consumes, with a sled-backed
//!   reference store and an in-process store for tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mushcore::config::Config;
//! use mushcore::world::{ObjectAccess, SledWorldStore, WorldStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store: Arc<dyn WorldStore> = Arc::new(SledWorldStore::open(&config.storage.data_dir)?);
//!
//!     // The script runtime fetches the acting object, then builds the
//!     // access service it hands to the interpreter's dedicated thread.
//!     let cancel = tokio_util::sync::CancellationToken::new();
//!     let caller = store
//!         .fetch(mushcore::world::ObjRef(2), &cancel)
//!         .await?
//!         .expect("acting object");
//!     let access = ObjectAccess::new(caller, store).with_deadline(config.op_deadline());
//!     let script = std::thread::spawn(move || {
//!         // Synchronous from the script's point of view.
//!         access.create_room("Kitchen")
//!     });
//!     let _kitchen = script.join().expect("script thread");
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency model
//!
//! Exactly one script thread per session consumes the channel and calls the
//! access service; exactly one network thread per connection produces into
//! the channel. The channel's gate holds at most one pending notification,
//! and the access service relies on the store for cross-session conflict
//! resolution: two sessions racing on the same object can still clobber
//! each other's save, which is accepted here, not solved.

pub mod channel;
pub mod config;
pub mod logutil;
pub mod world;
