//! World data model and persistence scaffolding.
//! Foundational record types, the asynchronous store contract with its sled
//! reference implementation, and the permission-checked access service the
//! script interpreter calls into.

pub mod access;
pub mod errors;
pub mod memory;
pub mod storage;
pub mod types;

pub use access::{ObjectAccess, DEFAULT_OP_DEADLINE};
pub use errors::StoreError;
pub use memory::MemoryWorldStore;
pub use storage::{SledWorldStore, SledWorldStoreBuilder, WorldStore};
pub use types::*;
