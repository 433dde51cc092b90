use thiserror::Error;

/// Errors that can arise inside the world persistence tier.
///
/// These never cross the script-facing surface: the access service collapses
/// them into the domain sentinels (`ObjRef::NOTHING`, `false`, `None`,
/// `PropRead::Absent`) so script code can branch without exception handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation's cancellation signal fired before the call completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}
