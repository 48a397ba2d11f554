/// Errors returned by [`StorageApi`](crate::storage::StorageApi).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A stored value does not fit its domain type.
    #[error("corrupt value in column {0}")]
    Corrupt(&'static str),
    /// A nonce does not fit the store's counter.
    #[error("nonce {0} is out of range")]
    NonceOutOfRange(u64),
    /// An internal error occurred.
    #[error("an internal error occurred")]
    InternalError(#[from] eyre::Error),
}
