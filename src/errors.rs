/// Error type that can be returned by fallible operations in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller-supplied values were rejected. Nothing has been written to the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The backing store could not be created, read or appended to
    #[error("Error accessing ledger store: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true if the caller can fix this error by supplying different input
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Storage(StorageError::Csv(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(StorageError::Io(err))
    }
}

/// Rejected input to [`LedgerStore::append`](crate::types::LedgerStore::append)
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Every transaction needs a product name
    #[error("Product name must not be empty")]
    EmptyName,
    /// Quantities are whole numbers greater than zero
    #[error("Quantity must be a positive whole number, got {0:?}")]
    InvalidQuantity(String),
}

/// Failure of the underlying store
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Opening, creating or flushing the store file failed
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Error reading or writing CSV records; could wrap IO or parsing errors
    #[error("{0}")]
    Csv(#[from] csv::Error),
}
