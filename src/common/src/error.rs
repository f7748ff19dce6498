use std::error::Error;
use std::fmt;
use std::io;

pub fn h_err(s: &str) -> HoradrimError {
    HoradrimError::Internal(s.to_string())
}

/// Custom error type.
///
/// Every recoverable failure a command can produce is a variant here; the
/// operation log collapses all of them to a single `failure` status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoradrimError {
    /// IO Errors.
    IOError(String),
    /// A `create type` named a type that already exists.
    DuplicateType(String),
    /// A command referenced a type the catalog does not know.
    UnknownType(String),
    /// A `create record` used a primary key that is already indexed.
    DuplicateKey(String),
    /// A delete/update/search referenced an absent primary key.
    UnknownKey(String),
    /// A list or filter produced nothing to emit.
    EmptyResult,
    /// An index file was expected on disk but is missing.
    IndexMissing(String),
    /// Heap file corruption or misuse.
    StorageError(String),
    /// Catch-all internal errors.
    Internal(String),
}

impl fmt::Display for HoradrimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                HoradrimError::IOError(s) => s.to_string(),
                HoradrimError::DuplicateType(t) => format!("type {} already exists", t),
                HoradrimError::UnknownType(t) => format!("unknown type {}", t),
                HoradrimError::DuplicateKey(k) => format!("primary key {} already exists", k),
                HoradrimError::UnknownKey(k) => format!("unknown primary key {}", k),
                HoradrimError::EmptyResult => "empty result".to_string(),
                HoradrimError::IndexMissing(t) => format!("missing index file for type {}", t),
                HoradrimError::StorageError(s) => format!("storage error: {}", s),
                HoradrimError::Internal(s) => format!("internal error: {}", s),
            }
        )
    }
}

impl From<io::Error> for HoradrimError {
    fn from(error: io::Error) -> Self {
        HoradrimError::IOError(error.to_string())
    }
}

impl Error for HoradrimError {}
