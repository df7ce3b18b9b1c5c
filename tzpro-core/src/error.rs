use thiserror::Error;

use crate::TimezoneId;

/// Error returned when the timezone database cannot resolve an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown timezone: {0}")]
    UnknownTimezone(TimezoneId),
    #[error("instant out of range for timezone {0}")]
    OutOfRange(TimezoneId),
}

/// Error type for registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),
}

/// Error type for persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("malformed persisted state under {key}: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot encode record for {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PersistError {
    pub(crate) fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PersistError::Store(Box::new(err))
    }
}
