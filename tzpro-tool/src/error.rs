use thiserror::Error;

#[derive(Debug, Error)]
pub enum TzproError {
    #[error("Store error: {0}")]
    Store(#[from] tzpro_rocks::RocksError),

    #[error("Persistence error: {0}")]
    Persist(#[from] tzpro_core::PersistError),

    #[error("{0}")]
    Registry(#[from] tzpro_core::RegistryError),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Timezone not displayed: {0}")]
    NotDisplayed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
