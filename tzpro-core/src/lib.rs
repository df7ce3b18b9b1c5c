//! TimeZone Pro core: a world clock over a user-chosen set of timezones.
//!
//! Core concepts:
//! - **Registry**: which timezones are displayed, in what order, and whether
//!   the dashboard shows live time or a pinned custom instant
//! - **Resolver**: local time, UTC offset and DST status of a zone at an instant
//! - **Settings**: the registry's records in a key-value [`Store`]
//! - **Export**: CSV and shareable text snapshots
//! - **Dashboard**: the composition root presentation layers talk to
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use tzpro_core::{ChronoTzDatabase, MemoryStore, Registry, Resolver, Settings};
//!
//! let mut registry = Registry::load(Settings::new(MemoryStore::new()), "Europe/Warsaw");
//! registry.add_timezone("America/Denver");
//!
//! let resolver = Resolver::new(ChronoTzDatabase::new());
//! let instant = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
//! let snapshot = resolver.resolve("America/Denver", instant).unwrap();
//! assert_eq!(snapshot.time, "06:00:00");
//! assert!(snapshot.dst);
//! ```

mod clock;
mod dashboard;
mod error;
pub mod export;
mod registry;
mod resolve;
pub mod serde_helpers;
mod settings;
mod store;
mod tzdb;

/// IANA timezone identifier (e.g., "Europe/Warsaw", "America/New_York")
pub type TimezoneId = String;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard::{CardView, Dashboard, Refresh, REFRESH_INTERVAL};
pub use error::{PersistError, RegistryError, ResolveError};
pub use export::{CsvExport, ExportRow};
pub use registry::{AddOutcome, Mode, PendingEdit, Registry, ResetOutcome, DEFAULT_TIMEZONES};
pub use resolve::{
    format_timezone_label, format_utc_offset, CatalogEntry, CurrentTimePanel,
    ResolvedZoneSnapshot, Resolver, FALLBACK_OFFSET, UNKNOWN_LOCATION,
};
pub use settings::{
    SessionRecord, Settings, UserDefaultRecord, NAV_COLLAPSED_KEY, SESSION_KEY, USER_DEFAULT_KEY,
};
pub use store::{MemoryStore, Store};
pub use tzdb::{ChronoTzDatabase, StaticDatabase, TimezoneDatabase};
