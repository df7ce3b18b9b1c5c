//! Persistence of registry state in a [`Store`].
//!
//! Three independent records live in the store:
//! - the session record, rewritten after every registry mutation;
//! - the user-default record, written only on explicit request;
//! - the navigation-collapsed flag, a bare `"true"`/`"false"` string.
//!
//! Records are JSON. Reads never fail: a missing, unreadable or malformed
//! record is reported as absent so callers fall back to defaults.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::store::Store;
use crate::TimezoneId;

pub const SESSION_KEY: &str = "timezoneProSettings";
pub const USER_DEFAULT_KEY: &str = "userDefaultSettings";
pub const NAV_COLLAPSED_KEY: &str = "navCollapsed";

/// Auto-saved session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub displayed_timezones: Option<Vec<TimezoneId>>,
    #[serde(default)]
    pub timezone_order: Option<Vec<TimezoneId>>,
    #[serde(default, with = "crate::serde_helpers::iso_millis")]
    pub custom_time: Option<DateTime<Utc>>,
}

/// Snapshot saved by "save as my default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDefaultRecord {
    #[serde(default)]
    pub displayed_timezones: Option<Vec<TimezoneId>>,
    #[serde(default)]
    pub timezone_order: Option<Vec<TimezoneId>>,
    #[serde(default)]
    pub navigation_expanded: Option<bool>,
}

/// Typed access to the records kept in a [`Store`].
#[derive(Debug)]
pub struct Settings<S> {
    store: S,
}

impl<S: Store> Settings<S> {
    pub fn new(store: S) -> Self {
        Settings { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn load_session(&self) -> Option<SessionRecord> {
        self.load(SESSION_KEY)
    }

    pub fn save_session(&self, record: &SessionRecord) -> Result<(), PersistError> {
        self.save(SESSION_KEY, record)
    }

    pub fn clear_session(&self) -> Result<(), PersistError> {
        self.remove(SESSION_KEY)
    }

    pub fn load_user_default(&self) -> Option<UserDefaultRecord> {
        self.load(USER_DEFAULT_KEY)
    }

    pub fn save_user_default(&self, record: &UserDefaultRecord) -> Result<(), PersistError> {
        self.save(USER_DEFAULT_KEY, record)
    }

    pub fn clear_user_default(&self) -> Result<(), PersistError> {
        self.remove(USER_DEFAULT_KEY)
    }

    pub fn has_user_default(&self) -> bool {
        matches!(self.store.get(USER_DEFAULT_KEY), Ok(Some(_)))
    }

    /// Only the exact string `"true"` counts as collapsed.
    pub fn nav_collapsed(&self) -> bool {
        match self.store.get(NAV_COLLAPSED_KEY) {
            Ok(Some(bytes)) => bytes == b"true",
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(key = NAV_COLLAPSED_KEY, %err, "failed to read setting");
                false
            }
        }
    }

    pub fn set_nav_collapsed(&self, collapsed: bool) -> Result<(), PersistError> {
        let value: &[u8] = if collapsed { b"true" } else { b"false" };
        self.store
            .put(NAV_COLLAPSED_KEY, value)
            .map_err(PersistError::store)
    }

    /// Reads and decodes a record, reporting failures as errors.
    pub fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, PersistError> {
        let Some(bytes) = self.store.get(key).map_err(PersistError::store)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| PersistError::Malformed { key, source })
    }

    fn load<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        match self.read(key) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(key, %err, "discarding persisted record");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, key: &'static str, record: &T) -> Result<(), PersistError> {
        let bytes =
            serde_json::to_vec(record).map_err(|source| PersistError::Encode { key, source })?;
        self.store.put(key, &bytes).map_err(PersistError::store)
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.store.remove(key).map_err(PersistError::store)
    }
}
