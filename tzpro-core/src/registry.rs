//! The set of displayed timezones, their order, and the time override.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexSet;

use crate::error::{PersistError, RegistryError};
use crate::resolve::Resolver;
use crate::settings::{SessionRecord, Settings, UserDefaultRecord};
use crate::store::Store;
use crate::tzdb::TimezoneDatabase;
use crate::TimezoneId;

/// Zones shown on first start and after a reset to built-in defaults.
pub const DEFAULT_TIMEZONES: [&str; 10] = [
    "America/New_York",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Paris",
    "Asia/Tokyo",
    "Asia/Shanghai",
    "Asia/Kolkata",
    "Australia/Sydney",
    "Asia/Dubai",
    "Asia/Hong_Kong",
];

const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";
const TIME_INPUT_FORMAT: &str = "%H:%M";
const COMBINED_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Custom date/time input that has not been committed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEdit {
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// `HH:MM`
    pub time: Option<String>,
}

impl PendingEdit {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.time.is_none()
    }

    fn clear(&mut self) {
        self.date = None;
        self.time = None;
    }
}

/// Which instant the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Tracking the real current time.
    Live,
    /// Pinned to a user-chosen instant.
    Custom(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// State came from the saved user-default record.
    UserDefault,
    /// No usable user default; built-in defaults were restored.
    Builtin,
}

/// Owns the displayed timezones and the time override, and writes the
/// session record back to its [`Settings`] after every mutation.
///
/// `displayed` is the membership set; `order` is the render order. Every
/// member of `displayed` appears exactly once in `order`. A trusted reorder
/// may leave identifiers in `order` that are not displayed; those are skipped
/// by [`Registry::visible_order`].
#[derive(Debug)]
pub struct Registry<S> {
    settings: Settings<S>,
    ambient: TimezoneId,
    displayed: IndexSet<TimezoneId>,
    order: Vec<TimezoneId>,
    custom: Option<DateTime<Utc>>,
    pending: PendingEdit,
}

impl<S: Store> Registry<S> {
    /// Loads the session record, falling back to the built-in defaults when
    /// it is missing or malformed.
    ///
    /// `ambient` is the user's own timezone; custom date/time input is read
    /// as wall-clock time there.
    pub fn load(settings: Settings<S>, ambient: impl Into<TimezoneId>) -> Self {
        let mut registry = Registry {
            settings,
            ambient: ambient.into(),
            displayed: IndexSet::new(),
            order: Vec::new(),
            custom: None,
            pending: PendingEdit::default(),
        };

        match registry.settings.load_session() {
            Some(record) => {
                registry.restore(record.displayed_timezones, record.timezone_order);
                registry.custom = record.custom_time;
            }
            None => registry.restore_builtin(),
        }

        tracing::debug!(
            zones = registry.displayed.len(),
            custom = registry.custom.is_some(),
            "registry loaded"
        );
        registry
    }

    pub fn settings(&self) -> &Settings<S> {
        &self.settings
    }

    pub fn ambient_timezone(&self) -> &str {
        &self.ambient
    }

    pub fn displayed(&self) -> &IndexSet<TimezoneId> {
        &self.displayed
    }

    pub fn order(&self) -> &[TimezoneId] {
        &self.order
    }

    pub fn contains(&self, timezone: &str) -> bool {
        self.displayed.contains(timezone)
    }

    /// Identifiers to render, in order.
    pub fn visible_order(&self) -> impl Iterator<Item = &TimezoneId> {
        self.order.iter().filter(|tz| self.displayed.contains(*tz))
    }

    pub fn custom_instant(&self) -> Option<DateTime<Utc>> {
        self.custom
    }

    pub fn is_custom(&self) -> bool {
        self.custom.is_some()
    }

    pub fn mode(&self) -> Mode {
        match self.custom {
            Some(instant) => Mode::Custom(instant),
            None => Mode::Live,
        }
    }

    pub fn pending_edit(&self) -> &PendingEdit {
        &self.pending
    }

    /// Whether a staged edit could be committed (live mode with input).
    pub fn can_commit(&self) -> bool {
        self.custom.is_none() && !self.pending.is_empty()
    }

    pub fn add_timezone(&mut self, timezone: impl Into<TimezoneId>) -> AddOutcome {
        let timezone = timezone.into();
        if self.displayed.contains(&timezone) {
            tracing::debug!(%timezone, "timezone already displayed");
            return AddOutcome::AlreadyPresent;
        }

        tracing::debug!(%timezone, "adding timezone");
        self.displayed.insert(timezone.clone());
        self.order.push(timezone);
        self.persist();
        AddOutcome::Added
    }

    /// Removes a timezone from display. Returns false if it was not shown.
    pub fn remove_timezone(&mut self, timezone: &str) -> bool {
        let was_displayed = self.displayed.shift_remove(timezone);
        let before = self.order.len();
        self.order.retain(|tz| tz != timezone);

        if !was_displayed && before == self.order.len() {
            return false;
        }

        tracing::debug!(%timezone, "removed timezone");
        self.persist();
        was_displayed
    }

    /// Replaces the display order.
    ///
    /// The new order is expected to be a permutation of the current one and
    /// is taken as given.
    pub fn reorder(&mut self, new_order: Vec<TimezoneId>) {
        tracing::debug!(len = new_order.len(), "reordering timezones");
        self.order = new_order;
        self.persist();
    }

    pub fn set_custom_instant(&mut self, instant: DateTime<Utc>) {
        tracing::debug!(%instant, "custom time set");
        self.custom = Some(instant);
        self.pending.clear();
        self.persist();
    }

    pub fn clear_custom_instant(&mut self) {
        tracing::debug!("resuming live time");
        self.custom = None;
        self.pending.clear();
        self.persist();
    }

    /// Leaves custom mode, or freezes the display at `now` when live.
    /// Returns the new override.
    pub fn toggle_custom_instant(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.custom.is_some() {
            self.clear_custom_instant();
        } else {
            self.set_custom_instant(now);
        }
        self.custom
    }

    /// Stages a `YYYY-MM-DD` date. An empty string unstages it.
    pub fn stage_date_edit(&mut self, date: impl Into<String>) {
        self.pending.date = Some(date.into()).filter(|d| !d.is_empty());
    }

    /// Stages an `HH:MM` time. An empty string unstages it.
    pub fn stage_time_edit(&mut self, time: impl Into<String>) {
        self.pending.time = Some(time.into()).filter(|t| !t.is_empty());
    }

    /// Commits the staged date and time as the custom instant.
    ///
    /// A missing date defaults to the UTC calendar date of `now`, a missing
    /// time to `00:00`. The result is read as wall-clock time in the ambient
    /// timezone. Returns `Ok(None)` when nothing is staged. On error nothing
    /// changes.
    pub fn commit_pending_edit<D: TimezoneDatabase>(
        &mut self,
        resolver: &Resolver<D>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, RegistryError> {
        if self.pending.is_empty() {
            return Ok(None);
        }

        let date = match &self.pending.date {
            Some(date) => date.clone(),
            None => now.format(DATE_INPUT_FORMAT).to_string(),
        };
        let time = self.pending.time.as_deref().unwrap_or("00:00");
        let combined = format!("{}T{}:00", date, time);

        let local = NaiveDateTime::parse_from_str(&combined, COMBINED_INPUT_FORMAT)
            .map_err(|_| RegistryError::InvalidDateTime(combined.clone()))?;
        let instant = match resolver.database().local_to_utc(&self.ambient, local) {
            Ok(instant) => instant,
            Err(err) => {
                tracing::warn!(ambient = %self.ambient, %err, "reading custom time as UTC");
                local.and_utc()
            }
        };

        self.set_custom_instant(instant);
        Ok(Some(instant))
    }

    /// Date and time input values describing the current override: the UTC
    /// date and the ambient wall-clock time.
    pub fn custom_inputs<D: TimezoneDatabase>(
        &self,
        resolver: &Resolver<D>,
    ) -> Option<(String, String)> {
        let instant = self.custom?;
        let local = resolver
            .local_datetime(&self.ambient, instant)
            .unwrap_or_else(|_| instant.naive_utc());
        Some((
            instant.format(DATE_INPUT_FORMAT).to_string(),
            local.format(TIME_INPUT_FORMAT).to_string(),
        ))
    }

    /// Restores the built-in zone list, leaves custom mode, and wipes every
    /// persisted record.
    pub fn reset_to_builtin_defaults(&mut self) {
        tracing::info!("resetting to built-in defaults");
        self.restore_builtin();
        self.custom = None;
        self.pending.clear();

        if let Err(err) = self.settings.clear_session() {
            tracing::warn!(%err, "failed to clear session record");
        }
        if let Err(err) = self.settings.clear_user_default() {
            tracing::warn!(%err, "failed to clear user default");
        }
        if let Err(err) = self.settings.set_nav_collapsed(false) {
            tracing::warn!(%err, "failed to store navigation state");
        }
    }

    /// Saves the current zones and order as the user's default.
    pub fn save_current_as_user_default(
        &self,
        navigation_expanded: bool,
    ) -> Result<(), PersistError> {
        let record = UserDefaultRecord {
            displayed_timezones: Some(self.displayed.iter().cloned().collect()),
            timezone_order: Some(self.order.clone()),
            navigation_expanded: Some(navigation_expanded),
        };
        self.settings.save_user_default(&record)?;
        tracing::info!(zones = self.displayed.len(), "saved user default");
        Ok(())
    }

    /// Restores the saved user default, or the built-in defaults when there
    /// is none. Destructive: callers should confirm first.
    pub fn reset_to_user_default(&mut self) -> ResetOutcome {
        let Some(record) = self.settings.load_user_default() else {
            self.reset_to_builtin_defaults();
            return ResetOutcome::Builtin;
        };

        tracing::info!("resetting to user default");
        if let Err(err) = self.settings.clear_session() {
            tracing::warn!(%err, "failed to clear session record");
        }

        self.restore(record.displayed_timezones, record.timezone_order);
        self.custom = None;
        self.pending.clear();

        let collapsed = record.navigation_expanded == Some(false);
        if let Err(err) = self.settings.set_nav_collapsed(collapsed) {
            tracing::warn!(%err, "failed to store navigation state");
        }
        ResetOutcome::UserDefault
    }

    fn restore_builtin(&mut self) {
        let defaults: Vec<TimezoneId> = DEFAULT_TIMEZONES.iter().map(|tz| tz.to_string()).collect();
        self.displayed = defaults.iter().cloned().collect();
        self.order = defaults;
    }

    fn restore(&mut self, displayed: Option<Vec<TimezoneId>>, order: Option<Vec<TimezoneId>>) {
        self.displayed = match displayed {
            Some(zones) => zones.into_iter().collect(),
            None => DEFAULT_TIMEZONES.iter().map(|tz| tz.to_string()).collect(),
        };
        self.order = order.unwrap_or_else(|| self.displayed.iter().cloned().collect());
        self.heal_order();
    }

    /// Drops repeated entries from the order and appends displayed zones
    /// that are missing from it.
    fn heal_order(&mut self) {
        let mut seen = IndexSet::with_capacity(self.order.len());
        self.order.retain(|tz| seen.insert(tz.clone()));

        let missing: Vec<TimezoneId> = self
            .displayed
            .iter()
            .filter(|tz| !seen.contains(*tz))
            .cloned()
            .collect();
        if !missing.is_empty() {
            tracing::debug!(count = missing.len(), "appending zones missing from order");
            self.order.extend(missing);
        }
    }

    fn session_record(&self) -> SessionRecord {
        SessionRecord {
            displayed_timezones: Some(self.displayed.iter().cloned().collect()),
            timezone_order: Some(self.order.clone()),
            custom_time: self.custom,
        }
    }

    fn persist(&self) {
        if let Err(err) = self.settings.save_session(&self.session_record()) {
            tracing::warn!(%err, "failed to save session");
        }
    }
}
