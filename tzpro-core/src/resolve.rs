//! Time resolution: what time is it in a given zone at a given instant.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::error::ResolveError;
use crate::tzdb::TimezoneDatabase;
use crate::TimezoneId;

/// Offset string shown when a zone cannot be resolved.
pub const FALLBACK_OFFSET: &str = "UTC+0";

/// Location text shown when the user's own zone cannot be resolved.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

pub(crate) const TIME_FORMAT: &str = "%H:%M:%S";
pub(crate) const LONG_DATE_FORMAT: &str = "%A, %B %-d, %Y";
pub(crate) const SHORT_DATE_FORMAT: &str = "%a, %b %-d";

/// One zone resolved at one instant. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedZoneSnapshot {
    pub timezone: TimezoneId,
    /// Wall-clock time in the zone.
    pub local: NaiveDateTime,
    /// `HH:MM:SS`, 24-hour.
    pub time: String,
    /// e.g. `Monday, January 1, 2024`.
    pub date: String,
    /// e.g. `GMT+09:00`.
    pub utc_offset: String,
    pub offset_hours: f64,
    pub dst: bool,
}

/// An entry of the "add timezone" picker.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub timezone: TimezoneId,
    pub offset_hours: f64,
    pub offset_string: String,
    pub label: String,
}

impl CatalogEntry {
    /// Text shown for the entry, e.g. `GMT+09:00 | Tokyo (Asia)`.
    pub fn option_text(&self) -> String {
        format!("{} | {}", self.offset_string, self.label)
    }
}

/// The "your current time" panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTimePanel {
    pub heading: &'static str,
    pub time: String,
    /// e.g. `Mon, Jan 1`.
    pub date: String,
    pub label: String,
}

/// Turns a `Region/City` identifier into a display label.
///
/// With `short` set only the city is returned, otherwise `City (Region)`.
/// Underscores become spaces.
pub fn format_timezone_label(timezone: &str, short: bool) -> String {
    let region = timezone.split('/').next().unwrap_or(timezone).replace('_', " ");
    let city = timezone.rsplit('/').next().unwrap_or(timezone).replace('_', " ");

    if short {
        city
    } else {
        format!("{} ({})", city, region)
    }
}

/// Formats an offset in long form: `GMT+05:30`, `GMT-03:00`, or `GMT` at zero.
pub fn format_utc_offset(offset: FixedOffset) -> String {
    let total = offset.local_minus_utc();
    if total == 0 {
        return "GMT".to_string();
    }

    let sign = if total < 0 { '-' } else { '+' };
    let abs = total.unsigned_abs();
    let (hours, minutes, seconds) = (abs / 3600, (abs % 3600) / 60, abs % 60);
    if seconds == 0 {
        format!("GMT{}{:02}:{:02}", sign, hours, minutes)
    } else {
        format!("GMT{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
    }
}

/// Resolves zone-local time, offsets and DST status against a
/// [`TimezoneDatabase`].
#[derive(Debug, Clone, Default)]
pub struct Resolver<D> {
    db: D,
}

impl<D: TimezoneDatabase> Resolver<D> {
    pub fn new(db: D) -> Self {
        Resolver { db }
    }

    pub fn database(&self) -> &D {
        &self.db
    }

    pub fn utc_offset(
        &self,
        timezone: &str,
        instant: DateTime<Utc>,
    ) -> Result<FixedOffset, ResolveError> {
        self.db.offset_at(timezone, instant)
    }

    /// Signed local-minus-UTC difference in hours.
    pub fn utc_offset_hours(
        &self,
        timezone: &str,
        instant: DateTime<Utc>,
    ) -> Result<f64, ResolveError> {
        let offset = self.utc_offset(timezone, instant)?;
        Ok(f64::from(offset.local_minus_utc()) / 3600.0)
    }

    pub fn utc_offset_string(
        &self,
        timezone: &str,
        instant: DateTime<Utc>,
    ) -> Result<String, ResolveError> {
        self.utc_offset(timezone, instant).map(format_utc_offset)
    }

    /// Offset in hours, or zero when the zone is unknown.
    pub fn utc_offset_hours_or_zero(&self, timezone: &str, instant: DateTime<Utc>) -> f64 {
        self.utc_offset_hours(timezone, instant).unwrap_or(0.0)
    }

    /// Offset string, or [`FALLBACK_OFFSET`] when the zone is unknown.
    pub fn utc_offset_string_or_default(&self, timezone: &str, instant: DateTime<Utc>) -> String {
        self.utc_offset_string(timezone, instant)
            .unwrap_or_else(|_| FALLBACK_OFFSET.to_string())
    }

    pub fn local_datetime(
        &self,
        timezone: &str,
        instant: DateTime<Utc>,
    ) -> Result<NaiveDateTime, ResolveError> {
        let offset = self.utc_offset(timezone, instant)?;
        Ok(instant.with_timezone(&offset).naive_local())
    }

    /// Heuristic DST check.
    ///
    /// Compares the current offset with the offsets at local midnight on
    /// January 1 and July 1 of the zone-local year. Whichever reference is
    /// larger is the summer offset; DST is in effect when the current offset
    /// equals it and it strictly exceeds the other one. Transition days and
    /// zones with unusual rules are not handled exactly.
    pub fn is_daylight_saving(
        &self,
        timezone: &str,
        instant: DateTime<Utc>,
    ) -> Result<bool, ResolveError> {
        let offset = self.utc_offset(timezone, instant)?;
        let current = offset.local_minus_utc();
        let year = instant.with_timezone(&offset).year();

        let january = self.reference_offset(timezone, year, 1)?;
        let july = self.reference_offset(timezone, year, 7)?;

        let (summer, other) = if january < july {
            (july, january)
        } else {
            (january, july)
        };
        Ok(current == summer && summer > other)
    }

    fn reference_offset(&self, timezone: &str, year: i32, month: u32) -> Result<i32, ResolveError> {
        let midnight = NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| ResolveError::OutOfRange(timezone.to_string()))?;
        let instant = self.db.local_to_utc(timezone, midnight)?;
        Ok(self.utc_offset(timezone, instant)?.local_minus_utc())
    }

    pub fn resolve(
        &self,
        timezone: &str,
        instant: DateTime<Utc>,
    ) -> Result<ResolvedZoneSnapshot, ResolveError> {
        let offset = self.utc_offset(timezone, instant)?;
        let local = instant.with_timezone(&offset).naive_local();
        let dst = self.is_daylight_saving(timezone, instant)?;

        Ok(ResolvedZoneSnapshot {
            timezone: timezone.to_string(),
            local,
            time: local.format(TIME_FORMAT).to_string(),
            date: local.format(LONG_DATE_FORMAT).to_string(),
            utc_offset: format_utc_offset(offset),
            offset_hours: f64::from(offset.local_minus_utc()) / 3600.0,
            dst,
        })
    }

    /// `City | GMT+02:00` for the user's own zone, or [`UNKNOWN_LOCATION`].
    pub fn location_label(&self, timezone: &str, instant: DateTime<Utc>) -> String {
        match self.utc_offset_string(timezone, instant) {
            Ok(offset) => format!("{} | {}", format_timezone_label(timezone, true), offset),
            Err(err) => {
                tracing::warn!(%timezone, %err, "cannot resolve location timezone");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }

    pub fn current_time_panel(
        &self,
        timezone: &str,
        instant: DateTime<Utc>,
        custom: bool,
    ) -> Result<CurrentTimePanel, ResolveError> {
        let local = self.local_datetime(timezone, instant)?;
        Ok(CurrentTimePanel {
            heading: if custom {
                "Custom Time Set"
            } else {
                "Your Current Time"
            },
            time: local.format(TIME_FORMAT).to_string(),
            date: local.format(SHORT_DATE_FORMAT).to_string(),
            label: format_timezone_label(timezone, true),
        })
    }

    /// Every known zone, sorted by offset at `instant` (west to east).
    pub fn catalog(&self, instant: DateTime<Utc>) -> Vec<CatalogEntry> {
        let mut entries: Vec<CatalogEntry> = self
            .db
            .timezones()
            .into_iter()
            .map(|timezone| CatalogEntry {
                offset_hours: self.utc_offset_hours_or_zero(&timezone, instant),
                offset_string: self.utc_offset_string_or_default(&timezone, instant),
                label: format_timezone_label(&timezone, false),
                timezone,
            })
            .collect();

        entries.sort_by(|a, b| a.offset_hours.total_cmp(&b.offset_hours));
        entries
    }
}
