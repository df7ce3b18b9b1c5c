//! Timezone database capability.
//!
//! The rest of the crate only ever asks one question of a timezone
//! database: "what is the UTC offset of this zone at this instant?". Keeping
//! that behind a trait lets the resolution logic run against a deterministic
//! table in tests.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Offset, TimeDelta, Utc};
use chrono_tz::Tz;
use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::TimezoneId;

/// Source of UTC offsets for named timezones.
pub trait TimezoneDatabase {
    /// Returns the offset of `timezone` from UTC at `instant`.
    fn offset_at(
        &self,
        timezone: &str,
        instant: DateTime<Utc>,
    ) -> Result<FixedOffset, ResolveError>;

    /// Lists every identifier the database recognizes.
    fn timezones(&self) -> Vec<TimezoneId>;

    /// Converts a wall-clock time in `timezone` to an absolute instant.
    ///
    /// The offset is looked up at the wall-clock time read as UTC, then again
    /// at the instant that first guess produces. When the second candidate's
    /// own offset disagrees with the one applied, the local time falls in a
    /// transition gap and the later candidate wins, so gap times move forward
    /// past the gap on both sides of UTC.
    fn local_to_utc(
        &self,
        timezone: &str,
        local: NaiveDateTime,
    ) -> Result<DateTime<Utc>, ResolveError> {
        let naive_utc = local.and_utc();
        let guess = self.offset_at(timezone, naive_utc)?;
        let first = shift_back(timezone, naive_utc, guess)?;
        let offset = self.offset_at(timezone, first)?;
        let second = shift_back(timezone, naive_utc, offset)?;

        if self.offset_at(timezone, second)? == offset {
            Ok(second)
        } else {
            Ok(first.max(second))
        }
    }
}

fn shift_back(
    timezone: &str,
    instant: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, ResolveError> {
    instant
        .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
        .ok_or_else(|| ResolveError::OutOfRange(timezone.to_string()))
}

/// Timezone database backed by the IANA data compiled into `chrono-tz`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoTzDatabase;

impl ChronoTzDatabase {
    pub fn new() -> Self {
        Self
    }
}

impl TimezoneDatabase for ChronoTzDatabase {
    fn offset_at(
        &self,
        timezone: &str,
        instant: DateTime<Utc>,
    ) -> Result<FixedOffset, ResolveError> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| ResolveError::UnknownTimezone(timezone.to_string()))?;
        Ok(instant.with_timezone(&tz).offset().fix())
    }

    fn timezones(&self) -> Vec<TimezoneId> {
        chrono_tz::TZ_VARIANTS
            .iter()
            .map(|tz| tz.name().to_string())
            .collect()
    }
}

/// Offset rule for one zone of a [`StaticDatabase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StaticZone {
    standard_secs: i32,
    summer: Option<SummerRule>,
}

/// Summer offset in force from the first day of `start_month` up to (not
/// including) the first day of `end_month`, both read on the UTC calendar.
/// A `start_month` after `end_month` wraps around the new year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SummerRule {
    offset_secs: i32,
    start_month: u32,
    end_month: u32,
}

impl SummerRule {
    fn active(&self, month: u32) -> bool {
        if self.start_month <= self.end_month {
            month >= self.start_month && month < self.end_month
        } else {
            month >= self.start_month || month < self.end_month
        }
    }
}

/// A small, deterministic timezone table.
///
/// Useful for testing and as a reference implementation.
#[derive(Debug, Clone, Default)]
pub struct StaticDatabase {
    zones: IndexMap<TimezoneId, StaticZone>,
}

impl StaticDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a zone with a single, year-round offset.
    pub fn with_zone(mut self, timezone: impl Into<TimezoneId>, offset_secs: i32) -> Self {
        self.zones.insert(
            timezone.into(),
            StaticZone {
                standard_secs: offset_secs,
                summer: None,
            },
        );
        self
    }

    /// Adds a zone that switches to `summer_secs` between `start_month`
    /// (inclusive) and `end_month` (exclusive).
    pub fn with_seasonal_zone(
        mut self,
        timezone: impl Into<TimezoneId>,
        standard_secs: i32,
        summer_secs: i32,
        start_month: u32,
        end_month: u32,
    ) -> Self {
        self.zones.insert(
            timezone.into(),
            StaticZone {
                standard_secs,
                summer: Some(SummerRule {
                    offset_secs: summer_secs,
                    start_month,
                    end_month,
                }),
            },
        );
        self
    }
}

impl TimezoneDatabase for StaticDatabase {
    fn offset_at(
        &self,
        timezone: &str,
        instant: DateTime<Utc>,
    ) -> Result<FixedOffset, ResolveError> {
        let zone = self
            .zones
            .get(timezone)
            .ok_or_else(|| ResolveError::UnknownTimezone(timezone.to_string()))?;
        let secs = match zone.summer {
            Some(rule) if rule.active(instant.month()) => rule.offset_secs,
            _ => zone.standard_secs,
        };
        FixedOffset::east_opt(secs).ok_or_else(|| ResolveError::OutOfRange(timezone.to_string()))
    }

    fn timezones(&self) -> Vec<TimezoneId> {
        self.zones.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn chrono_tz_offsets() {
        let db = ChronoTzDatabase::new();

        let tokyo = db.offset_at("Asia/Tokyo", utc(2024, 1, 1, 0, 0)).unwrap();
        assert_eq!(tokyo.local_minus_utc(), 9 * 3600);

        let ny_winter = db.offset_at("America/New_York", utc(2024, 1, 15, 12, 0)).unwrap();
        let ny_summer = db.offset_at("America/New_York", utc(2024, 7, 15, 12, 0)).unwrap();
        assert_eq!(ny_winter.local_minus_utc(), -5 * 3600);
        assert_eq!(ny_summer.local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn chrono_tz_unknown() {
        let db = ChronoTzDatabase::new();
        let err = db.offset_at("Invalid/Timezone", utc(2024, 1, 1, 0, 0)).unwrap_err();
        assert_eq!(err, ResolveError::UnknownTimezone("Invalid/Timezone".to_string()));
    }

    #[test]
    fn chrono_tz_lists_zones() {
        let zones = ChronoTzDatabase::new().timezones();
        assert!(zones.iter().any(|z| z == "Europe/Paris"));
        assert!(zones.iter().any(|z| z == "Asia/Kolkata"));
    }

    #[test]
    fn local_to_utc_across_offsets() {
        let db = ChronoTzDatabase::new();
        let local = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();

        assert_eq!(db.local_to_utc("Asia/Kolkata", local).unwrap(), utc(2024, 3, 15, 9, 0));
        assert_eq!(
            db.local_to_utc("America/New_York", local).unwrap(),
            utc(2024, 3, 15, 18, 30)
        );
    }

    #[test]
    fn local_to_utc_skips_forward_over_gaps() {
        let db = ChronoTzDatabase::new();
        let gap = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(2, 30, 0)
                .unwrap()
        };

        // 02:30 does not exist on spring-forward day; both land on 03:30 summer time
        assert_eq!(
            db.local_to_utc("America/New_York", gap(2024, 3, 10)).unwrap(),
            utc(2024, 3, 10, 7, 30)
        );
        assert_eq!(
            db.local_to_utc("Europe/Paris", gap(2024, 3, 31)).unwrap(),
            utc(2024, 3, 31, 1, 30)
        );
    }

    #[test]
    fn local_to_utc_keeps_times_next_to_gaps() {
        let db = ChronoTzDatabase::new();
        let at = |d, h, min| {
            NaiveDate::from_ymd_opt(2024, 3, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap()
        };

        assert_eq!(
            db.local_to_utc("America/New_York", at(10, 1, 30)).unwrap(),
            utc(2024, 3, 10, 6, 30)
        );
        assert_eq!(
            db.local_to_utc("America/New_York", at(10, 3, 30)).unwrap(),
            utc(2024, 3, 10, 7, 30)
        );
        assert_eq!(
            db.local_to_utc("Europe/Paris", at(31, 1, 30)).unwrap(),
            utc(2024, 3, 31, 0, 30)
        );
    }

    #[test]
    fn static_seasonal_zone() {
        let db = StaticDatabase::new().with_seasonal_zone("Test/North", 3600, 7200, 4, 11);
        assert_eq!(
            db.offset_at("Test/North", utc(2024, 8, 1, 0, 0)).unwrap().local_minus_utc(),
            7200
        );
        assert_eq!(
            db.offset_at("Test/North", utc(2024, 1, 1, 0, 0)).unwrap().local_minus_utc(),
            3600
        );
    }

    #[test]
    fn static_southern_rule_wraps() {
        let db = StaticDatabase::new().with_seasonal_zone("Test/South", 36000, 39600, 10, 4);
        let jan = db.offset_at("Test/South", utc(2024, 1, 10, 0, 0)).unwrap();
        let jul = db.offset_at("Test/South", utc(2024, 7, 10, 0, 0)).unwrap();
        assert_eq!(jan.local_minus_utc(), 39600);
        assert_eq!(jul.local_minus_utc(), 36000);
    }

    #[test]
    fn static_lists_in_insertion_order() {
        let db = StaticDatabase::new()
            .with_zone("B/Second", 0)
            .with_zone("A/First", 0);
        assert_eq!(db.timezones(), vec!["B/Second".to_string(), "A/First".to_string()]);
    }
}
