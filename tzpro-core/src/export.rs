//! CSV and plain-text exports of the displayed zones.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexSet;

use crate::resolve::{format_timezone_label, ResolvedZoneSnapshot, Resolver};
use crate::tzdb::TimezoneDatabase;
use crate::TimezoneId;

pub const CSV_FILENAME: &str = "timezones.csv";
pub const CSV_MIME: &str = "text/csv";

const CSV_HEADER: [&str; 5] = ["Timezone", "Time", "Date", "UTC Offset", "DST"];
const SHARE_TITLE: &str = "🌍 TimeZone Pro - Global Times";
const SHARE_SIGNATURE: &str = "Generated by TimeZone Pro";

const EXPORT_TIME_FORMAT: &str = "%H:%M";
const EXPORT_DATE_FORMAT: &str = "%-m/%-d/%Y";
const LOCALE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// One exported line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    /// Long label, e.g. `Tokyo (Asia)`.
    pub timezone: String,
    /// `HH:MM`
    pub time: String,
    /// `M/D/YYYY`
    pub date: String,
    pub offset: String,
    pub dst: bool,
}

impl ExportRow {
    pub fn from_snapshot(snapshot: &ResolvedZoneSnapshot) -> Self {
        ExportRow {
            timezone: format_timezone_label(&snapshot.timezone, false),
            time: snapshot.local.format(EXPORT_TIME_FORMAT).to_string(),
            date: snapshot.local.format(EXPORT_DATE_FORMAT).to_string(),
            offset: snapshot.utc_offset.clone(),
            dst: snapshot.dst,
        }
    }

    fn dst_label(&self) -> &'static str {
        if self.dst { "Yes" } else { "No" }
    }
}

/// A CSV document ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: &'static str,
    pub mime: &'static str,
    pub content: String,
}

impl CsvExport {
    pub fn new(content: String) -> Self {
        CsvExport {
            filename: CSV_FILENAME,
            mime: CSV_MIME,
            content,
        }
    }
}

/// Resolves every identifier of `order` that is also in `displayed`.
///
/// Identifiers the database cannot resolve are logged and left out.
pub fn snapshot_all<'a, D, I>(
    resolver: &Resolver<D>,
    order: I,
    displayed: &IndexSet<TimezoneId>,
    instant: DateTime<Utc>,
) -> Vec<ResolvedZoneSnapshot>
where
    D: TimezoneDatabase,
    I: IntoIterator<Item = &'a TimezoneId>,
{
    order
        .into_iter()
        .filter(|tz| displayed.contains(*tz))
        .filter_map(|tz| match resolver.resolve(tz, instant) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(timezone = %tz, %err, "skipping timezone in export");
                None
            }
        })
        .collect()
}

pub fn rows(snapshots: &[ResolvedZoneSnapshot]) -> Vec<ExportRow> {
    snapshots.iter().map(ExportRow::from_snapshot).collect()
}

/// Renders rows as CSV.
///
/// Every field is wrapped in double quotes as-is; embedded quotes are not
/// escaped. Rows are joined by `\n` with no trailing newline.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let header = std::iter::once(CSV_HEADER.map(String::from));
    let body = rows.iter().map(|row| {
        [
            row.timezone.clone(),
            row.time.clone(),
            row.date.clone(),
            row.offset.clone(),
            row.dst_label().to_string(),
        ]
    });

    header
        .chain(body)
        .map(|fields| {
            fields
                .iter()
                .map(|field| format!("\"{}\"", field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a wall-clock time the way the share text shows it,
/// e.g. `3/15/2024, 2:30:00 PM`.
pub fn format_locale_string(local: NaiveDateTime) -> String {
    local.format(LOCALE_FORMAT).to_string()
}

/// Renders rows as a shareable text block.
///
/// `local` is the reference instant as wall-clock time in the user's zone;
/// `custom` selects the "Custom Time" or "Current Time" wording.
pub fn to_share_text(rows: &[ExportRow], custom: bool, local: NaiveDateTime) -> String {
    let kind = if custom { "Custom Time" } else { "Current Time" };
    let mut text = format!("{}\n{}: {}\n\n", SHARE_TITLE, kind, format_locale_string(local));

    for row in rows {
        let dst = if row.dst { " (DST)" } else { "" };
        text.push_str(&format!("{}\n{} {}{}\n\n", row.timezone, row.time, row.offset, dst));
    }

    text.push_str(SHARE_SIGNATURE);
    text
}
