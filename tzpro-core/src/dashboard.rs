//! Composition root tying the registry, the resolver and a clock together.
//!
//! Presentation adapters talk to a single [`Dashboard`]: they forward user
//! actions to the registry and pull view models back out. The periodic
//! refresh is driven from outside by calling [`Dashboard::tick`] about once
//! per [`REFRESH_INTERVAL`].

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::clock::Clock;
use crate::error::RegistryError;
use crate::export::{self, CsvExport};
use crate::registry::Registry;
use crate::resolve::{
    format_timezone_label, CatalogEntry, CurrentTimePanel, ResolvedZoneSnapshot, Resolver,
    FALLBACK_OFFSET,
};
use crate::store::Store;
use crate::tzdb::TimezoneDatabase;
use crate::TimezoneId;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// What one timezone card shows.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub timezone: TimezoneId,
    pub label: String,
    pub time: String,
    pub date: String,
    pub offset: String,
    pub dst: bool,
}

impl CardView {
    fn from_snapshot(snapshot: ResolvedZoneSnapshot) -> Self {
        CardView {
            label: format_timezone_label(&snapshot.timezone, false),
            timezone: snapshot.timezone,
            time: snapshot.time,
            date: snapshot.date,
            offset: snapshot.utc_offset,
            dst: snapshot.dst,
        }
    }

    /// Card for a zone that cannot be resolved.
    fn placeholder(timezone: &str) -> Self {
        CardView {
            timezone: timezone.to_string(),
            label: format_timezone_label(timezone, false),
            time: "--:--".to_string(),
            date: "Loading...".to_string(),
            offset: FALLBACK_OFFSET.to_string(),
            dst: false,
        }
    }
}

/// Everything redrawn on a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Refresh {
    pub cards: Vec<CardView>,
    pub panel: Option<CurrentTimePanel>,
}

pub struct Dashboard<S, D, C> {
    registry: Registry<S>,
    resolver: Resolver<D>,
    clock: C,
    visible: bool,
}

impl<S, D, C> Dashboard<S, D, C>
where
    S: Store,
    D: TimezoneDatabase,
    C: Clock,
{
    pub fn new(registry: Registry<S>, resolver: Resolver<D>, clock: C) -> Self {
        Dashboard {
            registry,
            resolver,
            clock,
            visible: true,
        }
    }

    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry<S> {
        &mut self.registry
    }

    pub fn resolver(&self) -> &Resolver<D> {
        &self.resolver
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The override in custom mode, the clock otherwise.
    pub fn reference_instant(&self) -> DateTime<Utc> {
        self.registry
            .custom_instant()
            .unwrap_or_else(|| self.clock.now())
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Records whether the page is being looked at. Hidden pages do not tick.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            tracing::debug!(visible, "visibility changed");
        }
        self.visible = visible;
    }

    /// Whether the periodic refresh should run: visible and live.
    pub fn is_ticking(&self) -> bool {
        self.visible && !self.registry.is_custom()
    }

    /// Periodic refresh. Returns `None` while suspended.
    pub fn tick(&self) -> Option<Refresh> {
        self.is_ticking().then(|| self.refresh())
    }

    /// Recomputes every view against the reference instant.
    pub fn refresh(&self) -> Refresh {
        Refresh {
            cards: self.cards(),
            panel: self.current_time_panel(),
        }
    }

    pub fn cards(&self) -> Vec<CardView> {
        let instant = self.reference_instant();
        self.registry
            .visible_order()
            .map(|tz| match self.resolver.resolve(tz, instant) {
                Ok(snapshot) => CardView::from_snapshot(snapshot),
                Err(err) => {
                    tracing::warn!(timezone = %tz, %err, "cannot resolve timezone");
                    CardView::placeholder(tz)
                }
            })
            .collect()
    }

    pub fn current_time_panel(&self) -> Option<CurrentTimePanel> {
        let ambient = self.registry.ambient_timezone();
        match self.resolver.current_time_panel(
            ambient,
            self.reference_instant(),
            self.registry.is_custom(),
        ) {
            Ok(panel) => Some(panel),
            Err(err) => {
                tracing::warn!(%ambient, %err, "cannot update current time panel");
                None
            }
        }
    }

    /// `City | offset` for the user's own zone, always at the real now.
    pub fn location_label(&self) -> String {
        self.resolver
            .location_label(self.registry.ambient_timezone(), self.clock.now())
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.resolver.catalog(self.clock.now())
    }

    pub fn snapshots(&self) -> Vec<ResolvedZoneSnapshot> {
        export::snapshot_all(
            &self.resolver,
            self.registry.order(),
            self.registry.displayed(),
            self.reference_instant(),
        )
    }

    pub fn export_csv(&self) -> CsvExport {
        let rows = export::rows(&self.snapshots());
        CsvExport::new(export::to_csv(&rows))
    }

    pub fn share_text(&self) -> String {
        let rows = export::rows(&self.snapshots());
        export::to_share_text(&rows, self.registry.is_custom(), self.ambient_local())
    }

    pub fn commit_pending_edit(&mut self) -> Result<Option<DateTime<Utc>>, RegistryError> {
        let now = self.clock.now();
        self.registry.commit_pending_edit(&self.resolver, now)
    }

    pub fn toggle_custom_instant(&mut self) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.registry.toggle_custom_instant(now)
    }

    pub fn custom_inputs(&self) -> Option<(String, String)> {
        self.registry.custom_inputs(&self.resolver)
    }

    fn ambient_local(&self) -> NaiveDateTime {
        let instant = self.reference_instant();
        self.resolver
            .local_datetime(self.registry.ambient_timezone(), instant)
            .unwrap_or_else(|_| instant.naive_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::settings::{Settings, SESSION_KEY};
    use crate::store::MemoryStore;
    use crate::tzdb::StaticDatabase;
    use chrono::TimeZone;

    fn dashboard(clock: &FixedClock) -> Dashboard<MemoryStore, StaticDatabase, &FixedClock> {
        let store = MemoryStore::new();
        store
            .put(
                SESSION_KEY,
                br#"{"displayedTimezones":["Asia/Tokyo","Europe/Paris"],"timezoneOrder":["Asia/Tokyo","Europe/Paris"],"customTime":null}"#,
            )
            .unwrap();
        let registry = Registry::load(Settings::new(store), "Europe/Paris");
        let resolver = Resolver::new(
            StaticDatabase::new()
                .with_zone("Asia/Tokyo", 9 * 3600)
                .with_seasonal_zone("Europe/Paris", 3600, 7200, 4, 11),
        );
        Dashboard::new(registry, resolver, clock)
    }

    fn noon(month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn ticks_only_when_visible_and_live() {
        let clock = FixedClock::new(noon(1));
        let mut dashboard = dashboard(&clock);
        assert!(dashboard.tick().is_some());

        dashboard.set_visible(false);
        assert!(dashboard.tick().is_none());

        dashboard.set_visible(true);
        dashboard.toggle_custom_instant();
        assert!(dashboard.tick().is_none());

        dashboard.toggle_custom_instant();
        assert!(dashboard.tick().is_some());
    }

    #[test]
    fn cards_follow_the_clock_in_live_mode() {
        let clock = FixedClock::new(noon(1));
        let dashboard = dashboard(&clock);

        let cards = dashboard.cards();
        let tokyo = &cards[0];
        assert_eq!(tokyo.label, "Tokyo (Asia)");
        assert_eq!(tokyo.time, "21:00:00");

        clock.set(noon(8));
        let paris = &dashboard.cards()[1];
        assert_eq!(paris.time, "14:00:00");
        assert_eq!(paris.offset, "GMT+02:00");
        assert!(paris.dst);
    }

    #[test]
    fn custom_mode_freezes_views() {
        let clock = FixedClock::new(noon(1));
        let mut dashboard = dashboard(&clock);
        let frozen = dashboard.toggle_custom_instant().unwrap();

        clock.set(noon(8));
        assert_eq!(dashboard.reference_instant(), frozen);
        assert_eq!(dashboard.cards()[0].time, "21:00:00");

        let panel = dashboard.current_time_panel().unwrap();
        assert_eq!(panel.heading, "Custom Time Set");
        assert_eq!(panel.time, "13:00:00");
    }

    #[test]
    fn unknown_zone_gets_placeholder_card() {
        let clock = FixedClock::new(noon(1));
        let mut dashboard = dashboard(&clock);
        dashboard.registry_mut().add_timezone("Nowhere/Land");

        let card = dashboard
            .cards()
            .into_iter()
            .find(|c| c.timezone == "Nowhere/Land")
            .unwrap();
        assert_eq!(card.time, "--:--");
        assert_eq!(card.offset, FALLBACK_OFFSET);
        assert!(!card.dst);
    }

    #[test]
    fn exports_skip_unknown_zones() {
        let clock = FixedClock::new(noon(1));
        let mut dashboard = dashboard(&clock);
        dashboard.registry_mut().add_timezone("Nowhere/Land");

        let csv = dashboard.export_csv();
        assert_eq!(csv.filename, "timezones.csv");
        assert_eq!(csv.mime, "text/csv");
        assert_eq!(
            csv.content,
            "\"Timezone\",\"Time\",\"Date\",\"UTC Offset\",\"DST\"\n\
             \"Tokyo (Asia)\",\"21:00\",\"1/1/2024\",\"GMT+09:00\",\"No\"\n\
             \"Paris (Europe)\",\"13:00\",\"1/1/2024\",\"GMT+01:00\",\"No\""
        );

        let text = dashboard.share_text();
        assert!(text.contains("Current Time: 1/1/2024, 1:00:00 PM"));
        assert!(!text.contains("Nowhere"));
    }

    #[test]
    fn commit_through_dashboard() {
        let clock = FixedClock::new(noon(1));
        let mut dashboard = dashboard(&clock);
        dashboard.registry_mut().stage_date_edit("2024-03-15");
        dashboard.registry_mut().stage_time_edit("14:30");

        let instant = dashboard.commit_pending_edit().unwrap().unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 3, 15, 13, 30, 0).unwrap());
        assert_eq!(
            dashboard.custom_inputs(),
            Some(("2024-03-15".to_string(), "14:30".to_string()))
        );
        assert!(dashboard.share_text().contains("Custom Time: 3/15/2024, 2:30:00 PM"));
    }

    #[test]
    fn location_label_uses_ambient_zone() {
        let clock = FixedClock::new(noon(1));
        let dashboard = dashboard(&clock);
        assert_eq!(dashboard.location_label(), "Paris | GMT+01:00");
    }
}
