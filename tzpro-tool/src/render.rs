//! Plain-text rendering of dashboard view models.

use std::fmt::Write;

use tzpro_core::{CardView, CatalogEntry, CurrentTimePanel, Refresh};

pub fn card_line(card: &CardView) -> String {
    let dst = if card.dst { "  DST" } else { "" };
    format!(
        "{:<32} {:>8}  {:<28} {}{}",
        card.label, card.time, card.date, card.offset, dst
    )
}

pub fn panel_lines(panel: &CurrentTimePanel) -> String {
    format!("{}\n  {}  {}  ({})", panel.heading, panel.time, panel.date, panel.label)
}

pub fn refresh(refresh: &Refresh) -> String {
    let mut out = String::new();
    if let Some(panel) = &refresh.panel {
        let _ = writeln!(out, "{}\n", panel_lines(panel));
    }
    if refresh.cards.is_empty() {
        let _ = writeln!(out, "No timezones displayed. Add one with `tzpro add <timezone>`.");
    }
    for card in &refresh.cards {
        let _ = writeln!(out, "{}", card_line(card));
    }
    out
}

pub fn catalog_line(entry: &CatalogEntry) -> String {
    format!("{:<40} {}", entry.option_text(), entry.timezone)
}
