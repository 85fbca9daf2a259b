//! Text helpers for values shown to visitors.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::config::MAX_REASONABLE_YEARS;

pub const NO_DEADLINE: &str = "Sin fecha límite";
pub const INVALID_DATE: &str = "Fecha inválida";

const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// Format an upstream date string for display, e.g. `"2026-10-17 23:59:00"` → `"17 oct 2026"`.
///
/// Empty and `"N/A"` mean the giveaway has no deadline. Dates more than
/// `MAX_REASONABLE_YEARS` after `now` are upstream placeholders and read the same way.
pub fn format_date(raw: &str, now: DateTime<Utc>) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("N/A") {
        return NO_DEADLINE.to_string();
    }

    let Some(date) = parse_date(raw) else {
        return INVALID_DATE.to_string();
    };

    let limit = now
        .date_naive()
        .with_year(now.year() + MAX_REASONABLE_YEARS)
        // Feb 29 has no counterpart two years on
        .or_else(|| now.date_naive().checked_add_days(chrono::Days::new(365 * 2)))
        .unwrap_or(NaiveDate::MAX);
    if date > limit {
        return NO_DEADLINE.to_string();
    }

    format!("{} {} {}", date.day(), MONTHS_ES[date.month0() as usize], date.year())
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and bare `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Cut `s` to `max` characters and append "..." when it was longer.
pub fn truncate_title(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}

/// "1 voto" / "3 votos".
pub fn vote_label(count: usize) -> String {
    if count == 1 {
        "1 voto".to_string()
    } else {
        format!("{count} votos")
    }
}
