use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use crate::models::activity::Activity;

pub const DEFAULT_ICON: &str = "fa-circle";

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"https?://[^\s"<>]+"#).unwrap());

/// Renders an ISO date as `MON, 03 JUN`. Returns `None` for unparseable input.
pub fn format_date(date: &str) -> Option<String> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    Some(parsed.format("%a, %d %b").to_string().to_uppercase())
}

pub fn activity_icon(activity: &Activity) -> &str {
    match activity.icon.as_deref() {
        Some(icon) if !icon.is_empty() => icon,
        _ => DEFAULT_ICON,
    }
}

/// Turns every http(s) URL in a note into a link opening in a new tab.
pub fn format_note(note: &str) -> String {
    URL_RE
        .replace_all(note, |caps: &Captures<'_>| {
            let url = &caps[0];
            format!(r#"<a href="{url}" target="_blank"><i class="fas fa-link me-1"></i>{url}</a>"#)
        })
        .into_owned()
}

/// Element id of the section rendering `date`.
pub fn day_anchor(date: &str) -> String {
    format!("day-{date}")
}
