//! Property extraction — total functions over a page's `properties` object.
//!
//! Notion property values are loosely-typed nested documents; every
//! extractor here returns its documented default on missing or malformed
//! structure instead of erroring.

use chrono::NaiveDate;
use serde_json::Value;

/// First title element's plain text, trimmed. `""` if absent.
pub fn title(props: &Value, name: &str) -> String {
    props[name]["title"][0]["plain_text"]
        .as_str()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Checkbox as the tabular literals `"Yes"` / `"No"`.
pub fn checkbox(props: &Value, name: &str) -> &'static str {
    if props[name]["checkbox"].as_bool().unwrap_or(false) { "Yes" } else { "No" }
}

/// Selected option's name. `""` if nothing is selected.
pub fn select(props: &Value, name: &str) -> String {
    props[name]["select"]["name"].as_str().unwrap_or("").to_string()
}

/// Raw ISO date start string. `""` if absent.
pub fn date(props: &Value, name: &str) -> String {
    props[name]["date"]["start"].as_str().unwrap_or("").to_string()
}

/// First rich-text run's content. `""` if absent.
pub fn rich_text(props: &Value, name: &str) -> String {
    props[name]["rich_text"][0]["text"]["content"]
        .as_str()
        .unwrap_or("")
        .to_string()
}

/// Referenced page ids of a relation property, in order.
pub fn relation_ids(props: &Value, name: &str) -> Vec<String> {
    props[name]["relation"]
        .as_array()
        .map(|rels| {
            rels.iter()
                .filter_map(|rel| rel["id"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Signed whole-day difference between a due date and the run's frozen
/// "today". `None` iff the date is absent or unparsable.
pub fn days_remaining(due_date: &str, today: NaiveDate) -> Option<i64> {
    if due_date.is_empty() {
        return None;
    }
    // Notion may attach a time component ("2025-03-10T09:00:00..."); the
    // day count only looks at the calendar date.
    let parsed = due_date
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
    match parsed {
        Some(date) => Some((date - today).num_days()),
        None => {
            tracing::error!("unparsable due date '{due_date}'");
            None
        }
    }
}
