//! Column value extraction.
//!
//! Pure functions that turn one decoded [`ColumnValue`] (or its absence)
//! into a normalized scalar or `None`. Nothing here performs I/O and
//! nothing here errors: an unparsable value degrades to `None`.

use crate::api::ColumnValue;
use chrono::NaiveDate;

/// Extract free text.
///
/// Preference order: computed display value, then raw text. A result that
/// is empty or whitespace-only is `None`, never an empty-string sentinel.
#[must_use]
pub fn text(value: Option<&ColumnValue>) -> Option<String> {
    let raw = match value? {
        ColumnValue::Text { text }
        | ColumnValue::Number { text }
        | ColumnValue::Unknown { text } => text.as_deref(),
        ColumnValue::Date { text, .. } => text.as_deref(),
        ColumnValue::Status { label } => label.as_deref(),
        ColumnValue::People { text, .. } => text.as_deref(),
        ColumnValue::Relation { display, .. } | ColumnValue::Mirror { display } => {
            display.as_deref()
        }
    }?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Extract a decimal number.
///
/// Thousands separators are stripped before parsing. Empty input or
/// non-numeric text yields `None`.
#[must_use]
pub fn number(value: Option<&ColumnValue>) -> Option<f64> {
    let raw = text(value)?;
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse().ok()
}

/// Extract a date as Unix milliseconds (midnight UTC).
///
/// The structured date sub-field wins when present; otherwise the textual
/// form is parsed as `YYYY-MM-DD`. Invalid dates degrade to `None`.
#[must_use]
pub fn date(value: Option<&ColumnValue>) -> Option<i64> {
    let parsed = match value? {
        ColumnValue::Date { date, text } => date.or_else(|| {
            NaiveDate::parse_from_str(text.as_deref()?.trim(), "%Y-%m-%d").ok()
        }),
        other => NaiveDate::parse_from_str(&self::text(Some(other))?, "%Y-%m-%d").ok(),
    }?;

    Some(
        parsed
            .and_hms_opt(0, 0, 0)?
            .and_utc()
            .timestamp_millis(),
    )
}

/// Extract a status label for the normalizer, untranslated.
#[must_use]
pub fn label(value: Option<&ColumnValue>) -> Option<String> {
    match value? {
        ColumnValue::Status { label } => {
            let trimmed = label.as_deref()?.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        other => text(Some(other)),
    }
}

/// Extract person/team ids as a comma-separated list.
#[must_use]
pub fn people_ids(value: Option<&ColumnValue>) -> Option<String> {
    match value? {
        ColumnValue::People { ids, .. } if !ids.is_empty() => Some(ids.join(",")),
        _ => None,
    }
}

/// Extract linked item ids as a comma-separated list.
///
/// Relation columns store the linked ids, never the display names:
/// display text is unsuitable for relational joins.
#[must_use]
pub fn relation_ids(value: Option<&ColumnValue>) -> Option<String> {
    match value? {
        ColumnValue::Relation { linked_ids, .. } if !linked_ids.is_empty() => {
            Some(linked_ids.join(","))
        }
        _ => None,
    }
}
