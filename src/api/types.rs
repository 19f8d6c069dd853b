//! Wire types for the board API and the decoded column-value union.
//!
//! The remote API treats every column value as an untyped bag of optional
//! fields (`text`, `value`, `display_value`). Decoding happens exactly once
//! here, at the client boundary, into the closed [`ColumnValue`] union so
//! the mapping pipeline never probes raw JSON.
//!
//! Decoding is tolerant: a malformed `value` payload degrades to the
//! text-only form of its variant, never an error.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

// ── GraphQL envelope ──────────────────────────────────────────

/// Top-level GraphQL response: `data` or a populated `errors` array.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<BoardsData>,
    pub errors: Option<Vec<GraphQlError>>,
}

/// One entry of the GraphQL `errors` array.
#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct BoardsData {
    #[serde(default)]
    pub boards: Vec<RawBoard>,
}

/// Envelope for follow-up page queries (`next_items_page`).
#[derive(Debug, Deserialize)]
pub struct NextPageResponse {
    pub data: Option<NextPageData>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct NextPageData {
    pub next_items_page: Option<RawItemsPage>,
}

// ── Raw board structures ──────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawBoard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<RawColumn>,
    pub items_page: RawItemsPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawColumn {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One page of items plus the cursor for the next page (null on the last).
#[derive(Debug, Deserialize)]
pub struct RawItemsPage {
    pub cursor: Option<String>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
pub struct RawItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub column_values: Vec<RawColumnValue>,
    #[serde(default)]
    pub subitems: Option<Vec<RawItem>>,
}

/// An untyped column value as the API delivers it.
///
/// `value` is a JSON-encoded string whose shape depends on `type`;
/// `display_value` is only populated for mirror/formula/relation columns.
#[derive(Debug, Deserialize)]
pub struct RawColumnValue {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
    pub value: Option<String>,
    pub display_value: Option<String>,
}

// ── Decoded entities ──────────────────────────────────────────

/// A board with its column schema and fully paginated items.
#[derive(Debug, Clone)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub columns: Vec<Column>,
    pub items: Vec<Item>,
}

/// A column definition (id is the opaque per-board lookup key).
#[derive(Debug, Clone)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub kind: String,
}

/// One item (or subitem) with its values keyed by column id.
#[derive(Debug, Clone, Default)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub values: HashMap<String, ColumnValue>,
    pub subitems: Vec<Item>,
}

/// Closed union of externally-typed column values.
///
/// Every variant keeps only what the extractor needs; display text for
/// computed columns lives in `Mirror`/`Relation`, structured sub-fields
/// (dates, linked ids) are already parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// Plain text, long text, email, phone.
    Text { text: Option<String> },
    /// Numeric column; the textual form is authoritative.
    Number { text: Option<String> },
    /// Date column, structured date preferred over the text rendering.
    Date {
        date: Option<NaiveDate>,
        text: Option<String>,
    },
    /// Status column label as configured on the board.
    Status { label: Option<String> },
    /// People column: assigned person/team ids.
    People {
        ids: Vec<String>,
        text: Option<String>,
    },
    /// Linked-items column: ids of the linked items plus display names.
    Relation {
        linked_ids: Vec<String>,
        display: Option<String>,
    },
    /// Mirror/formula column: only a computed display value exists.
    Mirror { display: Option<String> },
    /// Any column type we do not model; raw text retained.
    Unknown { text: Option<String> },
}

// ── Raw `value` payload shapes ────────────────────────────────

#[derive(Debug, Deserialize)]
struct DateValue {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PeopleValue {
    #[serde(default, rename = "personsAndTeams")]
    persons_and_teams: Vec<PersonRef>,
}

#[derive(Debug, Deserialize)]
struct PersonRef {
    id: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RelationValue {
    #[serde(default, rename = "linkedPulseIds")]
    linked_pulse_ids: Vec<LinkedPulseRef>,
}

#[derive(Debug, Deserialize)]
struct LinkedPulseRef {
    #[serde(rename = "linkedPulseId")]
    linked_pulse_id: serde_json::Value,
}

/// Render a JSON id (number or string) as a plain string.
fn id_to_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl RawColumnValue {
    /// Decode into the closed union based on the declared type tag.
    #[must_use]
    pub fn decode(&self) -> ColumnValue {
        match self.kind.as_str() {
            "text" | "long_text" | "long-text" | "email" | "phone" | "name" => {
                ColumnValue::Text {
                    text: self.text.clone(),
                }
            }
            "numbers" | "numeric" => ColumnValue::Number {
                text: self.text.clone(),
            },
            "date" => ColumnValue::Date {
                date: self.structured_date(),
                text: self.text.clone(),
            },
            "status" | "color" | "dropdown" => ColumnValue::Status {
                label: self.text.clone(),
            },
            "people" | "multiple-person" => ColumnValue::People {
                ids: self.person_ids(),
                text: self.text.clone(),
            },
            "board_relation" | "board-relation" | "dependency" => ColumnValue::Relation {
                linked_ids: self.linked_ids(),
                display: self.display_value.clone().or_else(|| self.text.clone()),
            },
            "mirror" | "lookup" | "formula" => ColumnValue::Mirror {
                display: self.display_value.clone().or_else(|| self.text.clone()),
            },
            _ => ColumnValue::Unknown {
                text: self.text.clone(),
            },
        }
    }

    /// Parse the structured `{"date":"YYYY-MM-DD"}` sub-field, if any.
    fn structured_date(&self) -> Option<NaiveDate> {
        let raw = self.value.as_deref()?;
        let parsed: DateValue = serde_json::from_str(raw).ok()?;
        NaiveDate::parse_from_str(parsed.date.as_deref()?, "%Y-%m-%d").ok()
    }

    /// Parse person/team ids from the raw `value` payload.
    fn person_ids(&self) -> Vec<String> {
        let Some(raw) = self.value.as_deref() else {
            return Vec::new();
        };
        let Ok(parsed) = serde_json::from_str::<PeopleValue>(raw) else {
            return Vec::new();
        };
        parsed
            .persons_and_teams
            .iter()
            .filter_map(|p| id_to_string(&p.id))
            .collect()
    }

    /// Parse linked item ids from the raw `value` payload.
    fn linked_ids(&self) -> Vec<String> {
        let Some(raw) = self.value.as_deref() else {
            return Vec::new();
        };
        let Ok(parsed) = serde_json::from_str::<RelationValue>(raw) else {
            return Vec::new();
        };
        parsed
            .linked_pulse_ids
            .iter()
            .filter_map(|l| id_to_string(&l.linked_pulse_id))
            .collect()
    }
}

impl RawItem {
    /// Decode an item and its subitems (one level deep, per the API).
    #[must_use]
    pub fn decode(&self) -> Item {
        let values = self
            .column_values
            .iter()
            .map(|cv| (cv.id.clone(), cv.decode()))
            .collect();

        let subitems = self
            .subitems
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(RawItem::decode)
            .collect();

        Item {
            id: self.id.clone(),
            name: self.name.clone(),
            values,
            subitems,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: &str, text: Option<&str>, value: Option<&str>, display: Option<&str>) -> RawColumnValue {
        RawColumnValue {
            id: "col".to_string(),
            kind: kind.to_string(),
            text: text.map(String::from),
            value: value.map(String::from),
            display_value: display.map(String::from),
        }
    }

    #[test]
    fn test_decode_text() {
        let cv = raw("text", Some("hello"), None, None);
        assert_eq!(
            cv.decode(),
            ColumnValue::Text {
                text: Some("hello".to_string())
            }
        );
    }

    #[test]
    fn test_decode_structured_date() {
        let cv = raw("date", Some("2024-01-05"), Some(r#"{"date":"2024-01-05"}"#), None);
        let ColumnValue::Date { date, .. } = cv.decode() else {
            panic!("expected date variant");
        };
        assert_eq!(date, Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()));
    }

    #[test]
    fn test_decode_malformed_date_value_degrades() {
        let cv = raw("date", Some("Jan 5"), Some("not json"), None);
        let ColumnValue::Date { date, text } = cv.decode() else {
            panic!("expected date variant");
        };
        assert!(date.is_none());
        assert_eq!(text.as_deref(), Some("Jan 5"));
    }

    #[test]
    fn test_decode_people_ids() {
        let cv = raw(
            "people",
            Some("Dana, Yossi"),
            Some(r#"{"personsAndTeams":[{"id":111,"kind":"person"},{"id":222,"kind":"person"}]}"#),
            None,
        );
        let ColumnValue::People { ids, .. } = cv.decode() else {
            panic!("expected people variant");
        };
        assert_eq!(ids, vec!["111", "222"]);
    }

    #[test]
    fn test_decode_relation_keeps_ids_and_display() {
        let cv = raw(
            "board_relation",
            None,
            Some(r#"{"linkedPulseIds":[{"linkedPulseId":987654}]}"#),
            Some("Acme Corp"),
        );
        let ColumnValue::Relation { linked_ids, display } = cv.decode() else {
            panic!("expected relation variant");
        };
        assert_eq!(linked_ids, vec!["987654"]);
        assert_eq!(display.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_decode_unknown_kind() {
        let cv = raw("world_clock", Some("UTC+2"), None, None);
        assert_eq!(
            cv.decode(),
            ColumnValue::Unknown {
                text: Some("UTC+2".to_string())
            }
        );
    }

    #[test]
    fn test_item_decode_flattens_values_and_subitems() {
        let item = RawItem {
            id: "1".to_string(),
            name: "Acme Corp".to_string(),
            column_values: vec![raw("status", Some("Done"), None, None)],
            subitems: Some(vec![RawItem {
                id: "2".to_string(),
                name: "Invoice #2".to_string(),
                column_values: vec![],
                subitems: None,
            }]),
        };

        let decoded = item.decode();
        assert_eq!(
            decoded.values.get("col"),
            Some(&ColumnValue::Status {
                label: Some("Done".to_string())
            })
        );
        assert_eq!(decoded.subitems.len(), 1);
        assert_eq!(decoded.subitems[0].name, "Invoice #2");
    }
}
