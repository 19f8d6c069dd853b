//! Generic record mapper.
//!
//! One function interprets a [`BoardDescriptor`] against one item (or
//! subitem) and produces a sparse [`Record`], or `None` to skip. Field
//! values route through the extractor; enumerated kinds additionally pass
//! through the normalizer so the stored value is always from the closed
//! set, never an untranslated source label.
//!
//! Unparsable scalars (bad number, bad date) degrade to null and the
//! field is omitted; they are not record-level errors.

use crate::api::Item;
use crate::mapping::descriptor::{BoardDescriptor, FieldKind};
use crate::mapping::{extract, normalize};
use crate::model::{FieldValue, Record};

/// Map one item into a target record.
///
/// Returns `None` when the item has a blank name (the schema requires a
/// non-empty title, so such items are skipped, not errored).
///
/// `parent_name` is set when the item is a subitem being flattened into
/// its parent board's table; it populates the descriptor's
/// `parent_field` so the flattened row carries a reference back to the
/// parent instead of silently merging with it.
#[must_use]
pub fn map_item(desc: &BoardDescriptor, item: &Item, parent_name: Option<&str>) -> Option<Record> {
    let name = item.name.trim();
    if name.is_empty() {
        return None;
    }

    let mut record = Record::new(Some(item.id.clone()), name);

    for fm in &desc.fields {
        let value = item.values.get(&fm.column_id);
        record.push_opt(&fm.field, map_field(fm.kind, value));
    }

    if let (Some(field), Some(parent)) = (desc.parent_field.as_deref(), parent_name) {
        let parent = parent.trim();
        if !parent.is_empty() {
            record.push_opt(field, Some(FieldValue::from(parent)));
        }
    }

    Some(record)
}

/// Extract and normalize one field according to its semantic kind.
///
/// Enumerated kinds always yield a value (the normalizer's documented
/// default on a soft miss); scalar kinds yield `None` when absent or
/// unparsable, so the column is left untouched on upsert.
fn map_field(kind: FieldKind, value: Option<&crate::api::ColumnValue>) -> Option<FieldValue> {
    match kind {
        FieldKind::Text => extract::text(value).map(FieldValue::Text),
        FieldKind::Number => extract::number(value).map(FieldValue::Number),
        FieldKind::Date => extract::date(value).map(FieldValue::Timestamp),
        FieldKind::People => extract::people_ids(value).map(FieldValue::Text),
        FieldKind::Relation => extract::relation_ids(value).map(FieldValue::Text),
        FieldKind::TaskStatus => {
            let label = extract::label(value);
            Some(FieldValue::from(
                normalize::task_status(label.as_deref()).as_str(),
            ))
        }
        FieldKind::PaymentStatus => {
            let label = extract::label(value);
            Some(FieldValue::from(
                normalize::payment_status(label.as_deref()).as_str(),
            ))
        }
        FieldKind::Priority => {
            let label = extract::label(value);
            Some(FieldValue::from(
                normalize::priority(label.as_deref()).as_str(),
            ))
        }
        FieldKind::Currency => {
            let label = extract::label(value);
            Some(FieldValue::from(
                normalize::currency(label.as_deref()).as_str(),
            ))
        }
        FieldKind::DealStage => {
            let label = extract::label(value);
            Some(FieldValue::from(
                normalize::deal_stage(label.as_deref()).as_str(),
            ))
        }
        FieldKind::ProjectStatus => {
            let label = extract::label(value);
            Some(FieldValue::from(
                normalize::project_status(label.as_deref()).as_str(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ColumnValue;
    use crate::mapping::descriptor::{FieldMap, SyncMode};
    use crate::storage::TargetTable;
    use std::collections::HashMap;

    fn tasks_descriptor() -> BoardDescriptor {
        BoardDescriptor {
            board_id: "tasks".to_string(),
            table: TargetTable::Tasks,
            mode: SyncMode::IncrementalUpsert,
            parent_field: Some("parent_name".to_string()),
            fields: vec![
                FieldMap {
                    column_id: "status".to_string(),
                    field: "status".to_string(),
                    kind: FieldKind::TaskStatus,
                },
                FieldMap {
                    column_id: "numbers__1".to_string(),
                    field: "hours".to_string(),
                    kind: FieldKind::Number,
                },
                FieldMap {
                    column_id: "text8".to_string(),
                    field: "notes".to_string(),
                    kind: FieldKind::Text,
                },
            ],
        }
    }

    fn item(id: &str, name: &str, values: Vec<(&str, ColumnValue)>) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<HashMap<_, _>>(),
            subitems: Vec::new(),
        }
    }

    #[test]
    fn test_blank_name_skips_record() {
        let it = item("1", "   ", vec![]);
        assert!(map_item(&tasks_descriptor(), &it, None).is_none());
    }

    #[test]
    fn test_unparsable_number_omits_field() {
        let it = item(
            "2",
            "B",
            vec![(
                "numbers__1",
                ColumnValue::Number {
                    text: Some("x".to_string()),
                },
            )],
        );
        let rec = map_item(&tasks_descriptor(), &it, None).unwrap();
        assert!(rec.field("hours").is_none());
    }

    #[test]
    fn test_null_field_is_absent_not_empty_string() {
        let it = item(
            "3",
            "C",
            vec![(
                "text8",
                ColumnValue::Text {
                    text: Some("  ".to_string()),
                },
            )],
        );
        let rec = map_item(&tasks_descriptor(), &it, None).unwrap();
        assert!(rec.field("notes").is_none());
    }

    #[test]
    fn test_status_always_normalized() {
        let it = item(
            "4",
            "D",
            vec![(
                "status",
                ColumnValue::Status {
                    label: Some("Stuck".to_string()),
                },
            )],
        );
        let rec = map_item(&tasks_descriptor(), &it, None).unwrap();
        assert_eq!(rec.field("status"), Some(&FieldValue::Text("blocked".to_string())));

        // Absent status column still yields the documented default.
        let it = item("5", "E", vec![]);
        let rec = map_item(&tasks_descriptor(), &it, None).unwrap();
        assert_eq!(rec.field("status"), Some(&FieldValue::Text("todo".to_string())));
    }

    #[test]
    fn test_subitem_carries_parent_name() {
        let it = item("6", "Invoice #2", vec![]);
        let rec = map_item(&tasks_descriptor(), &it, Some("Acme Corp")).unwrap();
        assert_eq!(
            rec.field("parent_name"),
            Some(&FieldValue::Text("Acme Corp".to_string()))
        );
    }

    #[test]
    fn test_external_key_is_item_id() {
        let it = item("7788", "F", vec![]);
        let rec = map_item(&tasks_descriptor(), &it, None).unwrap();
        assert_eq!(rec.external_id.as_deref(), Some("7788"));
    }
}
