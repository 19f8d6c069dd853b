//! Target-schema data types.
//!
//! This module defines the normalized representation that mapped records
//! carry between the mapper and the store:
//!
//! - [`FieldValue`] - a normalized scalar (text, number, or timestamp)
//! - [`Record`] - one mapped row, sparse (absent fields are omitted)
//! - Closed enumerations for status/priority/category fields
//!
//! Every enumeration has a documented default used by the normalizer as
//! its soft-miss fallback, plus `Display`/`FromStr` for the stored string
//! form.

use serde::{Deserialize, Serialize};

/// A normalized scalar value for one target-schema field.
///
/// Timestamps are Unix milliseconds, matching the INTEGER storage
/// convention used throughout the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free text (names, notes, serialized id lists).
    Text(String),
    /// Decimal number (money, hours).
    Number(f64),
    /// Unix milliseconds.
    Timestamp(i64),
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One mapped row, ready for the store.
///
/// Sparse by construction: a field whose extracted value is null is simply
/// not present in `fields`, so incremental upserts never overwrite
/// previously populated columns with nulls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Source item id, used to correlate re-syncs (upsert key).
    pub external_id: Option<String>,
    /// Required title; a record with a blank name is never produced.
    pub name: String,
    /// `(column, value)` pairs for every non-null mapped field.
    pub fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create a record with a name and external key and no other fields.
    #[must_use]
    pub fn new(external_id: Option<String>, name: &str) -> Self {
        Self {
            external_id,
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Append a field if the value is present (sparse write).
    pub fn push_opt(&mut self, column: &str, value: Option<FieldValue>) {
        if let Some(value) = value {
            self.fields.push((column.to_string(), value));
        }
    }

    /// Look up a mapped field by column name.
    #[must_use]
    pub fn field(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }
}

/// Declares the stored string form, the `FromStr` parse, and the
/// soft-miss default for a closed enumeration.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $(
                #[doc = $text]
                $variant,
            )+
        }

        impl $name {
            /// The documented fallback for unmapped source labels.
            pub const DEFAULT: Self = Self::$default;

            /// Stored string form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::DEFAULT
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!("unknown {}: {s}", stringify!($name))),
                }
            }
        }
    };
}

closed_enum! {
    /// Work state of a task or project item. Default: `todo`.
    TaskStatus, default = Todo {
        Todo => "todo",
        InProgress => "in_progress",
        Blocked => "blocked",
        Done => "done",
        Canceled => "canceled",
    }
}

closed_enum! {
    /// Billing state of a payment row. Default: `pending`.
    PaymentStatus, default = Pending {
        Pending => "pending",
        Invoiced => "invoiced",
        Paid => "paid",
        Overdue => "overdue",
        Canceled => "canceled",
    }
}

closed_enum! {
    /// Task priority. Default: `medium`.
    Priority, default = Medium {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

closed_enum! {
    /// Payment/deal currency. Default: `ils` (the source system's home
    /// currency; most boards omit the currency column entirely).
    Currency, default = Ils {
        Ils => "ils",
        Usd => "usd",
        Eur => "eur",
    }
}

closed_enum! {
    /// Pipeline stage of a deal. Default: `lead`.
    DealStage, default = Lead {
        Lead => "lead",
        Proposal => "proposal",
        Negotiation => "negotiation",
        Won => "won",
        Lost => "lost",
    }
}

closed_enum! {
    /// Lifecycle state of a project. Default: `active`.
    ProjectStatus, default = Active {
        Active => "active",
        OnHold => "on_hold",
        Completed => "completed",
        Canceled => "canceled",
    }
}
