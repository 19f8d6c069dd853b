//! Status/category normalization.
//!
//! Maps free-text source labels (English and Hebrew, case-insensitive,
//! substring-tolerant) onto the closed enumerations of the target schema.
//! One rule table per enumeration, shared by every board-sync path so the
//! mapping behavior is identical regardless of which board invoked it.
//!
//! Matching is first-match-wins in declaration order; the tables are
//! `const` slices so that order is fixed. An unmatched label is a soft
//! miss: it maps to the enumeration's documented default and logs at
//! `debug`, never an error.

use crate::model::{Currency, DealStage, PaymentStatus, Priority, ProjectStatus, TaskStatus};

/// Rule tables are `(needle, value)` pairs; a label matches a rule when it
/// contains the needle case-insensitively.
type Rules<T> = &'static [(&'static str, T)];

const TASK_STATUS_RULES: Rules<TaskStatus> = &[
    ("done", TaskStatus::Done),
    ("complete", TaskStatus::Done),
    ("בוצע", TaskStatus::Done),
    ("הושלם", TaskStatus::Done),
    ("stuck", TaskStatus::Blocked),
    ("blocked", TaskStatus::Blocked),
    ("תקוע", TaskStatus::Blocked),
    ("working on it", TaskStatus::InProgress),
    ("in progress", TaskStatus::InProgress),
    ("בטיפול", TaskStatus::InProgress),
    ("בעבודה", TaskStatus::InProgress),
    ("cancel", TaskStatus::Canceled),
    ("בוטל", TaskStatus::Canceled),
    ("todo", TaskStatus::Todo),
    ("to do", TaskStatus::Todo),
    ("לביצוע", TaskStatus::Todo),
];

const PAYMENT_STATUS_RULES: Rules<PaymentStatus> = &[
    ("paid", PaymentStatus::Paid),
    ("שולם", PaymentStatus::Paid),
    ("overdue", PaymentStatus::Overdue),
    ("late", PaymentStatus::Overdue),
    ("באיחור", PaymentStatus::Overdue),
    ("invoice", PaymentStatus::Invoiced),
    ("חשבונית", PaymentStatus::Invoiced),
    ("cancel", PaymentStatus::Canceled),
    ("בוטל", PaymentStatus::Canceled),
    ("pending", PaymentStatus::Pending),
    ("ממתין", PaymentStatus::Pending),
];

const PRIORITY_RULES: Rules<Priority> = &[
    ("critical", Priority::Critical),
    ("urgent", Priority::Critical),
    ("דחוף", Priority::Critical),
    ("high", Priority::High),
    ("גבוה", Priority::High),
    ("low", Priority::Low),
    ("נמוך", Priority::Low),
    ("medium", Priority::Medium),
    ("normal", Priority::Medium),
    ("בינוני", Priority::Medium),
];

const CURRENCY_RULES: Rules<Currency> = &[
    ("usd", Currency::Usd),
    ("$", Currency::Usd),
    ("dollar", Currency::Usd),
    ("eur", Currency::Eur),
    ("€", Currency::Eur),
    ("ils", Currency::Ils),
    ("nis", Currency::Ils),
    ("₪", Currency::Ils),
    ("שקל", Currency::Ils),
];

const DEAL_STAGE_RULES: Rules<DealStage> = &[
    ("won", DealStage::Won),
    ("closed won", DealStage::Won),
    ("נסגר", DealStage::Won),
    ("lost", DealStage::Lost),
    ("אבוד", DealStage::Lost),
    ("negotiation", DealStage::Negotiation),
    ("משא ומתן", DealStage::Negotiation),
    ("proposal", DealStage::Proposal),
    ("quote", DealStage::Proposal),
    ("הצעת מחיר", DealStage::Proposal),
    ("lead", DealStage::Lead),
    ("ליד", DealStage::Lead),
];

const PROJECT_STATUS_RULES: Rules<ProjectStatus> = &[
    ("complete", ProjectStatus::Completed),
    ("done", ProjectStatus::Completed),
    ("הסתיים", ProjectStatus::Completed),
    ("hold", ProjectStatus::OnHold),
    ("frozen", ProjectStatus::OnHold),
    ("מוקפא", ProjectStatus::OnHold),
    ("cancel", ProjectStatus::Canceled),
    ("בוטל", ProjectStatus::Canceled),
    ("active", ProjectStatus::Active),
    ("פעיל", ProjectStatus::Active),
];

/// First-match-wins lookup against a rule table.
///
/// `None` or an unmatched label yields the default and logs the miss.
fn match_rules<T: Copy + std::fmt::Debug>(
    rules: Rules<T>,
    label: Option<&str>,
    default: T,
    field: &str,
) -> T {
    let Some(label) = label else {
        return default;
    };
    let needle = label.trim().to_lowercase();
    if needle.is_empty() {
        return default;
    }

    for (pattern, value) in rules {
        if needle.contains(pattern) {
            return *value;
        }
    }

    tracing::debug!(field, label, default = ?default, "unmapped label, using default");
    default
}

/// Normalize a task status label. Unmapped labels fall back to `todo`.
#[must_use]
pub fn task_status(label: Option<&str>) -> TaskStatus {
    match_rules(TASK_STATUS_RULES, label, TaskStatus::DEFAULT, "task_status")
}

/// Normalize a payment status label. Unmapped labels fall back to `pending`.
#[must_use]
pub fn payment_status(label: Option<&str>) -> PaymentStatus {
    match_rules(
        PAYMENT_STATUS_RULES,
        label,
        PaymentStatus::DEFAULT,
        "payment_status",
    )
}

/// Normalize a priority label. Unmapped labels fall back to `medium`.
#[must_use]
pub fn priority(label: Option<&str>) -> Priority {
    match_rules(PRIORITY_RULES, label, Priority::DEFAULT, "priority")
}

/// Normalize a currency label. Unmapped labels fall back to `ils`.
#[must_use]
pub fn currency(label: Option<&str>) -> Currency {
    match_rules(CURRENCY_RULES, label, Currency::DEFAULT, "currency")
}

/// Normalize a deal stage label. Unmapped labels fall back to `lead`.
#[must_use]
pub fn deal_stage(label: Option<&str>) -> DealStage {
    match_rules(DEAL_STAGE_RULES, label, DealStage::DEFAULT, "deal_stage")
}

/// Normalize a project status label. Unmapped labels fall back to `active`.
#[must_use]
pub fn project_status(label: Option<&str>) -> ProjectStatus {
    match_rules(
        PROJECT_STATUS_RULES,
        label,
        ProjectStatus::DEFAULT,
        "project_status",
    )
}
