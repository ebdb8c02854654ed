//! The tabular row one Notion record turns into.

use serde::{Deserialize, Serialize};

/// Read-only view of one task, extracted from a Notion record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub professor: String,
    /// `"Yes"` / `"No"` — kept as literals for tabular consistency.
    pub done: String,
    /// The `Tipo` select.
    pub kind: String,
    /// The `Estágio` select.
    pub stage: String,
    /// Resolved `Matéria` relation titles, `", "`-joined.
    pub subject: String,
    /// Raw ISO due date, `""` when absent.
    pub due_date: String,
    /// `None` iff `due_date` is absent or unparsable.
    pub days_remaining: Option<i64>,
    pub description: String,
    /// Resolved `Tópicos` relation titles, `", "`-joined.
    pub topics: String,
}

impl TaskRecord {
    /// Dispatch filter: not done, and due within `window_days`. A missing
    /// day count never matches.
    pub fn is_actionable(&self, window_days: i64) -> bool {
        self.done == "No" && matches!(self.days_remaining, Some(d) if d <= window_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(done: &str, days: Option<i64>) -> TaskRecord {
        TaskRecord {
            professor: String::new(),
            done: done.into(),
            kind: "Assignment".into(),
            stage: String::new(),
            subject: "Math".into(),
            due_date: "2025-03-09".into(),
            days_remaining: days,
            description: String::new(),
            topics: String::new(),
        }
    }

    #[test]
    fn test_actionable_when_pending_and_due() {
        assert!(record("No", Some(3)).is_actionable(7));
        assert!(record("No", Some(0)).is_actionable(7));
        assert!(record("No", Some(-2)).is_actionable(7));
    }

    #[test]
    fn test_done_never_actionable() {
        assert!(!record("Yes", Some(3)).is_actionable(7));
    }

    #[test]
    fn test_missing_days_never_actionable() {
        assert!(!record("No", None).is_actionable(7));
    }

    #[test]
    fn test_outside_window_not_actionable() {
        assert!(!record("No", Some(8)).is_actionable(7));
        assert!(record("No", Some(7)).is_actionable(7));
    }
}
