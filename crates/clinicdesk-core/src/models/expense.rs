//! Expense ledger entries.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An ad-hoc expense recorded through the financial report surface.
///
/// Immutable once created; deletion is not exposed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    /// Unique identifier
    pub id: String,
    /// Short description of the expense
    pub title: String,
    /// Amount spent
    pub amount: Decimal,
    /// Free-form note
    pub note: String,
    /// Calendar day the expense belongs to
    pub expense_day: NaiveDate,
    /// Creation timestamp, set once
    pub created_at: String,
}

impl Expense {
    /// Create a new expense entry for the given day.
    pub fn new(title: String, amount: Decimal, note: String, day: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            amount,
            note,
            expense_day: day,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_expense() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let expense = Expense::new("Gloves".into(), "35.50".parse().unwrap(), String::new(), day);
        assert_eq!(expense.title, "Gloves");
        assert_eq!(expense.expense_day, day);
        assert!(!expense.created_at.is_empty());
    }
}
