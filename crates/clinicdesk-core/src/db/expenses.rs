//! Expense ledger operations.

use chrono::NaiveDate;
use rusqlite::params;
use rust_decimal::Decimal;

use super::{Database, DbError, DbResult};
use crate::models::Expense;

impl Database {
    /// Insert a new expense entry.
    pub fn insert_expense(&self, expense: &Expense) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO expenses (id, title, amount, note, expense_day, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                expense.id,
                expense.title,
                expense.amount.to_string(),
                expense.note,
                expense.expense_day.to_string(),
                expense.created_at,
            ],
        )?;
        Ok(())
    }

    /// List a day's expenses in creation order.
    ///
    /// `search` is a case-insensitive substring match over title and note.
    pub fn list_expenses_for_day(
        &self,
        day: NaiveDate,
        search: Option<&str>,
    ) -> DbResult<Vec<Expense>> {
        let mut rows = Vec::new();

        if let Some(query) = search {
            let pattern = format!("%{}%", query);
            let mut stmt = self.conn.prepare(
                r#"
                SELECT id, title, amount, note, expense_day, created_at
                FROM expenses
                WHERE expense_day = ?1 AND (title LIKE ?2 OR note LIKE ?2)
                ORDER BY created_at
                "#,
            )?;
            let mapped = stmt.query_map(params![day.to_string(), pattern], map_expense_row)?;
            for row in mapped {
                rows.push(row?);
            }
        } else {
            let mut stmt = self.conn.prepare(
                r#"
                SELECT id, title, amount, note, expense_day, created_at
                FROM expenses
                WHERE expense_day = ?1
                ORDER BY created_at
                "#,
            )?;
            let mapped = stmt.query_map([day.to_string()], map_expense_row)?;
            for row in mapped {
                rows.push(row?);
            }
        }

        rows.into_iter().map(|row| row.try_into()).collect()
    }
}

/// Intermediate row struct for database mapping.
struct ExpenseRow {
    id: String,
    title: String,
    amount: String,
    note: String,
    expense_day: String,
    created_at: String,
}

fn map_expense_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExpenseRow> {
    Ok(ExpenseRow {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        note: row.get(3)?,
        expense_day: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = DbError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Expense {
            id: row.id,
            title: row.title,
            amount: row.amount.parse::<Decimal>()?,
            note: row.note,
            expense_day: row.expense_day.parse::<NaiveDate>()?,
            created_at: row.created_at,
        })
    }
}
