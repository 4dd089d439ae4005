//! Daily financial report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{Database, DbResult};
use crate::models::Expense;

/// Income, outcome and balance for one calendar day.
///
/// Income counts every amount actually tendered that day (`partial_paid`),
/// whether or not the record is fully paid. The aggregates always cover the
/// whole day; the optional search only narrows the expense listing.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub day: NaiveDate,
    pub income: Decimal,
    pub outcome: Decimal,
    pub balance: Decimal,
    pub expenses: Vec<Expense>,
}

impl DailyReport {
    /// Build the report for `day`.
    pub fn build(db: &Database, day: NaiveDate, search: Option<&str>) -> DbResult<Self> {
        let patients = db.list_patients_for_day(day, None)?;
        let income = patients
            .iter()
            .fold(Decimal::ZERO, |total, p| total + p.partial_paid);

        let all_expenses = db.list_expenses_for_day(day, None)?;
        let outcome = all_expenses
            .iter()
            .fold(Decimal::ZERO, |total, e| total + e.amount);

        let expenses = match search {
            Some(query) => db.list_expenses_for_day(day, Some(query))?,
            None => all_expenses,
        };

        Ok(Self {
            day,
            income,
            outcome,
            balance: income - outcome,
            expenses,
        })
    }

    /// Export as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
