//! Transactional patient registration.
//!
//! Registration is the one operation here where interleaving causes
//! user-visible harm (two patients holding the same queue number), so the
//! whole flow runs inside a single immediate write transaction: look up the
//! selected body parts, reconcile the tendered amount, draw the next queue
//! number and persist the record as one all-or-nothing unit. A failure at
//! any step leaves nothing behind, including the counter advance.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::billing;
use crate::db::{Database, DbError};
use crate::models::Patient;
use crate::queue;

/// Registration form input.
///
/// `tendered` is the raw decimal text from the form (defaults to "0");
/// malformed or negative input coerces to zero. `payment_method` is an
/// opaque label carried only into the next receipt rendering.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub birth_year: i32,
    pub phone: String,
    pub notes: String,
    pub body_part_ids: Vec<String>,
    pub payment_method: Option<String>,
    pub tendered: String,
}

impl RegistrationRequest {
    fn validate(&self) -> Result<(), RegistrationError> {
        if self.body_part_ids.is_empty() {
            return Err(RegistrationError::Rejected("no body parts selected"));
        }
        if self.first_name.trim().is_empty() {
            return Err(RegistrationError::Rejected("first name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(RegistrationError::Rejected("last name is required"));
        }
        Ok(())
    }
}

/// Registration errors.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("registration rejected: {0}")]
    Rejected(&'static str),

    #[error("unknown body part: {0}")]
    UnknownBodyPart(String),

    #[error("queue number already taken for {0}, resubmit the registration")]
    QueueConflict(NaiveDate),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Executes registrations against a database.
pub struct Registrar<'a> {
    db: &'a mut Database,
}

impl<'a> Registrar<'a> {
    /// Create a new registrar.
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// Register a patient for `day` and return the persisted record.
    pub fn register(
        &mut self,
        request: &RegistrationRequest,
        day: NaiveDate,
    ) -> Result<Patient, RegistrationError> {
        request.validate()?;
        let tendered = billing::parse_amount(&request.tendered);

        // The form may repeat a selection; one membership row each.
        let mut selected: Vec<&str> = Vec::new();
        for id in &request.body_part_ids {
            if !selected.contains(&id.as_str()) {
                selected.push(id);
            }
        }

        let tx = self.db.immediate_transaction()?;

        let mut total_price = Decimal::ZERO;
        for part_id in &selected {
            let price: Option<String> = tx
                .query_row(
                    "SELECT price FROM body_parts WHERE id = ?",
                    [part_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(DbError::from)?;
            match price {
                Some(raw) => total_price += raw.parse::<Decimal>().map_err(DbError::from)?,
                None => return Err(RegistrationError::UnknownBodyPart(part_id.to_string())),
            }
        }

        let settlement = billing::reconcile(total_price, tendered);
        let number = queue::next_number(&tx, day).map_err(DbError::from)?;

        let mut patient = Patient::new(
            request.first_name.trim().to_string(),
            request.last_name.trim().to_string(),
            request.birth_year,
            request.phone.clone(),
            request.notes.clone(),
            queue::format_number(number),
            day,
        );
        patient.paid = settlement.paid;
        patient.partial_paid = settlement.partial_paid;

        let inserted = tx.execute(
            r#"
            INSERT INTO patients (
                id, first_name, last_name, birth_year, phone, notes,
                queue_number, queue_day, registered, paid, partial_paid,
                finished, missed, registered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                patient.id,
                patient.first_name,
                patient.last_name,
                patient.birth_year,
                patient.phone,
                patient.notes,
                patient.queue_number,
                patient.queue_day.to_string(),
                patient.registered,
                patient.paid,
                patient.partial_paid.to_string(),
                patient.finished,
                patient.missed,
                patient.registered_at,
            ],
        );
        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(RegistrationError::QueueConflict(day));
            }
            return Err(DbError::from(err).into());
        }

        for part_id in &selected {
            tx.execute(
                "INSERT INTO patient_body_parts (patient_id, body_part_id) VALUES (?1, ?2)",
                params![patient.id, part_id],
            )
            .map_err(DbError::from)?;
        }

        tx.commit().map_err(DbError::from)?;
        Ok(patient)
    }
}

/// True when an insert failed the per-day queue-number uniqueness
/// constraint (as opposed to some other constraint).
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("patients.queue_day")
    )
}
