//! ClinicDesk Core Library
//!
//! Front-desk queue and billing manager for a small scan clinic: registers
//! patients, assigns daily sequential queue numbers, tracks per-body-part
//! pricing and partial payments, renders printable receipts, feeds the live
//! waiting-room display and tallies daily income against expenses.
//!
//! # Architecture
//!
//! ```text
//! Registration form ──► validate ──► one write transaction
//!                                      │  load selected body parts
//!                                      │  total price → reconcile payment
//!                                      │  draw next queue number (per-day counter)
//!                                      │  persist patient + memberships
//!                                      ▼
//!                                  Receipt (summary text = QR payload)
//!
//! Queue list / waiting-room board / financial report: day-scoped reads.
//! ```
//!
//! Every day-scoped operation takes the calendar day as an explicit
//! parameter; the crate never decides "today" on its own.
//!
//! # Modules
//!
//! - [`db`]: SQLite storage layer
//! - [`models`]: domain types (BodyPart, Patient, Expense)
//! - [`queue`]: per-day queue numbering
//! - [`registration`]: transactional registration flow
//! - [`billing`]: payment reconciliation and the daily report
//! - [`receipt`]: printable receipt rendering
//! - [`display`]: waiting-room display feed
//! - [`config`]: static front-desk settings

pub mod billing;
pub mod config;
pub mod db;
pub mod display;
pub mod models;
pub mod queue;
pub mod receipt;
pub mod registration;

// Re-export commonly used types
pub use billing::{reconcile, reconcile_with_override, DailyReport, Settlement};
pub use config::Settings;
pub use db::Database;
pub use display::DisplayBoard;
pub use models::{BodyPart, Expense, Patient, PatientUpdate, QueueEntry};
pub use receipt::Receipt;
pub use registration::{RegistrationError, RegistrationRequest};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::{Arc, Mutex};

use db::DbError;
use registration::Registrar;

// =========================================================================
// Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("queue number already taken for {0}, resubmit the registration")]
    QueueConflict(NaiveDate),

    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

impl From<RegistrationError> for ClinicError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::Rejected(reason) => ClinicError::InvalidInput(reason.to_string()),
            RegistrationError::UnknownBodyPart(id) => {
                ClinicError::NotFound(format!("body part {}", id))
            }
            RegistrationError::QueueConflict(day) => ClinicError::QueueConflict(day),
            RegistrationError::Db(e) => ClinicError::Database(e),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::Poisoned(e.to_string())
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe front-desk facade; the surface the presentation layer calls.
///
/// Cloning is cheap and clones share the same database and payment-method
/// slot.
#[derive(Clone)]
pub struct Clinic {
    db: Arc<Mutex<Database>>,
    settings: Settings,
    /// Payment-method label from the latest registration, consumed by the
    /// next receipt build.
    last_payment_method: Arc<Mutex<Option<String>>>,
}

impl Clinic {
    /// Open or create a clinic database at the given path.
    pub fn open<P: AsRef<Path>>(path: P, settings: Settings) -> Result<Self, ClinicError> {
        let db = Database::open(path)?;
        Ok(Self::with_database(db, settings))
    }

    /// Create an in-memory clinic (for testing).
    pub fn open_in_memory(settings: Settings) -> Result<Self, ClinicError> {
        let db = Database::open_in_memory()?;
        Ok(Self::with_database(db, settings))
    }

    fn with_database(db: Database, settings: Settings) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            settings,
            last_payment_method: Arc::new(Mutex::new(None)),
        }
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Add a body part to the catalog.
    pub fn add_body_part(&self, name: &str, price: Decimal) -> Result<BodyPart, ClinicError> {
        if name.trim().is_empty() {
            return Err(ClinicError::InvalidInput("body part name is required".into()));
        }
        if price < Decimal::ZERO {
            return Err(ClinicError::InvalidInput("price must not be negative".into()));
        }
        let part = BodyPart::new(name.trim().to_string(), price.round_dp(2));
        let db = self.db.lock()?;
        db.insert_body_part(&part)?;
        Ok(part)
    }

    /// Rename and/or re-price a body part.
    pub fn update_body_part(
        &self,
        id: &str,
        name: Option<&str>,
        price: Option<Decimal>,
    ) -> Result<BodyPart, ClinicError> {
        let db = self.db.lock()?;
        let mut part = db
            .get_body_part(id)?
            .ok_or_else(|| ClinicError::NotFound(format!("body part {}", id)))?;
        if let Some(name) = name {
            if !name.trim().is_empty() {
                part.name = name.trim().to_string();
            }
        }
        if let Some(price) = price {
            if price < Decimal::ZERO {
                return Err(ClinicError::InvalidInput("price must not be negative".into()));
            }
            part.price = price.round_dp(2);
        }
        db.update_body_part(&part)?;
        Ok(part)
    }

    /// Delete a body part; it disappears from every patient's future total.
    pub fn delete_body_part(&self, id: &str) -> Result<(), ClinicError> {
        let db = self.db.lock()?;
        if !db.delete_body_part(id)? {
            return Err(ClinicError::NotFound(format!("body part {}", id)));
        }
        Ok(())
    }

    /// The whole catalog, ordered by name.
    pub fn body_parts(&self) -> Result<Vec<BodyPart>, ClinicError> {
        let db = self.db.lock()?;
        Ok(db.list_body_parts()?)
    }

    // =========================================================================
    // Registration & Receipt
    // =========================================================================

    /// Register a patient for `day`.
    ///
    /// On success the payment-method label is parked for the receipt that
    /// follows. On any failure nothing is persisted.
    pub fn register_patient(
        &self,
        request: RegistrationRequest,
        day: NaiveDate,
    ) -> Result<Patient, ClinicError> {
        let mut db = self.db.lock()?;
        let patient = match Registrar::new(&mut db).register(&request, day) {
            Ok(patient) => patient,
            Err(RegistrationError::QueueConflict(day)) => {
                tracing::warn!("queue number conflict on {}, asking caller to resubmit", day);
                return Err(ClinicError::QueueConflict(day));
            }
            Err(e) => return Err(e.into()),
        };
        *self.last_payment_method.lock()? = request.payment_method;
        tracing::info!(
            "registered patient {} with queue number {}",
            patient.id,
            patient.queue_number
        );
        Ok(patient)
    }

    /// Render the receipt for a patient.
    ///
    /// Consumes the parked payment-method label; rendering the same receipt
    /// again shows none.
    pub fn receipt(&self, patient_id: &str) -> Result<Receipt, ClinicError> {
        let db = self.db.lock()?;
        let patient = db
            .get_patient(patient_id)?
            .ok_or_else(|| ClinicError::NotFound(format!("patient {}", patient_id)))?;
        let payment_method = self.last_payment_method.lock()?.take();
        Ok(Receipt::build(&db, &patient, payment_method)?)
    }

    // =========================================================================
    // Queue List Operations
    // =========================================================================

    /// A day's registrations in queue order, with body parts and live
    /// totals. `search` matches name or queue number, case-insensitively.
    pub fn patients_for_day(
        &self,
        day: NaiveDate,
        search: Option<&str>,
    ) -> Result<Vec<QueueEntry>, ClinicError> {
        let db = self.db.lock()?;
        let patients = db.list_patients_for_day(day, search)?;
        let mut entries = Vec::with_capacity(patients.len());
        for patient in patients {
            entries.push(db.queue_entry(patient)?);
        }
        Ok(entries)
    }

    /// Call a patient to the room.
    pub fn call_patient(&self, patient_id: &str) -> Result<(), ClinicError> {
        let db = self.db.lock()?;
        if !db.mark_called(patient_id)? {
            return Err(ClinicError::NotFound(format!("patient {}", patient_id)));
        }
        Ok(())
    }

    /// Mark a visit complete; the patient leaves the waiting-room display.
    pub fn finish_patient(&self, patient_id: &str) -> Result<(), ClinicError> {
        let db = self.db.lock()?;
        if !db.mark_finished(patient_id)? {
            return Err(ClinicError::NotFound(format!("patient {}", patient_id)));
        }
        Ok(())
    }

    /// Mark a patient as called-but-absent.
    pub fn mark_missed(&self, patient_id: &str) -> Result<(), ClinicError> {
        let db = self.db.lock()?;
        if !db.mark_missed(patient_id)? {
            return Err(ClinicError::NotFound(format!("patient {}", patient_id)));
        }
        Ok(())
    }

    /// Apply the list-view edit action: field changes, optional body-part
    /// replacement, and payment re-reconciliation with the explicit paid
    /// override.
    pub fn edit_patient(
        &self,
        patient_id: &str,
        update: PatientUpdate,
    ) -> Result<Patient, ClinicError> {
        let db = self.db.lock()?;
        let mut patient = db
            .get_patient(patient_id)?
            .ok_or_else(|| ClinicError::NotFound(format!("patient {}", patient_id)))?;

        if let Some(first_name) = update.first_name {
            patient.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            patient.last_name = last_name;
        }
        if let Some(birth_year) = update.birth_year {
            patient.birth_year = birth_year;
        }
        if let Some(phone) = update.phone {
            patient.phone = phone;
        }

        if let Some(part_ids) = &update.body_part_ids {
            if !part_ids.is_empty() {
                for part_id in part_ids {
                    db.get_body_part(part_id)?
                        .ok_or_else(|| ClinicError::NotFound(format!("body part {}", part_id)))?;
                }
                db.set_patient_body_parts(&patient.id, part_ids)?;
            }
        }

        let total_price = db.total_price(&patient.id)?;
        let tendered = match &update.partial_paid {
            Some(raw) => billing::parse_amount(raw),
            None => patient.partial_paid,
        };
        let settlement = billing::reconcile_with_override(total_price, tendered, update.mark_paid);
        patient.partial_paid = settlement.partial_paid;
        patient.paid = settlement.paid;

        db.update_patient(&patient)?;
        Ok(patient)
    }

    /// Remove a patient record entirely.
    pub fn delete_patient(&self, patient_id: &str) -> Result<(), ClinicError> {
        let db = self.db.lock()?;
        if !db.delete_patient(patient_id)? {
            return Err(ClinicError::NotFound(format!("patient {}", patient_id)));
        }
        Ok(())
    }

    // =========================================================================
    // Finances
    // =========================================================================

    /// Record an expense for `day`. Malformed amounts coerce to zero.
    pub fn add_expense(
        &self,
        title: &str,
        raw_amount: &str,
        note: &str,
        day: NaiveDate,
    ) -> Result<Expense, ClinicError> {
        if title.trim().is_empty() {
            return Err(ClinicError::InvalidInput("expense title is required".into()));
        }
        let expense = Expense::new(
            title.trim().to_string(),
            billing::parse_amount(raw_amount),
            note.to_string(),
            day,
        );
        let db = self.db.lock()?;
        db.insert_expense(&expense)?;
        Ok(expense)
    }

    /// The day's income/outcome/balance plus the (optionally searched)
    /// expense listing.
    pub fn financial_report(
        &self,
        day: NaiveDate,
        search: Option<&str>,
    ) -> Result<DailyReport, ClinicError> {
        let db = self.db.lock()?;
        Ok(DailyReport::build(&db, day, search)?)
    }

    // =========================================================================
    // Waiting-Room Display
    // =========================================================================

    /// The live board for `day`: unfinished patients in queue order plus
    /// the emergency phone line.
    pub fn waiting_board(&self, day: NaiveDate) -> Result<DisplayBoard, ClinicError> {
        let db = self.db.lock()?;
        Ok(DisplayBoard::build(&db, day, &self.settings)?)
    }
}
