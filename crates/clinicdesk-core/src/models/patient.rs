//! Patient records and queue views.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BodyPart;

/// One patient record per registration event.
///
/// This is not a persistent patient identity: a returning visitor gets a
/// fresh record (and a fresh queue number) on every visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Unique identifier
    pub id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Year of birth
    pub birth_year: i32,
    /// Contact phone, may be empty
    pub phone: String,
    /// Front-desk notes, may be empty
    pub notes: String,
    /// Zero-padded position in the day's queue (e.g. "001")
    pub queue_number: String,
    /// Calendar day the queue number belongs to
    pub queue_day: NaiveDate,
    /// Waiting in the queue, not yet called
    pub registered: bool,
    /// Fully paid
    pub paid: bool,
    /// Amount actually tendered toward the total, clamped to [0, total]
    pub partial_paid: Decimal,
    /// Visit complete, hidden from the waiting-room display
    pub finished: bool,
    /// Was called but not present
    pub missed: bool,
    /// Registration timestamp, set once
    pub registered_at: String,
}

impl Patient {
    /// Create a record in the freshly-registered state.
    pub fn new(
        first_name: String,
        last_name: String,
        birth_year: i32,
        phone: String,
        notes: String,
        queue_number: String,
        queue_day: NaiveDate,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name,
            last_name,
            birth_year,
            phone,
            notes,
            queue_number,
            queue_day,
            registered: true,
            paid: false,
            partial_paid: Decimal::ZERO,
            finished: false,
            missed: false,
            registered_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Field changes applied by the list-view edit action.
///
/// `None` leaves the field untouched. A body-part set is only replaced when
/// a non-empty set is supplied. `partial_paid` is the raw tendered text from
/// the form; malformed input coerces to zero.
#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_year: Option<i32>,
    pub phone: Option<String>,
    pub body_part_ids: Option<Vec<String>>,
    pub partial_paid: Option<String>,
    /// Explicit "mark as paid" override
    pub mark_paid: bool,
}

/// A patient together with its current body parts and live total price.
///
/// The total is recomputed from the catalog at query time, not frozen at
/// registration.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueueEntry {
    pub patient: Patient,
    pub body_parts: Vec<BodyPart>,
    pub total_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_new_patient_flags() {
        let patient = Patient::new(
            "Aziz".into(),
            "Karimov".into(),
            1987,
            "+998901234567".into(),
            String::new(),
            "001".into(),
            day(),
        );
        assert!(patient.registered);
        assert!(!patient.paid);
        assert!(!patient.finished);
        assert!(!patient.missed);
        assert_eq!(patient.partial_paid, Decimal::ZERO);
        assert_eq!(patient.id.len(), 36); // UUID format
    }

    #[test]
    fn test_full_name() {
        let patient = Patient::new(
            "Aziz".into(),
            "Karimov".into(),
            1987,
            String::new(),
            String::new(),
            "002".into(),
            day(),
        );
        assert_eq!(patient.full_name(), "Aziz Karimov");
    }
}
