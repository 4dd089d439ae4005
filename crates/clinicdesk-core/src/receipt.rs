//! Printable receipt rendering.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{Database, DbResult};
use crate::models::Patient;

/// Human-readable summary of one registration, handed to the printer.
///
/// [`Receipt::text`] is both the printed summary and, verbatim, the payload
/// a QR encoder receives; image generation itself is the embedding
/// application's concern.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub queue_number: String,
    pub first_name: String,
    pub last_name: String,
    /// Live total at rendering time
    pub total_price: Decimal,
    pub partial_paid: Decimal,
    /// Opaque payment-method label, consumed from the registration that
    /// produced this receipt; absent when already consumed
    pub payment_method: Option<String>,
    pub registered_at: String,
}

impl Receipt {
    /// Build a receipt for a patient record.
    pub fn build(
        db: &Database,
        patient: &Patient,
        payment_method: Option<String>,
    ) -> DbResult<Self> {
        let total_price = db.total_price(&patient.id)?;
        Ok(Self {
            queue_number: patient.queue_number.clone(),
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            total_price,
            partial_paid: patient.partial_paid,
            payment_method,
            registered_at: patient.registered_at.clone(),
        })
    }

    /// The printable summary; also the exact QR payload.
    pub fn text(&self) -> String {
        format!(
            "Queue: {}\nName: {}\nSurname: {}\nTotal: {}\nPaid: {}\nPayment: {}\nDate: {}",
            self.queue_number,
            self.first_name,
            self.last_name,
            self.total_price,
            self.partial_paid,
            self.payment_method.as_deref().unwrap_or("-"),
            self.registered_at,
        )
    }

    /// Export as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
