//! Priced catalog entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A priced scan category a patient selects one or more of at registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyPart {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Price, non-negative, two decimal places
    pub price: Decimal,
}

impl BodyPart {
    /// Create a new catalog entry.
    pub fn new(name: String, price: Decimal) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            price,
        }
    }
}
