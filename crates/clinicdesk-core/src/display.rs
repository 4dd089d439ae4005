//! Live waiting-room display feed.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::Settings;
use crate::db::{Database, DbResult};
use crate::models::QueueEntry;

/// Everything the waiting-room screen shows for one day: the unfinished
/// queue in order, plus the emergency phone line from settings.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayBoard {
    pub day: NaiveDate,
    pub entries: Vec<QueueEntry>,
    pub emergency_phone: String,
}

impl DisplayBoard {
    /// Build the board for `day`.
    pub fn build(db: &Database, day: NaiveDate, settings: &Settings) -> DbResult<Self> {
        let waiting = db.list_waiting_for_day(day)?;
        let mut entries = Vec::with_capacity(waiting.len());
        for patient in waiting {
            entries.push(db.queue_entry(patient)?);
        }
        Ok(Self {
            day,
            entries,
            emergency_phone: settings.emergency_phone.clone(),
        })
    }
}
