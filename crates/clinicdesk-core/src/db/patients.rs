//! Patient database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

use super::{Database, DbError, DbResult};
use crate::models::{BodyPart, Patient, QueueEntry};

const PATIENT_COLUMNS: &str = "id, first_name, last_name, birth_year, phone, notes, \
     queue_number, queue_day, registered, paid, partial_paid, finished, missed, registered_at";

impl Database {
    /// Insert a new patient record.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
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
        )?;
        Ok(())
    }

    /// Update the mutable fields of an existing patient.
    ///
    /// Queue number, queue day and registration timestamp are set once at
    /// registration and never change.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                first_name = ?2,
                last_name = ?3,
                birth_year = ?4,
                phone = ?5,
                notes = ?6,
                registered = ?7,
                paid = ?8,
                partial_paid = ?9,
                finished = ?10,
                missed = ?11,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.first_name,
                patient.last_name,
                patient.birth_year,
                patient.phone,
                patient.notes,
                patient.registered,
                patient.paid,
                patient.partial_paid.to_string(),
                patient.finished,
                patient.missed,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by id.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?"),
                [id],
                map_patient_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List a day's registrations in queue order.
    ///
    /// `search` is a case-insensitive substring match over first name,
    /// last name and queue number.
    pub fn list_patients_for_day(
        &self,
        day: NaiveDate,
        search: Option<&str>,
    ) -> DbResult<Vec<Patient>> {
        let mut rows = Vec::new();

        if let Some(query) = search {
            let pattern = format!("%{}%", query);
            let mut stmt = self.conn.prepare(&format!(
                r#"
                SELECT {PATIENT_COLUMNS} FROM patients
                WHERE queue_day = ?1
                  AND (first_name LIKE ?2 OR last_name LIKE ?2 OR queue_number LIKE ?2)
                ORDER BY CAST(queue_number AS INTEGER)
                "#
            ))?;
            let mapped = stmt.query_map(params![day.to_string(), pattern], map_patient_row)?;
            for row in mapped {
                rows.push(row?);
            }
        } else {
            let mut stmt = self.conn.prepare(&format!(
                r#"
                SELECT {PATIENT_COLUMNS} FROM patients
                WHERE queue_day = ?1
                ORDER BY CAST(queue_number AS INTEGER)
                "#
            ))?;
            let mapped = stmt.query_map([day.to_string()], map_patient_row)?;
            for row in mapped {
                rows.push(row?);
            }
        }

        rows.into_iter().map(|row| row.try_into()).collect()
    }

    /// List a day's unfinished registrations in queue order (the
    /// waiting-room display feed).
    pub fn list_waiting_for_day(&self, day: NaiveDate) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PATIENT_COLUMNS} FROM patients
            WHERE queue_day = ?1 AND finished = 0
            ORDER BY CAST(queue_number AS INTEGER)
            "#
        ))?;

        let mapped = stmt.query_map([day.to_string()], map_patient_row)?;
        let mut rows = Vec::new();
        for row in mapped {
            rows.push(row?);
        }
        rows.into_iter().map(|row| row.try_into()).collect()
    }

    /// Call a patient to the room: clears the waiting, missed and finished
    /// flags.
    pub fn mark_called(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE patients SET registered = 0, missed = 0, finished = 0, updated_at = datetime('now') WHERE id = ?",
            [id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Mark a visit complete.
    pub fn mark_finished(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE patients SET finished = 1, updated_at = datetime('now') WHERE id = ?",
            [id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Mark a patient as called-but-absent.
    pub fn mark_missed(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE patients SET missed = 1, finished = 0, updated_at = datetime('now') WHERE id = ?",
            [id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a patient record (memberships cascade).
    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Replace a patient's body-part set.
    pub fn set_patient_body_parts(&self, patient_id: &str, part_ids: &[String]) -> DbResult<()> {
        self.conn.execute(
            "DELETE FROM patient_body_parts WHERE patient_id = ?",
            [patient_id],
        )?;
        for part_id in part_ids {
            self.conn.execute(
                "INSERT OR IGNORE INTO patient_body_parts (patient_id, body_part_id) VALUES (?1, ?2)",
                params![patient_id, part_id],
            )?;
        }
        Ok(())
    }

    /// The body parts currently associated with a patient, ordered by name.
    pub fn patient_body_parts(&self, patient_id: &str) -> DbResult<Vec<BodyPart>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT b.id, b.name, b.price
            FROM body_parts b
            JOIN patient_body_parts m ON m.body_part_id = b.id
            WHERE m.patient_id = ?
            ORDER BY b.name
            "#,
        )?;

        let mapped = stmt.query_map([patient_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut parts = Vec::new();
        for row in mapped {
            let (id, name, price) = row?;
            parts.push(BodyPart {
                id,
                name,
                price: price.parse::<Decimal>()?,
            });
        }
        Ok(parts)
    }

    /// Live total price: sum of the current catalog prices of the patient's
    /// body parts. Zero when the set is empty, never an error.
    pub fn total_price(&self, patient_id: &str) -> DbResult<Decimal> {
        let parts = self.patient_body_parts(patient_id)?;
        Ok(parts
            .iter()
            .fold(Decimal::ZERO, |total, part| total + part.price))
    }

    /// Assemble the list/display view for one patient.
    pub fn queue_entry(&self, patient: Patient) -> DbResult<QueueEntry> {
        let body_parts = self.patient_body_parts(&patient.id)?;
        let total_price = body_parts
            .iter()
            .fold(Decimal::ZERO, |total, part| total + part.price);
        Ok(QueueEntry {
            patient,
            body_parts,
            total_price,
        })
    }
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: String,
    first_name: String,
    last_name: String,
    birth_year: i32,
    phone: String,
    notes: String,
    queue_number: String,
    queue_day: String,
    registered: bool,
    paid: bool,
    partial_paid: String,
    finished: bool,
    missed: bool,
    registered_at: String,
}

fn map_patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        birth_year: row.get(3)?,
        phone: row.get(4)?,
        notes: row.get(5)?,
        queue_number: row.get(6)?,
        queue_day: row.get(7)?,
        registered: row.get(8)?,
        paid: row.get(9)?,
        partial_paid: row.get(10)?,
        finished: row.get(11)?,
        missed: row.get(12)?,
        registered_at: row.get(13)?,
    })
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            birth_year: row.birth_year,
            phone: row.phone,
            notes: row.notes,
            queue_number: row.queue_number,
            queue_day: row.queue_day.parse::<NaiveDate>()?,
            registered: row.registered,
            paid: row.paid,
            partial_paid: row.partial_paid.parse::<Decimal>()?,
            finished: row.finished,
            missed: row.missed,
            registered_at: row.registered_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn make_patient(first: &str, last: &str, number: &str, on: NaiveDate) -> Patient {
        Patient::new(
            first.into(),
            last.into(),
            1990,
            String::new(),
            String::new(),
            number.into(),
            on,
        )
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let mut patient = make_patient("Aziz", "Karimov", "001", day());
        patient.partial_paid = dec("40.50");
        db.insert_patient(&patient).unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved, patient);
    }

    #[test]
    fn test_update_patient() {
        let db = setup_db();

        let mut patient = make_patient("Aziz", "Karimov", "001", day());
        db.insert_patient(&patient).unwrap();

        patient.phone = "+998901112233".into();
        patient.paid = true;
        patient.partial_paid = dec("120");
        assert!(db.update_patient(&patient).unwrap());

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved.phone, "+998901112233");
        assert!(retrieved.paid);
        assert_eq!(retrieved.partial_paid, dec("120"));
    }

    #[test]
    fn test_day_filter_and_numeric_order() {
        let db = setup_db();
        let other_day = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

        for (first, number) in [("A", "002"), ("B", "010"), ("C", "001")] {
            db.insert_patient(&make_patient(first, "X", number, day()))
                .unwrap();
        }
        db.insert_patient(&make_patient("D", "X", "001", other_day))
            .unwrap();

        let listed = db.list_patients_for_day(day(), None).unwrap();
        let numbers: Vec<&str> = listed.iter().map(|p| p.queue_number.as_str()).collect();
        assert_eq!(numbers, vec!["001", "002", "010"]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let db = setup_db();

        db.insert_patient(&make_patient("Aziz", "Karimov", "001", day()))
            .unwrap();
        db.insert_patient(&make_patient("Malika", "Tosheva", "002", day()))
            .unwrap();

        let by_name = db.list_patients_for_day(day(), Some("kari")).unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].first_name, "Aziz");

        let by_number = db.list_patients_for_day(day(), Some("002")).unwrap();
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].first_name, "Malika");

        let none = db.list_patients_for_day(day(), Some("zzz")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_status_flag_actions() {
        let db = setup_db();

        let patient = make_patient("Aziz", "Karimov", "001", day());
        db.insert_patient(&patient).unwrap();

        assert!(db.mark_missed(&patient.id).unwrap());
        let p = db.get_patient(&patient.id).unwrap().unwrap();
        assert!(p.missed && !p.finished);

        assert!(db.mark_called(&patient.id).unwrap());
        let p = db.get_patient(&patient.id).unwrap().unwrap();
        assert!(!p.registered && !p.missed && !p.finished);

        assert!(db.mark_finished(&patient.id).unwrap());
        let p = db.get_patient(&patient.id).unwrap().unwrap();
        assert!(p.finished);

        assert!(!db.mark_called("no-such-id").unwrap());
    }

    #[test]
    fn test_waiting_excludes_finished() {
        let db = setup_db();

        let first = make_patient("A", "X", "001", day());
        let second = make_patient("B", "X", "002", day());
        db.insert_patient(&first).unwrap();
        db.insert_patient(&second).unwrap();
        db.mark_finished(&first.id).unwrap();

        let waiting = db.list_waiting_for_day(day()).unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].id, second.id);
    }

    #[test]
    fn test_total_price_empty_set_is_zero() {
        let db = setup_db();

        let patient = make_patient("Aziz", "Karimov", "001", day());
        db.insert_patient(&patient).unwrap();

        assert_eq!(db.total_price(&patient.id).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_membership_and_total_price() {
        let db = setup_db();

        let knee = BodyPart::new("Knee".into(), dec("120.00"));
        let spine = BodyPart::new("Spine".into(), dec("150.50"));
        db.insert_body_part(&knee).unwrap();
        db.insert_body_part(&spine).unwrap();

        let patient = make_patient("Aziz", "Karimov", "001", day());
        db.insert_patient(&patient).unwrap();
        db.set_patient_body_parts(&patient.id, &[knee.id.clone(), spine.id.clone()])
            .unwrap();

        assert_eq!(db.total_price(&patient.id).unwrap(), dec("270.50"));

        // Replacing the set drops the old membership
        db.set_patient_body_parts(&patient.id, &[spine.id.clone()])
            .unwrap();
        assert_eq!(db.total_price(&patient.id).unwrap(), dec("150.50"));
    }

    #[test]
    fn test_deleting_body_part_lowers_future_totals() {
        // Totals are live, not frozen at registration: removing a catalog
        // entry changes what previously registered patients total to.
        let db = setup_db();

        let knee = BodyPart::new("Knee".into(), dec("120.00"));
        let spine = BodyPart::new("Spine".into(), dec("150.50"));
        db.insert_body_part(&knee).unwrap();
        db.insert_body_part(&spine).unwrap();

        let patient = make_patient("Aziz", "Karimov", "001", day());
        db.insert_patient(&patient).unwrap();
        db.set_patient_body_parts(&patient.id, &[knee.id.clone(), spine.id.clone()])
            .unwrap();

        db.delete_body_part(&knee.id).unwrap();

        assert_eq!(db.total_price(&patient.id).unwrap(), dec("150.50"));
        let parts = db.patient_body_parts(&patient.id).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name, "Spine");
    }

    #[test]
    fn test_delete_patient_cascades_membership() {
        let db = setup_db();

        let knee = BodyPart::new("Knee".into(), dec("120.00"));
        db.insert_body_part(&knee).unwrap();

        let patient = make_patient("Aziz", "Karimov", "001", day());
        db.insert_patient(&patient).unwrap();
        db.set_patient_body_parts(&patient.id, &[knee.id.clone()])
            .unwrap();

        assert!(db.delete_patient(&patient.id).unwrap());

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM patient_body_parts", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_queue_entry_view() {
        let db = setup_db();

        let knee = BodyPart::new("Knee".into(), dec("120.00"));
        db.insert_body_part(&knee).unwrap();

        let patient = make_patient("Aziz", "Karimov", "001", day());
        db.insert_patient(&patient).unwrap();
        db.set_patient_body_parts(&patient.id, &[knee.id.clone()])
            .unwrap();

        let entry = db.queue_entry(patient.clone()).unwrap();
        assert_eq!(entry.patient.id, patient.id);
        assert_eq!(entry.body_parts.len(), 1);
        assert_eq!(entry.total_price, dec("120.00"));
    }
}
