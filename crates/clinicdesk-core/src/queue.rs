//! Daily queue numbering.
//!
//! Queue numbers are a per-calendar-day sequence starting at 1, rendered
//! zero-padded to three digits ("001", "042"). The sequence lives in the
//! `queue_counters` table, one row per day, advanced with a single UPSERT.
//! Callers draw numbers inside an immediate write transaction so the
//! read-modify-write is serialized; the `UNIQUE (queue_day, queue_number)`
//! constraint on patients is the last line of defense against duplicates.

use chrono::NaiveDate;
use rusqlite::Connection;

/// Render a queue number, zero-padded to three digits.
///
/// Past 999 the number simply grows ("1000"); there is no cap.
pub fn format_number(n: u32) -> String {
    format!("{:03}", n)
}

/// Numeric interpretation of a stored queue number.
pub fn parse_number(s: &str) -> Option<u32> {
    s.trim().parse().ok()
}

/// Draw the next queue number for `day`.
///
/// A missing counter row seeds from the highest number already stored for
/// that day, and an existing row advances to at least one past it, so a
/// retried registration always converges past any number already taken.
pub(crate) fn next_number(conn: &Connection, day: NaiveDate) -> rusqlite::Result<u32> {
    let number: i64 = conn.query_row(
        r#"
        INSERT INTO queue_counters (day, last_number)
        VALUES (
            ?1,
            COALESCE((SELECT MAX(CAST(queue_number AS INTEGER))
                      FROM patients WHERE queue_day = ?1), 0) + 1
        )
        ON CONFLICT(day) DO UPDATE SET
            last_number = MAX(
                last_number + 1,
                COALESCE((SELECT MAX(CAST(queue_number AS INTEGER))
                          FROM patients WHERE queue_day = ?1), 0) + 1
            )
        RETURNING last_number
        "#,
        [day.to_string()],
        |row| row.get(0),
    )?;
    Ok(number as u32)
}
