//! Body-part catalog operations.

use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

use super::{Database, DbError, DbResult};
use crate::models::BodyPart;

impl Database {
    /// Insert a new body part.
    pub fn insert_body_part(&self, part: &BodyPart) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO body_parts (id, name, price) VALUES (?1, ?2, ?3)",
            params![part.id, part.name, part.price.to_string()],
        )?;
        Ok(())
    }

    /// Update name and price of an existing body part.
    pub fn update_body_part(&self, part: &BodyPart) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE body_parts SET name = ?2, price = ?3, updated_at = datetime('now') WHERE id = ?1",
            params![part.id, part.name, part.price.to_string()],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a body part by id.
    pub fn get_body_part(&self, id: &str) -> DbResult<Option<BodyPart>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, name, price FROM body_parts WHERE id = ?",
                [id],
                |row| {
                    Ok(BodyPartRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        price: row.get(2)?,
                    })
                },
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// List the whole catalog, ordered by name.
    pub fn list_body_parts(&self) -> DbResult<Vec<BodyPart>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, price FROM body_parts ORDER BY name")?;

        let rows = stmt.query_map([], |row| {
            Ok(BodyPartRow {
                id: row.get(0)?,
                name: row.get(1)?,
                price: row.get(2)?,
            })
        })?;

        let mut parts = Vec::new();
        for row in rows {
            parts.push(row?.try_into()?);
        }
        Ok(parts)
    }

    /// Delete a body part.
    pub fn delete_body_part(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM body_parts WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct BodyPartRow {
    id: String,
    name: String,
    price: String,
}

impl TryFrom<BodyPartRow> for BodyPart {
    type Error = DbError;

    fn try_from(row: BodyPartRow) -> Result<Self, Self::Error> {
        Ok(BodyPart {
            id: row.id,
            name: row.name,
            price: row.price.parse::<Decimal>()?,
        })
    }
}
