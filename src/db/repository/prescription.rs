//! Prescription persistence — status flag plus the replaceable set of
//! extracted orders. The order set is always written whole: reprocessing
//! deletes the previous rows and inserts the new ones in one transaction.

use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{ExtractedOrder, MatchedOrder, PrescriptionStatus};

pub fn insert_prescription(
    conn: &Connection,
    id: &Uuid,
    raw_text: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, raw_text, status, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            id.to_string(),
            raw_text,
            PrescriptionStatus::Pending.as_str(),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_prescription_status(
    conn: &Connection,
    id: &Uuid,
) -> Result<PrescriptionStatus, DatabaseError> {
    let status: String = conn
        .query_row(
            "SELECT status FROM prescriptions WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
                entity_type: "Prescription".into(),
                id: id.to_string(),
            },
            other => DatabaseError::from(other),
        })?;
    PrescriptionStatus::from_str(&status)
}

pub fn set_prescription_status(
    conn: &Connection,
    id: &Uuid,
    status: PrescriptionStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE prescriptions SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status.as_str()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn get_prescription_text(conn: &Connection, id: &Uuid) -> Result<String, DatabaseError> {
    conn.query_row(
        "SELECT raw_text FROM prescriptions WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        },
        other => DatabaseError::from(other),
    })
}

/// Replace the full order set for a prescription: delete old rows, insert
/// the new ones. Runs inside a transaction so readers never observe the
/// gap between delete and insert.
pub fn replace_prescription_orders(
    conn: &Connection,
    prescription_id: &Uuid,
    orders: &[MatchedOrder],
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "DELETE FROM prescription_orders WHERE prescription_id = ?1",
        params![prescription_id.to_string()],
    )?;

    for (position, matched) in orders.iter().enumerate() {
        tx.execute(
            "INSERT INTO prescription_orders
             (id, prescription_id, medicine_name, dosage, frequency, duration,
              quantity, matched_medicine_id, is_available, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                Uuid::new_v4().to_string(),
                prescription_id.to_string(),
                matched.order.medicine_name,
                matched.order.dosage,
                matched.order.frequency,
                matched.order.duration,
                matched.order.quantity,
                matched.matched_catalog_id,
                matched.is_available as i32,
                position as i64,
            ],
        )?;
    }

    tx.commit()?;
    Ok(())
}

/// Fetch a prescription's orders in extraction order.
pub fn fetch_prescription_orders(
    conn: &Connection,
    prescription_id: &Uuid,
) -> Result<Vec<MatchedOrder>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT medicine_name, dosage, frequency, duration, quantity,
                matched_medicine_id, is_available
         FROM prescription_orders
         WHERE prescription_id = ?1
         ORDER BY position ASC",
    )?;
    let rows = stmt
        .query_map(params![prescription_id.to_string()], |row| {
            Ok(MatchedOrder {
                order: ExtractedOrder {
                    medicine_name: row.get(0)?,
                    dosage: row.get(1)?,
                    frequency: row.get(2)?,
                    duration: row.get(3)?,
                    quantity: row.get(4)?,
                },
                matched_catalog_id: row.get(5)?,
                is_available: row.get::<_, i32>(6)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
