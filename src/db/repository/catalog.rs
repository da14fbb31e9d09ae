//! Medicine catalog queries. The catalog is externally owned — the
//! pipeline only reads it through case-insensitive substring search.

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::CatalogMedicine;

pub fn insert_medicine(
    conn: &Connection,
    name: &str,
    price: Option<f64>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO medicines (name, price) VALUES (?1, ?2)",
        params![name, price],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Case-insensitive substring search over medicine names. An empty or
/// whitespace-only query returns an empty list without touching the table.
pub fn search_medicines(
    conn: &Connection,
    query: &str,
) -> Result<Vec<CatalogMedicine>, DatabaseError> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let pattern = format!("%{}%", query.trim());
    let mut stmt = conn.prepare(
        "SELECT id, name, price FROM medicines
         WHERE name LIKE ?1 COLLATE NOCASE
         ORDER BY id ASC",
    )?;
    let rows = stmt
        .query_map(params![pattern], |row| {
            Ok(CatalogMedicine {
                id: row.get(0)?,
                name: row.get(1)?,
                price: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn search_is_case_insensitive_substring() {
        let conn = open_memory_database().unwrap();
        insert_medicine(&conn, "Paracetamol 500mg", Some(2.50)).unwrap();
        insert_medicine(&conn, "Ibuprofen 200mg", Some(3.00)).unwrap();

        let results = search_medicines(&conn, "paraceta").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Paracetamol 500mg");
    }

    #[test]
    fn empty_query_returns_empty_without_error() {
        let conn = open_memory_database().unwrap();
        insert_medicine(&conn, "Paracetamol 500mg", None).unwrap();

        assert!(search_medicines(&conn, "").unwrap().is_empty());
        assert!(search_medicines(&conn, "   ").unwrap().is_empty());
    }

    #[test]
    fn results_ordered_by_id() {
        let conn = open_memory_database().unwrap();
        let a = insert_medicine(&conn, "Amoxicillin 250mg", None).unwrap();
        let b = insert_medicine(&conn, "Amoxicillin 500mg", None).unwrap();

        let results = search_medicines(&conn, "amoxicillin").unwrap();
        assert_eq!(results.iter().map(|m| m.id).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn no_match_returns_empty() {
        let conn = open_memory_database().unwrap();
        insert_medicine(&conn, "Paracetamol 500mg", None).unwrap();
        assert!(search_medicines(&conn, "warfarin").unwrap().is_empty());
    }
}
