use std::collections::HashSet;

use rusqlite::Connection;

use crate::error::StoreError;

pub fn connect(path: &str) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

/// Idempotent: safe on every start, never alters existing data.
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS seen_listings (
            id       TEXT PRIMARY KEY,
            found_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

/// Full membership snapshot as of the call.
pub fn seen_ids(conn: &Connection) -> Result<HashSet<String>, StoreError> {
    let mut stmt = conn.prepare("SELECT id FROM seen_listings")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(ids)
}

/// Insert-if-absent batch commit. Re-inserting an id already present is a
/// no-op, never an error. Returns the number of rows actually inserted.
pub fn add_seen_ids(conn: &Connection, ids: &[String]) -> Result<usize, StoreError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let tx = conn.unchecked_transaction()?;
    let mut inserted = 0;
    {
        let mut stmt = tx.prepare("INSERT OR IGNORE INTO seen_listings (id) VALUES (?1)")?;
        for id in ids {
            inserted += stmt.execute(rusqlite::params![id])?;
        }
    }
    tx.commit()?;
    Ok(inserted)
}

// ── Stats ──

pub struct StoreStats {
    pub seen: usize,
    pub oldest: Option<String>,
    pub newest: Option<String>,
}

impl StoreStats {
    pub fn print(&self) {
        println!("Seen listings: {}", self.seen);
        if let (Some(oldest), Some(newest)) = (&self.oldest, &self.newest) {
            println!("First seen:    {}", oldest);
            println!("Last seen:     {}", newest);
        }
    }
}

pub fn get_stats(conn: &Connection) -> Result<StoreStats, StoreError> {
    let seen: usize = conn.query_row("SELECT COUNT(*) FROM seen_listings", [], |r| r.get(0))?;
    let oldest: Option<String> =
        conn.query_row("SELECT MIN(found_at) FROM seen_listings", [], |r| r.get(0))?;
    let newest: Option<String> =
        conn.query_row("SELECT MAX(found_at) FROM seen_listings", [], |r| r.get(0))?;
    Ok(StoreStats {
        seen,
        oldest,
        newest,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = memory_db();
        add_seen_ids(&conn, &["abc".into()]).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(seen_ids(&conn).unwrap().len(), 1);
    }

    #[test]
    fn add_is_idempotent_per_id() {
        let conn = memory_db();
        let batch = vec!["abc".to_string(), "xyz".to_string()];
        assert_eq!(add_seen_ids(&conn, &batch).unwrap(), 2);
        assert_eq!(add_seen_ids(&conn, &batch).unwrap(), 0);
        assert_eq!(seen_ids(&conn).unwrap().len(), 2);
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let conn = memory_db();
        assert_eq!(add_seen_ids(&conn, &[]).unwrap(), 0);
        assert!(seen_ids(&conn).unwrap().is_empty());
    }

    #[test]
    fn snapshot_contains_all_committed_ids() {
        let conn = memory_db();
        add_seen_ids(&conn, &["abc".into()]).unwrap();
        add_seen_ids(&conn, &["abc".into(), "xyz".into()]).unwrap();
        let ids = seen_ids(&conn).unwrap();
        assert!(ids.contains("abc"));
        assert!(ids.contains("xyz"));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn stats_count_matches() {
        let conn = memory_db();
        add_seen_ids(&conn, &["a".into(), "b".into(), "c".into()]).unwrap();
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.seen, 3);
        assert!(stats.oldest.is_some());
    }
}
