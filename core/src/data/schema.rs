//! Database schema definitions for the partition record store
//!
//! Two tables back the packet lifecycle:
//! - `posts`: authoritative local records, mutated by inbound updates
//! - `sent_posts`: correlation records for outbound updates

use rusqlite::Connection;

/// Creates all required database tables
pub fn create_all_tables(conn: &Connection) -> rusqlite::Result<()> {
    create_post_table(conn)?;
    create_sent_post_table(conn)?;
    create_counter_table(conn)?;
    Ok(())
}

/// Post table: authoritative records keyed by numeric ID
///
/// `id` and `creator` are written once at creation. Only `title` and
/// `content` change afterwards.
pub fn create_post_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY NOT NULL CHECK (id >= 0),
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            creator TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )",
        [],
    )?;
    Ok(())
}

/// SentPost table: outbound correlation records
///
/// Shares the numeric ID space with `posts`, but there is no foreign key:
/// the correlated Post lives on the remote partition.
pub fn create_sent_post_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sent_posts (
            id INTEGER PRIMARY KEY NOT NULL CHECK (id >= 0),
            title TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )",
        [],
    )?;
    Ok(())
}

/// Counter table: next ID to hand out per record kind
pub fn create_counter_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS counters (
            name TEXT PRIMARY KEY NOT NULL,
            value INTEGER NOT NULL CHECK (value >= 0)
        )",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_create_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_all_tables(&conn).unwrap();

        assert!(table_exists(&conn, "posts"));
        assert!(table_exists(&conn, "sent_posts"));
        assert!(table_exists(&conn, "counters"));
    }

    #[test]
    fn test_create_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_all_tables(&conn).unwrap();
        create_all_tables(&conn).unwrap();
        assert!(table_exists(&conn, "posts"));
    }

    #[test]
    fn test_negative_id_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        create_all_tables(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO sent_posts (id, title) VALUES (-1, 'x')",
            [],
        );
        assert!(result.is_err());
    }
}
