//! Database initialization and startup
//!
//! Opens the SQLite database backing a partition's record store and ensures
//! all required tables exist.

use rusqlite::Connection;

use super::schema::create_all_tables;

/// Error type for database startup
#[derive(Debug)]
pub enum StartError {
    /// Empty database path provided
    EmptyPath,
    /// SQLite error
    Database(rusqlite::Error),
}

impl std::fmt::Display for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartError::EmptyPath => write!(f, "database path cannot be empty"),
            StartError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for StartError {}

impl From<rusqlite::Error> for StartError {
    fn from(e: rusqlite::Error) -> Self {
        StartError::Database(e)
    }
}

/// Opens the database at `db_path` and ensures all required tables exist
///
/// # Errors
/// - `StartError::EmptyPath` if the path is empty
/// - `StartError::Database` for SQLite errors
pub fn start_db(db_path: &str) -> Result<Connection, StartError> {
    if db_path.is_empty() {
        return Err(StartError::EmptyPath);
    }

    let conn = Connection::open(db_path)?;

    // PRAGMA returns the new mode, so query_row instead of execute
    let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;

    create_all_tables(&conn)?;

    Ok(conn)
}

/// Create an in-memory database for testing
pub fn start_memory_db() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    // WAL mode doesn't work with in-memory databases, skip it
    create_all_tables(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_rejected() {
        let result = start_db("");
        assert!(matches!(result, Err(StartError::EmptyPath)));
    }

    #[test]
    fn test_start_db_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partition.db");
        let path = path.to_str().unwrap();

        let conn = start_db(path).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        // Reopening an initialized database is fine
        drop(conn);
        assert!(start_db(path).is_ok());
    }

    #[test]
    fn test_start_memory_db() {
        let conn = start_memory_db().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_start_error_display() {
        assert_eq!(StartError::EmptyPath.to_string(), "database path cannot be empty");
    }
}
