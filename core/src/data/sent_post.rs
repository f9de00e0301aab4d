//! SentPost storage
//!
//! Correlation records for updates this partition pushed to a remote
//! partition. A row is only authoritative once the remote side confirmed it.

use rusqlite::{params, Connection, OptionalExtension};

use super::post::{sql_id, sql_key};

/// Outbound correlation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPost {
    /// Same numeric space as `Post::id`
    pub id: u64,
    /// Title this partition expects to become authoritative remotely
    pub title: String,
}

fn parse_sent_post_row(row: &rusqlite::Row) -> rusqlite::Result<SentPost> {
    let id: i64 = row.get(0)?;
    Ok(SentPost {
        id: id as u64,
        title: row.get(1)?,
    })
}

/// Get a SentPost by ID
pub fn get_sent_post(conn: &Connection, id: u64) -> rusqlite::Result<Option<SentPost>> {
    let Some(key) = sql_id(id) else {
        return Ok(None);
    };

    conn.query_row(
        "SELECT id, title FROM sent_posts WHERE id = ?1",
        [key],
        parse_sent_post_row,
    )
    .optional()
}

/// Insert or overwrite a SentPost
pub fn set_sent_post(conn: &Connection, sent: &SentPost) -> rusqlite::Result<()> {
    let key = sql_key(sent.id)?;

    conn.execute(
        "INSERT INTO sent_posts (id, title) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            updated_at = strftime('%s', 'now')",
        params![key, sent.title],
    )?;
    Ok(())
}

/// Get all SentPosts ordered by ID
pub fn get_all_sent_posts(conn: &Connection) -> rusqlite::Result<Vec<SentPost>> {
    let mut stmt = conn.prepare("SELECT id, title FROM sent_posts ORDER BY id")?;

    let sent = stmt
        .query_map([], parse_sent_post_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::create_all_tables;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_all_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_set_and_get_sent_post() {
        let conn = setup_db();
        let sent = SentPost { id: 7, title: "old".to_string() };
        set_sent_post(&conn, &sent).unwrap();

        assert_eq!(get_sent_post(&conn, 7).unwrap(), Some(sent));
        assert!(get_sent_post(&conn, 8).unwrap().is_none());
    }

    #[test]
    fn test_overwrite_sent_post() {
        let conn = setup_db();
        set_sent_post(&conn, &SentPost { id: 7, title: "old".to_string() }).unwrap();
        set_sent_post(&conn, &SentPost { id: 7, title: "new".to_string() }).unwrap();

        let all = get_all_sent_posts(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "new");
    }

    #[test]
    fn test_set_out_of_range_id_fails() {
        let conn = setup_db();
        let result = set_sent_post(&conn, &SentPost { id: u64::MAX, title: "x".to_string() });
        assert!(matches!(result, Err(rusqlite::Error::ToSqlConversionFailure(_))));
        assert!(get_sent_post(&conn, u64::MAX).unwrap().is_none());
    }
}
