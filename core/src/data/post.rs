//! Post storage
//!
//! Posts are the authoritative local records. IDs are assigned once, from
//! the `post` counter, and never reused.

use rusqlite::{params, Connection, OptionalExtension};

/// Counter row used to assign Post IDs
const POST_COUNTER: &str = "post";

/// Authoritative local record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Unique, immutable identifier
    pub id: u64,
    pub title: String,
    pub content: String,
    /// Identity of the originating actor (immutable)
    pub creator: String,
}

/// SQLite stores INTEGER as i64; IDs beyond that range can't exist in the table
pub(crate) fn sql_id(id: u64) -> Option<i64> {
    sql_key(id).ok()
}

/// Like [`sql_id`], but an out-of-range ID is a write error
pub(crate) fn sql_key(id: u64) -> rusqlite::Result<i64> {
    i64::try_from(id).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn parse_post_row(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    let id: i64 = row.get(0)?;
    Ok(Post {
        id: id as u64,
        title: row.get(1)?,
        content: row.get(2)?,
        creator: row.get(3)?,
    })
}

/// Get a Post by ID
pub fn get_post(conn: &Connection, id: u64) -> rusqlite::Result<Option<Post>> {
    let Some(key) = sql_id(id) else {
        return Ok(None);
    };

    conn.query_row(
        "SELECT id, title, content, creator FROM posts WHERE id = ?1",
        [key],
        parse_post_row,
    )
    .optional()
}

/// Insert or overwrite a Post
///
/// An existing row keeps its `creator`; only `title` and `content` are
/// replaced.
pub fn set_post(conn: &Connection, post: &Post) -> rusqlite::Result<()> {
    let key = sql_key(post.id)?;

    conn.execute(
        "INSERT INTO posts (id, title, content, creator) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            content = excluded.content,
            updated_at = strftime('%s', 'now')",
        params![key, post.title, post.content, post.creator],
    )?;
    Ok(())
}

/// Create a new Post with the next free ID
///
/// The counter bump and the insert happen in one transaction.
pub fn append_post(
    conn: &mut Connection,
    title: &str,
    content: &str,
    creator: &str,
) -> rusqlite::Result<u64> {
    let tx = conn.transaction()?;

    let next: i64 = tx
        .query_row(
            "SELECT value FROM counters WHERE name = ?1",
            [POST_COUNTER],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);

    // Skip over IDs already taken by set_post with explicit IDs
    let max_existing: Option<i64> =
        tx.query_row("SELECT MAX(id) FROM posts", [], |row| row.get(0))?;
    let id = match max_existing {
        Some(max) if max >= next => max + 1,
        _ => next,
    };

    tx.execute(
        "INSERT INTO posts (id, title, content, creator) VALUES (?1, ?2, ?3, ?4)",
        params![id, title, content, creator],
    )?;
    tx.execute(
        "INSERT INTO counters (name, value) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        params![POST_COUNTER, id + 1],
    )?;

    tx.commit()?;
    Ok(id as u64)
}

/// Get all Posts ordered by ID
pub fn get_all_posts(conn: &Connection) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare("SELECT id, title, content, creator FROM posts ORDER BY id")?;

    let posts = stmt
        .query_map([], parse_post_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(posts)
}
