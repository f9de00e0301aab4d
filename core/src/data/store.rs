//! Record store seam
//!
//! The packet controller only ever talks to storage through [`RecordStore`].
//! [`SqliteStore`] is the implementation used by partitions and tests.

use rusqlite::Connection;

use super::post::{append_post, get_all_posts, get_post, set_post, Post};
use super::sent_post::{get_all_sent_posts, get_sent_post, set_sent_post, SentPost};
use super::start::{start_db, start_memory_db, StartError};

/// Error returned by a record store backend
#[derive(Debug)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError(e.to_string())
    }
}

/// Key/value access to Posts and SentPosts, keyed by numeric ID
pub trait RecordStore {
    /// Look up a Post; `None` means not found
    fn get_post(&self, id: u64) -> Result<Option<Post>, StoreError>;

    /// Persist a Post
    fn set_post(&mut self, post: &Post) -> Result<(), StoreError>;

    /// Create a Post with a freshly assigned ID
    fn append_post(&mut self, title: &str, content: &str, creator: &str) -> Result<u64, StoreError>;

    /// All Posts, ordered by ID
    fn all_posts(&self) -> Result<Vec<Post>, StoreError>;

    /// Look up a SentPost; `None` means not found
    fn get_sent_post(&self, id: u64) -> Result<Option<SentPost>, StoreError>;

    /// Persist a SentPost
    fn set_sent_post(&mut self, sent: &SentPost) -> Result<(), StoreError>;

    /// All SentPosts, ordered by ID
    fn all_sent_posts(&self) -> Result<Vec<SentPost>, StoreError>;
}

/// SQLite-backed record store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap an already initialized connection
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (or create) an on-disk store
    pub fn open(db_path: &str) -> Result<Self, StartError> {
        Ok(Self::new(start_db(db_path)?))
    }

    /// Fresh in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(start_memory_db()?))
    }

    /// Underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl RecordStore for SqliteStore {
    fn get_post(&self, id: u64) -> Result<Option<Post>, StoreError> {
        Ok(get_post(&self.conn, id)?)
    }

    fn set_post(&mut self, post: &Post) -> Result<(), StoreError> {
        Ok(set_post(&self.conn, post)?)
    }

    fn append_post(&mut self, title: &str, content: &str, creator: &str) -> Result<u64, StoreError> {
        Ok(append_post(&mut self.conn, title, content, creator)?)
    }

    fn all_posts(&self) -> Result<Vec<Post>, StoreError> {
        Ok(get_all_posts(&self.conn)?)
    }

    fn get_sent_post(&self, id: u64) -> Result<Option<SentPost>, StoreError> {
        Ok(get_sent_post(&self.conn, id)?)
    }

    fn set_sent_post(&mut self, sent: &SentPost) -> Result<(), StoreError> {
        Ok(set_sent_post(&self.conn, sent)?)
    }

    fn all_sent_posts(&self) -> Result<Vec<SentPost>, StoreError> {
        Ok(get_all_sent_posts(&self.conn)?)
    }
}
