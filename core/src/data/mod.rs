//! Data layer for a partition's record store
//!
//! Provides storage and retrieval for:
//! - Posts (authoritative local records)
//! - SentPosts (outbound correlation records)
//!
//! - `schema` - table definitions
//! - `start` - opening on-disk and in-memory databases
//! - `post` / `sent_post` - per-table access
//! - `store` - the `RecordStore` seam used by the packet controller

pub mod post;
pub mod schema;
pub mod sent_post;
pub mod start;
pub mod store;

pub use post::{append_post, get_all_posts, get_post, set_post, Post};
pub use schema::create_all_tables;
pub use sent_post::{get_all_sent_posts, get_sent_post, set_sent_post, SentPost};
pub use start::{start_db, start_memory_db, StartError};
pub use store::{RecordStore, SqliteStore, StoreError};
