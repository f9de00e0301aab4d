//! Post sync protocol - public interface
//!
//! # Module Structure
//!
//! - `controller.rs`: the four packet transitions (transmit, receive,
//!   acknowledge, timeout)
//! - `router.rs`: channel callbacks wrapping the controller
//! - `config.rs`: SyncConfig builder
//! - `error.rs`: PacketError, ReceiveError
//! - `events.rs`: lifecycle events
//! - `policy.rs`: sender-side resolution hooks
//!
//! # Example
//!
//! ```ignore
//! use postsync_core::{PacketController, PacketRouter, SqliteStore, SyncConfig};
//!
//! let config = SyncConfig::default();
//! let store = SqliteStore::open("blog.db")?;
//! let mut router = PacketRouter::new(config, PacketController::new(store, transport));
//!
//! let data = UpdatePostPacketData::new("7", "New title", "New content");
//! let sequence = router.send_update_post(&data, "channel-0", counterparty_height, now)?;
//! ```

mod config;
mod controller;
mod error;
mod events;
mod policy;
mod router;

pub use config::SyncConfig;
pub use controller::{Outcome, PacketController};
pub use error::{PacketError, ReceiveError};
pub use events::{AcknowledgedEvent, PacketEvent, ReceivedEvent, SentEvent, TimedOutEvent};
pub use policy::{NoopPolicy, ResolutionPolicy};
pub use router::PacketRouter;
