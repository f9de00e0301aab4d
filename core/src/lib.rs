//! Post Sync Core
//!
//! Cross-partition update of blog posts over an ordered, capability-gated
//! packet channel.
//!
//! A partition sends an update request for a post it created earlier. The
//! counterparty overwrites its copy if it has one and answers with a
//! structured acknowledgement; the sender then reconciles its correlation
//! record, or hands rejections, error acknowledgements and timeouts to a
//! resolution policy.
//!
//! # Module Structure
//!
//! - `protocol/`: Public interface (controller, router, config, events)
//! - `network/`: Packet envelope, payload codec, acknowledgements, transport seam
//! - `data/`: SQLite persistence (posts, sent posts)
//! - `testing/`: Two-partition in-process simulation
//!
//! # Quick Start
//!
//! ```ignore
//! use postsync_core::testing::{Side, TestNetwork};
//! use postsync_core::UpdatePostPacketData;
//!
//! let mut network = TestNetwork::new()?;
//! network.send_update(Side::A, &UpdatePostPacketData::new("7", "title", "body"))?;
//!
//! for relayed in network.relay(Side::A) {
//!     println!("{}: {:?}", relayed.sequence, relayed.result);
//! }
//! ```

// Public interface
pub mod protocol;

// Infrastructure modules
pub mod data;
pub mod network;
pub mod testing;

// Re-export main API types for convenience
pub use data::{Post, RecordStore, SentPost, SqliteStore, StoreError};
pub use network::{
    Acknowledgement, ChannelCapability, Height, Packet, PacketData, Transport, TransportError,
    UpdatePostPacketAck, UpdatePostPacketData,
};
pub use protocol::{
    NoopPolicy, Outcome, PacketController, PacketError, PacketEvent, PacketRouter, ReceiveError,
    ResolutionPolicy, SyncConfig,
};
