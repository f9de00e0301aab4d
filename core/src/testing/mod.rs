//! Testing utilities for post sync
//!
//! Provides an in-process simulation of two partitions joined by a channel,
//! so the packet lifecycle can be exercised without a real transport.
//!
//! # Example
//!
//! ```ignore
//! let mut network = TestNetwork::new()?;
//!
//! // A sends an update to B
//! let data = UpdatePostPacketData::new("7", "title", "content");
//! network.send_update(Side::A, &data)?;
//!
//! // B receives it, A processes the acknowledgement
//! let relayed = network.relay(Side::A);
//! ```

pub mod network;
pub mod transport;

pub use network::{Relayed, Side, TestChain, TestNetwork};
pub use transport::LoopbackTransport;

/// Install a `fmt` subscriber filtered by `RUST_LOG`
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
