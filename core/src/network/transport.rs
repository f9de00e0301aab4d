//! Channel transport seam
//!
//! The transport owns channels, sequencing and timeout enforcement. The
//! packet controller only asks it for a capability and hands it bytes.

use super::packet::Height;

/// Proof that this module may send on `port_id`/`channel_id`
///
/// Only a transport hands these out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelCapability {
    port_id: String,
    channel_id: String,
}

impl ChannelCapability {
    pub fn new(port_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            port_id: port_id.into(),
            channel_id: channel_id.into(),
        }
    }

    pub fn port_id(&self) -> &str {
        &self.port_id
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Whether this capability covers the given port and channel
    pub fn authorizes(&self, port_id: &str, channel_id: &str) -> bool {
        self.port_id == port_id && self.channel_id == channel_id
    }
}

/// Errors reported by a transport when sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Capability does not cover the requested channel
    Unauthorized { port_id: String, channel_id: String },
    /// Channel does not exist or is not open
    ChannelClosed(String),
    /// Both timeout height and timestamp are zero
    InvalidTimeout,
    /// Any other send failure
    SendFailed(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Unauthorized { port_id, channel_id } => {
                write!(f, "capability does not authorize {}/{}", port_id, channel_id)
            }
            TransportError::ChannelClosed(channel) => write!(f, "channel not open: {}", channel),
            TransportError::InvalidTimeout => {
                write!(f, "packet timeout height and timestamp cannot both be zero")
            }
            TransportError::SendFailed(e) => write!(f, "send failed: {}", e),
        }
    }
}

impl std::error::Error for TransportError {}

/// Ordered, timeout-bounded packet delivery between two endpoints
///
/// Dispositions (ack or timeout) come back through the packet router, not
/// through this trait.
pub trait Transport {
    /// Capability for sending on `port_id`/`channel_id`, if this module owns it
    fn get_capability(&self, port_id: &str, channel_id: &str) -> Option<ChannelCapability>;

    /// Enqueue `data` and return its sequence number
    fn send_packet(
        &mut self,
        capability: &ChannelCapability,
        source_port: &str,
        source_channel: &str,
        timeout_height: Height,
        timeout_timestamp: u64,
        data: Vec<u8>,
    ) -> Result<u64, TransportError>;
}
