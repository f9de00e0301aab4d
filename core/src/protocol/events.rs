//! Packet events
//!
//! Emitted by the packet router for every lifecycle step so the embedding
//! partition can index or surface them.

use super::controller::Outcome;

/// Events emitted by the packet router
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketEvent {
    /// An update packet left this partition
    Sent(SentEvent),
    /// An update packet from the counterparty was processed
    Received(ReceivedEvent),
    /// The counterparty's acknowledgement was processed
    Acknowledged(AcknowledgedEvent),
    /// An update packet expired before being received
    TimedOut(TimedOutEvent),
}

/// Event: update packet sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEvent {
    pub sequence: u64,
    pub channel_id: String,
    pub post_id: String,
}

/// Event: inbound packet processed
///
/// `post_id` is None when the payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedEvent {
    pub sequence: u64,
    pub post_id: Option<String>,
    /// Structured ack verdict (false whenever an error ack was written)
    pub success: bool,
    /// Why an error acknowledgement was written, if one was
    pub error: Option<String>,
}

/// Event: acknowledgement processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcknowledgedEvent {
    pub sequence: u64,
    pub post_id: String,
    pub outcome: Outcome,
}

/// Event: packet timed out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedOutEvent {
    pub sequence: u64,
    pub post_id: String,
}

impl PacketEvent {
    /// Sequence number of the packet this event is about
    pub fn sequence(&self) -> u64 {
        match self {
            PacketEvent::Sent(e) => e.sequence,
            PacketEvent::Received(e) => e.sequence,
            PacketEvent::Acknowledged(e) => e.sequence,
            PacketEvent::TimedOut(e) => e.sequence,
        }
    }
}
