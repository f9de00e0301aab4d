//! Network layer
//!
//! Contains:
//! - Packet: transport envelope, module payloads and their codec
//! - Ack: the Result/Error acknowledgement envelope
//! - Transport: the capability-gated send seam

pub mod ack;
pub mod packet;
pub mod transport;

pub use ack::{AckType, Acknowledgement};
pub use packet::{
    DecodeError, EncodeError, Height, Packet, PacketData, PacketType, UpdatePostPacketAck,
    UpdatePostPacketData, ValidationError, MAX_CONTENT_LEN, MAX_TITLE_LEN,
};
pub use transport::{ChannelCapability, Transport, TransportError};
