//! Acknowledgement envelope
//!
//! Written by the receiving partition after it processed a packet and
//! carried back to the sender. One type byte, then the body:
//!
//! | Type byte | Body |
//! |-----------|------|
//! | `0x01`    | raw result bytes (an encoded `UpdatePostPacketAck`) |
//! | `0x02`    | UTF-8 error message (invalid sequences are replaced) |

use super::packet::{DecodeError, EncodeError, UpdatePostPacketAck};

/// Acknowledgement type prefix byte
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckType {
    Result = 0x01,
    Error = 0x02,
}

impl TryFrom<u8> for AckType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(AckType::Result),
            0x02 => Ok(AckType::Error),
            _ => Err(()),
        }
    }
}

/// Receiver's response to a delivered packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// Packet was processed; body is the module's structured ack
    Result(Vec<u8>),
    /// Packet was rejected before a structured ack was produced
    Error(String),
}

impl Acknowledgement {
    /// Result acknowledgement carrying an encoded structured ack
    pub fn success(ack: &UpdatePostPacketAck) -> Result<Self, EncodeError> {
        Ok(Acknowledgement::Result(ack.encode()?))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Acknowledgement::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Acknowledgement::Error(_))
    }

    pub fn encode(&self) -> Vec<u8> {
        let (ack_type, body) = match self {
            Acknowledgement::Result(bytes) => (AckType::Result, bytes.as_slice()),
            Acknowledgement::Error(message) => (AckType::Error, message.as_bytes()),
        };
        let mut bytes = Vec::with_capacity(1 + body.len());
        bytes.push(ack_type as u8);
        bytes.extend_from_slice(body);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let ack_type = AckType::try_from(bytes[0]).map_err(|_| DecodeError::UnknownType(bytes[0]))?;

        match ack_type {
            AckType::Result => Ok(Acknowledgement::Result(bytes[1..].to_vec())),
            AckType::Error => Ok(Acknowledgement::Error(
                String::from_utf8_lossy(&bytes[1..]).into_owned(),
            )),
        }
    }
}
