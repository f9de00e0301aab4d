//! Packet lifecycle errors

use crate::data::StoreError;
use crate::network::{DecodeError, EncodeError, TransportError, UpdatePostPacketAck, ValidationError};

/// Errors that can occur in the packet lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// Module does not own the channel capability (setup error)
    CapabilityNotFound { port_id: String, channel_id: String },
    /// Packet payload could not be serialized
    EncodingFailed(String),
    /// Transport refused the packet
    Transport(String),
    /// Update request failed structural validation
    InvalidPacket(String),
    /// Post ID is not a base-10 unsigned integer
    InvalidIdentifier(String),
    /// Counterparty sent a result ack whose body is not a structured ack
    MalformedAcknowledgment(String),
    /// Acknowledgement is neither a result nor an error
    UnrecognizedAcknowledgmentFormat(String),
    /// Packet payload is not a known module packet
    UnrecognizedPacket(String),
    /// Record store error
    Database(String),
    /// A resolution policy hook failed
    Policy(String),
    /// Sync configuration is unusable
    InvalidConfig(String),
}

impl std::fmt::Display for PacketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PacketError::CapabilityNotFound { port_id, channel_id } => write!(
                f,
                "module does not own channel capability for {}/{}",
                port_id, channel_id
            ),
            PacketError::EncodingFailed(e) => write!(f, "cannot marshal the packet: {}", e),
            PacketError::Transport(e) => write!(f, "transport error: {}", e),
            PacketError::InvalidPacket(e) => write!(f, "invalid packet: {}", e),
            PacketError::InvalidIdentifier(e) => write!(f, "cannot parse post id: {}", e),
            PacketError::MalformedAcknowledgment(e) => {
                write!(f, "cannot unmarshal acknowledgment: {}", e)
            }
            PacketError::UnrecognizedAcknowledgmentFormat(e) => {
                write!(f, "invalid acknowledgment format: {}", e)
            }
            PacketError::UnrecognizedPacket(e) => write!(f, "unrecognized packet: {}", e),
            PacketError::Database(e) => write!(f, "database error: {}", e),
            PacketError::Policy(e) => write!(f, "resolution policy failed: {}", e),
            PacketError::InvalidConfig(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl std::error::Error for PacketError {}

impl From<StoreError> for PacketError {
    fn from(e: StoreError) -> Self {
        PacketError::Database(e.0)
    }
}

impl From<EncodeError> for PacketError {
    fn from(e: EncodeError) -> Self {
        PacketError::EncodingFailed(e.0)
    }
}

impl From<TransportError> for PacketError {
    fn from(e: TransportError) -> Self {
        PacketError::Transport(e.to_string())
    }
}

impl From<ValidationError> for PacketError {
    fn from(e: ValidationError) -> Self {
        PacketError::InvalidPacket(e.to_string())
    }
}

impl From<DecodeError> for PacketError {
    fn from(e: DecodeError) -> Self {
        PacketError::UnrecognizedPacket(e.to_string())
    }
}

/// Failure while receiving a packet
///
/// Validation failures carry no ack. An unparseable post ID carries the
/// negative ack alongside the error, so callers must propagate the error
/// and may still frame the ack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveError {
    pub ack: Option<UpdatePostPacketAck>,
    pub error: PacketError,
}

impl ReceiveError {
    pub fn without_ack(error: PacketError) -> Self {
        Self { ack: None, error }
    }

    pub fn with_ack(ack: UpdatePostPacketAck, error: PacketError) -> Self {
        Self { ack: Some(ack), error }
    }
}

impl std::fmt::Display for ReceiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for ReceiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<PacketError> for ReceiveError {
    fn from(e: PacketError) -> Self {
        ReceiveError::without_ack(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_error_display() {
        let err = PacketError::CapabilityNotFound {
            port_id: "blog".to_string(),
            channel_id: "channel-0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "module does not own channel capability for blog/channel-0"
        );

        let err = PacketError::InvalidIdentifier("invalid digit found in string".to_string());
        assert_eq!(err.to_string(), "cannot parse post id: invalid digit found in string");

        let err = PacketError::MalformedAcknowledgment("empty payload".to_string());
        assert_eq!(err.to_string(), "cannot unmarshal acknowledgment: empty payload");

        let err = PacketError::UnrecognizedAcknowledgmentFormat("unknown type: 0x9".to_string());
        assert_eq!(err.to_string(), "invalid acknowledgment format: unknown type: 0x9");
    }

    #[test]
    fn test_conversions() {
        let err: PacketError = StoreError("locked".to_string()).into();
        assert_eq!(err, PacketError::Database("locked".to_string()));

        let err: PacketError = ValidationError::EmptyTitle.into();
        assert_eq!(err, PacketError::InvalidPacket("title cannot be empty".to_string()));

        let err: PacketError = TransportError::InvalidTimeout.into();
        assert!(matches!(err, PacketError::Transport(_)));
    }

    #[test]
    fn test_receive_error_keeps_ack() {
        let err = ReceiveError::with_ack(
            UpdatePostPacketAck::failure(),
            PacketError::InvalidIdentifier("bad".to_string()),
        );
        assert_eq!(err.ack, Some(UpdatePostPacketAck::failure()));
        assert_eq!(err.to_string(), "cannot parse post id: bad");

        let err: ReceiveError = PacketError::InvalidPacket("x".to_string()).into();
        assert!(err.ack.is_none());
    }

    #[test]
    fn test_packet_error_is_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(PacketError::Database("x".to_string()));
        assert!(!err.to_string().is_empty());
    }
}
