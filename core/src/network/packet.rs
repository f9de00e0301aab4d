//! Packet wire format
//!
//! A [`Packet`] is the transport-level envelope. Its `data` is an encoded
//! [`PacketData`]: one type byte followed by a postcard payload.
//!
//! | Type byte | Payload |
//! |-----------|---------|
//! | `0x00`    | none (`NoData`) |
//! | `0x01`    | postcard `UpdatePostPacketData` |

use serde::{Deserialize, Serialize};

/// Maximum title length in bytes
pub const MAX_TITLE_LEN: usize = 256;

/// Maximum content length in bytes (64 KiB)
pub const MAX_CONTENT_LEN: usize = 64 * 1024;

/// Block height on the counterparty, used as a timeout bound
///
/// Ordered by revision first, then height. The zero height means
/// "no height timeout".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Height {
    pub revision_number: u64,
    pub revision_height: u64,
}

impl Height {
    pub fn new(revision_number: u64, revision_height: u64) -> Self {
        Self { revision_number, revision_height }
    }

    /// The disabled height
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }

    /// Same revision, `blocks` further on
    pub fn increment_by(&self, blocks: u64) -> Self {
        Self {
            revision_number: self.revision_number,
            revision_height: self.revision_height.saturating_add(blocks),
        }
    }
}

impl std::fmt::Display for Height {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

/// Transport envelope for one delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub sequence: u64,
    pub source_port: String,
    pub source_channel: String,
    pub destination_port: String,
    pub destination_channel: String,
    /// Opaque payload (an encoded `PacketData`)
    pub data: Vec<u8>,
    pub timeout_height: Height,
    /// Nanoseconds since the epoch; zero disables the timestamp bound
    pub timeout_timestamp: u64,
}

impl Packet {
    /// Whether the packet can no longer be received at the given destination
    /// height and time
    pub fn has_timed_out(&self, dest_height: Height, dest_timestamp: u64) -> bool {
        let height_expired = !self.timeout_height.is_zero() && dest_height >= self.timeout_height;
        let time_expired = self.timeout_timestamp != 0 && dest_timestamp >= self.timeout_timestamp;
        height_expired || time_expired
    }
}

/// Update request: overwrite title and content of the Post with `post_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePostPacketData {
    /// Decimal Post ID on the receiving partition
    pub post_id: String,
    pub title: String,
    pub content: String,
}

/// Structural problems with an update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyPostId,
    EmptyTitle,
    TitleTooLong(usize),
    ContentTooLong(usize),
    /// Post ID is not a plain base-10 u64 (no sign, no whitespace)
    InvalidPostId(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyPostId => write!(f, "post id cannot be empty"),
            ValidationError::EmptyTitle => write!(f, "title cannot be empty"),
            ValidationError::TitleTooLong(len) => {
                write!(f, "title too long ({} bytes, max {})", len, MAX_TITLE_LEN)
            }
            ValidationError::ContentTooLong(len) => {
                write!(f, "content too long ({} bytes, max {})", len, MAX_CONTENT_LEN)
            }
            ValidationError::InvalidPostId(id) => write!(f, "invalid post id {:?}", id),
        }
    }
}

impl std::error::Error for ValidationError {}

impl UpdatePostPacketData {
    pub fn new(post_id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    /// Structural checks only; the ID is not parsed here
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.post_id.trim().is_empty() {
            return Err(ValidationError::EmptyPostId);
        }
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.title.len() > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong(self.title.len()));
        }
        if self.content.len() > MAX_CONTENT_LEN {
            return Err(ValidationError::ContentTooLong(self.content.len()));
        }
        Ok(())
    }

    /// Parse `post_id` as a base-10 u64
    ///
    /// Only ASCII digits are accepted; `str::parse` alone would take a
    /// leading `+`.
    pub fn parse_post_id(&self) -> Result<u64, ValidationError> {
        let invalid = || ValidationError::InvalidPostId(self.post_id.clone());
        if !self.post_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        self.post_id.parse::<u64>().map_err(|_| invalid())
    }
}

/// Receiver's verdict on an update request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePostPacketAck {
    pub is_success: bool,
}

impl UpdatePostPacketAck {
    pub fn success() -> Self {
        Self { is_success: true }
    }

    pub fn failure() -> Self {
        Self { is_success: false }
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        postcard::to_allocvec(self).map_err(|e| EncodeError(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        decode_exact(bytes)
    }
}

/// Packet type prefix byte
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    NoData = 0x00,
    UpdatePost = 0x01,
}

impl TryFrom<u8> for PacketType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(PacketType::NoData),
            0x01 => Ok(PacketType::UpdatePost),
            _ => Err(()),
        }
    }
}

/// Module-level packet payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketData {
    NoData,
    UpdatePost(UpdatePostPacketData),
}

impl PacketData {
    pub fn packet_type(&self) -> PacketType {
        match self {
            PacketData::NoData => PacketType::NoData,
            PacketData::UpdatePost(_) => PacketType::UpdatePost,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        match self {
            PacketData::NoData => Ok(vec![PacketType::NoData as u8]),
            PacketData::UpdatePost(data) => Self::encode_update_post(data),
        }
    }

    /// Encode an update request without wrapping it in `PacketData` first
    pub fn encode_update_post(data: &UpdatePostPacketData) -> Result<Vec<u8>, EncodeError> {
        let payload = postcard::to_allocvec(data).map_err(|e| EncodeError(e.to_string()))?;
        let mut bytes = Vec::with_capacity(1 + payload.len());
        bytes.push(PacketType::UpdatePost as u8);
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let packet_type =
            PacketType::try_from(bytes[0]).map_err(|_| DecodeError::UnknownType(bytes[0]))?;

        match packet_type {
            PacketType::NoData => Ok(PacketData::NoData),
            PacketType::UpdatePost => {
                let data: UpdatePostPacketData = decode_exact(&bytes[1..])?;
                Ok(PacketData::UpdatePost(data))
            }
        }
    }
}

/// Decode a postcard value that must span the whole input
fn decode_exact<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, DecodeError> {
    let (value, rest) =
        postcard::take_from_bytes(bytes).map_err(|e| DecodeError::InvalidPayload(e.to_string()))?;
    if !rest.is_empty() {
        return Err(DecodeError::InvalidPayload(format!("{} trailing bytes", rest.len())));
    }
    Ok(value)
}

/// Error encoding a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError(pub String);

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "encode failed: {}", self.0)
    }
}

impl std::error::Error for EncodeError {}

/// Error decoding a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Empty payload
    Empty,
    /// Unknown type prefix
    UnknownType(u8),
    /// Invalid payload data
    InvalidPayload(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "empty payload"),
            DecodeError::UnknownType(t) => write!(f, "unknown type: {:#x}", t),
            DecodeError::InvalidPayload(e) => write!(f, "invalid payload: {}", e),
        }
    }
}

impl std::error::Error for DecodeError {}
