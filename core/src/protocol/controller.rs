//! Packet lifecycle controller
//!
//! Owns the four transitions of an update packet:
//!
//! ```text
//! sender:   Idle ─transmit─► Sent ─┬─ acknowledge(Result{true})  ─► Confirmed
//!                                  ├─ acknowledge(Result{false}) ─► Rejected
//!                                  ├─ acknowledge(Error)         ─► Errored
//!                                  ├─ acknowledge(undecodable)   ─► AckMalformed (error)
//!                                  └─ timeout                    ─► TimedOut
//!
//! receiver: Received ─receive─► Applied | NotFound
//! ```
//!
//! Every transition runs to completion on the caller's thread. Only
//! `Confirmed` touches the sender's local state (the SentPost title); the
//! other outcomes go to the [`ResolutionPolicy`].

use tracing::{debug, info, trace, warn};

use crate::data::{RecordStore, SentPost};
use crate::network::{
    Acknowledgement, DecodeError, Height, Packet, PacketData, Transport, UpdatePostPacketAck,
    UpdatePostPacketData,
};

use super::error::{PacketError, ReceiveError};
use super::policy::{NoopPolicy, ResolutionPolicy};

/// Terminal sender-side state of an update packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Counterparty applied the update. `reconciled` is false when there
    /// was no SentPost to update.
    Confirmed { reconciled: bool },
    /// Counterparty processed the update but had nothing to apply it to
    Rejected,
    /// Counterparty answered with an error acknowledgement
    Errored(String),
    /// Packet was never received before its timeout
    TimedOut,
}

/// Drives transmit / receive / acknowledge / timeout against a record store
/// and a transport
pub struct PacketController<S, T, P = NoopPolicy> {
    store: S,
    transport: T,
    policy: P,
}

impl<S, T> PacketController<S, T, NoopPolicy>
where
    S: RecordStore,
    T: Transport,
{
    /// Controller with the no-op resolution policy
    pub fn new(store: S, transport: T) -> Self {
        Self::with_policy(store, transport, NoopPolicy)
    }
}

impl<S, T, P> PacketController<S, T, P>
where
    S: RecordStore,
    T: Transport,
    P: ResolutionPolicy,
{
    pub fn with_policy(store: S, transport: T, policy: P) -> Self {
        Self { store, transport, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn into_parts(self) -> (S, T, P) {
        (self.store, self.transport, self.policy)
    }

    /// Send an update request to the counterparty
    ///
    /// Returns the transport-assigned sequence number. Nothing is sent on any
    /// error path, and no local record is touched.
    pub fn transmit(
        &mut self,
        data: &UpdatePostPacketData,
        source_port: &str,
        source_channel: &str,
        timeout_height: Height,
        timeout_timestamp: u64,
    ) -> Result<u64, PacketError> {
        let capability = match self.transport.get_capability(source_port, source_channel) {
            Some(cap) => cap,
            None => {
                warn!(port = source_port, channel = source_channel, "module does not own channel capability");
                return Err(PacketError::CapabilityNotFound {
                    port_id: source_port.to_string(),
                    channel_id: source_channel.to_string(),
                });
            }
        };

        let bytes = PacketData::encode_update_post(data)?;

        let sequence = self.transport.send_packet(
            &capability,
            source_port,
            source_channel,
            timeout_height,
            timeout_timestamp,
            bytes,
        )?;

        debug!(
            post_id = %data.post_id,
            sequence,
            port = source_port,
            channel = source_channel,
            timeout_height = %timeout_height,
            timeout_timestamp,
            "update packet sent"
        );

        Ok(sequence)
    }

    /// Apply an inbound update request to the local Post
    ///
    /// - structurally invalid request: error, no ack
    /// - unparseable post ID: error AND negative ack
    /// - unknown post ID: negative ack, no error, no mutation
    /// - known post ID: title and content overwritten, positive ack
    pub fn receive(
        &mut self,
        packet: &Packet,
        data: &UpdatePostPacketData,
    ) -> Result<UpdatePostPacketAck, ReceiveError> {
        trace!(sequence = packet.sequence, channel = %packet.destination_channel, "receiving update packet");

        if let Err(e) = data.validate_basic() {
            debug!(sequence = packet.sequence, error = %e, "update packet failed validation");
            return Err(ReceiveError::without_ack(e.into()));
        }

        let post_id = match data.parse_post_id() {
            Ok(id) => id,
            Err(e) => {
                warn!(sequence = packet.sequence, post_id = %data.post_id, error = %e, "cannot parse post id");
                return Err(ReceiveError::with_ack(
                    UpdatePostPacketAck::failure(),
                    PacketError::InvalidIdentifier(e.to_string()),
                ));
            }
        };

        let Some(mut post) = self.store.get_post(post_id).map_err(PacketError::from)? else {
            debug!(sequence = packet.sequence, post_id, "post not found, update not applied");
            return Ok(UpdatePostPacketAck::failure());
        };

        post.title = data.title.clone();
        post.content = data.content.clone();
        self.store.set_post(&post).map_err(PacketError::from)?;

        debug!(sequence = packet.sequence, post_id, "update applied");
        Ok(UpdatePostPacketAck::success())
    }

    /// Handle the counterparty's acknowledgement for `data`
    pub fn acknowledge(
        &mut self,
        data: &UpdatePostPacketData,
        ack: &Acknowledgement,
    ) -> Result<Outcome, PacketError> {
        match ack {
            Acknowledgement::Error(reason) => {
                debug!(post_id = %data.post_id, reason = %reason, "error acknowledgement");
                self.policy.on_error_ack(&mut self.store, data, reason)?;
                Ok(Outcome::Errored(reason.clone()))
            }
            Acknowledgement::Result(bytes) => {
                let packet_ack = UpdatePostPacketAck::decode(bytes).map_err(|e| {
                    warn!(
                        post_id = %data.post_id,
                        ack = %hex::encode(bytes),
                        error = %e,
                        "counterparty returned an undecodable acknowledgement"
                    );
                    PacketError::MalformedAcknowledgment(e.to_string())
                })?;
                self.reconcile(data, packet_ack)
            }
        }
    }

    /// Like [`acknowledge`](Self::acknowledge), starting from the raw
    /// acknowledgement bytes
    ///
    /// Bytes that are neither a result nor an error acknowledgement are an
    /// unrecognized format.
    pub fn acknowledge_bytes(
        &mut self,
        data: &UpdatePostPacketData,
        ack_bytes: &[u8],
    ) -> Result<Outcome, PacketError> {
        let ack = Acknowledgement::decode(ack_bytes).map_err(|e: DecodeError| {
            warn!(
                post_id = %data.post_id,
                ack = %hex::encode(ack_bytes),
                error = %e,
                "unrecognized acknowledgement format"
            );
            PacketError::UnrecognizedAcknowledgmentFormat(e.to_string())
        })?;
        self.acknowledge(data, &ack)
    }

    /// Handle a packet that timed out before the counterparty received it
    pub fn timeout(&mut self, data: &UpdatePostPacketData) -> Result<Outcome, PacketError> {
        debug!(post_id = %data.post_id, "update packet timed out");
        self.policy.on_timeout(&mut self.store, data)?;
        Ok(Outcome::TimedOut)
    }

    fn reconcile(
        &mut self,
        data: &UpdatePostPacketData,
        packet_ack: UpdatePostPacketAck,
    ) -> Result<Outcome, PacketError> {
        // The transmit path only sends well-formed IDs
        let post_id = match data.parse_post_id() {
            Ok(id) => id,
            Err(e) => {
                debug!(post_id = %data.post_id, error = %e, "unparseable post id in acknowledged packet");
                return Ok(outcome_without_reconcile(packet_ack));
            }
        };

        if !packet_ack.is_success {
            debug!(post_id, "update rejected by counterparty");
            self.policy.on_rejected(&mut self.store, data)?;
            return Ok(Outcome::Rejected);
        }

        let Some(sent) = self.store.get_sent_post(post_id)? else {
            debug!(post_id, "no sent post to reconcile");
            return Ok(Outcome::Confirmed { reconciled: false });
        };

        let sent = SentPost {
            title: data.title.clone(),
            ..sent
        };
        self.store.set_sent_post(&sent)?;

        info!(post_id, title = %sent.title, "sent post reconciled");
        Ok(Outcome::Confirmed { reconciled: true })
    }
}

fn outcome_without_reconcile(packet_ack: UpdatePostPacketAck) -> Outcome {
    if packet_ack.is_success {
        Outcome::Confirmed { reconciled: false }
    } else {
        Outcome::Rejected
    }
}
