//! Packet router
//!
//! The channel-facing side of the module. The transport calls
//! `on_recv_packet`, `on_acknowledgement_packet` and `on_timeout_packet`;
//! the router decodes the module payload, drives the controller, frames the
//! acknowledgement and records a [`PacketEvent`] for every step.

use tracing::{debug, info, warn};

use crate::data::{RecordStore, SqliteStore};
use crate::network::{
    Acknowledgement, Height, Packet, PacketData, Transport, UpdatePostPacketData,
};

use super::config::SyncConfig;
use super::controller::{Outcome, PacketController};
use super::error::PacketError;
use super::events::{AcknowledgedEvent, PacketEvent, ReceivedEvent, SentEvent, TimedOutEvent};
use super::policy::{NoopPolicy, ResolutionPolicy};

/// Module packet callbacks wrapped around a [`PacketController`]
pub struct PacketRouter<S, T, P = NoopPolicy> {
    config: SyncConfig,
    controller: PacketController<S, T, P>,
    events: Vec<PacketEvent>,
}

impl<S, T, P> PacketRouter<S, T, P>
where
    S: RecordStore,
    T: Transport,
    P: ResolutionPolicy,
{
    pub fn new(config: SyncConfig, controller: PacketController<S, T, P>) -> Self {
        Self {
            config,
            controller,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn controller(&self) -> &PacketController<S, T, P> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PacketController<S, T, P> {
        &mut self.controller
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<PacketEvent> {
        std::mem::take(&mut self.events)
    }

    /// Send an update on `channel_id` from the configured port
    ///
    /// Timeouts are relative to the counterparty's latest known height and
    /// the current time (nanoseconds), per [`SyncConfig`].
    pub fn send_update_post(
        &mut self,
        data: &UpdatePostPacketData,
        channel_id: &str,
        counterparty_height: Height,
        now_nanos: u64,
    ) -> Result<u64, PacketError> {
        data.validate_basic()?;

        let timeout_height = self.config.timeout_height(counterparty_height);
        let timeout_timestamp = self.config.timeout_timestamp(now_nanos);

        let sequence = self.controller.transmit(
            data,
            &self.config.port_id,
            channel_id,
            timeout_height,
            timeout_timestamp,
        )?;

        self.events.push(PacketEvent::Sent(SentEvent {
            sequence,
            channel_id: channel_id.to_string(),
            post_id: data.post_id.clone(),
        }));

        Ok(sequence)
    }

    /// Process an inbound packet and produce the acknowledgement to write
    ///
    /// Any error (undecodable payload, invalid request, unparseable ID)
    /// becomes an error acknowledgement; otherwise the structured ack is
    /// returned as a result acknowledgement.
    pub fn on_recv_packet(&mut self, packet: &Packet) -> Acknowledgement {
        let data = match PacketData::decode(&packet.data) {
            Ok(PacketData::UpdatePost(data)) => data,
            Ok(PacketData::NoData) => {
                return self.reject_packet(packet, None, "packet carries no data".to_string());
            }
            Err(e) => {
                warn!(sequence = packet.sequence, error = %e, "cannot unmarshal packet data");
                return self.reject_packet(packet, None, format!("cannot unmarshal packet data: {}", e));
            }
        };

        let packet_ack = match self.controller.receive(packet, &data) {
            Ok(packet_ack) => packet_ack,
            Err(e) => {
                return self.reject_packet(packet, Some(data.post_id), e.to_string());
            }
        };

        let ack = match Acknowledgement::success(&packet_ack) {
            Ok(ack) => ack,
            Err(e) => {
                return self.reject_packet(packet, Some(data.post_id), e.to_string());
            }
        };

        self.events.push(PacketEvent::Received(ReceivedEvent {
            sequence: packet.sequence,
            post_id: Some(data.post_id),
            success: packet_ack.is_success,
            error: None,
        }));

        ack
    }

    /// Process the counterparty's acknowledgement for a packet we sent
    pub fn on_acknowledgement_packet(
        &mut self,
        packet: &Packet,
        ack_bytes: &[u8],
    ) -> Result<Outcome, PacketError> {
        let data = decode_update(packet)?;
        let outcome = self.controller.acknowledge_bytes(&data, ack_bytes)?;

        info!(sequence = packet.sequence, post_id = %data.post_id, outcome = ?outcome, "acknowledgement processed");

        self.events.push(PacketEvent::Acknowledged(AcknowledgedEvent {
            sequence: packet.sequence,
            post_id: data.post_id,
            outcome: outcome.clone(),
        }));

        Ok(outcome)
    }

    /// Process the expiry of a packet we sent
    pub fn on_timeout_packet(&mut self, packet: &Packet) -> Result<Outcome, PacketError> {
        let data = decode_update(packet)?;
        let outcome = self.controller.timeout(&data)?;

        self.events.push(PacketEvent::TimedOut(TimedOutEvent {
            sequence: packet.sequence,
            post_id: data.post_id,
        }));

        Ok(outcome)
    }

    fn reject_packet(&mut self, packet: &Packet, post_id: Option<String>, reason: String) -> Acknowledgement {
        debug!(sequence = packet.sequence, reason = %reason, "writing error acknowledgement");

        self.events.push(PacketEvent::Received(ReceivedEvent {
            sequence: packet.sequence,
            post_id,
            success: false,
            error: Some(reason.clone()),
        }));

        Acknowledgement::Error(reason)
    }
}

impl<T: Transport> PacketRouter<SqliteStore, T> {
    /// Validate `config` and open the record store it names
    ///
    /// Without a `db_path` the store is in-memory.
    pub fn open(config: SyncConfig, transport: T) -> Result<Self, PacketError> {
        config.validate().map_err(PacketError::InvalidConfig)?;

        let store = match &config.db_path {
            Some(path) => {
                let path = path.to_string_lossy();
                SqliteStore::open(&path).map_err(|e| PacketError::Database(e.to_string()))?
            }
            None => SqliteStore::in_memory()?,
        };

        info!(port = %config.port_id, db_path = ?config.db_path, "packet router opened");
        Ok(Self::new(config, PacketController::new(store, transport)))
    }
}

/// Decode the update request carried by a packet we sent
fn decode_update(packet: &Packet) -> Result<UpdatePostPacketData, PacketError> {
    match PacketData::decode(&packet.data)? {
        PacketData::UpdatePost(data) => Ok(data),
        PacketData::NoData => Err(PacketError::UnrecognizedPacket("packet carries no data".to_string())),
    }
}
