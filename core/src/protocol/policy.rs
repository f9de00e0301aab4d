//! Resolution policies
//!
//! Outcomes that currently need no local compensation (error acks, negative
//! acks, timeouts) are routed through [`ResolutionPolicy`] so retry or
//! rollback logic can be plugged in without touching the controller.

use tracing::debug;

use crate::data::RecordStore;
use crate::network::UpdatePostPacketData;

use super::error::PacketError;

/// Hooks for unresolved packet outcomes
///
/// Every hook runs inside the transition that observed the outcome and may
/// mutate the store. Returning an error fails that transition.
pub trait ResolutionPolicy {
    /// The counterparty answered with an error acknowledgement
    fn on_error_ack(
        &self,
        store: &mut dyn RecordStore,
        data: &UpdatePostPacketData,
        reason: &str,
    ) -> Result<(), PacketError>;

    /// The counterparty processed the packet but did not apply it
    fn on_rejected(
        &self,
        store: &mut dyn RecordStore,
        data: &UpdatePostPacketData,
    ) -> Result<(), PacketError>;

    /// The packet timed out before being received
    fn on_timeout(
        &self,
        store: &mut dyn RecordStore,
        data: &UpdatePostPacketData,
    ) -> Result<(), PacketError>;
}

/// Accepts every outcome without touching local state
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPolicy;

impl ResolutionPolicy for NoopPolicy {
    fn on_error_ack(
        &self,
        _store: &mut dyn RecordStore,
        data: &UpdatePostPacketData,
        reason: &str,
    ) -> Result<(), PacketError> {
        debug!(post_id = %data.post_id, reason, "error ack accepted, no compensation");
        Ok(())
    }

    fn on_rejected(
        &self,
        _store: &mut dyn RecordStore,
        data: &UpdatePostPacketData,
    ) -> Result<(), PacketError> {
        debug!(post_id = %data.post_id, "update rejected by counterparty, no compensation");
        Ok(())
    }

    fn on_timeout(
        &self,
        _store: &mut dyn RecordStore,
        data: &UpdatePostPacketData,
    ) -> Result<(), PacketError> {
        debug!(post_id = %data.post_id, "update timed out, no compensation");
        Ok(())
    }
}
