//! Loopback transport - an in-process channel end
//!
//! Sends are queued locally with increasing sequence numbers. A
//! [`TestNetwork`](super::TestNetwork) drains the queue and decides each
//! packet's fate (delivery or timeout).

use std::collections::HashSet;

use crate::network::{ChannelCapability, Height, Packet, Transport, TransportError};

/// One end of a simulated channel
#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    port_id: String,
    channel_id: String,
    counterparty_port: String,
    counterparty_channel: String,
    /// (port, channel) pairs this module owns a capability for
    owned: HashSet<(String, String)>,
    open: bool,
    next_sequence: u64,
    pending: Vec<Packet>,
}

impl LoopbackTransport {
    /// Channel end owning `port_id`/`channel_id`, facing the same port on
    /// the counterparty's `channel_id`
    pub fn new(port_id: &str, channel_id: &str) -> Self {
        let mut owned = HashSet::new();
        owned.insert((port_id.to_string(), channel_id.to_string()));
        Self {
            port_id: port_id.to_string(),
            channel_id: channel_id.to_string(),
            counterparty_port: port_id.to_string(),
            counterparty_channel: channel_id.to_string(),
            owned,
            open: true,
            next_sequence: 1,
            pending: Vec::new(),
        }
    }

    /// Set the counterparty end written into outgoing packets
    pub fn with_counterparty(mut self, port_id: &str, channel_id: &str) -> Self {
        self.counterparty_port = port_id.to_string();
        self.counterparty_channel = channel_id.to_string();
        self
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Drop the module's capability for this channel end
    pub fn revoke_capability(&mut self) {
        self.owned.remove(&(self.port_id.clone(), self.channel_id.clone()));
    }

    /// Stop accepting sends
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Packets sent but not yet relayed
    pub fn pending(&self) -> &[Packet] {
        &self.pending
    }

    /// Remove and return all packets sent but not yet relayed
    pub fn take_pending(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.pending)
    }
}

impl Transport for LoopbackTransport {
    fn get_capability(&self, port_id: &str, channel_id: &str) -> Option<ChannelCapability> {
        self.owned
            .contains(&(port_id.to_string(), channel_id.to_string()))
            .then(|| ChannelCapability::new(port_id, channel_id))
    }

    fn send_packet(
        &mut self,
        capability: &ChannelCapability,
        source_port: &str,
        source_channel: &str,
        timeout_height: Height,
        timeout_timestamp: u64,
        data: Vec<u8>,
    ) -> Result<u64, TransportError> {
        if !capability.authorizes(source_port, source_channel) {
            return Err(TransportError::Unauthorized {
                port_id: source_port.to_string(),
                channel_id: source_channel.to_string(),
            });
        }
        if source_port != self.port_id || source_channel != self.channel_id || !self.open {
            return Err(TransportError::ChannelClosed(source_channel.to_string()));
        }
        if timeout_height.is_zero() && timeout_timestamp == 0 {
            return Err(TransportError::InvalidTimeout);
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.pending.push(Packet {
            sequence,
            source_port: source_port.to_string(),
            source_channel: source_channel.to_string(),
            destination_port: self.counterparty_port.clone(),
            destination_channel: self.counterparty_channel.clone(),
            data,
            timeout_height,
            timeout_timestamp,
        });

        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(transport: &mut LoopbackTransport, timeout_timestamp: u64) -> Result<u64, TransportError> {
        let cap = transport.get_capability("blog", "channel-0").unwrap();
        transport.send_packet(&cap, "blog", "channel-0", Height::zero(), timeout_timestamp, vec![1])
    }

    #[test]
    fn test_sequences_increase() {
        let mut transport = LoopbackTransport::new("blog", "channel-0").with_counterparty("blog", "channel-1");

        assert_eq!(send(&mut transport, 10).unwrap(), 1);
        assert_eq!(send(&mut transport, 10).unwrap(), 2);

        let pending = transport.take_pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1].destination_channel, "channel-1");
        assert!(transport.pending().is_empty());
    }

    #[test]
    fn test_capability_lookup() {
        let mut transport = LoopbackTransport::new("blog", "channel-0");
        assert!(transport.get_capability("blog", "channel-1").is_none());

        transport.revoke_capability();
        assert!(transport.get_capability("blog", "channel-0").is_none());
    }

    #[test]
    fn test_rejects_bad_sends() {
        let mut transport = LoopbackTransport::new("blog", "channel-0");
        assert_eq!(send(&mut transport, 0), Err(TransportError::InvalidTimeout));

        let foreign = ChannelCapability::new("blog", "channel-5");
        assert!(matches!(
            transport.send_packet(&foreign, "blog", "channel-0", Height::zero(), 1, vec![]),
            Err(TransportError::Unauthorized { .. })
        ));

        transport.close();
        assert!(matches!(send(&mut transport, 10), Err(TransportError::ChannelClosed(_))));
        assert!(transport.pending().is_empty());
    }
}
