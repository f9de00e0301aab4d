//! Test network - two partitions joined by one channel
//!
//! Routes packets between two in-process partitions without a real
//! transport. Each partition has its own in-memory record store, block
//! height and clock; relaying a packet either delivers it (and carries the
//! acknowledgement back) or, if the destination has passed the packet's
//! timeout, reports the timeout to the sender. Every packet gets exactly
//! one of the two.

use crate::data::{SqliteStore, StoreError};
use crate::network::{Acknowledgement, Height, UpdatePostPacketData};
use crate::protocol::{Outcome, PacketController, PacketError, PacketRouter, SyncConfig};

use super::transport::LoopbackTransport;

/// Channel end names used by both partitions
pub const CHANNEL_A: &str = "channel-0";
pub const CHANNEL_B: &str = "channel-1";

/// Start of the simulated clock (nanoseconds)
const GENESIS_TIME_NANOS: u64 = 1_700_000_000_000_000_000;

/// Nanoseconds per second
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Which side of the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// One simulated partition
pub struct TestChain {
    pub router: PacketRouter<SqliteStore, LoopbackTransport>,
    pub height: Height,
    pub time_nanos: u64,
}

impl TestChain {
    fn new(config: SyncConfig, channel: &str, counterparty_channel: &str) -> Result<Self, StoreError> {
        let transport = LoopbackTransport::new(&config.port_id, channel)
            .with_counterparty(&config.port_id, counterparty_channel);
        let store = SqliteStore::in_memory()?;
        Ok(Self {
            router: PacketRouter::new(config, PacketController::new(store, transport)),
            height: Height::new(0, 1),
            time_nanos: GENESIS_TIME_NANOS,
        })
    }

    pub fn channel_id(&self) -> &str {
        self.router.controller().transport().channel_id()
    }

    pub fn store(&self) -> &SqliteStore {
        self.router.controller().store()
    }

    pub fn store_mut(&mut self) -> &mut SqliteStore {
        self.router.controller_mut().store_mut()
    }
}

/// What happened to one relayed packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relayed {
    pub sequence: u64,
    /// Acknowledgement written by the destination; None on timeout
    pub ack: Option<Acknowledgement>,
    /// Sender-side result of the acknowledgement or timeout
    pub result: Result<Outcome, PacketError>,
}

/// A simulated pair of partitions
pub struct TestNetwork {
    a: TestChain,
    b: TestChain,
}

impl TestNetwork {
    /// Both partitions with the testing config
    pub fn new() -> Result<Self, StoreError> {
        Self::with_config(SyncConfig::for_testing())
    }

    pub fn with_config(config: SyncConfig) -> Result<Self, StoreError> {
        Ok(Self {
            a: TestChain::new(config.clone(), CHANNEL_A, CHANNEL_B)?,
            b: TestChain::new(config, CHANNEL_B, CHANNEL_A)?,
        })
    }

    pub fn chain(&self, side: Side) -> &TestChain {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    pub fn chain_mut(&mut self, side: Side) -> &mut TestChain {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }

    /// Move a partition forward by `blocks` blocks and `secs` seconds
    pub fn advance(&mut self, side: Side, blocks: u64, secs: u64) {
        let chain = self.chain_mut(side);
        chain.height = chain.height.increment_by(blocks);
        chain.time_nanos = chain.time_nanos.saturating_add(secs.saturating_mul(NANOS_PER_SEC));
    }

    /// Send an update from `side` to the other partition
    pub fn send_update(&mut self, side: Side, data: &UpdatePostPacketData) -> Result<u64, PacketError> {
        let counterparty_height = self.chain(side.other()).height;
        let chain = self.chain_mut(side);
        let channel = chain.channel_id().to_string();
        let now = chain.time_nanos;
        chain.router.send_update_post(data, &channel, counterparty_height, now)
    }

    /// Relay every pending packet sent by `side`
    pub fn relay(&mut self, side: Side) -> Vec<Relayed> {
        self.relay_with(side, |ack| ack.encode())
    }

    /// Relay every pending packet sent by `side`, passing each
    /// acknowledgement through `rewrite` on its way back
    pub fn relay_with<F>(&mut self, side: Side, mut rewrite: F) -> Vec<Relayed>
    where
        F: FnMut(&Acknowledgement) -> Vec<u8>,
    {
        let (src, dst) = match side {
            Side::A => (&mut self.a, &mut self.b),
            Side::B => (&mut self.b, &mut self.a),
        };

        let packets = src.router.controller_mut().transport_mut().take_pending();
        let mut relayed = Vec::with_capacity(packets.len());

        for packet in packets {
            if packet.has_timed_out(dst.height, dst.time_nanos) {
                let result = src.router.on_timeout_packet(&packet);
                relayed.push(Relayed { sequence: packet.sequence, ack: None, result });
                continue;
            }

            let ack = dst.router.on_recv_packet(&packet);
            let result = src.router.on_acknowledgement_packet(&packet, &rewrite(&ack));
            relayed.push(Relayed { sequence: packet.sequence, ack: Some(ack), result });
        }

        relayed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Post, RecordStore, SentPost};
    use crate::network::UpdatePostPacketAck;
    use crate::protocol::PacketEvent;

    fn seed(network: &mut TestNetwork, id: u64) {
        network
            .chain_mut(Side::B)
            .store_mut()
            .set_post(&Post {
                id,
                title: "old".to_string(),
                content: "old".to_string(),
                creator: "bob".to_string(),
            })
            .unwrap();
        network
            .chain_mut(Side::A)
            .store_mut()
            .set_sent_post(&SentPost { id, title: "old".to_string() })
            .unwrap();
    }

    fn update(post_id: &str) -> UpdatePostPacketData {
        UpdatePostPacketData::new(post_id, "new", "new-body")
    }

    #[test]
    fn test_update_is_applied_and_confirmed() {
        crate::testing::init_tracing();
        let mut network = TestNetwork::new().unwrap();
        seed(&mut network, 7);

        let sequence = network.send_update(Side::A, &update("7")).unwrap();
        let relayed = network.relay(Side::A);

        assert_eq!(relayed.len(), 1);
        assert_eq!(relayed[0].sequence, sequence);
        assert_eq!(relayed[0].result, Ok(Outcome::Confirmed { reconciled: true }));

        let post = network.chain(Side::B).store().get_post(7).unwrap().unwrap();
        assert_eq!(post.title, "new");
        assert_eq!(post.content, "new-body");
        assert_eq!(post.creator, "bob");

        let sent = network.chain(Side::A).store().get_sent_post(7).unwrap().unwrap();
        assert_eq!(sent.title, "new");
    }

    #[test]
    fn test_missing_target_is_rejected() {
        let mut network = TestNetwork::new().unwrap();
        network
            .chain_mut(Side::A)
            .store_mut()
            .set_sent_post(&SentPost { id: 9, title: "old".to_string() })
            .unwrap();

        network.send_update(Side::A, &update("9")).unwrap();
        let relayed = network.relay(Side::A);

        assert_eq!(
            relayed[0].ack,
            Some(Acknowledgement::success(&UpdatePostPacketAck::failure()).unwrap())
        );
        assert_eq!(relayed[0].result, Ok(Outcome::Rejected));
        assert!(network.chain(Side::B).store().all_posts().unwrap().is_empty());
        assert_eq!(network.chain(Side::A).store().get_sent_post(9).unwrap().unwrap().title, "old");
    }

    #[test]
    fn test_bad_identifier_comes_back_as_error_ack() {
        let mut network = TestNetwork::new().unwrap();
        seed(&mut network, 7);

        network.send_update(Side::A, &update("abc")).unwrap();
        let relayed = network.relay(Side::A);

        assert!(relayed[0].ack.as_ref().unwrap().is_error());
        assert!(matches!(relayed[0].result, Ok(Outcome::Errored(_))));
        assert_eq!(network.chain(Side::A).store().get_sent_post(7).unwrap().unwrap().title, "old");
    }

    #[test]
    fn test_timeout_by_height() {
        let mut network = TestNetwork::new().unwrap();
        seed(&mut network, 7);

        network.send_update(Side::A, &update("7")).unwrap();
        // testing config: 5 block height offset
        network.advance(Side::B, 5, 0);
        let relayed = network.relay(Side::A);

        assert_eq!(relayed[0].ack, None);
        assert_eq!(relayed[0].result, Ok(Outcome::TimedOut));
        assert_eq!(network.chain(Side::B).store().get_post(7).unwrap().unwrap().title, "old");
        assert_eq!(network.chain(Side::A).store().get_sent_post(7).unwrap().unwrap().title, "old");
    }

    #[test]
    fn test_timeout_by_timestamp() {
        let mut network = TestNetwork::new().unwrap();
        seed(&mut network, 7);

        network.send_update(Side::A, &update("7")).unwrap();
        network.advance(Side::B, 0, 10);
        let relayed = network.relay(Side::A);

        assert_eq!(relayed[0].result, Ok(Outcome::TimedOut));
    }

    #[test]
    fn test_just_before_timeout_is_delivered() {
        let mut network = TestNetwork::new().unwrap();
        seed(&mut network, 7);

        network.send_update(Side::A, &update("7")).unwrap();
        network.advance(Side::B, 4, 9);
        let relayed = network.relay(Side::A);

        assert_eq!(relayed[0].result, Ok(Outcome::Confirmed { reconciled: true }));
    }

    #[test]
    fn test_malformed_ack_is_reported() {
        let mut network = TestNetwork::new().unwrap();
        seed(&mut network, 7);

        network.send_update(Side::A, &update("7")).unwrap();
        let relayed = network.relay_with(Side::A, |_| vec![0x01, 0x07]);

        assert!(matches!(relayed[0].result, Err(PacketError::MalformedAcknowledgment(_))));
        // The receiver applied it; the sender could not tell
        assert_eq!(network.chain(Side::B).store().get_post(7).unwrap().unwrap().title, "new");
        assert_eq!(network.chain(Side::A).store().get_sent_post(7).unwrap().unwrap().title, "old");
    }

    #[test]
    fn test_unrecognized_ack_is_reported() {
        let mut network = TestNetwork::new().unwrap();
        seed(&mut network, 7);

        network.send_update(Side::A, &update("7")).unwrap();
        let relayed = network.relay_with(Side::A, |_| vec![0x33]);

        assert!(matches!(
            relayed[0].result,
            Err(PacketError::UnrecognizedAcknowledgmentFormat(_))
        ));
    }

    #[test]
    fn test_each_packet_disposed_once() {
        let mut network = TestNetwork::new().unwrap();
        seed(&mut network, 7);

        network.send_update(Side::A, &update("7")).unwrap();
        network.send_update(Side::A, &update("8")).unwrap();

        assert_eq!(network.relay(Side::A).len(), 2);
        assert!(network.relay(Side::A).is_empty());

        let events = network.chain_mut(Side::A).router.drain_events();
        let sequences: Vec<u64> = events.iter().map(|e| e.sequence()).collect();
        assert_eq!(sequences, vec![1, 2, 1, 2]);
        assert!(matches!(events[2], PacketEvent::Acknowledged(_)));
    }

    #[test]
    fn test_updates_flow_both_ways() {
        let mut network = TestNetwork::new().unwrap();
        network
            .chain_mut(Side::A)
            .store_mut()
            .append_post("a-title", "a-body", "alice")
            .unwrap();

        network.send_update(Side::B, &update("0")).unwrap();
        let relayed = network.relay(Side::B);

        assert_eq!(relayed[0].result, Ok(Outcome::Confirmed { reconciled: false }));
        assert_eq!(network.chain(Side::A).store().get_post(0).unwrap().unwrap().title, "new");
    }

    #[test]
    fn test_retry_after_timeout() {
        let mut network = TestNetwork::new().unwrap();
        seed(&mut network, 7);

        network.send_update(Side::A, &update("7")).unwrap();
        network.advance(Side::B, 10, 0);
        assert_eq!(network.relay(Side::A)[0].result, Ok(Outcome::TimedOut));

        // Retries are driven by the caller; the new packet times out relative
        // to the counterparty's current height
        let retry = network.send_update(Side::A, &update("7")).unwrap();
        let relayed = network.relay(Side::A);

        assert_eq!(retry, 2);
        assert_eq!(relayed[0].result, Ok(Outcome::Confirmed { reconciled: true }));
    }

    #[test]
    fn test_send_without_capability() {
        let mut network = TestNetwork::new().unwrap();
        network
            .chain_mut(Side::A)
            .router
            .controller_mut()
            .transport_mut()
            .revoke_capability();

        let err = network.send_update(Side::A, &update("7")).unwrap_err();
        assert!(matches!(err, PacketError::CapabilityNotFound { .. }));
        assert!(network.relay(Side::A).is_empty());
    }
}
