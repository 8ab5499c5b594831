//! Reward transactions and their mini-blocks.

use std::collections::BTreeMap;

use bytes::Bytes;
use prost::Message;
use rand::Rng;
use siege_primitives::{Address, ShardCoordinator, ShardId};
use siege_topics::{TopicName, channel, topic};
use siege_wire::{
    TxHash, denominate, encode_big_uint,
    proto::{MiniBlock, REWARDS_BLOCK_TYPE, RewardTx},
};

use crate::transfer::DENOMINATION;

/// Metablock context rewards are issued in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EconomicsSnapshot {
    pub round: u64,
    pub epoch: u32,
    /// Smallest reward, in whole tokens.
    pub base_amount: f64,
}

impl Default for EconomicsSnapshot {
    fn default() -> Self {
        Self {
            round: 49_056,
            epoch: 77,
            base_amount: 1_000_000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reward {
    pub tx: RewardTx,
    pub hash: TxHash,
    pub shard: ShardId,
    pub bytes: Bytes,
}

impl Reward {
    pub fn new(tx: RewardTx, shard: ShardId) -> Self {
        let bytes = Bytes::from(tx.encode_to_vec());
        Self {
            hash: TxHash::of(&bytes),
            tx,
            shard,
            bytes,
        }
    }
}

/// Reward `receiver` with `base_amount` plus up to 100 tokens.
pub fn build_reward<R: Rng>(
    snapshot: &EconomicsSnapshot,
    receiver: Address,
    coordinator: &ShardCoordinator,
    rng: &mut R,
) -> Reward {
    let amount = snapshot.base_amount + 100.0 * rng.random::<f64>();
    let tx = RewardTx {
        round: snapshot.round,
        epoch: snapshot.epoch,
        value: encode_big_uint(denominate(amount, DENOMINATION)),
        rcv_addr: receiver.as_bytes().to_vec(),
    };
    Reward::new(tx, coordinator.compute_shard(&receiver))
}

/// Rewards grouped for broadcast.
#[derive(Debug, Default)]
pub struct RewardBundle {
    /// One mini-block per receiving shard, in shard order.
    pub mini_blocks: Vec<MiniBlock>,
    /// Serialized rewards per topic, in mini-block hash order.
    pub broadcasts: Vec<(TopicName, Vec<Bytes>)>,
}

pub fn bundle_rewards(rewards: Vec<Reward>) -> RewardBundle {
    let mut groups: BTreeMap<ShardId, Vec<Reward>> = BTreeMap::new();
    for reward in rewards {
        groups.entry(reward.shard).or_default().push(reward);
    }

    let mut bundle = RewardBundle::default();
    for (shard, mut group) in groups {
        group.sort_by(|a, b| a.hash.cmp(&b.hash));

        bundle.mini_blocks.push(MiniBlock {
            tx_hashes: group.iter().map(|r| r.hash.as_bytes().to_vec()).collect(),
            receiver_shard_id: shard.get(),
            sender_shard_id: ShardId::META.get(),
            r#type: REWARDS_BLOCK_TYPE,
        });
        bundle.broadcasts.push((
            topic(channel::REWARDS_TRANSACTIONS, ShardId::META, shard),
            group.into_iter().map(|r| r.bytes).collect(),
        ));
    }
    bundle
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use siege_wire::decode_big_uint;

    use super::*;

    fn reward(seed: u8, shard: ShardId) -> Reward {
        let tx = RewardTx {
            round: 1,
            epoch: 1,
            value: encode_big_uint(u128::from(seed)),
            rcv_addr: vec![seed; 32],
        };
        Reward::new(tx, shard)
    }

    #[test]
    fn groups_by_receiver_shard_in_hash_order() {
        let rewards = vec![
            reward(1, ShardId::new(0)),
            reward(2, ShardId::new(0)),
            reward(3, ShardId::new(1)),
            reward(4, ShardId::META),
        ];
        let bundle = bundle_rewards(rewards);

        let sizes: Vec<(u32, usize)> = bundle
            .mini_blocks
            .iter()
            .map(|mb| (mb.receiver_shard_id, mb.tx_hashes.len()))
            .collect();
        assert_eq!(sizes, vec![(0, 2), (1, 1), (u32::MAX, 1)]);

        for mb in &bundle.mini_blocks {
            assert_eq!(mb.sender_shard_id, u32::MAX);
            assert_eq!(mb.r#type, REWARDS_BLOCK_TYPE);
            assert!(mb.tx_hashes.windows(2).all(|w| w[0] < w[1]));
        }

        let topics: Vec<&str> = bundle.broadcasts.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(
            topics,
            vec![
                "rewardsTransactions_0_META",
                "rewardsTransactions_1_META",
                "rewardsTransactions_META",
            ]
        );

        let (_, shard0) = &bundle.broadcasts[0];
        let hashes: Vec<Vec<u8>> = shard0
            .iter()
            .map(|bytes| TxHash::of(bytes).as_bytes().to_vec())
            .collect();
        assert_eq!(hashes, bundle.mini_blocks[0].tx_hashes);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let bundle = bundle_rewards(Vec::new());
        assert!(bundle.mini_blocks.is_empty());
        assert!(bundle.broadcasts.is_empty());
    }

    #[test]
    fn amounts_stay_within_the_bonus_range() {
        let coordinator = ShardCoordinator::new(2).unwrap();
        let snapshot = EconomicsSnapshot::default();
        let mut rng = StdRng::seed_from_u64(4);
        let unit = 10u128.pow(DENOMINATION);

        for _ in 0..50 {
            let reward = build_reward(&snapshot, Address::new([1; 32]), &coordinator, &mut rng);
            let value = decode_big_uint(&reward.tx.value).unwrap();
            // Float scaling may land just below the whole amount.
            assert!(value >= 999_999 * unit);
            assert!(value <= 1_000_101 * unit);
            assert_eq!(reward.tx.round, 49_056);
            assert_eq!(reward.tx.epoch, 77);
            assert_eq!(reward.shard, ShardId::new(1));
        }
    }
}
