//! Base channel names.

pub const TRANSACTIONS: &str = "transactions";
pub const UNSIGNED_TRANSACTIONS: &str = "unsignedTransactions";
pub const REWARDS_TRANSACTIONS: &str = "rewardsTransactions";
pub const SHARD_BLOCKS: &str = "shardBlocks";
pub const TX_BLOCK_BODIES: &str = "txBlockBodies";
pub const PEER_CHANGE_BLOCK_BODIES: &str = "peerChangeBlockBodies";
pub const METACHAIN_BLOCKS: &str = "metachainBlocks";
pub const ACCOUNT_TRIE_NODES: &str = "accountTrieNodes";
pub const VALIDATOR_TRIE_NODES: &str = "validatorTrieNodes";

/// Unsharded heartbeat topic.
pub const HEARTBEAT: &str = "heartbeat";

/// Channels expanded by [`crate::generate_topics`], in catalogue order.
pub const SHARDED: [&str; 9] = [
    TRANSACTIONS,
    UNSIGNED_TRANSACTIONS,
    REWARDS_TRANSACTIONS,
    SHARD_BLOCKS,
    TX_BLOCK_BODIES,
    PEER_CHANGE_BLOCK_BODIES,
    METACHAIN_BLOCKS,
    ACCOUNT_TRIE_NODES,
    VALIDATOR_TRIE_NODES,
];

/// Suffix used by channels that are shared by every shard.
pub const ALL_SUFFIX: &str = "ALL";
