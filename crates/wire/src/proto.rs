//! Protobuf messages.
//!
//! Field numbers follow the target network's schemas.

/// Mini-block type carrying reward transactions.
pub const REWARDS_BLOCK_TYPE: i32 = 255;

/// A signed transfer transaction.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Transaction {
    #[prost(uint64, tag = "1")]
    pub nonce: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub rcv_addr: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub snd_addr: Vec<u8>,
    #[prost(uint64, tag = "5")]
    pub gas_price: u64,
    #[prost(uint64, tag = "6")]
    pub gas_limit: u64,
    #[prost(bytes = "vec", tag = "7")]
    pub data: Vec<u8>,
    #[prost(bytes = "vec", tag = "8")]
    pub signature: Vec<u8>,
}

/// A validator heartbeat.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Heartbeat {
    #[prost(bytes = "vec", tag = "1")]
    pub payload: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub pubkey: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub signature: Vec<u8>,
    #[prost(uint32, tag = "4")]
    pub shard_id: u32,
    #[prost(string, tag = "5")]
    pub version_number: String,
    #[prost(string, tag = "6")]
    pub node_display_name: String,
    #[prost(string, tag = "7")]
    pub identity: String,
    #[prost(bytes = "vec", tag = "8")]
    pub pid: Vec<u8>,
}

/// A reward transaction issued by the metachain.
#[derive(Clone, PartialEq, prost::Message)]
pub struct RewardTx {
    #[prost(uint64, tag = "1")]
    pub round: u64,
    #[prost(uint32, tag = "2")]
    pub epoch: u32,
    #[prost(bytes = "vec", tag = "3")]
    pub value: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub rcv_addr: Vec<u8>,
}

/// Transaction hashes travelling between one pair of shards.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MiniBlock {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub tx_hashes: Vec<Vec<u8>>,
    #[prost(uint32, tag = "2")]
    pub receiver_shard_id: u32,
    #[prost(uint32, tag = "3")]
    pub sender_shard_id: u32,
    #[prost(int32, tag = "4")]
    pub r#type: i32,
}

/// A batch of serialized payloads sent as one gossip message.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Batch {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub data: Vec<Vec<u8>>,
}
