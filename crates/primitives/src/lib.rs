//! Core value types shared across the siege workspace.
//!
//! - [`Address`] - 32-byte account address
//! - [`ShardId`] - shard identifier, including the metachain
//! - [`ShardCoordinator`] - maps addresses onto shards

mod address;
mod shard;

pub use address::{ADDRESS_LEN, Address, AddressError};
pub use shard::{ShardCoordinator, ShardError, ShardId};
