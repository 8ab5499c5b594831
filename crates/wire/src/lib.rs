//! Wire formats for the traffic the fleet publishes.
//!
//! - [`proto`] - protobuf messages understood by the target network
//! - [`bigint`] - the network's big-integer byte caster
//! - [`hash`] - transaction hashing
//! - [`packer`] - greedy packing of payloads into size-bounded batches

pub mod bigint;
pub mod hash;
pub mod packer;
pub mod proto;

pub use bigint::{BigIntError, decode_big_uint, denominate, encode_big_uint};
pub use hash::TxHash;
pub use packer::{Chunk, MAX_BULK_TRANSACTION_SIZE, PackError, Packed, pack_in_chunks};
