//! Greedy packing of payloads into gossip-sized batches.

use bytes::Bytes;
use prost::Message;

use crate::proto::Batch;

/// Default upper bound for one encoded batch.
pub const MAX_BULK_TRANSACTION_SIZE: usize = 1 << 18;

/// Key byte of the repeated `data` field (field 1, length-delimited).
const DATA_FIELD_KEY_LEN: usize = 1;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PackError {
    #[error("payload {index} of {size} bytes does not fit in a {limit}-byte chunk")]
    Oversized {
        index: usize,
        size: usize,
        limit: usize,
    },
}

/// One encoded [`Batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    bytes: Bytes,
    items: usize,
}

impl Chunk {
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Number of payloads in the batch.
    pub fn items(&self) -> usize {
        self.items
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of [`pack_in_chunks`].
#[derive(Debug, Default)]
pub struct Packed {
    pub chunks: Vec<Chunk>,
    pub rejected: Vec<PackError>,
}

/// Pack `items` in order into batches whose encoding stays within `limit`.
///
/// A chunk is closed as soon as the next item would push it past the limit.
/// An item that cannot fit even in an empty chunk is reported in
/// [`Packed::rejected`].
pub fn pack_in_chunks(items: Vec<Bytes>, limit: usize) -> Packed {
    let mut packed = Packed::default();
    let mut current: Vec<Vec<u8>> = Vec::new();
    let mut current_size = 0usize;

    for (index, item) in items.into_iter().enumerate() {
        let cost = field_cost(item.len());
        if cost > limit {
            packed.rejected.push(PackError::Oversized {
                index,
                size: item.len(),
                limit,
            });
            continue;
        }
        if current_size + cost > limit {
            packed.chunks.push(seal(&mut current));
            current_size = 0;
        }
        current.push(item.into());
        current_size += cost;
    }

    if !current.is_empty() {
        packed.chunks.push(seal(&mut current));
    }
    packed
}

fn field_cost(len: usize) -> usize {
    DATA_FIELD_KEY_LEN + prost::encoding::encoded_len_varint(len as u64) + len
}

fn seal(current: &mut Vec<Vec<u8>>) -> Chunk {
    let batch = Batch {
        data: std::mem::take(current),
    };
    Chunk {
        items: batch.data.len(),
        bytes: Bytes::from(batch.encode_to_vec()),
    }
}
