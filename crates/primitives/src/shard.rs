//! Shard identifiers and the address-to-shard mapping.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ADDRESS_LEN, Address};

const META_LABEL: &str = "META";

/// Errors raised by shard parsing and coordinator construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShardError {
    #[error("invalid shard id: {0:?}")]
    Parse(String),

    #[error("number of shards must be at least 1")]
    NoShards,

    #[error("shard {shard} is outside the {number_of_shards}-shard topology")]
    OutOfRange { shard: ShardId, number_of_shards: u32 },
}

/// Identifier of a shard.
///
/// Regular shards are numbered from zero. The metachain uses the reserved
/// identifier [`ShardId::META`] and is rendered as `META`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShardId(u32);

impl ShardId {
    pub const META: Self = Self(u32::MAX);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_meta(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_meta() {
            f.write_str(META_LABEL)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Debug for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShardId({self})")
    }
}

impl FromStr for ShardId {
    type Err = ShardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(META_LABEL) {
            return Ok(Self::META);
        }
        s.parse::<u32>()
            .map(Self)
            .map_err(|_| ShardError::Parse(s.to_string()))
    }
}

impl TryFrom<String> for ShardId {
    type Error = ShardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShardId> for String {
    fn from(shard: ShardId) -> Self {
        shard.to_string()
    }
}

/// Maps account addresses onto shards.
///
/// The shard is derived from the trailing bytes of the address, masked down
/// to the number of bits needed to address every shard. Values that land past
/// the last shard are folded back with a one-bit-narrower mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardCoordinator {
    number_of_shards: u32,
    mask_high: u32,
    mask_low: u32,
}

impl ShardCoordinator {
    pub fn new(number_of_shards: u32) -> Result<Self, ShardError> {
        if number_of_shards == 0 {
            return Err(ShardError::NoShards);
        }

        // ceil(log2(n)); zero for a single shard.
        let bits = u32::BITS - (number_of_shards - 1).leading_zeros();
        let mask_high = low_bits(bits);
        let mask_low = low_bits(bits.saturating_sub(1));

        Ok(Self {
            number_of_shards,
            mask_high,
            mask_low,
        })
    }

    pub const fn number_of_shards(&self) -> u32 {
        self.number_of_shards
    }

    /// Compute the shard that owns `address`.
    pub fn compute_shard(&self, address: &Address) -> ShardId {
        let tail_len = match self.number_of_shards {
            0..=256 => 1,
            257..=65_536 => 2,
            _ => 4,
        };
        let tail = address
            .as_bytes()
            .get(ADDRESS_LEN - tail_len..)
            .unwrap_or_default();

        if address.is_system_contract() && tail.last() == Some(&0xff) {
            return ShardId::META;
        }

        let value = tail
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));

        let mut shard = value & self.mask_high;
        if shard >= self.number_of_shards {
            shard = value & self.mask_low;
        }
        ShardId::new(shard)
    }

    /// Whether `shard` is part of this topology. The metachain always is.
    pub fn contains(&self, shard: ShardId) -> bool {
        shard.is_meta() || shard.get() < self.number_of_shards
    }

    /// Check that `shard` is part of this topology.
    pub fn validate(&self, shard: ShardId) -> Result<ShardId, ShardError> {
        if self.contains(shard) {
            Ok(shard)
        } else {
            Err(ShardError::OutOfRange {
                shard,
                number_of_shards: self.number_of_shards,
            })
        }
    }

    /// Every shard of the topology, metachain first.
    pub fn all_shards(&self) -> Vec<ShardId> {
        std::iter::once(ShardId::META)
            .chain((0..self.number_of_shards).map(ShardId::new))
            .collect()
    }
}

fn low_bits(bits: u32) -> u32 {
    if bits >= u32::BITS {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn address_ending_with(tail: &[u8]) -> Address {
        let mut bytes = [0x11u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - tail.len()..].copy_from_slice(tail);
        Address::new(bytes)
    }

    #[test]
    fn meta_round_trips_through_text() {
        assert_eq!(ShardId::META.to_string(), "META");
        assert_eq!("META".parse::<ShardId>().unwrap(), ShardId::META);
        assert_eq!("meta".parse::<ShardId>().unwrap(), ShardId::META);
        assert_eq!("3".parse::<ShardId>().unwrap(), ShardId::new(3));
        assert!("x".parse::<ShardId>().is_err());
    }

    #[test]
    fn zero_shards_is_rejected() {
        assert_eq!(ShardCoordinator::new(0).unwrap_err(), ShardError::NoShards);
    }

    #[test]
    fn single_shard_owns_everything() {
        let coordinator = ShardCoordinator::new(1).unwrap();
        for last in [0u8, 1, 7, 0xfe] {
            assert_eq!(
                coordinator.compute_shard(&address_ending_with(&[last])),
                ShardId::new(0)
            );
        }
    }

    #[test]
    fn two_shards_split_on_last_bit() {
        let coordinator = ShardCoordinator::new(2).unwrap();
        assert_eq!(
            coordinator.compute_shard(&address_ending_with(&[0x02])),
            ShardId::new(0)
        );
        assert_eq!(
            coordinator.compute_shard(&address_ending_with(&[0x03])),
            ShardId::new(1)
        );
    }

    #[test]
    fn out_of_range_values_fold_back() {
        // Three shards need two bits; the value 3 is folded to 3 & 1.
        let coordinator = ShardCoordinator::new(3).unwrap();
        assert_eq!(
            coordinator.compute_shard(&address_ending_with(&[0x03])),
            ShardId::new(1)
        );
        assert_eq!(
            coordinator.compute_shard(&address_ending_with(&[0x02])),
            ShardId::new(2)
        );
    }

    #[test]
    fn wide_topologies_read_more_tail_bytes() {
        let coordinator = ShardCoordinator::new(1024).unwrap();
        assert_eq!(
            coordinator.compute_shard(&address_ending_with(&[0x03, 0x01])),
            ShardId::new(0x301)
        );
    }

    #[test]
    fn system_contract_on_metachain() {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 1] = 0xff;
        let coordinator = ShardCoordinator::new(2).unwrap();
        assert_eq!(coordinator.compute_shard(&Address::new(bytes)), ShardId::META);
    }

    #[test]
    fn all_shards_lists_meta_first() {
        let coordinator = ShardCoordinator::new(2).unwrap();
        assert_eq!(
            coordinator.all_shards(),
            vec![ShardId::META, ShardId::new(0), ShardId::new(1)]
        );
        assert!(coordinator.validate(ShardId::new(2)).is_err());
        assert!(coordinator.validate(ShardId::META).is_ok());
    }

    proptest! {
        #[test]
        fn computed_shard_is_always_in_range(
            bytes in proptest::array::uniform32(any::<u8>()),
            shards in 1u32..5000,
        ) {
            let coordinator = ShardCoordinator::new(shards).unwrap();
            let shard = coordinator.compute_shard(&Address::new(bytes));
            prop_assert!(coordinator.contains(shard));
        }
    }
}
