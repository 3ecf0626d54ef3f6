//! Sharding across test processes.
//!
//! Tests are assigned to shards by a stable hash of their unique ID, so every process of a sharded run computes
//! the same partition without coordinating.

use treebridge_core::TestIdentifier;

use super::{FilterResult, PostDiscoveryFilter};

pub const ARG_NUM_SHARDS: &str = "numShards";
pub const ARG_SHARD_INDEX: &str = "shardIndex";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardingFilter {
    num_shards: u64,
    shard_index: u64,
}

impl ShardingFilter {
    /// `None` unless `num_shards > 0` and `shard_index < num_shards`.
    pub fn new(num_shards: u64, shard_index: u64) -> Option<Self> {
        (num_shards > 0 && shard_index < num_shards).then_some(Self {
            num_shards,
            shard_index,
        })
    }

    /// Build from string arguments as passed by the launcher. Missing or unparsable values disable sharding.
    pub fn from_arguments<'a>(lookup: impl Fn(&str) -> Option<&'a str>) -> Option<Self> {
        let num_shards = lookup(ARG_NUM_SHARDS)?.trim().parse().ok()?;
        let shard_index = lookup(ARG_SHARD_INDEX)?.trim().parse().ok()?;
        Self::new(num_shards, shard_index)
    }

    pub fn num_shards(&self) -> u64 {
        self.num_shards
    }

    pub fn shard_index(&self) -> u64 {
        self.shard_index
    }

    /// The shard a unique ID belongs to.
    pub fn shard_of(&self, unique_id: &str) -> u64 {
        stable_hash(unique_id) % self.num_shards
    }
}

impl PostDiscoveryFilter for ShardingFilter {
    fn apply(&self, identifier: &TestIdentifier) -> FilterResult {
        if !super::is_filterable(identifier) {
            return FilterResult::Included;
        }
        if self.shard_of(identifier.unique_id().as_str()) == self.shard_index {
            FilterResult::Included
        } else {
            FilterResult::excluded(format!("not in shard {} of {}", self.shard_index, self.num_shards))
        }
    }
}

// FNV-1a, 64 bit
fn stable_hash(value: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    value
        .bytes()
        .fold(OFFSET_BASIS, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}
