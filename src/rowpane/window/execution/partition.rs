//! Partitioning: grouping rows by PARTITION BY key equality.
//!
//! Partitions hold indices into the caller's row slice rather than cloned
//! rows. Group membership follows SQL grouping rules, so `NULL` keys group
//! together. Partition order is first-seen key order and row order within a
//! partition is input order, both deterministic.

use crate::rowpane::window::execution::types::{FieldValue, Row};
use rustc_hash::FxHashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Pre-hashed partition key for fast grouping lookups
///
/// Uses Arc<[FieldValue]> instead of Vec<String> to avoid per-row string
/// allocations, and pre-computes the hash once per row.
#[derive(Debug, Clone)]
struct PartitionKey {
    /// Pre-computed hash (computed once, reused on every probe)
    hash: u64,
    /// Field values forming the key
    values: Arc<[FieldValue]>,
}

impl PartitionKey {
    fn new(values: Vec<FieldValue>) -> Self {
        let mut hasher = rustc_hash::FxHasher::default();
        for value in &values {
            value.hash(&mut hasher);
        }
        let hash = hasher.finish();

        Self {
            hash,
            values: Arc::from(values.into_boxed_slice()),
        }
    }

    fn values(&self) -> &[FieldValue] {
        &self.values
    }
}

impl PartialEq for PartitionKey {
    fn eq(&self, other: &Self) -> bool {
        // Fast path: compare hashes first
        if self.hash != other.hash {
            return false;
        }
        self.values.as_ref() == other.values.as_ref()
    }
}

impl Eq for PartitionKey {}

impl Hash for PartitionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// One partition: the original indices of rows sharing a partition key
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// The PARTITION BY values shared by every row in this partition
    pub key: Vec<FieldValue>,
    /// Indices into the input row slice, in input order
    pub rows: Vec<usize>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Split rows into partitions by PARTITION BY key equality.
///
/// An empty `partition_by` yields a single partition holding every row.
/// Column existence is checked during request validation, so an absent field
/// here resolves to `NULL` like any other row access.
pub fn partition_rows(rows: &[Row], partition_by: &[String]) -> Vec<Partition> {
    if partition_by.is_empty() {
        return vec![Partition {
            key: Vec::new(),
            rows: (0..rows.len()).collect(),
        }];
    }

    let mut partitions: Vec<Partition> = Vec::new();
    let mut index: FxHashMap<PartitionKey, usize> = FxHashMap::default();

    for (i, row) in rows.iter().enumerate() {
        let values: Vec<FieldValue> = partition_by.iter().map(|c| row.column(c)).collect();
        let key = PartitionKey::new(values);

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = partitions.len();
                partitions.push(Partition {
                    key: key.values().to_vec(),
                    rows: Vec::new(),
                });
                index.insert(key, slot);
                slot
            }
        };
        partitions[slot].rows.push(i);
    }

    partitions
}
