// Per-scrape snapshot of bucket records, keyed by bucket name

use crate::models::BucketRecord;
use std::collections::{BTreeSet, HashMap};

/// Immutable view of one bucket-stats response. Built once per scrape and
/// dropped when the scrape ends; never shared across scrapes.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    buckets: HashMap<String, BucketRecord>,
}

impl Snapshot {
    /// Keys records by name. A repeated name replaces the earlier record.
    pub fn build(records: impl IntoIterator<Item = BucketRecord>) -> Self {
        let mut buckets = HashMap::new();
        for record in records {
            buckets.insert(record.name.clone(), record);
        }
        Self { buckets }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&BucketRecord> {
        self.buckets.get(name)
    }

    /// Records in unspecified order.
    pub fn buckets(&self) -> impl Iterator<Item = &BucketRecord> {
        self.buckets.values()
    }

    /// Deduplicated owner ids, sorted.
    pub fn distinct_owners(&self) -> BTreeSet<&str> {
        self.buckets.values().map(|b| b.owner_id.as_str()).collect()
    }
}
