// Aggregation over a snapshot: per-bucket values, per-owner sums and quotas, global total

use crate::gateway::{FetchError, StatsSource};
use crate::models::OwnerQuota;
use crate::snapshot::Snapshot;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Usage figures of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketUsage<'a> {
    pub name: &'a str,
    pub size_actual_kb: u64,
    pub size_utilized_kb: u64,
    pub num_objects: u64,
    pub num_shards: u64,
}

/// Quota of one bucket; `-1` is passed through as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketQuota<'a> {
    pub name: &'a str,
    pub max_size_kb: i64,
    pub max_objects: i64,
}

/// What to do when one owner's quota lookup fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaFailurePolicy {
    /// Skip the failed owner and keep going.
    #[default]
    SkipOwner,
    /// Stop at the first failure; owners already fetched are kept.
    AbortRemaining,
}

#[derive(Debug)]
pub struct OwnerQuotaFailure {
    pub owner_id: String,
    pub error: FetchError,
}

/// Quotas fetched during one scrape, plus the lookups that failed.
#[derive(Debug, Default)]
pub struct OwnerQuotas {
    pub quotas: BTreeMap<String, OwnerQuota>,
    pub failures: Vec<OwnerQuotaFailure>,
    /// Owners never attempted because the loop was aborted.
    pub skipped: usize,
}

pub fn bucket_usage(snapshot: &Snapshot) -> impl Iterator<Item = BucketUsage<'_>> {
    snapshot.buckets().map(|b| BucketUsage {
        name: &b.name,
        size_actual_kb: b.size_actual_kb,
        size_utilized_kb: b.size_utilized_kb,
        num_objects: b.num_objects,
        num_shards: b.num_shards,
    })
}

pub fn bucket_quotas(snapshot: &Snapshot) -> impl Iterator<Item = BucketQuota<'_>> {
    snapshot.buckets().map(|b| BucketQuota {
        name: &b.name,
        max_size_kb: b.quota_max_size_kb,
        max_objects: b.quota_max_objects,
    })
}

/// Sum of `size_actual_kb` per owner. Only owners with at least one bucket appear.
/// Sums saturate at `u64::MAX`.
pub fn owner_usage(snapshot: &Snapshot) -> BTreeMap<&str, u64> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for b in snapshot.buckets() {
        let total = totals.entry(b.owner_id.as_str()).or_default();
        *total = total.saturating_add(b.size_actual_kb);
    }
    totals
}

/// Sum of `size_actual_kb` across every bucket, saturating at `u64::MAX`.
pub fn total_usage(snapshot: &Snapshot) -> u64 {
    snapshot
        .buckets()
        .fold(0u64, |acc, b| acc.saturating_add(b.size_actual_kb))
}

/// One quota fetch per distinct owner, sequentially, in owner order.
pub async fn owner_quotas<S: StatsSource>(
    source: &S,
    snapshot: &Snapshot,
    policy: QuotaFailurePolicy,
) -> OwnerQuotas {
    let owners: Vec<String> = snapshot
        .distinct_owners()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let mut out = OwnerQuotas::default();

    for (i, owner_id) in owners.iter().enumerate() {
        match source.fetch_owner_quota(owner_id).await {
            Ok(quota) => {
                out.quotas.insert(owner_id.clone(), quota);
            }
            Err(e) => {
                warn!(
                    error = %e,
                    owner = %owner_id,
                    operation = "fetch_owner_quota",
                    "owner quota lookup failed"
                );
                out.failures.push(OwnerQuotaFailure {
                    owner_id: owner_id.clone(),
                    error: e,
                });
                if policy == QuotaFailurePolicy::AbortRemaining {
                    out.skipped = owners.len() - i - 1;
                    break;
                }
            }
        }
    }
    out
}
