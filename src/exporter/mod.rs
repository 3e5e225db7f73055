// Scrape pipeline: fetch -> snapshot -> aggregate -> samples.
// Each call builds its own snapshot; nothing is carried between scrapes.

mod descriptors;
mod exposition;
mod sink;

pub use descriptors::{DescriptorTable, MetricDescriptor, MetricId};
pub use exposition::{PrometheusSink, ScrapeHealth};
pub use sink::{MetricSample, MetricSink, SinkError};

use crate::aggregation::{self, QuotaFailurePolicy};
use crate::gateway::{FetchError, StatsSource};
use crate::models::OwnerQuota;
use crate::snapshot::Snapshot;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Counts describing one completed scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub buckets: usize,
    pub owners: usize,
    pub samples: usize,
    pub owner_quota_failures: usize,
    pub owner_quota_skipped: usize,
    pub elapsed: Duration,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct Scrape {
    pub samples: Vec<MetricSample>,
    pub summary: ScrapeSummary,
}

pub struct Exporter<S> {
    source: S,
    descriptors: DescriptorTable,
    quota_failure_policy: QuotaFailurePolicy,
}

impl<S: StatsSource> Exporter<S> {
    pub fn new(
        source: S,
        descriptors: DescriptorTable,
        quota_failure_policy: QuotaFailurePolicy,
    ) -> Self {
        Self {
            source,
            descriptors,
            quota_failure_policy,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    /// Static descriptor list; no network access.
    pub fn describe(&self) -> Vec<&MetricDescriptor> {
        self.descriptors.iter().collect()
    }

    /// Runs the full pipeline. Bucket-stats failures are returned; owner quota
    /// failures are handled per the configured policy and only counted.
    #[instrument(skip(self), fields(operation = "scrape"))]
    pub async fn try_collect(&self) -> Result<Scrape, FetchError> {
        let started = Instant::now();
        let records = self.source.fetch_bucket_stats().await?;
        let snapshot = Snapshot::build(records);
        let owners =
            aggregation::owner_quotas(&self.source, &snapshot, self.quota_failure_policy).await;

        let samples = samples_for(&snapshot, &owners.quotas);
        let summary = ScrapeSummary {
            buckets: snapshot.len(),
            owners: snapshot.distinct_owners().len(),
            samples: samples.len(),
            owner_quota_failures: owners.failures.len(),
            owner_quota_skipped: owners.skipped,
            elapsed: started.elapsed(),
        };
        debug!(
            buckets = summary.buckets,
            owners = summary.owners,
            samples = summary.samples,
            owner_quota_failures = summary.owner_quota_failures,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "scrape complete"
        );
        Ok(Scrape { samples, summary })
    }

    /// Like [`try_collect`](Self::try_collect) but never fails: a bucket-stats
    /// error is logged and yields no samples.
    pub async fn collect(&self) -> Vec<MetricSample> {
        match self.try_collect().await {
            Ok(scrape) => scrape.samples,
            Err(e) => {
                warn!(
                    error = %e,
                    kind = e.kind(),
                    operation = "fetch_bucket_stats",
                    "scrape failed; no samples this round"
                );
                Vec::new()
            }
        }
    }

    /// Runs the pipeline and streams every sample into `sink`. Nothing reaches
    /// the sink unless the bucket-stats fetch succeeded.
    pub async fn collect_into<K: MetricSink>(
        &self,
        sink: &mut K,
    ) -> Result<ScrapeSummary, ScrapeError> {
        let scrape = self.try_collect().await?;
        for sample in scrape.samples {
            sink.emit(sample)?;
        }
        Ok(scrape.summary)
    }
}

fn samples_for(
    snapshot: &Snapshot,
    owner_quotas: &BTreeMap<String, OwnerQuota>,
) -> Vec<MetricSample> {
    let owner_usage = aggregation::owner_usage(snapshot);
    let capacity = snapshot.len() * 6 + owner_usage.len() + owner_quotas.len() * 2 + 1;
    let mut out = Vec::with_capacity(capacity);

    for u in aggregation::bucket_usage(snapshot) {
        out.extend([
            MetricSample::labeled(MetricId::BucketActualSize, u.name, u.size_actual_kb as f64),
            MetricSample::labeled(
                MetricId::BucketUtilizedSize,
                u.name,
                u.size_utilized_kb as f64,
            ),
            MetricSample::labeled(MetricId::BucketNumObjects, u.name, u.num_objects as f64),
            MetricSample::labeled(MetricId::BucketNumShards, u.name, u.num_shards as f64),
        ]);
    }
    for q in aggregation::bucket_quotas(snapshot) {
        out.push(MetricSample::labeled(
            MetricId::BucketQuotaMaxSize,
            q.name,
            q.max_size_kb as f64,
        ));
        out.push(MetricSample::labeled(
            MetricId::BucketQuotaMaxObjects,
            q.name,
            q.max_objects as f64,
        ));
    }
    for (owner, total) in &owner_usage {
        out.push(MetricSample::labeled(
            MetricId::UserUsageSize,
            *owner,
            *total as f64,
        ));
    }
    for (owner, quota) in owner_quotas {
        out.push(MetricSample::labeled(
            MetricId::UserQuotaMaxSize,
            owner.as_str(),
            quota.max_size_kb,
        ));
        out.push(MetricSample::labeled(
            MetricId::UserQuotaMaxObjects,
            owner.as_str(),
            quota.max_objects,
        ));
    }
    out.push(MetricSample::unlabeled(
        MetricId::TotalUsageSize,
        aggregation::total_usage(snapshot) as f64,
    ));
    out
}
