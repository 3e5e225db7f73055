// Prometheus text exposition. One registry per scrape, so concurrent scrapes
// never write into the same gauges.

use super::descriptors::{DescriptorTable, MetricId};
use super::sink::{MetricSample, MetricSink, SinkError};
use crate::version::VERSION;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::BTreeMap;
use std::time::Duration;

pub const SCRAPE_SUCCESS: &str = "ceph_rgw_exporter_scrape_success";
pub const SCRAPE_DURATION: &str = "ceph_rgw_exporter_scrape_duration_seconds";
pub const OWNER_QUOTA_FAILURES: &str = "ceph_rgw_exporter_owner_quota_failures";
pub const BUILD_INFO: &str = "ceph_rgw_exporter_build_info";

enum Slot {
    Labeled(GaugeVec),
    // Registered on first sample so a failed scrape exposes nothing for it.
    Unlabeled { opts: Opts, gauge: Option<Gauge> },
}

/// Exporter-health values rendered next to the gateway data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrapeHealth {
    pub success: bool,
    pub duration: Duration,
    pub owner_quota_failures: usize,
}

pub struct PrometheusSink {
    registry: Registry,
    slots: BTreeMap<MetricId, Slot>,
}

impl PrometheusSink {
    pub fn new(descriptors: &DescriptorTable) -> Result<Self, SinkError> {
        let registry = Registry::new();
        let mut slots = BTreeMap::new();
        for d in descriptors.iter() {
            let opts = Opts::new(d.name, d.help);
            let slot = match d.label {
                Some(label) => {
                    let vec = GaugeVec::new(opts, &[label])?;
                    registry.register(Box::new(vec.clone()))?;
                    Slot::Labeled(vec)
                }
                None => Slot::Unlabeled { opts, gauge: None },
            };
            slots.insert(d.id, slot);
        }
        Ok(Self { registry, slots })
    }

    pub fn record_health(&self, health: &ScrapeHealth) -> Result<(), SinkError> {
        let success = Gauge::with_opts(Opts::new(
            SCRAPE_SUCCESS,
            "Whether the last scrape of the gateway succeeded (1) or failed (0)",
        ))?;
        success.set(if health.success { 1.0 } else { 0.0 });

        let duration = Gauge::with_opts(Opts::new(
            SCRAPE_DURATION,
            "Time spent scraping the gateway",
        ))?;
        duration.set(health.duration.as_secs_f64());

        let failures = Gauge::with_opts(Opts::new(
            OWNER_QUOTA_FAILURES,
            "Owner quota lookups that failed during the last scrape",
        ))?;
        failures.set(health.owner_quota_failures as f64);

        let build_info = GaugeVec::new(
            Opts::new(BUILD_INFO, "Exporter build information"),
            &["version"],
        )?;
        build_info.get_metric_with_label_values(&[VERSION])?.set(1.0);

        self.registry.register(Box::new(success))?;
        self.registry.register(Box::new(duration))?;
        self.registry.register(Box::new(failures))?;
        self.registry.register(Box::new(build_info))?;
        Ok(())
    }

    /// Adds `process_*` metrics for this process.
    #[cfg(target_os = "linux")]
    pub fn register_process_metrics(&self) -> Result<(), SinkError> {
        let collector = prometheus::process_collector::ProcessCollector::for_self();
        self.registry.register(Box::new(collector))?;
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    pub fn register_process_metrics(&self) -> Result<(), SinkError> {
        Ok(())
    }

    pub fn render(&self) -> Result<String, SinkError> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl MetricSink for PrometheusSink {
    fn emit(&mut self, sample: MetricSample) -> Result<(), SinkError> {
        let metric = sample.metric;
        let slot = self
            .slots
            .get_mut(&metric)
            .ok_or(SinkError::UnknownMetric(metric))?;

        match (slot, sample.label) {
            (Slot::Labeled(vec), Some(label)) => {
                vec.get_metric_with_label_values(&[label.as_str()])?
                    .set(sample.value);
            }
            (Slot::Unlabeled { opts, gauge }, None) => {
                if gauge.is_none() {
                    let g = Gauge::with_opts(opts.clone())?;
                    self.registry.register(Box::new(g.clone()))?;
                    *gauge = Some(g);
                }
                if let Some(g) = gauge {
                    g.set(sample.value);
                }
            }
            (Slot::Labeled(_), None) => {
                return Err(SinkError::LabelMismatch {
                    metric,
                    expected: 1,
                    got: 0,
                });
            }
            (Slot::Unlabeled { .. }, Some(_)) => {
                return Err(SinkError::LabelMismatch {
                    metric,
                    expected: 0,
                    got: 1,
                });
            }
        }
        Ok(())
    }
}
