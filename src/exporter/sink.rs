// Samples and the sink they are streamed into

use super::descriptors::MetricId;
use thiserror::Error;

/// One measurement: which gauge, the value of its label (if it has one), the value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub metric: MetricId,
    pub label: Option<String>,
    pub value: f64,
}

impl MetricSample {
    pub fn labeled(metric: MetricId, label: impl Into<String>, value: f64) -> Self {
        Self {
            metric,
            label: Some(label.into()),
            value,
        }
    }

    pub fn unlabeled(metric: MetricId, value: f64) -> Self {
        Self {
            metric,
            label: None,
            value,
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("metric {metric:?} expects {expected} label(s), sample has {got}")]
    LabelMismatch {
        metric: MetricId,
        expected: usize,
        got: usize,
    },

    #[error("metric {0:?} is not registered with this sink")]
    UnknownMetric(MetricId),

    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("exposition is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Receives every sample of a scrape, in one pass.
pub trait MetricSink {
    fn emit(&mut self, sample: MetricSample) -> Result<(), SinkError>;
}

impl MetricSink for Vec<MetricSample> {
    fn emit(&mut self, sample: MetricSample) -> Result<(), SinkError> {
        self.push(sample);
        Ok(())
    }
}
