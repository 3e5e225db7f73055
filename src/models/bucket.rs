// Bucket records, decoded from the gateway's `/admin/bucket?stats` payload

use serde::Deserialize;

/// Quota value the gateway reports for "no limit". Never a real limit.
pub const UNLIMITED: i64 = -1;

/// One bucket as seen in a single bucket-stats response.
///
/// Usage figures are in kilobytes. Quota fields keep the gateway's sign
/// convention so that [`UNLIMITED`] reaches the exposition untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BucketStatsWire")]
pub struct BucketRecord {
    pub name: String,
    pub owner_id: String,
    pub size_actual_kb: u64,
    pub size_utilized_kb: u64,
    pub num_objects: u64,
    pub quota_max_size_kb: i64,
    pub quota_max_objects: i64,
    pub num_shards: u64,
}

// Wire layout of one element of the bucket-stats array. The gateway omits
// `rgw.main` for buckets that never held an object, and older releases omit
// `bucket_quota` entirely.
#[derive(Deserialize)]
struct BucketStatsWire {
    bucket: String,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    usage: UsageWire,
    #[serde(default)]
    bucket_quota: BucketQuotaWire,
    #[serde(default)]
    num_shards: u64,
}

#[derive(Default, Deserialize)]
struct UsageWire {
    #[serde(rename = "rgw.main", default)]
    main: UsageSizeWire,
}

#[derive(Default, Deserialize)]
struct UsageSizeWire {
    #[serde(default)]
    size_kb_actual: u64,
    #[serde(default)]
    size_kb_utilized: u64,
    #[serde(default)]
    num_objects: u64,
}

#[derive(Deserialize)]
struct BucketQuotaWire {
    #[serde(default = "unlimited")]
    max_size: i64,
    #[serde(default = "unlimited")]
    max_objects: i64,
}

impl Default for BucketQuotaWire {
    fn default() -> Self {
        Self {
            max_size: UNLIMITED,
            max_objects: UNLIMITED,
        }
    }
}

fn unlimited() -> i64 {
    UNLIMITED
}

impl From<BucketStatsWire> for BucketRecord {
    fn from(w: BucketStatsWire) -> Self {
        Self {
            name: w.bucket,
            owner_id: w.owner,
            size_actual_kb: w.usage.main.size_kb_actual,
            size_utilized_kb: w.usage.main.size_kb_utilized,
            num_objects: w.usage.main.num_objects,
            quota_max_size_kb: w.bucket_quota.max_size,
            quota_max_objects: w.bucket_quota.max_objects,
            num_shards: w.num_shards,
        }
    }
}
