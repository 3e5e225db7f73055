// Static metric descriptors: names, help text and label schema

/// Identifies one exported gauge. Discriminants index the descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricId {
    BucketActualSize,
    BucketUtilizedSize,
    BucketNumObjects,
    BucketNumShards,
    BucketQuotaMaxSize,
    BucketQuotaMaxObjects,
    UserUsageSize,
    UserQuotaMaxSize,
    UserQuotaMaxObjects,
    TotalUsageSize,
}

impl MetricId {
    pub const ALL: [MetricId; 10] = [
        MetricId::BucketActualSize,
        MetricId::BucketUtilizedSize,
        MetricId::BucketNumObjects,
        MetricId::BucketNumShards,
        MetricId::BucketQuotaMaxSize,
        MetricId::BucketQuotaMaxObjects,
        MetricId::UserUsageSize,
        MetricId::UserQuotaMaxSize,
        MetricId::UserQuotaMaxObjects,
        MetricId::TotalUsageSize,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub id: MetricId,
    pub name: &'static str,
    pub help: &'static str,
    /// The single label dimension, if any.
    pub label: Option<&'static str>,
}

/// All descriptors, built once at startup and handed to the exporter.
#[derive(Debug, Clone)]
pub struct DescriptorTable {
    entries: [MetricDescriptor; 10],
}

impl Default for DescriptorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self {
            entries: MetricId::ALL.map(describe),
        }
    }

    pub fn get(&self, id: MetricId) -> &MetricDescriptor {
        &self.entries[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn describe(id: MetricId) -> MetricDescriptor {
    let (name, help, label) = match id {
        MetricId::BucketActualSize => (
            "ceph_rgw_bucket_actual_size",
            "Bucket actual size in KB",
            Some("name"),
        ),
        MetricId::BucketUtilizedSize => (
            "ceph_rgw_bucket_utilized_size",
            "Bucket utilized size in KB",
            Some("name"),
        ),
        MetricId::BucketNumObjects => (
            "ceph_rgw_bucket_num_objects",
            "Number of objects in the bucket",
            Some("name"),
        ),
        MetricId::BucketNumShards => (
            "ceph_rgw_bucket_num_shards",
            "Number of bucket index shards",
            Some("name"),
        ),
        MetricId::BucketQuotaMaxSize => (
            "ceph_rgw_bucket_quota_max_size",
            "Bucket quota max size (-1 = unlimited)",
            Some("name"),
        ),
        MetricId::BucketQuotaMaxObjects => (
            "ceph_rgw_bucket_quota_max_objects",
            "Bucket quota max objects (-1 = unlimited)",
            Some("name"),
        ),
        MetricId::UserUsageSize => (
            "ceph_rgw_user_usage_size",
            "Sum of actual bucket sizes per owner in KB",
            Some("name"),
        ),
        MetricId::UserQuotaMaxSize => (
            "ceph_rgw_user_quota_max_size",
            "User quota max size (-1 = unlimited)",
            Some("user"),
        ),
        MetricId::UserQuotaMaxObjects => (
            "ceph_rgw_user_quota_max_objects",
            "User quota max objects (-1 = unlimited)",
            Some("user"),
        ),
        MetricId::TotalUsageSize => (
            "ceph_rgw_bucket_total_usage_size",
            "Sum of actual sizes across all buckets in KB",
            None,
        ),
    };
    MetricDescriptor {
        id,
        name,
        help,
        label,
    }
}
