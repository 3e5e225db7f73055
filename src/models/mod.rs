// Gateway data model: bucket records and owner quotas

mod bucket;
mod quota;

pub use bucket::{BucketRecord, UNLIMITED};
pub use quota::OwnerQuota;
