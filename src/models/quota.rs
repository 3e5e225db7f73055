// Per-owner quota, decoded from `/admin/user?quota&quota-type=user`

use serde::Deserialize;

/// One account's user-level quota. The gateway serializes these as numbers
/// that may be fractional; `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct OwnerQuota {
    #[serde(rename = "max_size")]
    pub max_size_kb: f64,
    pub max_objects: f64,
}
