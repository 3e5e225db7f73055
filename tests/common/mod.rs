// Shared test helpers: in-memory stats source, record builder, mock gateway

#![allow(dead_code)]

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    routing::get,
};
use reqwest::StatusCode as UpstreamStatus;
use rgw_exporter::gateway::{BUCKET_STATS_ENDPOINT, FetchError, OWNER_QUOTA_ENDPOINT, StatsSource};
use rgw_exporter::models::{BucketRecord, OwnerQuota};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Two buckets of `u1` (100 KB + 50 KB); `a` has no size quota and a 1000-object cap.
pub const BUCKET_STATS_JSON: &str = r#"[
  {
    "bucket": "a",
    "owner": "u1",
    "num_shards": 11,
    "usage": {"rgw.main": {"size_kb_actual": 100, "size_kb_utilized": 90, "num_objects": 4}},
    "bucket_quota": {"enabled": false, "max_size": -1, "max_objects": 1000}
  },
  {
    "bucket": "b",
    "owner": "u1",
    "num_shards": 1,
    "usage": {"rgw.main": {"size_kb_actual": 50, "size_kb_utilized": 40, "num_objects": 2}},
    "bucket_quota": {"enabled": true, "max_size": 2048, "max_objects": -1}
  }
]"#;

pub const USER_QUOTA_JSON: &str =
    r#"{"enabled": true, "check_on_raw": false, "max_size": 1073741824, "max_size_kb": 1048576, "max_objects": -1}"#;

pub fn record(name: &str, owner: &str, size_actual_kb: u64) -> BucketRecord {
    BucketRecord {
        name: name.into(),
        owner_id: owner.into(),
        size_actual_kb,
        size_utilized_kb: size_actual_kb,
        num_objects: 1,
        quota_max_size_kb: -1,
        quota_max_objects: -1,
        num_shards: 1,
    }
}

pub fn upstream_error(endpoint: &'static str, status: u16) -> FetchError {
    FetchError::Upstream {
        endpoint,
        status: UpstreamStatus::from_u16(status).unwrap(),
        body: String::new(),
    }
}

/// In-memory `StatsSource`. Owners without a configured quota fail with 404.
#[derive(Default)]
pub struct FakeSource {
    buckets: Option<Vec<BucketRecord>>,
    quotas: HashMap<String, OwnerQuota>,
    delay: Option<Duration>,
    bucket_calls: AtomicUsize,
    quota_calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_buckets(records: Vec<BucketRecord>) -> Self {
        Self {
            buckets: Some(records),
            ..Self::default()
        }
    }

    /// Bucket stats answer HTTP 500.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn quota(mut self, owner: &str, max_size_kb: f64, max_objects: f64) -> Self {
        self.quotas.insert(
            owner.into(),
            OwnerQuota {
                max_size_kb,
                max_objects,
            },
        );
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn bucket_calls(&self) -> usize {
        self.bucket_calls.load(Ordering::SeqCst)
    }

    pub fn quota_calls(&self) -> Vec<String> {
        self.quota_calls.lock().unwrap().clone()
    }
}

impl StatsSource for FakeSource {
    async fn fetch_bucket_stats(&self) -> Result<Vec<BucketRecord>, FetchError> {
        self.bucket_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.buckets
            .clone()
            .ok_or_else(|| upstream_error(BUCKET_STATS_ENDPOINT, 500))
    }

    async fn fetch_owner_quota(&self, owner_id: &str) -> Result<OwnerQuota, FetchError> {
        self.quota_calls.lock().unwrap().push(owner_id.to_owned());
        self.quotas
            .get(owner_id)
            .copied()
            .ok_or_else(|| upstream_error(OWNER_QUOTA_ENDPOINT, 404))
    }
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    bucket: (StatusCode, String),
    user: (StatusCode, String),
}

/// Axum server standing in for the gateway admin API on 127.0.0.1.
pub struct MockGateway {
    pub url: Url,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockGateway {
    pub async fn spawn(bucket: (u16, &str), user: (u16, &str)) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requests: requests.clone(),
            bucket: (StatusCode::from_u16(bucket.0).unwrap(), bucket.1.to_owned()),
            user: (StatusCode::from_u16(user.0).unwrap(), user.1.to_owned()),
        };
        let app = Router::new()
            .route("/admin/bucket", get(bucket_handler))
            .route("/admin/user", get(user_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            requests,
        }
    }

    /// Gateway answering with [`BUCKET_STATS_JSON`] and [`USER_QUOTA_JSON`].
    pub async fn healthy() -> Self {
        Self::spawn((200, BUCKET_STATS_JSON), (200, USER_QUOTA_JSON)).await
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn capture(state: &MockState, uri: &Uri, headers: HeaderMap) {
    state.requests.lock().unwrap().push(CapturedRequest {
        path: uri.path().to_owned(),
        query: uri.query().map(str::to_owned),
        headers,
    });
}

async fn bucket_handler(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, String) {
    capture(&state, &uri, headers);
    state.bucket.clone()
}

async fn user_handler(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, String) {
    capture(&state, &uri, headers);
    state.user.clone()
}

/// A local address nothing listens on.
pub fn unused_local_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}
