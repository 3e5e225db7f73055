// Gateway admin API client: bucket stats and per-owner user quota.
// One signed GET per call, no retries; bodies are always read to the end.

mod error;

pub use error::FetchError;

use crate::models::{BucketRecord, OwnerQuota};
use crate::signer::{self, RequestSigner};
use reqwest::header::{AUTHORIZATION, DATE, HOST};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::{debug, instrument};
use url::Url;

pub const BUCKET_STATS_ENDPOINT: &str = "bucket_stats";
pub const OWNER_QUOTA_ENDPOINT: &str = "owner_quota";

const BUCKET_RESOURCE: &str = "/admin/bucket";
const USER_RESOURCE: &str = "/admin/user";

/// The two read-only admin queries a scrape needs.
pub trait StatsSource {
    fn fetch_bucket_stats(
        &self,
    ) -> impl Future<Output = Result<Vec<BucketRecord>, FetchError>> + Send;

    fn fetch_owner_quota(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = Result<OwnerQuota, FetchError>> + Send;
}

pub struct GatewayClient {
    http: reqwest::Client,
    base: Url,
    host: Option<String>,
    signer: RequestSigner,
}

impl GatewayClient {
    pub fn new(base: Url, signer: RequestSigner) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(crate::version::user_agent())
            .build()?;
        Ok(Self::with_client(http, base, signer))
    }

    pub fn with_client(http: reqwest::Client, base: Url, signer: RequestSigner) -> Self {
        let host = signer::host_header(&base);
        Self {
            http,
            base,
            host,
            signer,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn access_key(&self) -> &str {
        self.signer.access_key()
    }

    /// `{base}/admin/bucket?stats`
    pub fn bucket_stats_url(&self) -> Url {
        let mut url = self.resource_url(BUCKET_RESOURCE);
        url.set_query(Some("stats"));
        url
    }

    /// `{base}/admin/user?quota&uid={owner_id}&quota-type=user`
    pub fn owner_quota_url(&self, owner_id: &str) -> Url {
        let mut url = self.resource_url(USER_RESOURCE);
        url.query_pairs_mut()
            .append_key_only("quota")
            .append_pair("uid", owner_id)
            .append_pair("quota-type", "user");
        url
    }

    // Keeps any path prefix of the base URL (gateways behind a reverse proxy).
    fn resource_url(&self, resource: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}{resource}"));
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: Url,
    ) -> Result<T, FetchError> {
        // The signed resource is the path alone; the query is not part of it.
        let signed = self
            .signer
            .sign_now("GET", url.path())
            .map_err(|source| FetchError::Signing { endpoint, source })?;
        let mut request = self
            .http
            .get(url)
            .header(DATE, &signed.date)
            .header(AUTHORIZATION, &signed.authorization);
        if let Some(host) = &self.host {
            request = request.header(HOST, host);
        }

        let response = request
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;
        debug!(
            endpoint,
            status = status.as_u16(),
            body_bytes = body.len(),
            "gateway response"
        );

        if !status.is_success() {
            return Err(FetchError::Upstream {
                endpoint,
                status,
                body: error::body_excerpt(&body),
            });
        }
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { endpoint, source })
    }
}

impl StatsSource for GatewayClient {
    #[instrument(skip(self), fields(operation = "fetch_bucket_stats"))]
    async fn fetch_bucket_stats(&self) -> Result<Vec<BucketRecord>, FetchError> {
        self.get_json(BUCKET_STATS_ENDPOINT, self.bucket_stats_url())
            .await
    }

    #[instrument(skip(self), fields(operation = "fetch_owner_quota"))]
    async fn fetch_owner_quota(&self, owner_id: &str) -> Result<OwnerQuota, FetchError> {
        self.get_json(OWNER_QUOTA_ENDPOINT, self.owner_quota_url(owner_id))
            .await
    }
}
