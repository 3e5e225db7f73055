// Failure taxonomy for admin API calls

use crate::signer::SignError;
use reqwest::StatusCode;
use thiserror::Error;

/// Longest body excerpt kept on an upstream error.
pub(crate) const BODY_EXCERPT_LIMIT: usize = 256;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS or timeout failure reaching the gateway.
    #[error("transport error calling {endpoint}: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The request could not be signed; it was never sent.
    #[error("could not sign {endpoint} request: {source}")]
    Signing {
        endpoint: &'static str,
        #[source]
        source: SignError,
    },

    /// The gateway answered with a non-success status.
    #[error("gateway returned {status} for {endpoint}: {body}")]
    Upstream {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The body was not valid JSON or did not match the expected schema.
    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn endpoint(&self) -> &'static str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Signing { endpoint, .. }
            | FetchError::Upstream { endpoint, .. }
            | FetchError::Decode { endpoint, .. } => endpoint,
        }
    }

    /// Short machine-friendly kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport",
            FetchError::Signing { .. } => "signing",
            FetchError::Upstream { .. } => "upstream",
            FetchError::Decode { .. } => "decode",
        }
    }
}

/// Lossy UTF-8 excerpt of an error body, cut on a char boundary.
pub(crate) fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.len() <= BODY_EXCERPT_LIMIT {
        return trimmed.to_string();
    }
    let mut end = BODY_EXCERPT_LIMIT;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_excerpt_keeps_short_bodies() {
        assert_eq!(body_excerpt(b"  {\"Code\":\"AccessDenied\"}\n"), "{\"Code\":\"AccessDenied\"}");
    }

    #[test]
    fn body_excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(BODY_EXCERPT_LIMIT);
        let out = body_excerpt(body.as_bytes());
        assert!(out.ends_with("..."));
        assert!(out.len() <= BODY_EXCERPT_LIMIT + 3);
    }

    #[test]
    fn upstream_error_reports_kind_and_endpoint() {
        let e = FetchError::Upstream {
            endpoint: "bucket_stats",
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        };
        assert_eq!(e.kind(), "upstream");
        assert_eq!(e.endpoint(), "bucket_stats");
        assert!(e.to_string().contains("500"));
    }

    #[test]
    fn signing_error_is_surfaced_with_endpoint() {
        let e = FetchError::Signing {
            endpoint: "owner_quota",
            source: SignError("invalid key length".into()),
        };
        assert_eq!(e.kind(), "signing");
        assert_eq!(e.endpoint(), "owner_quota");
        assert!(e.to_string().contains("could not sign owner_quota request"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
