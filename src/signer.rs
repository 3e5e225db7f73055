// S3 signature v2 (HMAC-SHA1) for the gateway admin API

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use thiserror::Error;

type HmacSha1 = Hmac<Sha1>;

/// RFC-1123 in UTC, as sent in the `Date` header.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// The secret could not be used as an HMAC-SHA1 key.
#[derive(Debug, Clone, Error)]
#[error("secret key rejected by HMAC-SHA1: {0}")]
pub struct SignError(pub(crate) String);

/// Holds the admin credentials and produces `Date` / `Authorization` pairs.
#[derive(Clone)]
pub struct RequestSigner {
    access_key: String,
    secret_key: String,
}

/// Header values for one request. `date` is exactly the string that was signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub date: String,
    pub authorization: String,
}

impl RequestSigner {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Signs `method path` with the current time.
    pub fn sign_now(&self, method: &str, path: &str) -> Result<SignedHeaders, SignError> {
        self.sign_at(method, path, Utc::now())
    }

    /// Signs with a fixed instant. The date string is formatted once and reused
    /// for both the canonical string and the header.
    pub fn sign_at(
        &self,
        method: &str,
        path: &str,
        at: DateTime<Utc>,
    ) -> Result<SignedHeaders, SignError> {
        let date = http_date(at);
        let signature = signature(&self.secret_key, &string_to_sign(method, &date, path))?;
        Ok(SignedHeaders {
            authorization: format!("AWS {}:{}", self.access_key, signature),
            date,
        })
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

pub fn http_date(at: DateTime<Utc>) -> String {
    at.format(HTTP_DATE_FORMAT).to_string()
}

/// `METHOD\n\n\nDATE\nPATH`: empty Content-MD5 and Content-Type, no amz headers.
pub fn string_to_sign(method: &str, date: &str, path: &str) -> String {
    format!("{method}\n\n\n{date}\n{path}")
}

/// Base64 of HMAC-SHA1 over `string_to_sign`, keyed by the secret.
pub fn signature(secret_key: &str, string_to_sign: &str) -> Result<String, SignError> {
    let mut mac = HmacSha1::new_from_slice(secret_key.as_bytes())
        .map_err(|e| SignError(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Host header value: the hostname only, without any `:port` suffix.
pub fn host_header(url: &url::Url) -> Option<String> {
    url.host_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap()
    }

    #[test]
    fn http_date_is_rfc1123_gmt() {
        assert_eq!(http_date(fixed_instant()), "Mon, 02 Jan 2006 15:04:05 GMT");
    }

    #[test]
    fn string_to_sign_layout() {
        assert_eq!(
            string_to_sign("GET", "Mon, 02 Jan 2006 15:04:05 GMT", "/admin/bucket"),
            "GET\n\n\nMon, 02 Jan 2006 15:04:05 GMT\n/admin/bucket"
        );
    }

    #[test]
    fn signature_matches_rfc2202_vector() {
        // HMAC-SHA1("Jefe", "what do ya want for nothing?") = effcdf6a...
        assert_eq!(
            signature("Jefe", "what do ya want for nothing?").unwrap(),
            "7/zfauXrL6LSdBbV8YTfnCWafHk="
        );
    }

    #[test]
    fn signature_matches_s3_v2_reference_example() {
        let sts = string_to_sign(
            "GET",
            "Tue, 27 Mar 2007 19:36:42 +0000",
            "/johnsmith/photos/puppy.jpg",
        );
        assert_eq!(
            signature("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY", &sts).unwrap(),
            "bWq2s1WEIj+Ydj0vQ697zp+IXMU="
        );
    }

    #[test]
    fn sign_at_builds_authorization_header() {
        let signer = RequestSigner::new("ACCESS", "secret");
        let headers = signer.sign_at("GET", "/admin/bucket", fixed_instant()).unwrap();
        assert_eq!(headers.date, "Mon, 02 Jan 2006 15:04:05 GMT");
        assert_eq!(
            headers.authorization,
            "AWS ACCESS:0zCK/Be8gvK9rLS689Ml9+wk1aA="
        );

        let user = signer.sign_at("GET", "/admin/user", fixed_instant()).unwrap();
        assert_eq!(user.authorization, "AWS ACCESS:E0JEWlrUURboo8Sox4cNqQrO5CA=");
    }

    #[test]
    fn signing_is_deterministic_for_same_instant() {
        let signer = RequestSigner::new("ACCESS", "secret");
        let a = signer.sign_at("GET", "/admin/bucket", fixed_instant()).unwrap();
        let b = signer.sign_at("GET", "/admin/bucket", fixed_instant()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn signed_date_round_trips_into_signature() {
        let signer = RequestSigner::new("ACCESS", "secret");
        let headers = signer.sign_now("GET", "/admin/user").unwrap();
        let expected = signature("secret", &string_to_sign("GET", &headers.date, "/admin/user")).unwrap();
        assert_eq!(headers.authorization, format!("AWS ACCESS:{expected}"));
    }

    #[test]
    fn signature_accepts_any_key_length() {
        let long_key = "k".repeat(4096);
        for key in ["", "x", long_key.as_str()] {
            let sig = signature(key, "GET\n\n\nMon, 02 Jan 2006 15:04:05 GMT\n/admin/bucket")
                .unwrap();
            assert_eq!(sig.len(), 28, "key of {} bytes", key.len());
        }
    }

    #[test]
    fn host_header_strips_port() {
        let url = url::Url::parse("http://rgw.internal:7480/").unwrap();
        assert_eq!(host_header(&url).as_deref(), Some("rgw.internal"));
        let url = url::Url::parse("https://10.0.0.5/").unwrap();
        assert_eq!(host_header(&url).as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn debug_redacts_secret() {
        let signer = RequestSigner::new("ACCESS", "topsecret");
        let out = format!("{signer:?}");
        assert!(out.contains("ACCESS"));
        assert!(!out.contains("topsecret"));
    }
}
