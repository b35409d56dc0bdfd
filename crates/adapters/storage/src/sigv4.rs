//! AWS Signature Version 4 query presigning

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use obra_errors::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::time::Duration;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Generates presigned URLs for an S3-compatible endpoint.
///
/// Only the `host` header is signed; the payload is unsigned, which is the
/// standard presigned-URL scheme.
#[derive(Clone)]
pub struct Presigner {
    endpoint: Url,
    region: String,
    bucket: String,
    access_key: String,
    secret_key: String,
}

impl Presigner {
    pub fn new(
        endpoint: &str,
        region: impl Into<String>,
        bucket: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> AppResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::validation(format!("Invalid storage endpoint: {}", e)))?;

        Ok(Self {
            endpoint,
            region: region.into(),
            bucket: bucket.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        })
    }

    /// Presign `method` for `key`, valid for `expires_in` from `now`
    pub fn presign(
        &self,
        method: &str,
        key: &str,
        expires_in: Duration,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        let host = self
            .endpoint
            .host_str()
            .ok_or_else(|| AppError::validation("Storage endpoint has no host"))?;
        let host = match self.endpoint.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = now.format("%Y%m%d").to_string();
        let scope = format!(
            "{}/{}/{}/aws4_request",
            date_stamp, self.region, SERVICE
        );
        let credential = format!("{}/{}", self.access_key, scope);

        // Path-style addressing keeps MinIO and AWS both happy
        let canonical_path = format!("/{}/{}", self.bucket, encode_key(key));

        let mut query: Vec<(String, String)> = vec![
            ("X-Amz-Algorithm".to_string(), ALGORITHM.to_string()),
            ("X-Amz-Credential".to_string(), credential),
            ("X-Amz-Date".to_string(), amz_date.clone()),
            (
                "X-Amz-Expires".to_string(),
                expires_in.as_secs().to_string(),
            ),
            ("X-Amz-SignedHeaders".to_string(), "host".to_string()),
        ];
        query.sort();

        let canonical_query = query
            .iter()
            .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request = format!(
            "{}\n{}\n{}\nhost:{}\n\nhost\n{}",
            method, canonical_path, canonical_query, host, UNSIGNED_PAYLOAD
        );

        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signature = hex::encode(self.signing_key(&date_stamp)?.sign(&string_to_sign)?);

        Ok(format!(
            "{}://{}{}?{}&X-Amz-Signature={}",
            self.endpoint.scheme(),
            host,
            canonical_path,
            canonical_query,
            signature
        ))
    }

    fn signing_key(&self, date_stamp: &str) -> AppResult<SigningKey> {
        let k_date = hmac_sha256(
            format!("AWS4{}", self.secret_key).as_bytes(),
            date_stamp.as_bytes(),
        )?;
        let k_region = hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, SERVICE.as_bytes())?;
        let key = hmac_sha256(&k_service, b"aws4_request")?;
        Ok(SigningKey(key))
    }
}

struct SigningKey(Vec<u8>);

impl SigningKey {
    fn sign(&self, data: &str) -> AppResult<Vec<u8>> {
        hmac_sha256(&self.0, data.as_bytes())
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> AppResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::internal(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// RFC 3986 encoding as SigV4 requires it (space as %20, '~' untouched)
fn uri_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Encode an object key, preserving `/` separators
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(uri_encode)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn presigner() -> Presigner {
        Presigner::new(
            "http://localhost:9000",
            "us-east-1",
            "obra-documents",
            "minio",
            "minio123",
        )
        .unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_presign_structure() {
        let url = presigner()
            .presign(
                "GET",
                "tenant/abc/documents/doc1/1/manual.pdf",
                Duration::from_secs(900),
                fixed_now(),
            )
            .unwrap();

        assert!(url.starts_with(
            "http://localhost:9000/obra-documents/tenant/abc/documents/doc1/1/manual.pdf?"
        ));
        assert!(url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
        assert!(url.contains("X-Amz-Date=20250601T120000Z"));
        assert!(url.contains("X-Amz-Expires=900"));
        assert!(url.contains("X-Amz-SignedHeaders=host"));
        assert!(url.contains("us-east-1%2Fs3%2Faws4_request"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[test]
    fn test_presign_is_deterministic_for_fixed_time() {
        let a = presigner()
            .presign("GET", "k", Duration::from_secs(60), fixed_now())
            .unwrap();
        let b = presigner()
            .presign("GET", "k", Duration::from_secs(60), fixed_now())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_differs_per_method_and_key() {
        let p = presigner();
        let get = p
            .presign("GET", "k", Duration::from_secs(60), fixed_now())
            .unwrap();
        let put = p
            .presign("PUT", "k", Duration::from_secs(60), fixed_now())
            .unwrap();
        let other = p
            .presign("GET", "k2", Duration::from_secs(60), fixed_now())
            .unwrap();

        let sig = |u: &str| u.split("X-Amz-Signature=").nth(1).unwrap().to_string();
        assert_ne!(sig(&get), sig(&put));
        assert_ne!(sig(&get), sig(&other));
    }

    #[test]
    fn test_key_encoding_preserves_slashes() {
        assert_eq!(encode_key("a/b c/d"), "a/b%20c/d");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(Presigner::new("not a url", "r", "b", "ak", "sk").is_err());
    }
}
