//! Bearer-token verification.
//!
//! Validates `Authorization: Bearer <jwt>` headers against the issuer's
//! published signing keys:
//! - RS256 only; the key set is fetched from the issuer's well-known JWKS URL
//! - key sets are cached process-wide per issuer with a fixed TTL
//! - every failure maps to a typed [`AuthError`] reason code
//!
//! The cache is just a cache: losing it costs one refetch, nothing more.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// How long a fetched key set stays valid.
const KEY_SET_TTL: Duration = Duration::from_secs(300);

/// Timeout for JWKS fetches.
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Identity header honored only when `dev_insecure_identity` is enabled.
pub const DEV_SUBJECT_HEADER: &str = "X-Dev-Subject";

/// The subject extracted from a successfully validated token.
/// Lives for one request; never persisted.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub issuer: String,
    /// Unix seconds.
    pub expires_at: i64,
}

/// Token verification failure, one variant per reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("malformed bearer token")]
    Malformed,
    #[error("unsupported signing algorithm")]
    UnsupportedAlg,
    #[error("token header carries no key id")]
    MissingKid,
    #[error("no signing key matches the token key id")]
    KeyNotFound,
    #[error("token has expired")]
    Expired,
    #[error("token signature verification failed")]
    BadSignature,
}

impl AuthError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            AuthError::Malformed => "malformed",
            AuthError::UnsupportedAlg => "unsupported_alg",
            AuthError::MissingKid => "missing_kid",
            AuthError::KeyNotFound => "key_not_found",
            AuthError::Expired => "expired",
            AuthError::BadSignature => "bad_signature",
        }
    }
}

/// Result of authenticating one inbound request.
#[derive(Debug)]
pub enum RequestAuth {
    Verified {
        identity: VerifiedIdentity,
        /// The raw bearer token, forwarded to the store for its own checks.
        /// Absent when the dev-mode identity fallback was used.
        bearer: Option<String>,
    },
    /// No credentials at all: the caller has never authenticated.
    Missing,
    /// A token was presented and rejected.
    Rejected(AuthError),
}

#[derive(Debug, Clone, Deserialize)]
struct JwksDocument {
    keys: Vec<JwksKey>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwksKey {
    kty: String,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

struct CachedKeySet {
    keys: Vec<JwksKey>,
    fetched_at: Instant,
}

#[derive(Deserialize)]
struct TokenClaims {
    sub: String,
    iss: String,
    exp: i64,
}

/// Verifies bearer tokens, caching issuer key sets.
pub struct TokenVerifier {
    client: reqwest::Client,
    cache: Mutex<HashMap<String, CachedKeySet>>,
    ttl: Duration,
}

impl TokenVerifier {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            cache: Mutex::new(HashMap::new()),
            ttl: KEY_SET_TTL,
        }
    }

    #[cfg(test)]
    fn with_ttl(ttl: Duration) -> Self {
        let mut verifier = Self::new();
        verifier.ttl = ttl;
        verifier
    }

    /// Authenticate one request from its headers.
    ///
    /// When `dev_insecure_identity` is set and no token is present, a
    /// caller-supplied identity header is accepted instead. This is a
    /// development aid and must never be enabled in production.
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        dev_insecure_identity: bool,
    ) -> RequestAuth {
        let authorization = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let authorization = match authorization {
            Some(value) => value,
            None => {
                if dev_insecure_identity {
                    if let Some(subject) = headers
                        .get(DEV_SUBJECT_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .filter(|s| !s.is_empty())
                    {
                        warn!("Accepting unverified dev-mode identity: {}", subject);
                        return RequestAuth::Verified {
                            identity: VerifiedIdentity {
                                subject: subject.to_string(),
                                issuer: "dev-mode".to_string(),
                                expires_at: i64::MAX,
                            },
                            bearer: None,
                        };
                    }
                }
                return RequestAuth::Missing;
            }
        };

        match self.verify(authorization).await {
            Ok(identity) => {
                let token = authorization.trim_start_matches("Bearer ").trim().to_string();
                RequestAuth::Verified {
                    identity,
                    bearer: Some(token),
                }
            }
            Err(err) => RequestAuth::Rejected(err),
        }
    }

    /// Verify a full `Authorization` header value.
    pub async fn verify(&self, authorization: &str) -> Result<VerifiedIdentity, AuthError> {
        let token = authorization
            .strip_prefix("Bearer ")
            .ok_or(AuthError::Malformed)?
            .trim();

        if token.split('.').count() != 3 {
            return Err(AuthError::Malformed);
        }

        let header = decode_header(token).map_err(|_| AuthError::Malformed)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlg);
        }
        let kid = header.kid.ok_or(AuthError::MissingKid)?;

        let issuer = peek_issuer(token)?;
        let keys = self.key_set(&issuer).await?;

        let key = keys
            .iter()
            .find(|k| k.kty == "RSA" && k.kid.as_deref() == Some(kid.as_str()))
            .ok_or(AuthError::KeyNotFound)?;

        let (n, e) = match (&key.n, &key.e) {
            (Some(n), Some(e)) => (n, e),
            _ => return Err(AuthError::KeyNotFound),
        };
        let decoding_key =
            DecodingKey::from_rsa_components(n, e).map_err(|_| AuthError::KeyNotFound)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let data = decode::<TokenClaims>(token, &decoding_key, &validation)
            .map_err(|err| map_decode_error(&err))?;

        Ok(VerifiedIdentity {
            subject: data.claims.sub,
            issuer: data.claims.iss,
            expires_at: data.claims.exp,
        })
    }

    fn cached_keys(&self, issuer: &str) -> Option<Vec<JwksKey>> {
        let cache = self.cache.lock().unwrap();
        cache
            .get(issuer)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.keys.clone())
    }

    /// Key set for an issuer, from cache or a fresh fetch.
    ///
    /// A fetch failure fails closed as `KeyNotFound`: the caller should retry
    /// after the cache window, not immediately.
    async fn key_set(&self, issuer: &str) -> Result<Vec<JwksKey>, AuthError> {
        if let Some(keys) = self.cached_keys(issuer) {
            return Ok(keys);
        }

        let url = format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'));
        debug!("Fetching signing keys from {}", url);

        let document: JwksDocument = async {
            let response = self.client.get(&url).send().await?;
            response.error_for_status()?.json().await
        }
        .await
        .map_err(|err: reqwest::Error| {
            warn!("JWKS fetch from {} failed: {}", url, err);
            AuthError::KeyNotFound
        })?;

        let mut cache = self.cache.lock().unwrap();
        cache.insert(
            issuer.to_string(),
            CachedKeySet {
                keys: document.keys.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(document.keys)
    }
}

impl Default for TokenVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the issuer claim without verifying the signature. Used only to find
/// the key set; the claim is re-read from the verified payload afterwards.
fn peek_issuer(token: &str) -> Result<String, AuthError> {
    let payload = token.split('.').nth(1).ok_or(AuthError::Malformed)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::Malformed)?;
    let claims: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|_| AuthError::Malformed)?;
    claims
        .get("iss")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or(AuthError::Malformed)
}

fn map_decode_error(err: &jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::BadSignature,
        ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlg,
        ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::InvalidToken
        | ErrorKind::MissingRequiredClaim(_) => AuthError::Malformed,
        _ => AuthError::BadSignature,
    }
}
