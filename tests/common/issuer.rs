//! Stub token issuer for end-to-end tests
//!
//! Generates an RSA keypair, serves the public half as a JWKS document from
//! a real HTTP endpoint, and mints RS256 tokens: valid ones, expired ones,
//! ones with an unknown key id, and ones signed by a key the JWKS does not
//! contain.

use super::constants::TEST_KID;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::json;

/// Stub issuer with a live JWKS endpoint
pub struct TestIssuer {
    /// Issuer URL, also the base of the JWKS endpoint
    pub issuer_url: String,

    signing_key: EncodingKey,
    /// A second key that is NOT in the published JWKS
    foreign_key: EncodingKey,

    _shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl TestIssuer {
    /// Spawns the issuer on a random port
    pub async fn spawn() -> Self {
        let mut rng = rand::thread_rng();
        let private_key =
            RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate test RSA key");
        let foreign_private_key =
            RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate foreign RSA key");

        let public_key = RsaPublicKey::from(&private_key);
        let jwks = json!({
            "keys": [{
                "kty": "RSA",
                "kid": TEST_KID,
                "alg": "RS256",
                "use": "sig",
                "n": URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
                "e": URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
            }]
        });

        let signing_key = encoding_key(&private_key);
        let foreign_key = encoding_key(&foreign_private_key);

        let app = axum::Router::new().route(
            "/.well-known/jwks.json",
            axum::routing::get(move || {
                let jwks = jwks.clone();
                async move { axum::Json(jwks) }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind issuer port");
        let port = listener.local_addr().expect("Failed to get address").port();
        let issuer_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Issuer server failed");
        });

        Self {
            issuer_url,
            signing_key,
            foreign_key,
            _shutdown_tx: shutdown_tx,
        }
    }

    /// A valid token for `subject`, expiring in an hour
    pub fn token_for(&self, subject: &str) -> String {
        self.mint(subject, TEST_KID, 3600, &self.signing_key)
    }

    /// A token that expired an hour ago
    pub fn expired_token(&self, subject: &str) -> String {
        self.mint(subject, TEST_KID, -3600, &self.signing_key)
    }

    /// A correctly signed token whose kid is not in the JWKS
    pub fn unknown_kid_token(&self, subject: &str) -> String {
        self.mint(subject, "rotated-away", 3600, &self.signing_key)
    }

    /// A token with the right kid signed by the wrong key
    pub fn badly_signed_token(&self, subject: &str) -> String {
        self.mint(subject, TEST_KID, 3600, &self.foreign_key)
    }

    /// An HS256 token, which the verifier must reject by algorithm
    pub fn symmetric_token(&self, subject: &str) -> String {
        let claims = self.claims(subject, 3600);
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"not-asymmetric"),
        )
        .expect("Failed to mint HS256 token")
    }

    fn claims(&self, subject: &str, expires_in_secs: i64) -> serde_json::Value {
        json!({
            "sub": subject,
            "iss": self.issuer_url,
            "exp": chrono::Utc::now().timestamp() + expires_in_secs,
        })
    }

    fn mint(&self, subject: &str, kid: &str, expires_in_secs: i64, key: &EncodingKey) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        encode(&header, &self.claims(subject, expires_in_secs), key)
            .expect("Failed to mint test token")
    }
}

fn encoding_key(private_key: &RsaPrivateKey) -> EncodingKey {
    let pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .expect("Failed to encode private key");
    EncodingKey::from_rsa_pem(pem.as_bytes()).expect("Failed to load private key")
}
