use crate::errors::GatekeeperError;
use crate::storage::random_id;
use josekit::jws::alg::hmac::{HmacJwsSigner, HmacJwsVerifier};
use josekit::jws::{JwsHeader, HS256};
use josekit::jwt::{self, JwtPayload};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Claims carried by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    pub subject: String,
    pub client_id: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// HS256 signer/verifier for access tokens, keyed by the configured secret.
#[derive(Clone)]
pub struct TokenSigner {
    signer: Arc<HmacJwsSigner>,
    verifier: Arc<HmacJwsVerifier>,
    lifetime_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: &str, lifetime_secs: i64) -> Result<Self, GatekeeperError> {
        if secret.is_empty() {
            return Err(GatekeeperError::InvalidInput(
                "token signing secret must not be empty".into(),
            ));
        }
        Ok(Self {
            signer: Arc::new(HS256.signer_from_bytes(secret.as_bytes())?),
            verifier: Arc::new(HS256.verifier_from_bytes(secret.as_bytes())?),
            lifetime_secs,
        })
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Sign an access token issued at `now`; returns the token and its absolute expiry.
    ///
    /// Every token gets a random `jti`, so two tokens for the same principal
    /// and client issued within the same second still differ.
    pub fn sign(
        &self,
        principal: &str,
        client_id: &str,
        now: i64,
    ) -> Result<(String, i64), GatekeeperError> {
        let expires_at = now + self.lifetime_secs;

        let mut payload = JwtPayload::new();
        payload.set_subject(principal);
        payload.set_issued_at(&unix_to_system(now));
        payload.set_expires_at(&unix_to_system(expires_at));
        payload.set_jwt_id(random_id());
        payload.set_claim("client_id", Some(Value::String(client_id.to_string())))?;

        let mut header = JwsHeader::new();
        header.set_token_type("JWT");
        let token = jwt::encode_with_signer(&payload, &header, self.signer.as_ref())?;
        Ok((token, expires_at))
    }

    /// Check the signature and extract claims. Expiry is not judged here.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, GatekeeperError> {
        let (payload, _header) = jwt::decode_with_verifier(token, self.verifier.as_ref())?;

        let subject = payload
            .subject()
            .ok_or_else(|| GatekeeperError::Jose("missing sub claim".into()))?
            .to_string();
        let client_id = payload
            .claim("client_id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatekeeperError::Jose("missing client_id claim".into()))?
            .to_string();
        let expires_at = payload
            .expires_at()
            .map(system_to_unix)
            .ok_or_else(|| GatekeeperError::Jose("missing exp claim".into()))?;
        let issued_at = payload.issued_at().map(system_to_unix).unwrap_or_default();

        Ok(AccessClaims {
            subject,
            client_id,
            issued_at,
            expires_at,
        })
    }
}

fn unix_to_system(secs: i64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
}

fn system_to_unix(t: SystemTime) -> i64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
