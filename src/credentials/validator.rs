use crate::credentials::errors::CredentialError;
use crate::signer::TokenSigner;
use crate::storage;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// A live bearer identity, as established by [`Validator::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authenticated {
    pub principal: String,
    pub client: String,
    pub expires_at: i64,
}

/// Resolves bearer access values to principals. Performs no authorization.
#[derive(Clone)]
pub struct Validator {
    db: DatabaseConnection,
    signer: TokenSigner,
}

impl Validator {
    pub fn new(db: DatabaseConnection, signer: TokenSigner) -> Self {
        Self { db, signer }
    }

    pub async fn validate(&self, access_token: &str) -> Result<Authenticated, CredentialError> {
        self.validate_at(access_token, Utc::now().timestamp()).await
    }

    /// Checks run cheapest first: shape and signature, then the signed expiry,
    /// and only then the store. An expired token therefore reports `Expired`
    /// even after its row has been revoked.
    pub async fn validate_at(
        &self,
        access_token: &str,
        now: i64,
    ) -> Result<Authenticated, CredentialError> {
        if !looks_like_jwt(access_token) {
            return Err(CredentialError::Malformed);
        }
        let claims = self
            .signer
            .verify(access_token)
            .map_err(|_| CredentialError::Malformed)?;
        if claims.expires_at <= now {
            return Err(CredentialError::Expired);
        }

        let row = storage::find_token_by_access(&self.db, access_token)
            .await?
            .ok_or(CredentialError::NotFound)?;
        if row.expires_at <= now {
            return Err(CredentialError::Expired);
        }

        Ok(Authenticated {
            principal: row.principal,
            client: row.client,
            expires_at: row.expires_at,
        })
    }
}

fn looks_like_jwt(value: &str) -> bool {
    let mut parts = value.split('.');
    let segments = [parts.next(), parts.next(), parts.next()];
    parts.next().is_none() && segments.iter().all(|s| matches!(s, Some(p) if !p.is_empty()))
}
