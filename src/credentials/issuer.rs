use crate::credentials::errors::CredentialError;
use crate::errors::GatekeeperError;
use crate::password;
use crate::signer::TokenSigner;
use crate::storage::{self, Token};
use chrono::Utc;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use subtle::ConstantTimeEq;

/// The only grant kind a client may exchange passwords under.
pub const PASSWORD_GRANT: &str = "password";

/// Exchanges verified credentials for tokens and manages their lifecycle.
#[derive(Clone)]
pub struct Issuer {
    db: DatabaseConnection,
    signer: TokenSigner,
    refresh_token_bytes: usize,
}

impl Issuer {
    pub fn new(db: DatabaseConnection, signer: TokenSigner, refresh_token_bytes: usize) -> Self {
        Self {
            db,
            signer,
            refresh_token_bytes,
        }
    }

    pub async fn issue_password_grant(
        &self,
        client_id: &str,
        client_secret: &str,
        principal: &str,
        password: &str,
    ) -> Result<Token, CredentialError> {
        self.issue_password_grant_at(
            client_id,
            client_secret,
            principal,
            password,
            Utc::now().timestamp(),
        )
        .await
    }

    pub async fn issue_password_grant_at(
        &self,
        client_id: &str,
        client_secret: &str,
        principal: &str,
        password: &str,
        now: i64,
    ) -> Result<Token, CredentialError> {
        let client = match storage::get_client(&self.db, client_id).await? {
            Some(c) if c.active => c,
            Some(_) => {
                tracing::info!(client = %client_id, "password grant from inactive client");
                return Err(CredentialError::InvalidClient);
            }
            None => {
                tracing::info!(client = %client_id, "password grant from unknown client");
                return Err(CredentialError::InvalidClient);
            }
        };
        if !secrets_match(client_secret, &client.secret) {
            tracing::info!(client = %client_id, "client secret mismatch");
            return Err(CredentialError::InvalidClient);
        }
        if client.grant_kind != PASSWORD_GRANT {
            return Err(CredentialError::UnsupportedGrant(PASSWORD_GRANT.to_string()));
        }

        let found = match storage::get_principal(&self.db, principal).await? {
            Some(p) if p.active => p,
            Some(_) => {
                tracing::debug!(principal = %principal, "password grant for inactive principal");
                return Err(CredentialError::InvalidPrincipal);
            }
            None => {
                tracing::debug!(principal = %principal, "password grant for unknown principal");
                return Err(CredentialError::InvalidPrincipal);
            }
        };
        match password::verify(password, &found.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(principal = %principal, client = %client_id, "password mismatch");
                return Err(CredentialError::InvalidPrincipal);
            }
            Err(e) => {
                tracing::warn!(principal = %principal, error = %e, "stored password hash is unreadable");
                return Err(CredentialError::InvalidPrincipal);
            }
        }

        let token = self.mint(&found.identifier, &client.identifier, now)?;
        storage::insert_token(&self.db, &token)
            .await
            .map_err(map_insert_error)?;

        tracing::info!(principal = %token.principal, client = %token.client, expires_at = token.expires_at, "token issued");
        Ok(token)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, CredentialError> {
        self.refresh_at(refresh_token, Utc::now().timestamp()).await
    }

    /// Replace the token holding `refresh_token` with a fresh one for the same
    /// principal and client. The old token is dead once this returns `Ok`.
    ///
    /// Of concurrent calls presenting the same value at most one succeeds; the
    /// others report `NotFound`.
    pub async fn refresh_at(&self, refresh_token: &str, now: i64) -> Result<Token, CredentialError> {
        if refresh_token.is_empty() {
            return Err(CredentialError::Malformed);
        }
        let existing = storage::find_token_by_refresh(&self.db, refresh_token)
            .await?
            .ok_or(CredentialError::NotFound)?;
        if existing.expires_at <= now {
            tracing::info!(principal = %existing.principal, client = %existing.client, "refresh with expired token");
            return Err(CredentialError::Expired);
        }

        let replacement = self.mint(&existing.principal, &existing.client, now)?;
        let rotated = storage::rotate_token(&self.db, refresh_token, &replacement)
            .await
            .map_err(map_insert_error)?;
        if !rotated {
            tracing::info!(principal = %existing.principal, "refresh lost to a concurrent rotation");
            return Err(CredentialError::NotFound);
        }

        tracing::info!(principal = %replacement.principal, client = %replacement.client, "token refreshed");
        Ok(replacement)
    }

    /// Delete the token with this access value. Revoking twice is fine.
    pub async fn revoke(&self, access_token: &str) -> Result<(), CredentialError> {
        let removed = storage::delete_token_by_access(&self.db, access_token).await?;
        if removed > 0 {
            tracing::info!("token revoked");
        }
        Ok(())
    }

    fn mint(&self, principal: &str, client: &str, now: i64) -> Result<Token, CredentialError> {
        let (access_token, expires_at) = self
            .signer
            .sign(principal, client, now)
            .map_err(|e| CredentialError::Signing(e.to_string()))?;

        Ok(Token {
            access_token,
            refresh_token: storage::random_token(self.refresh_token_bytes),
            principal: principal.to_string(),
            client: client.to_string(),
            expires_at,
            created_at: now,
        })
    }
}

fn secrets_match(presented: &str, stored: &str) -> bool {
    let (a, b) = (presented.as_bytes(), stored.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

fn map_insert_error(err: GatekeeperError) -> CredentialError {
    if let GatekeeperError::Db(db_err) = &err {
        if is_unique_violation(db_err) {
            return CredentialError::Conflict;
        }
    }
    CredentialError::Store(err)
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
