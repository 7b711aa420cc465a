use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use caucus_core::config::AuthConfig;
use caucus_db::db::DbProvider;
use caucus_db::db::query::api_token;
use caucus_db::model::api_token::NewApiToken;

use super::password::verify_password;
use super::token::{generate_token, hash_token};
use crate::error::{ServiceError, ServiceResult};

/// The identity a request was authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    pub subject: String,
}

/// A bearer token handed to a client at login.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"<redacted>")
            .field("subject", &self.subject)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Verifies credentials and bearer tokens for the mutating endpoints.
#[salvo::async_trait]
pub trait Authenticator: Send + Sync {
    /// ## Summary
    /// Checks a username and password.
    ///
    /// ## Errors
    /// Returns `InvalidCredentials` when they do not match.
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> ServiceResult<AuthenticatedSubject>;

    /// ## Summary
    /// Issues a new bearer token for an authenticated subject.
    ///
    /// ## Errors
    /// Returns an error if the token cannot be stored.
    async fn issue_token(&self, subject: &AuthenticatedSubject) -> ServiceResult<IssuedToken>;

    /// ## Summary
    /// Resolves a bearer token to its subject.
    ///
    /// ## Errors
    /// Returns `NotAuthenticated` for unknown or expired tokens.
    async fn verify_bearer(&self, token: &str) -> ServiceResult<AuthenticatedSubject>;
}

/// Single-administrator authenticator. Credentials come from configuration;
/// issued tokens are stored as SHA-256 digests in `api_tokens`.
pub struct DbAuthenticator {
    provider: Arc<dyn DbProvider>,
    admin_username: String,
    admin_password_hash: String,
    token_ttl: Duration,
}

impl DbAuthenticator {
    #[must_use]
    pub fn new(provider: Arc<dyn DbProvider>, config: &AuthConfig) -> Self {
        Self {
            provider,
            admin_username: config.admin_username.clone(),
            admin_password_hash: config.admin_password_hash.clone(),
            token_ttl: Duration::minutes(i64::from(config.token_ttl_minutes)),
        }
    }
}

#[salvo::async_trait]
impl Authenticator for DbAuthenticator {
    #[tracing::instrument(skip(self, password))]
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> ServiceResult<AuthenticatedSubject> {
        if self.admin_username.is_empty() || self.admin_password_hash.is_empty() {
            return Err(ServiceError::InvalidConfiguration(
                "auth.admin_username and auth.admin_password_hash must be set".to_owned(),
            ));
        }

        // Verify the password even for an unknown username so both paths cost the same.
        let password_matches = match verify_password(password, &self.admin_password_hash) {
            Ok(()) => true,
            Err(ServiceError::InvalidCredentials) => false,
            Err(e) => return Err(e),
        };

        if password_matches && username == self.admin_username {
            tracing::debug!("Credentials verified");
            Ok(AuthenticatedSubject {
                subject: username.to_owned(),
            })
        } else {
            tracing::warn!("Rejected login attempt");
            Err(ServiceError::InvalidCredentials)
        }
    }

    #[tracing::instrument(skip(self))]
    async fn issue_token(&self, subject: &AuthenticatedSubject) -> ServiceResult<IssuedToken> {
        let now = Utc::now();
        let token = generate_token();
        let token_hash = hash_token(&token);
        let expires_at = now + self.token_ttl;

        let mut conn = self.provider.get_connection().await?;

        let purged = api_token::purge_expired(&mut conn, now).await?;
        if purged > 0 {
            tracing::debug!(purged, "Purged expired tokens");
        }

        api_token::create_token(
            &mut conn,
            &NewApiToken {
                id: uuid::Uuid::now_v7(),
                subject: &subject.subject,
                token_hash: &token_hash,
                expires_at,
            },
        )
        .await?;

        tracing::info!(subject = %subject.subject, %expires_at, "Bearer token issued");

        Ok(IssuedToken {
            token,
            subject: subject.subject.clone(),
            expires_at,
        })
    }

    #[tracing::instrument(skip(self, token))]
    async fn verify_bearer(&self, token: &str) -> ServiceResult<AuthenticatedSubject> {
        let mut conn = self.provider.get_connection().await?;

        let stored = api_token::find_valid(&mut conn, &hash_token(token), Utc::now())
            .await?
            .ok_or(ServiceError::NotAuthenticated)?;

        Ok(AuthenticatedSubject {
            subject: stored.subject,
        })
    }
}
