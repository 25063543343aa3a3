// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session and credential lifecycle.
//!
//! Orchestrates the password hasher, token signer, and refresh-token
//! ledger. Refresh tokens are single-use: every refresh deletes the
//! presented row and inserts a new one in the same store transaction, so a
//! rotated-out token can never be replayed.

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{generate_refresh_token, TokenSigner};
use crate::config::Settings;
use crate::error::AppError;
use crate::metrics as keys;
use crate::store::{RefreshTokenRecord, RefreshTokenStore, UserRecord, UserStore};
use crate::validation;
use chrono::{Duration, Utc};
use flowtodo_common::{LoginResponse, RegisterRequest, TokenPairResponse, UserView};
use metrics::counter;
use std::sync::Arc;
use uuid::Uuid;

/// Manages registration, login, token refresh, and logout.
pub struct SessionManager<S> {
    store: Arc<S>,
    signer: TokenSigner,
    refresh_ttl: Duration,
    password_req: crate::config::PasswordRequirements,
}

impl<S> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            signer: self.signer.clone(),
            refresh_ttl: self.refresh_ttl,
            password_req: self.password_req.clone(),
        }
    }
}

impl<S> SessionManager<S>
where
    S: UserStore + RefreshTokenStore,
{
    pub fn new(store: Arc<S>, settings: &Settings) -> Self {
        Self {
            store,
            signer: TokenSigner::new(
                &settings.secret_key,
                Duration::minutes(settings.access_token_ttl_mins),
            ),
            refresh_ttl: Duration::days(settings.refresh_token_ttl_days),
            password_req: settings.password.clone(),
        }
    }

    /// Register a new user. Emails are unique, case-sensitive.
    pub async fn register(&self, req: RegisterRequest) -> Result<UserView, AppError> {
        validation::validate_email(&req.email)?;
        validation::validate_password(&req.password, &self.password_req)?;

        let password_hash = hash_password(&req.password)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
        let user = self
            .store
            .insert_user(UserRecord {
                id: Uuid::new_v4(),
                email: req.email,
                name: req.name,
                password_hash,
            })
            .await?;

        counter!(keys::USER_REGISTERED).increment(1);
        tracing::info!(user_id = %user.id, "user registered");
        Ok(UserView::from(&user))
    }

    /// Whether an email is already registered.
    pub async fn check_email(&self, email: &str) -> Result<bool, AppError> {
        self.store.email_exists(email).await
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown email and wrong password produce the same error, so callers
    /// cannot enumerate accounts.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        user_agent: Option<String>,
    ) -> Result<LoginResponse, AppError> {
        let user = match self.store.find_user_by_email(email).await? {
            Some(user) if verify_password(&user.password_hash, password) => user,
            _ => {
                counter!(keys::LOGIN_FAILED).increment(1);
                return Err(AppError::InvalidCredentials);
            },
        };

        let access_token = self.signer.issue_access_token(user.id)?;
        let refresh = self
            .store
            .insert_refresh_token(self.new_refresh_record(user.id, user_agent))
            .await?;

        counter!(keys::LOGIN_SUCCESS).increment(1);
        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(LoginResponse {
            tokens: TokenPairResponse::bearer(access_token, refresh.token),
            user: UserView::from(&user),
        })
    }

    /// Exchange a refresh token for a fresh token pair, rotating it out.
    ///
    /// An expired token is deleted on sight and reported as `TokenExpired`;
    /// a token already rotated out (including by a concurrent refresh) is
    /// `InvalidToken`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPairResponse, AppError> {
        let record = self
            .store
            .find_refresh_token(refresh_token)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if record.expires_at < Utc::now() {
            // Lazy expiry: remove the dead row on its next use.
            self.store.remove_refresh_token(refresh_token).await?;
            return Err(AppError::TokenExpired);
        }

        // Sign first: once the rotation commits the old token is gone, so
        // a signing failure after that point would strand the session.
        let access_token = self.signer.issue_access_token(record.user_id)?;

        // New token inherits the user agent the session was opened with.
        let new_record = self.new_refresh_record(record.user_id, record.user_agent.clone());
        let rotated = self
            .store
            .rotate_refresh_token(refresh_token, new_record)
            .await?
            .ok_or(AppError::InvalidToken)?;

        counter!(keys::TOKEN_REFRESHED).increment(1);
        tracing::debug!(user_id = %record.user_id, "refresh token rotated");
        Ok(TokenPairResponse::bearer(access_token, rotated.token))
    }

    /// Revoke one refresh token. Idempotent: revoking an unknown or
    /// already-revoked token succeeds, so callers cannot probe which
    /// tokens are live.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        if self.store.remove_refresh_token(refresh_token).await? {
            counter!(keys::TOKEN_REVOKED).increment(1);
        }
        Ok(())
    }

    /// Revoke every refresh token the user holds; returns the count.
    pub async fn logout_all(&self, user_id: Uuid) -> Result<u64, AppError> {
        let count = self.store.remove_refresh_tokens_for_user(user_id).await?;
        counter!(keys::TOKEN_REVOKED).increment(count);
        tracing::info!(user_id = %user_id, devices = count, "logged out everywhere");
        Ok(count)
    }

    /// Resolve a bearer access token to its user.
    ///
    /// Precondition of every protected operation. A valid signature whose
    /// subject no longer exists (deleted account, token not yet expired)
    /// is `UserNotFound`.
    pub async fn authenticate(&self, bearer_token: &str) -> Result<UserRecord, AppError> {
        let subject = self.signer.verify_access_token(bearer_token)?;
        self.store
            .find_user_by_id(subject)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Delete the account and everything it owns (refresh tokens, todos).
    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), AppError> {
        self.store.delete_user(user_id).await?;
        tracing::info!(user_id = %user_id, "account deleted");
        Ok(())
    }

    fn new_refresh_record(&self, user_id: Uuid, user_agent: Option<String>) -> RefreshTokenRecord {
        let now = Utc::now();
        RefreshTokenRecord {
            id: Uuid::new_v4(),
            user_id,
            token: generate_refresh_token(),
            user_agent,
            created_at: now,
            expires_at: now + self.refresh_ttl,
        }
    }
}
