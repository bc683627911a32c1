//! PostgreSQL Repository Implementations

use auth::models::user_id::UserId;
use chrono::{DateTime, Utc};
use kernel::id::{AuthorizationCodeId, OAuthAppId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{
    AccessToken, AuthorizationCode, LoginFlowState, OAuthApp, OAuthIdentity,
};
use crate::domain::repository::{
    AccessTokenRepository, AuthorizationCodeRepository, IdentityRepository, LoginStateRepository,
    OAuthAppRepository,
};
use crate::domain::value_objects::{PkceChallenge, Provider, ScopeSet};
use crate::error::{OAuthError, OAuthResult};

/// PostgreSQL-backed OAuth repository
#[derive(Clone)]
pub struct PgOAuthRepository {
    pool: PgPool,
}

impl PgOAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired flow state, codes and access tokens
    ///
    /// Returns (login_states, authorization_codes, access_tokens) deleted.
    pub async fn cleanup_all_expired(&self) -> OAuthResult<(u64, u64, u64)> {
        let now_ms = Utc::now().timestamp_millis();

        let states = sqlx::query("DELETE FROM oauth_login_states WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        let codes =
            sqlx::query("DELETE FROM oauth_authorization_codes WHERE expires_at_ms < $1")
                .bind(now_ms)
                .execute(&self.pool)
                .await?
                .rows_affected();

        let tokens = sqlx::query("DELETE FROM oauth_access_tokens WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(
            login_states_deleted = states,
            codes_deleted = codes,
            access_tokens_deleted = tokens,
            "Cleaned up expired OAuth data"
        );

        Ok((states, codes, tokens))
    }
}

// ============================================================================
// Identity Repository Implementation
// ============================================================================

impl IdentityRepository for PgOAuthRepository {
    async fn create(&self, identity: &OAuthIdentity) -> OAuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO oauth_identities (
                identity_id, user_id, provider, provider_subject,
                email, display_name, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(identity.identity_id)
        .bind(identity.user_id.as_uuid())
        .bind(identity.provider.slug())
        .bind(&identity.provider_subject)
        .bind(&identity.email)
        .bind(&identity.display_name)
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_subject(
        &self,
        provider: Provider,
        subject: &str,
    ) -> OAuthResult<Option<OAuthIdentity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT identity_id, user_id, provider, provider_subject,
                   email, display_name, created_at, updated_at
            FROM oauth_identities
            WHERE provider = $1 AND provider_subject = $2
            "#,
        )
        .bind(provider.slug())
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_identity()).transpose()
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> OAuthResult<Vec<OAuthIdentity>> {
        let rows = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT identity_id, user_id, provider, provider_subject,
                   email, display_name, created_at, updated_at
            FROM oauth_identities
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_identity()).collect()
    }

    async fn update(&self, identity: &OAuthIdentity) -> OAuthResult<()> {
        sqlx::query(
            r#"
            UPDATE oauth_identities SET
                email = $2,
                display_name = $3,
                updated_at = $4
            WHERE identity_id = $1
            "#,
        )
        .bind(identity.identity_id)
        .bind(&identity.email)
        .bind(&identity.display_name)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, provider: Provider, user_id: &UserId) -> OAuthResult<u64> {
        let deleted =
            sqlx::query("DELETE FROM oauth_identities WHERE provider = $1 AND user_id = $2")
                .bind(provider.slug())
                .bind(user_id.as_uuid())
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Login State Repository Implementation
// ============================================================================

impl LoginStateRepository for PgOAuthRepository {
    async fn create(&self, state: &LoginFlowState) -> OAuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO oauth_login_states (
                state_id, state_hash, provider, pkce_verifier,
                link_user_id, redirect_to, expires_at_ms, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(state.state_id)
        .bind(&state.state_hash)
        .bind(state.provider.slug())
        .bind(&state.pkce_verifier)
        .bind(state.link_user_id.as_ref().map(|id| *id.as_uuid()))
        .bind(&state.redirect_to)
        .bind(state.expires_at_ms)
        .bind(state.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_by_hash(&self, state_hash: &[u8]) -> OAuthResult<Option<LoginFlowState>> {
        // Delete-and-return makes the state single-use under concurrency
        let row = sqlx::query_as::<_, LoginStateRow>(
            r#"
            DELETE FROM oauth_login_states
            WHERE state_hash = $1
            RETURNING state_id, state_hash, provider, pkce_verifier,
                      link_user_id, redirect_to, expires_at_ms, created_at
            "#,
        )
        .bind(state_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_state()).transpose()
    }

    async fn cleanup_expired(&self) -> OAuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM oauth_login_states WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// OAuth App Repository Implementation
// ============================================================================

impl OAuthAppRepository for PgOAuthRepository {
    async fn create(&self, app: &OAuthApp) -> OAuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO oauth_apps (
                app_id, client_id, client_secret_hash, name,
                redirect_uris, allowed_scopes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(app.app_id.as_uuid())
        .bind(&app.client_id)
        .bind(&app.client_secret_hash)
        .bind(&app.name)
        .bind(&app.redirect_uris)
        .bind(app.allowed_scopes.as_slice())
        .bind(app.created_at)
        .bind(app.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_client_id(&self, client_id: &str) -> OAuthResult<Option<OAuthApp>> {
        let row = sqlx::query_as::<_, OAuthAppRow>(
            r#"
            SELECT app_id, client_id, client_secret_hash, name,
                   redirect_uris, allowed_scopes, created_at, updated_at
            FROM oauth_apps
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_app()))
    }

    async fn list(&self) -> OAuthResult<Vec<OAuthApp>> {
        let rows = sqlx::query_as::<_, OAuthAppRow>(
            r#"
            SELECT app_id, client_id, client_secret_hash, name,
                   redirect_uris, allowed_scopes, created_at, updated_at
            FROM oauth_apps
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_app()).collect())
    }
}

// ============================================================================
// Authorization Code Repository Implementation
// ============================================================================

impl AuthorizationCodeRepository for PgOAuthRepository {
    async fn create(&self, code: &AuthorizationCode) -> OAuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO oauth_authorization_codes (
                code_id, app_id, user_id, code_hash, redirect_uri,
                scope, code_challenge, expires_at_ms, used_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(code.code_id.as_uuid())
        .bind(code.app_id.as_uuid())
        .bind(code.user_id.as_uuid())
        .bind(&code.code_hash)
        .bind(&code.redirect_uri)
        .bind(code.scope.as_slice())
        .bind(code.code_challenge.as_str())
        .bind(code.expires_at_ms)
        .bind(code.used_at)
        .bind(code.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_hash(&self, code_hash: &[u8]) -> OAuthResult<Option<AuthorizationCode>> {
        let row = sqlx::query_as::<_, AuthorizationCodeRow>(
            r#"
            SELECT code_id, app_id, user_id, code_hash, redirect_uri,
                   scope, code_challenge, expires_at_ms, used_at, created_at
            FROM oauth_authorization_codes
            WHERE code_hash = $1
            "#,
        )
        .bind(code_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_code()).transpose()
    }

    async fn mark_used(&self, code: &AuthorizationCode) -> OAuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE oauth_authorization_codes SET used_at = $2
            WHERE code_id = $1 AND used_at IS NULL
            "#,
        )
        .bind(code.code_id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(OAuthError::CodeInvalid);
        }

        Ok(())
    }

    async fn cleanup_expired(&self) -> OAuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted =
            sqlx::query("DELETE FROM oauth_authorization_codes WHERE expires_at_ms < $1")
                .bind(now_ms)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Access Token Repository Implementation
// ============================================================================

impl AccessTokenRepository for PgOAuthRepository {
    async fn create(&self, token: &AccessToken) -> OAuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO oauth_access_tokens (
                token_id, app_id, user_id, token_hash, scope,
                expires_at_ms, revoked_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(token.token_id)
        .bind(token.app_id.as_uuid())
        .bind(token.user_id.as_uuid())
        .bind(&token.token_hash)
        .bind(token.scope.as_slice())
        .bind(token.expires_at_ms)
        .bind(token.revoked_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &[u8]) -> OAuthResult<Option<AccessToken>> {
        let row = sqlx::query_as::<_, AccessTokenRow>(
            r#"
            SELECT token_id, app_id, user_id, token_hash, scope,
                   expires_at_ms, revoked_at, created_at
            FROM oauth_access_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_token()))
    }

    async fn revoke_by_hash(&self, token_hash: &[u8]) -> OAuthResult<u64> {
        let revoked = sqlx::query(
            r#"
            UPDATE oauth_access_tokens SET revoked_at = $2
            WHERE token_hash = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(revoked)
    }

    async fn cleanup_expired(&self) -> OAuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM oauth_access_tokens WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

fn parse_provider(slug: &str) -> OAuthResult<Provider> {
    Provider::from_slug(slug)
        .ok_or_else(|| OAuthError::Internal(format!("Unknown provider in database: {slug}")))
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    identity_id: Uuid,
    user_id: Uuid,
    provider: String,
    provider_subject: String,
    email: Option<String>,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IdentityRow {
    fn into_identity(self) -> OAuthResult<OAuthIdentity> {
        Ok(OAuthIdentity {
            identity_id: self.identity_id,
            user_id: UserId::from_uuid(self.user_id),
            provider: parse_provider(&self.provider)?,
            provider_subject: self.provider_subject,
            email: self.email,
            display_name: self.display_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LoginStateRow {
    state_id: Uuid,
    state_hash: Vec<u8>,
    provider: String,
    pkce_verifier: String,
    link_user_id: Option<Uuid>,
    redirect_to: Option<String>,
    expires_at_ms: i64,
    created_at: DateTime<Utc>,
}

impl LoginStateRow {
    fn into_state(self) -> OAuthResult<LoginFlowState> {
        Ok(LoginFlowState {
            state_id: self.state_id,
            state_hash: self.state_hash,
            provider: parse_provider(&self.provider)?,
            pkce_verifier: self.pkce_verifier,
            link_user_id: self.link_user_id.map(UserId::from_uuid),
            redirect_to: self.redirect_to,
            expires_at_ms: self.expires_at_ms,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OAuthAppRow {
    app_id: Uuid,
    client_id: String,
    client_secret_hash: Option<Vec<u8>>,
    name: String,
    redirect_uris: Vec<String>,
    allowed_scopes: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OAuthAppRow {
    fn into_app(self) -> OAuthApp {
        OAuthApp {
            app_id: OAuthAppId::from_uuid(self.app_id),
            client_id: self.client_id,
            client_secret_hash: self.client_secret_hash,
            name: self.name,
            redirect_uris: self.redirect_uris,
            allowed_scopes: ScopeSet::from_vec(self.allowed_scopes),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthorizationCodeRow {
    code_id: Uuid,
    app_id: Uuid,
    user_id: Uuid,
    code_hash: Vec<u8>,
    redirect_uri: String,
    scope: Vec<String>,
    code_challenge: String,
    expires_at_ms: i64,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl AuthorizationCodeRow {
    fn into_code(self) -> OAuthResult<AuthorizationCode> {
        let code_challenge = PkceChallenge::new(self.code_challenge)
            .ok_or_else(|| OAuthError::Internal("Invalid PKCE challenge in database".to_string()))?;

        Ok(AuthorizationCode {
            code_id: AuthorizationCodeId::from_uuid(self.code_id),
            app_id: OAuthAppId::from_uuid(self.app_id),
            user_id: UserId::from_uuid(self.user_id),
            code_hash: self.code_hash,
            redirect_uri: self.redirect_uri,
            scope: ScopeSet::from_vec(self.scope),
            code_challenge,
            expires_at_ms: self.expires_at_ms,
            used_at: self.used_at,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AccessTokenRow {
    token_id: Uuid,
    app_id: Uuid,
    user_id: Uuid,
    token_hash: Vec<u8>,
    scope: Vec<String>,
    expires_at_ms: i64,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl AccessTokenRow {
    fn into_token(self) -> AccessToken {
        AccessToken {
            token_id: self.token_id,
            app_id: OAuthAppId::from_uuid(self.app_id),
            user_id: UserId::from_uuid(self.user_id),
            token_hash: self.token_hash,
            scope: ScopeSet::from_vec(self.scope),
            expires_at_ms: self.expires_at_ms,
            revoked_at: self.revoked_at,
            created_at: self.created_at,
        }
    }
}
