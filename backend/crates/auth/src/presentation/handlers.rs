//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

use platform::client::{ClientFingerprint, extract_client_ip, extract_fingerprint};
use platform::cookie::CookieConfig;
use platform::rate_limit::{RateLimitConfig, RateLimitStore};

use crate::application::config::AuthConfig;
use crate::application::{
    BackupCodeUseCase, CheckSessionUseCase, LoginHistoryUseCase, PasswordResetUseCase,
    SessionsUseCase, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
    TokenService, TotpSetupUseCase,
};
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::{
    AuthRepository, AuthSessionRepository, BackupCodeRepository, LoginHistoryRepository,
    PasswordResetRepository, RefreshTokenRepository, UserDetailsRepository, UserRepository,
};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    BackupCodesRegenerateRequest, BackupCodesResponse, BackupCodesStatusResponse,
    LoginAttemptResponse, LoginHistoryResponse, PasswordResetConfirmBody,
    PasswordResetRequestBody, SessionListResponse, SessionResponse, SessionStatusResponse,
    SignInRequest, SignInResponse, SignUpRequest, SignUpResponse, TokenPairResponse,
    TokenRefreshRequest, TokenRevokeRequest, TotpDisableRequest, TotpSetupResponse,
    TotpVerifyRequest, TotpVerifyResponse,
};

/// Everything the auth handlers need from persistence
///
/// Implemented automatically for any type that provides all the
/// repository traits (in practice `PgAuthRepository`).
pub trait AuthRepositories:
    UserRepository
    + UserDetailsRepository
    + AuthRepository
    + AuthSessionRepository
    + RefreshTokenRepository
    + BackupCodeRepository
    + PasswordResetRepository
    + LoginHistoryRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthRepositories for T where
    T: UserRepository
        + UserDetailsRepository
        + AuthRepository
        + AuthSessionRepository
        + RefreshTokenRepository
        + BackupCodeRepository
        + PasswordResetRepository
        + LoginHistoryRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, L>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub rate_store: Arc<L>,
    pub config: Arc<AuthConfig>,
}

// Per-route rate limits: (max requests, window seconds), keyed by IP
const SIGNIN_LIMIT: (u32, u64) = (10, 300);
const SIGNUP_LIMIT: (u32, u64) = (5, 3600);
const RESET_LIMIT: (u32, u64) = (3, 3600);

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<Json<SignUpResponse>>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    enforce_rate_limit(&state, "signup", SIGNUP_LIMIT, &headers, addr).await?;

    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let input = SignUpInput {
        user_name: req.user_name,
        email: req.email,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(SignUpResponse {
        public_id: output.public_id,
    }))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/signin
pub async fn sign_in<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    enforce_rate_limit(&state, "signin", SIGNIN_LIMIT, &headers, addr).await?;

    let fingerprint = request_fingerprint(&headers, addr)?;

    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let remember_me = req.remember_me;
    let with_tokens = req.with_tokens;

    let input = SignInInput {
        identifier: req.identifier,
        password: req.password,
        remember_me,
        totp_code: req.totp_code,
        backup_code: req.backup_code,
    };

    let output = use_case.execute(input, fingerprint.clone()).await?;

    if output.requires_2fa {
        // 2FA required - return response without session cookie
        return Ok((
            StatusCode::OK,
            Json(SignInResponse {
                public_id: output.public_id,
                requires_2fa: true,
                tokens: None,
            }),
        )
            .into_response());
    }

    // Issue an API token pair when requested
    let tokens = if with_tokens {
        let user_id = output
            .user_id
            .as_ref()
            .ok_or(AuthError::Internal("Missing user after sign-in".to_string()))?;
        let token_service = TokenService::new(
            state.repo.clone(),
            state.repo.clone(),
            state.config.clone(),
        );
        let pair = token_service.issue(user_id, &fingerprint).await?;
        Some(TokenPairResponse {
            access_token: pair.access_token,
            token_type: "Bearer".to_string(),
            expires_in: pair.access_expires_in,
            refresh_token: pair.refresh_token,
        })
    } else {
        None
    };

    // Success - set session cookie (Max-Age must match remember_me)
    let cookie = build_session_cookie(&state.config, &output.session_token, remember_me);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SignInResponse {
            public_id: output.public_id,
            requires_2fa: false,
            tokens,
        }),
    )
        .into_response())
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/auth/signout
pub async fn sign_out<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let token = extract_session_cookie(&headers, &state.config.session_cookie_name);

    if let Some(token) = token {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
        // Ignore errors - just clear the cookie
        let _ = use_case.execute(&token).await;
    }

    let cookie = build_clear_cookie(&state.config);

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

/// POST /api/auth/signout-all
pub async fn sign_out_all<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
) -> AuthResult<StatusCode>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let fingerprint = request_fingerprint(&headers, addr)?;

    let token = extract_session_cookie(&headers, &state.config.session_cookie_name)
        .ok_or(AuthError::SessionInvalid)?;

    let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
    use_case.execute_all(&token, &fingerprint.hash).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/status
pub async fn session_status<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
) -> AuthResult<Json<SessionStatusResponse>>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let fingerprint = request_fingerprint(&headers, addr)?;

    let token = extract_session_cookie(&headers, &state.config.session_cookie_name);

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());

    let session_info = if let Some(token) = token {
        use_case.execute(&token, &fingerprint.hash).await.ok()
    } else {
        None
    };

    match session_info {
        Some(info) => Ok(Json(SessionStatusResponse {
            authenticated: true,
            public_id: Some(info.public_id),
            user_role: Some(info.user_role),
            expires_at_ms: Some(info.expires_at_ms),
        })),
        None => Ok(Json(SessionStatusResponse {
            authenticated: false,
            public_id: None,
            user_role: None,
            expires_at_ms: None,
        })),
    }
}

// ============================================================================
// Session Management
// ============================================================================

/// GET /api/auth/sessions
pub async fn list_sessions<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
) -> AuthResult<Json<SessionListResponse>>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, addr).await?;

    let use_case = SessionsUseCase::new(state.repo.clone());
    let sessions = use_case.list(&session.user_id, session.session_id).await?;

    Ok(Json(SessionListResponse {
        sessions: sessions
            .into_iter()
            .map(|s| SessionResponse {
                session_id: s.session_id.to_string(),
                user_agent: s.user_agent,
                client_ip: s.client_ip,
                created_at_ms: s.created_at.timestamp_millis(),
                last_activity_at_ms: s.last_activity_at.timestamp_millis(),
                is_current: s.is_current,
            })
            .collect(),
    }))
}

/// DELETE /api/auth/sessions/{session_id}
pub async fn revoke_session<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Path(session_id): Path<Uuid>,
) -> AuthResult<StatusCode>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, addr).await?;

    let use_case = SessionsUseCase::new(state.repo.clone());
    use_case.revoke(&session.user_id, session_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// TOTP Setup (requires authentication)
// ============================================================================

/// POST /api/auth/totp/setup
pub async fn totp_setup<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
) -> AuthResult<Json<TotpSetupResponse>>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, addr).await?;

    let use_case =
        TotpSetupUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());

    let output = use_case.setup(&session.user_id).await?;

    Ok(Json(TotpSetupResponse {
        qr_code: output.qr_code_base64,
        secret: output.secret,
        otpauth_url: output.otpauth_url,
    }))
}

/// POST /api/auth/totp/verify
pub async fn totp_verify<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Json(req): Json<TotpVerifyRequest>,
) -> AuthResult<Json<TotpVerifyResponse>>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, addr).await?;

    let use_case =
        TotpSetupUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());

    let output = use_case.verify(&session.user_id, &req.code).await?;

    Ok(Json(TotpVerifyResponse {
        backup_codes: output.backup_codes,
    }))
}

/// POST /api/auth/totp/disable
pub async fn totp_disable<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Json(req): Json<TotpDisableRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, addr).await?;

    let use_case =
        TotpSetupUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());

    use_case.disable(&session.user_id, &req.code).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Backup Codes (requires authentication)
// ============================================================================

/// GET /api/auth/backup-codes
pub async fn backup_codes_status<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
) -> AuthResult<Json<BackupCodesStatusResponse>>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, addr).await?;

    let use_case =
        BackupCodeUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());

    let remaining = use_case.remaining(&session.user_id).await?;

    Ok(Json(BackupCodesStatusResponse { remaining }))
}

/// POST /api/auth/backup-codes/regenerate
pub async fn backup_codes_regenerate<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Json(req): Json<BackupCodesRegenerateRequest>,
) -> AuthResult<Json<BackupCodesResponse>>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, addr).await?;

    let use_case =
        BackupCodeUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());

    let backup_codes = use_case
        .regenerate(&session.user_id, &req.totp_code)
        .await?;

    Ok(Json(BackupCodesResponse { backup_codes }))
}

// ============================================================================
// Token Refresh / Revoke
// ============================================================================

/// POST /api/auth/token/refresh
pub async fn token_refresh<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Json(req): Json<TokenRefreshRequest>,
) -> AuthResult<Json<TokenPairResponse>>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let fingerprint = request_fingerprint(&headers, addr)?;

    let token_service = TokenService::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let pair = token_service
        .refresh(&req.refresh_token, &fingerprint)
        .await?;

    Ok(Json(TokenPairResponse {
        access_token: pair.access_token,
        token_type: "Bearer".to_string(),
        expires_in: pair.access_expires_in,
        refresh_token: pair.refresh_token,
    }))
}

/// POST /api/auth/token/revoke
pub async fn token_revoke<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Json(req): Json<TokenRevokeRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let token_service = TokenService::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    // Unknown tokens get the same answer as revoked ones
    match token_service.revoke(&req.refresh_token).await {
        Ok(()) | Err(AuthError::InvalidToken) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e),
    }
}

// ============================================================================
// Password Reset
// ============================================================================

/// POST /api/auth/password-reset/request
pub async fn password_reset_request<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Json(req): Json<PasswordResetRequestBody>,
) -> AuthResult<StatusCode>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    enforce_rate_limit(&state, "password-reset", RESET_LIMIT, &headers, addr).await?;

    let use_case = PasswordResetUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    // The answer never reveals whether the email matched an account
    match use_case.request(&req.email).await {
        Ok(Some(output)) => {
            // Delivery is a deployment concern (mail relay); the token
            // reaches the log only at debug level
            tracing::debug!(
                public_id = %output.public_id,
                email = %output.email,
                reset_token = %output.reset_token,
                "Password reset token ready for delivery"
            );
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Password reset request failed");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/password-reset/confirm
pub async fn password_reset_confirm<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Json(req): Json<PasswordResetConfirmBody>,
) -> AuthResult<StatusCode>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let use_case = PasswordResetUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    use_case.confirm(&req.token, req.new_password).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Login History
// ============================================================================

/// Query parameters for login history
#[derive(Debug, Deserialize)]
pub struct LoginHistoryQuery {
    pub limit: Option<u32>,
}

/// GET /api/auth/login-history
pub async fn login_history<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Query(query): Query<LoginHistoryQuery>,
) -> AuthResult<Json<LoginHistoryResponse>>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, addr).await?;

    let use_case = LoginHistoryUseCase::new(state.repo.clone());
    let attempts = use_case.list(&session.user_id, query.limit).await?;

    Ok(Json(LoginHistoryResponse {
        attempts: attempts
            .into_iter()
            .map(|a| LoginAttemptResponse {
                success: a.success,
                identifier: a.identifier,
                failure_reason: a.failure_reason.map(|r| r.code().to_string()),
                client_ip: a.client_ip,
                user_agent: a.user_agent,
                created_at_ms: a.created_at.timestamp_millis(),
            })
            .collect(),
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn request_fingerprint(headers: &HeaderMap, addr: SocketAddr) -> AuthResult<ClientFingerprint> {
    let client_ip = extract_client_ip(headers, Some(addr.ip()));
    Ok(extract_fingerprint(headers, client_ip)?)
}

/// Resolve the session behind the request cookie
async fn current_session<R, L>(
    state: &AuthAppState<R, L>,
    headers: &HeaderMap,
    addr: SocketAddr,
) -> AuthResult<AuthSession>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let fingerprint = request_fingerprint(headers, addr)?;

    let token = extract_session_cookie(headers, &state.config.session_cookie_name)
        .ok_or(AuthError::SessionInvalid)?;

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
    use_case.get_session(&token, &fingerprint.hash).await
}

async fn enforce_rate_limit<R, L>(
    state: &AuthAppState<R, L>,
    route: &str,
    (max_requests, window_secs): (u32, u64),
    headers: &HeaderMap,
    addr: SocketAddr,
) -> AuthResult<()>
where
    R: AuthRepositories,
    L: RateLimitStore + Clone + Send + Sync + 'static,
{
    let ip = extract_client_ip(headers, Some(addr.ip()))
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("{}:{}", route, ip);
    let config = RateLimitConfig::new(max_requests, window_secs);

    match state.rate_store.check_and_increment(&key, &config).await {
        Ok(result) if !result.allowed => Err(AuthError::RateLimited),
        Ok(_) => Ok(()),
        Err(e) => {
            // A broken counter store must not take sign-in down with it
            tracing::warn!(error = %e, "Rate limit check failed, allowing request");
            Ok(())
        }
    }
}

fn extract_session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    platform::cookie::extract_cookie(headers, name)
}

fn session_cookie_config(config: &AuthConfig, max_age_secs: Option<i64>) -> CookieConfig {
    CookieConfig {
        name: config.session_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs,
    }
}

fn build_session_cookie(config: &AuthConfig, token: &str, remember_me: bool) -> String {
    let max_age = if remember_me {
        config.session_ttl_long.as_secs()
    } else {
        config.session_ttl_short.as_secs()
    };

    session_cookie_config(config, Some(max_age as i64)).build_set_cookie(token)
}

fn build_clear_cookie(config: &AuthConfig) -> String {
    session_cookie_config(config, None).build_delete_cookie()
}
