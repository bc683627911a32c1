//! HTTP Handlers

use axum::Json;
use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use std::net::SocketAddr;
use std::sync::Arc;

use auth::application::CheckSessionUseCase;
use auth::application::config::AuthConfig;
use auth::domain::entity::auth_session::AuthSession;
use auth::presentation::AuthRepositories;
use platform::client::{ClientFingerprint, extract_client_ip, extract_fingerprint};
use platform::cookie::CookieConfig;

use crate::application::{
    AuthorizeInput, AuthorizeUseCase, CallbackInput, CallbackUseCase, ConnectUseCase,
    OAuthConfig, RegisterAppInput, RegisterAppUseCase, TokenExchangeUseCase, TokenRequestInput,
    TokenRevokeUseCase, UserinfoUseCase,
};
use crate::domain::repository::{IdentityRepository, OAuthRepositories};
use crate::domain::value_objects::Provider;
use crate::error::{OAuthError, OAuthResult};
use crate::presentation::dto::{
    AppInfo, AppListResponse, AuthorizeQuery, CallbackQuery, CallbackResponse, ConnectQuery,
    IdentityInfo, IdentityListResponse, ProviderInfo, ProvidersResponse, RegisterAppRequest,
    RegisterAppResponse, RevokeForm, TokenErrorResponse, TokenRequestForm, TokenResponse,
    UserinfoResponse,
};

/// Shared state for OAuth handlers
#[derive(Clone)]
pub struct OAuthAppState<O, R>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    pub oauth_repo: Arc<O>,
    pub auth_repo: Arc<R>,
    pub oauth_config: Arc<OAuthConfig>,
    pub auth_config: Arc<AuthConfig>,
}

// ============================================================================
// Providers
// ============================================================================

/// GET /api/oauth/providers
pub async fn list_providers<O, R>(
    State(state): State<OAuthAppState<O, R>>,
) -> Json<ProvidersResponse>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let providers = state
        .oauth_config
        .providers
        .iter()
        .map(|p| ProviderInfo {
            slug: p.provider.slug().to_string(),
            display_name: p.provider.display_name().to_string(),
        })
        .collect();

    Json(ProvidersResponse { providers })
}

// ============================================================================
// External Sign-In
// ============================================================================

/// GET /api/oauth/connect/{provider}
///
/// Starts the provider flow. A valid session turns the flow into
/// identity linking instead of sign-in.
pub async fn connect<O, R>(
    State(state): State<OAuthAppState<O, R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Path(provider): Path<String>,
    Query(query): Query<ConnectQuery>,
) -> OAuthResult<Redirect>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let provider = Provider::from_slug(&provider)
        .ok_or_else(|| OAuthError::ProviderNotFound(provider.clone()))?;

    // Optional session: linking when present, plain sign-in otherwise
    let link_user_id = current_session(&state, &headers, addr)
        .await
        .ok()
        .map(|session| session.user_id);

    let use_case = ConnectUseCase::new(state.oauth_repo.clone(), state.oauth_config.clone());
    let output = use_case
        .execute(provider, link_user_id, query.redirect_to)
        .await?;

    Ok(Redirect::to(&output.authorize_url))
}

/// GET /api/oauth/callback/{provider}
pub async fn callback<O, R>(
    State(state): State<OAuthAppState<O, R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> OAuthResult<Response>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let provider = Provider::from_slug(&provider)
        .ok_or_else(|| OAuthError::ProviderNotFound(provider.clone()))?;

    if let Some(error) = query.error {
        tracing::info!(provider = %provider, error = %error, "Provider denied the flow");
        return Err(OAuthError::StateInvalid);
    }

    let (code, flow_state) = match (query.code, query.state) {
        (Some(code), Some(state)) => (code, state),
        _ => return Err(OAuthError::StateInvalid),
    };

    let fingerprint = request_fingerprint(&headers, addr)?;

    let use_case = CallbackUseCase::new(
        state.oauth_repo.clone(),
        state.auth_repo.clone(),
        state.oauth_config.clone(),
        state.auth_config.clone(),
    );

    let output = use_case
        .execute(
            CallbackInput {
                provider,
                state: flow_state,
                code,
            },
            fingerprint,
        )
        .await?;

    let body = CallbackResponse {
        public_id: output.public_id,
        requires_2fa: output.requires_2fa,
        linked: output.linked,
        redirect_to: output.redirect_to,
    };

    // Only a full sign-in carries a session cookie
    if output.session_token.is_empty() {
        return Ok((StatusCode::OK, Json(body)).into_response());
    }

    let cookie = build_session_cookie(&state.auth_config, &output.session_token);

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

// ============================================================================
// Linked Identities
// ============================================================================

/// GET /api/oauth/identities
pub async fn list_identities<O, R>(
    State(state): State<OAuthAppState<O, R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
) -> OAuthResult<Json<IdentityListResponse>>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let session = current_session(&state, &headers, addr).await?;

    let identities = IdentityRepository::find_by_user_id(
        state.oauth_repo.as_ref(),
        &session.user_id,
    )
    .await?;

    Ok(Json(IdentityListResponse {
        identities: identities
            .into_iter()
            .map(|i| IdentityInfo {
                provider: i.provider.slug().to_string(),
                display_name: i.display_name,
                email: i.email,
                linked_at_ms: i.created_at.timestamp_millis(),
            })
            .collect(),
    }))
}

/// DELETE /api/oauth/identities/{provider}
pub async fn unlink_identity<O, R>(
    State(state): State<OAuthAppState<O, R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Path(provider): Path<String>,
) -> OAuthResult<StatusCode>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let provider = Provider::from_slug(&provider)
        .ok_or_else(|| OAuthError::ProviderNotFound(provider.clone()))?;

    let session = current_session(&state, &headers, addr).await?;

    let deleted =
        IdentityRepository::delete(state.oauth_repo.as_ref(), provider, &session.user_id).await?;

    if deleted == 0 {
        return Err(OAuthError::IdentityNotFound);
    }

    tracing::info!(
        user_id = %session.user_id,
        provider = %provider,
        "External identity unlinked"
    );

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Authorization Server
// ============================================================================

/// GET /api/oauth/authorize
pub async fn authorize<O, R>(
    State(state): State<OAuthAppState<O, R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Query(query): Query<AuthorizeQuery>,
) -> OAuthResult<Redirect>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let session = current_session(&state, &headers, addr).await?;

    let use_case = AuthorizeUseCase::new(state.oauth_repo.clone(), state.oauth_config.clone());

    let output = use_case
        .execute(
            AuthorizeInput {
                response_type: query.response_type,
                client_id: query.client_id,
                redirect_uri: query.redirect_uri,
                scope: query.scope,
                state: query.state,
                code_challenge: query.code_challenge,
                code_challenge_method: query.code_challenge_method,
            },
            &session.user_id,
        )
        .await?;

    Ok(Redirect::to(&output.redirect_url))
}

/// POST /api/oauth/token
///
/// Speaks the RFC 6749 error vocabulary instead of the app envelope.
pub async fn token<O, R>(
    State(state): State<OAuthAppState<O, R>>,
    Form(form): Form<TokenRequestForm>,
) -> Response
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let use_case = TokenExchangeUseCase::new(state.oauth_repo.clone(), state.oauth_config.clone());

    let input = TokenRequestInput {
        grant_type: form.grant_type,
        code: form.code,
        redirect_uri: form.redirect_uri,
        client_id: form.client_id,
        client_secret: form.client_secret,
        code_verifier: form.code_verifier,
    };

    match use_case.execute(input).await {
        Ok(output) => (
            StatusCode::OK,
            Json(TokenResponse {
                access_token: output.access_token,
                token_type: "Bearer".to_string(),
                expires_in: output.expires_in,
                scope: output.scope,
            }),
        )
            .into_response(),
        Err(e) => {
            let status = match &e {
                OAuthError::ClientAuthFailed | OAuthError::AppNotFound => {
                    StatusCode::UNAUTHORIZED
                }
                OAuthError::Database(_) | OAuthError::Internal(_) => {
                    return e.into_response();
                }
                _ => StatusCode::BAD_REQUEST,
            };
            tracing::debug!(error = %e, "Token exchange rejected");
            (
                status,
                Json(TokenErrorResponse {
                    error: e.rfc_error_code().to_string(),
                    error_description: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /api/oauth/revoke
///
/// RFC 7009: answers 200 whether or not the token existed.
pub async fn revoke<O, R>(
    State(state): State<OAuthAppState<O, R>>,
    Form(form): Form<RevokeForm>,
) -> OAuthResult<StatusCode>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let use_case = TokenRevokeUseCase::new(state.oauth_repo.clone());
    use_case.execute(&form.token).await?;

    Ok(StatusCode::OK)
}

/// GET /api/oauth/userinfo
pub async fn userinfo<O, R>(
    State(state): State<OAuthAppState<O, R>>,
    headers: HeaderMap,
) -> OAuthResult<Json<UserinfoResponse>>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let bearer = extract_bearer(&headers).ok_or(OAuthError::TokenInvalid)?;

    let use_case = UserinfoUseCase::new(state.oauth_repo.clone(), state.auth_repo.clone());
    let output = use_case.execute(&bearer).await?;

    Ok(Json(UserinfoResponse {
        sub: output.sub,
        user_name: output.user_name,
        display_name: output.display_name,
        email: output.email,
    }))
}

// ============================================================================
// App Registration (admin)
// ============================================================================

/// POST /api/oauth/apps
pub async fn register_app<O, R>(
    State(state): State<OAuthAppState<O, R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Json(req): Json<RegisterAppRequest>,
) -> OAuthResult<Json<RegisterAppResponse>>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    require_admin(&state, &headers, addr).await?;

    let use_case = RegisterAppUseCase::new(state.oauth_repo.clone());

    let output = use_case
        .execute(RegisterAppInput {
            name: req.name,
            redirect_uris: req.redirect_uris,
            allowed_scopes: req.allowed_scopes,
            confidential: req.confidential,
        })
        .await?;

    Ok(Json(RegisterAppResponse {
        client_id: output.client_id,
        client_secret: output.client_secret,
    }))
}

/// GET /api/oauth/apps
pub async fn list_apps<O, R>(
    State(state): State<OAuthAppState<O, R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
) -> OAuthResult<Json<AppListResponse>>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    require_admin(&state, &headers, addr).await?;

    let use_case = RegisterAppUseCase::new(state.oauth_repo.clone());
    let apps = use_case.list().await?;

    Ok(Json(AppListResponse {
        apps: apps
            .into_iter()
            .map(|app| AppInfo {
                client_id: app.client_id.clone(),
                name: app.name.clone(),
                redirect_uris: app.redirect_uris.clone(),
                allowed_scopes: app.allowed_scopes.as_str(),
                confidential: app.is_confidential(),
            })
            .collect(),
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn request_fingerprint(headers: &HeaderMap, addr: SocketAddr) -> OAuthResult<ClientFingerprint> {
    let client_ip = extract_client_ip(headers, Some(addr.ip()));
    Ok(extract_fingerprint(headers, client_ip)?)
}

/// Resolve the session behind the request cookie
async fn current_session<O, R>(
    state: &OAuthAppState<O, R>,
    headers: &HeaderMap,
    addr: SocketAddr,
) -> OAuthResult<AuthSession>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let fingerprint = request_fingerprint(headers, addr)?;

    let token = platform::cookie::extract_cookie(headers, &state.auth_config.session_cookie_name)
        .ok_or(OAuthError::SessionRequired)?;

    let use_case = CheckSessionUseCase::new(state.auth_repo.clone(), state.auth_config.clone());
    use_case
        .get_session(&token, &fingerprint.hash)
        .await
        .map_err(OAuthError::from)
}

async fn require_admin<O, R>(
    state: &OAuthAppState<O, R>,
    headers: &HeaderMap,
    addr: SocketAddr,
) -> OAuthResult<AuthSession>
where
    O: OAuthRepositories,
    R: AuthRepositories,
{
    let session = current_session(state, headers, addr).await?;

    if !session.user_role.is_admin_or_higher() {
        return Err(OAuthError::AdminRequired);
    }

    Ok(session)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.to_string())
}

fn build_session_cookie(config: &AuthConfig, token: &str) -> String {
    CookieConfig {
        name: config.session_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.session_ttl_short.as_secs() as i64),
    }
    .build_set_cookie(token)
}
