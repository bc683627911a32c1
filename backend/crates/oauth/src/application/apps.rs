//! App Registration Use Case
//!
//! Admin-seeded registration of third-party client applications. The
//! client secret is generated here and returned exactly once; only its
//! hash is stored.

use std::sync::Arc;

use nid::Nanoid;
use platform::crypto::{hash_token, random_token};

use crate::domain::entities::OAuthApp;
use crate::domain::repository::OAuthAppRepository;
use crate::domain::value_objects::ScopeSet;
use crate::error::{OAuthError, OAuthResult};

/// Byte length of generated client secrets
const CLIENT_SECRET_BYTES: usize = 32;

/// Registration input
pub struct RegisterAppInput {
    pub name: String,
    pub redirect_uris: Vec<String>,
    /// Space-separated scopes the app may request
    pub allowed_scopes: String,
    /// Confidential apps get a secret; public (PKCE-only) apps do not
    pub confidential: bool,
}

/// Registration output
pub struct RegisterAppOutput {
    pub client_id: String,
    /// Plain secret, shown exactly once
    pub client_secret: Option<String>,
}

/// App registration use case
pub struct RegisterAppUseCase<O>
where
    O: OAuthAppRepository,
{
    repo: Arc<O>,
}

impl<O> RegisterAppUseCase<O>
where
    O: OAuthAppRepository,
{
    pub fn new(repo: Arc<O>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: RegisterAppInput) -> OAuthResult<RegisterAppOutput> {
        if input.name.trim().is_empty() {
            return Err(OAuthError::Internal("App name cannot be empty".to_string()));
        }

        if input.redirect_uris.is_empty() {
            return Err(OAuthError::RedirectUriMismatch);
        }
        for uri in &input.redirect_uris {
            if url::Url::parse(uri).is_err() {
                return Err(OAuthError::RedirectUriMismatch);
            }
        }

        let allowed_scopes = ScopeSet::parse(&input.allowed_scopes);

        let client_id = Nanoid::<21>::new().as_str().to_string();
        let client_secret = input
            .confidential
            .then(|| random_token(CLIENT_SECRET_BYTES));
        let client_secret_hash = client_secret.as_deref().map(|s| hash_token(s).to_vec());

        let app = OAuthApp::new(
            client_id.clone(),
            client_secret_hash,
            input.name.trim(),
            input.redirect_uris,
            allowed_scopes,
        );
        self.repo.create(&app).await?;

        tracing::info!(
            client_id = %app.client_id,
            name = %app.name,
            confidential = app.is_confidential(),
            "OAuth application registered"
        );

        Ok(RegisterAppOutput {
            client_id,
            client_secret,
        })
    }

    /// List registered applications
    pub async fn list(&self) -> OAuthResult<Vec<OAuthApp>> {
        self.repo.list().await
    }
}
