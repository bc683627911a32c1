//! Application Layer
//!
//! Use cases and application services.

pub mod apps;
pub mod authorize;
pub mod callback;
pub mod config;
pub mod connect;
pub mod provider_client;
pub mod token;
pub mod userinfo;

// Re-exports
pub use apps::{RegisterAppInput, RegisterAppOutput, RegisterAppUseCase};
pub use authorize::{AuthorizeInput, AuthorizeOutput, AuthorizeUseCase};
pub use callback::{CallbackInput, CallbackOutput, CallbackUseCase};
pub use config::{OAuthConfig, ProviderConfig};
pub use connect::{ConnectOutput, ConnectUseCase};
pub use provider_client::ProviderUserInfo;
pub use token::{TokenExchangeUseCase, TokenOutput, TokenRequestInput, TokenRevokeUseCase};
pub use userinfo::{UserinfoOutput, UserinfoUseCase};
