//! Authentication and session reconciliation across two backends.
//! Keep the public surface thin and split implementation across sub-modules.

pub mod auth;
pub mod idp;
pub mod provider;
pub mod store;

pub use auth::{AuthError, AuthEvent, AuthManager, AuthResult, AuthSession, SignUpOutcome};
pub use idp::{IdentityClient, IdentityProvider, OAuthProvider};
pub use provider::{AuthProvider, BackendProvider, ProviderError, ProviderSession, SignUpRequest};
pub use store::{SessionRecord, SessionStore, StateBackend, TokenIssuer, WatcherId};
