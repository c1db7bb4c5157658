// Credential store and session authorization.

pub mod authorizer;
pub mod credential_store;
pub mod error;
pub mod secret;

pub use authorizer::SessionAuthorizer;
pub use credential_store::{CredentialRecord, CredentialStore};
pub use error::AuthError;
pub use secret::hash_password;
