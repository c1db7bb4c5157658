use crate::core_auth::credential_store::CredentialStore;
use crate::core_auth::error::{AuthError, AuthFailure};
use crate::core_fs::ScopedFs;
use log::{error, info, warn};
use std::sync::Arc;

/// Turns a username/password pair into a jailed filesystem handle.
///
/// Each attempt is single-shot: it either yields a [`ScopedFs`] rooted at the
/// user's directory or [`AuthError::Rejected`]. The cause of a rejection is
/// logged and never returned.
#[derive(Clone)]
pub struct SessionAuthorizer {
    store: Arc<CredentialStore>,
}

impl SessionAuthorizer {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn authorize(&self, username: &str, password: &str) -> Result<ScopedFs, AuthError> {
        match self.try_authorize(username, password) {
            Ok(fs) => {
                info!("User {:?} authenticated", username);
                Ok(fs)
            }
            Err(failure @ AuthFailure::RootUnavailable { .. }) => {
                error!("Rejecting login: {}", failure);
                Err(AuthError::Rejected)
            }
            Err(failure) => {
                warn!("Rejecting login: {}", failure);
                Err(AuthError::Rejected)
            }
        }
    }

    fn try_authorize(&self, username: &str, password: &str) -> Result<ScopedFs, AuthFailure> {
        let record = self.store.verify(username, password)?;
        ScopedFs::new(&record.path).map_err(|source| AuthFailure::RootUnavailable {
            user: username.to_string(),
            source,
        })
    }
}
