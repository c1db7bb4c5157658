use crate::config::Config;
use crate::core_auth::{AuthError, CredentialStore, SessionAuthorizer};
use crate::core_fs::ScopedFs;
use crate::core_policy::{ConnectionContext, ListenPolicy, SessionPolicy};
use crate::core_tls::{EncryptionPolicy, TlsError};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::Arc;

/// Everything the protocol engine asks of the server, at fixed points of a
/// connection's life.
pub trait ServerDriver: Send + Sync {
    /// Called once, before the listener is bound.
    fn get_settings(&self) -> ListenPolicy;

    /// Greeting for a freshly accepted connection. Never fails.
    fn client_connected(&self, cx: &ConnectionContext) -> String;

    /// Observational hook on teardown. Never fails.
    fn client_disconnected(&self, cx: &ConnectionContext);

    /// Checks credentials; on success every later file operation of the
    /// session goes through the returned handle.
    fn auth_user(
        &self,
        cx: &ConnectionContext,
        username: &str,
        password: &str,
    ) -> Result<ScopedFs, AuthError>;

    /// Encryption settings, asked for when a client requests `AUTH TLS`.
    fn tls_config(&self, cx: &ConnectionContext) -> Result<EncryptionPolicy, TlsError>;
}

/// The server's driver: credential check, jail construction and policy lookup.
pub struct FtpDriver {
    authorizer: SessionAuthorizer,
    policy: SessionPolicy,
    encryption: EncryptionPolicy,
}

impl FtpDriver {
    pub fn new(
        authorizer: SessionAuthorizer,
        policy: SessionPolicy,
        encryption: EncryptionPolicy,
    ) -> Self {
        Self {
            authorizer,
            policy,
            encryption,
        }
    }

    /// Loads users, policy and TLS material. Any failure is fatal to startup.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = CredentialStore::load_from_file(&config.server.users_file)
            .with_context(|| format!("Failed to load users file: {}", config.server.users_file))?;
        let policy = SessionPolicy::from_config(&config.server)
            .context("Invalid [server] configuration")?;
        let encryption =
            EncryptionPolicy::from_config(&config.tls).context("Invalid [tls] configuration")?;

        Ok(Self::new(
            SessionAuthorizer::new(Arc::new(store)),
            policy,
            encryption,
        ))
    }

    pub fn session_policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn encryption_policy(&self) -> &EncryptionPolicy {
        &self.encryption
    }
}

impl ServerDriver for FtpDriver {
    fn get_settings(&self) -> ListenPolicy {
        self.policy.get_listen_policy()
    }

    fn client_connected(&self, cx: &ConnectionContext) -> String {
        self.policy.on_client_connected(cx)
    }

    fn client_disconnected(&self, cx: &ConnectionContext) {
        self.policy.on_client_disconnected(cx)
    }

    fn auth_user(
        &self,
        cx: &ConnectionContext,
        username: &str,
        password: &str,
    ) -> Result<ScopedFs, AuthError> {
        debug!("Authenticating {:?} from {} (#{})", username, cx.remote_addr, cx.id);
        self.authorizer.authorize(username, password)
    }

    fn tls_config(&self, cx: &ConnectionContext) -> Result<EncryptionPolicy, TlsError> {
        if !self.encryption.is_enabled() {
            return Err(TlsError::TlsNotConfigured);
        }
        if !self.encryption.verifies_client_certs() {
            warn!(
                "Negotiating TLS without client certificate verification for {} (#{})",
                cx.remote_addr, cx.id
            );
        }
        Ok(self.encryption.clone())
    }
}
