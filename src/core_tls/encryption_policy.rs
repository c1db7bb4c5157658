use crate::core_tls::error::TlsError;
use crate::core_tls::tls_config::{TlsConfig, TlsMode};
use log::{info, warn};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::rustls::server::{AllowAnyAnonymousOrAuthenticatedClient, NoClientAuth};
use tokio_rustls::rustls::{self, Certificate, PrivateKey, RootCertStore};
use tokio_rustls::server::TlsStream;
use tokio_rustls::TlsAcceptor;

/// Encryption settings handed to the engine when a client asks for TLS.
///
/// The rustls configuration is built once at startup; clones share the same
/// acceptor.
#[derive(Clone)]
pub struct EncryptionPolicy {
    mode: TlsMode,
    acceptor: Option<TlsAcceptor>,
    verify_client_certs: bool,
}

impl EncryptionPolicy {
    pub fn disabled() -> Self {
        Self {
            mode: TlsMode::Disabled,
            acceptor: None,
            verify_client_certs: true,
        }
    }

    pub fn from_config(config: &TlsConfig) -> Result<Self, TlsError> {
        if !config.is_enabled() {
            return Ok(Self::disabled());
        }
        config.validate()?;

        let certs = load_certs(&config.cert_file)?;
        let key = load_private_key(&config.key_file)?;

        let verifier = if config.verify_client_certs {
            // Presented client certificates must chain to these roots. Without
            // a CA file the store is empty and every presented certificate is
            // refused; anonymous clients are still accepted.
            let roots = match &config.client_ca_file {
                Some(path) => load_client_roots(path)?,
                None => RootCertStore::empty(),
            };
            AllowAnyAnonymousOrAuthenticatedClient::new(roots).boxed()
        } else {
            warn!(
                "TLS client certificate verification DISABLED by configuration \
                 (tls.verify_client_certs = false)"
            );
            NoClientAuth::boxed()
        };

        let server_config = rustls::ServerConfig::builder()
            .with_safe_defaults()
            .with_client_cert_verifier(verifier)
            .with_single_cert(certs, key)
            .map_err(|e| TlsError::TlsConfigError(e.to_string()))?;

        info!(
            "TLS {:?}: certificate {:?}",
            config.mode, config.cert_file
        );

        Ok(Self {
            mode: config.mode,
            acceptor: Some(TlsAcceptor::from(Arc::new(server_config))),
            verify_client_certs: config.verify_client_certs,
        })
    }

    pub fn mode(&self) -> TlsMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.acceptor.is_some()
    }

    /// Clients must upgrade before logging in.
    pub fn is_required(&self) -> bool {
        self.is_enabled() && self.mode == TlsMode::Required
    }

    pub fn verifies_client_certs(&self) -> bool {
        self.verify_client_certs
    }

    /// Runs the server side of a TLS handshake over `stream`.
    pub async fn accept<IO>(&self, stream: IO) -> Result<TlsStream<IO>, TlsError>
    where
        IO: AsyncRead + AsyncWrite + Unpin,
    {
        let acceptor = self.acceptor.as_ref().ok_or(TlsError::TlsNotConfigured)?;
        acceptor
            .accept(stream)
            .await
            .map_err(|e| TlsError::TlsHandshakeError(e.to_string()))
    }
}

impl fmt::Debug for EncryptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionPolicy")
            .field("mode", &self.mode)
            .field("enabled", &self.is_enabled())
            .field("verify_client_certs", &self.verify_client_certs)
            .finish()
    }
}

fn load_certs(path: &Path) -> Result<Vec<Certificate>, TlsError> {
    let file = File::open(path).map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .map_err(|e| TlsError::CertificateLoadError(e.to_string()))?;
    if certs.is_empty() {
        return Err(TlsError::CertificateLoadError(format!(
            "No certificate found in {:?}",
            path
        )));
    }
    Ok(certs.into_iter().map(Certificate).collect())
}

fn load_private_key(path: &Path) -> Result<PrivateKey, TlsError> {
    let pem = std::fs::read(path).map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;

    let mut keys = rustls_pemfile::pkcs8_private_keys(&mut &pem[..])
        .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
    if keys.is_empty() {
        keys = rustls_pemfile::rsa_private_keys(&mut &pem[..])
            .map_err(|e| TlsError::PrivateKeyLoadError(e.to_string()))?;
    }

    keys.pop().map(PrivateKey).ok_or_else(|| {
        TlsError::PrivateKeyLoadError(format!("No private key found in {:?}", path))
    })
}

fn load_client_roots(path: &Path) -> Result<RootCertStore, TlsError> {
    let file = File::open(path).map_err(|e| TlsError::ClientCaLoadError(e.to_string()))?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .map_err(|e| TlsError::ClientCaLoadError(e.to_string()))?;

    let mut roots = RootCertStore::empty();
    for der in certs {
        roots
            .add(&Certificate(der))
            .map_err(|e| TlsError::ClientCaLoadError(e.to_string()))?;
    }
    if roots.is_empty() {
        return Err(TlsError::ClientCaLoadError(format!(
            "No CA certificate found in {:?}",
            path
        )));
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tokio_rustls::TlsConnector;

    fn enabled_config(dir: &TempDir) -> TlsConfig {
        TlsConfig {
            mode: TlsMode::Optional,
            cert_file: dir.path().join("cert.pem"),
            key_file: dir.path().join("key.pem"),
            client_ca_file: None,
            verify_client_certs: true,
        }
    }

    #[test]
    fn test_disabled_by_default() {
        let policy = EncryptionPolicy::from_config(&TlsConfig::default()).unwrap();
        assert!(!policy.is_enabled());
        assert!(!policy.is_required());
        assert_eq!(policy.mode(), TlsMode::Disabled);
        assert!(policy.verifies_client_certs());
    }

    #[test]
    fn test_missing_certificate() {
        let dir = TempDir::new().unwrap();
        let result = EncryptionPolicy::from_config(&enabled_config(&dir));
        assert!(matches!(result, Err(TlsError::CertificateLoadError(_))));
    }

    #[test]
    fn test_missing_key() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("cert.pem"), "not a pem").unwrap();
        let result = EncryptionPolicy::from_config(&enabled_config(&dir));
        assert!(matches!(result, Err(TlsError::PrivateKeyLoadError(_))));
    }

    #[test]
    fn test_certificate_without_pem_blocks() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("cert.pem"), "not a pem").unwrap();
        std::fs::write(dir.path().join("key.pem"), "not a pem").unwrap();
        let result = EncryptionPolicy::from_config(&enabled_config(&dir));
        assert!(matches!(result, Err(TlsError::CertificateLoadError(_))));
    }

    #[test]
    fn test_missing_client_ca() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("cert.pem"), "x").unwrap();
        std::fs::write(dir.path().join("key.pem"), "x").unwrap();
        let mut config = enabled_config(&dir);
        config.client_ca_file = Some(PathBuf::from("/nonexistent/ca.pem"));
        let result = EncryptionPolicy::from_config(&config);
        assert!(matches!(result, Err(TlsError::ClientCaLoadError(_))));
    }

    #[tokio::test]
    async fn test_accept_without_tls() {
        let (server, _client) = tokio::io::duplex(64);
        let result = EncryptionPolicy::disabled().accept(server).await;
        assert!(matches!(result, Err(TlsError::TlsNotConfigured)));
    }

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("testdata/tls")
            .join(name)
    }

    fn fixture_config(verify_client_certs: bool) -> TlsConfig {
        TlsConfig {
            mode: TlsMode::Required,
            cert_file: fixture("server-cert.pem"),
            key_file: fixture("server-key.pem"),
            client_ca_file: Some(fixture("ca-cert.pem")),
            verify_client_certs,
        }
    }

    /// Client side trusting the test CA, optionally presenting `cert`/`key`.
    fn connector(identity: Option<(&str, &str)>) -> TlsConnector {
        let mut roots = RootCertStore::empty();
        for cert in load_certs(&fixture("ca-cert.pem")).unwrap() {
            roots.add(&cert).unwrap();
        }
        let builder = rustls::ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(roots);
        let config = match identity {
            Some((cert, key)) => builder
                .with_client_auth_cert(
                    load_certs(&fixture(cert)).unwrap(),
                    load_private_key(&fixture(key)).unwrap(),
                )
                .unwrap(),
            None => builder.with_no_client_auth(),
        };
        TlsConnector::from(Arc::new(config))
    }

    /// Runs both ends of a handshake over an in-memory pipe.
    async fn handshake(
        policy: &EncryptionPolicy,
        identity: Option<(&str, &str)>,
    ) -> (Result<(), TlsError>, std::io::Result<()>) {
        let (server_io, client_io) = tokio::io::duplex(64 * 1024);
        let name = rustls::ServerName::try_from("localhost").unwrap();
        let connector = connector(identity);
        let (server, client) = tokio::join!(
            policy.accept(server_io),
            connector.connect(name, client_io)
        );
        (server.map(|_| ()), client.map(|_| ()))
    }

    #[test]
    fn test_from_config_with_certificates() {
        let policy = EncryptionPolicy::from_config(&fixture_config(true)).unwrap();
        assert!(policy.is_enabled());
        assert!(policy.is_required());
        assert!(policy.verifies_client_certs());
        assert_eq!(policy.mode(), TlsMode::Required);
    }

    #[tokio::test]
    async fn test_trusted_client_certificate_is_accepted() {
        let policy = EncryptionPolicy::from_config(&fixture_config(true)).unwrap();
        let (server, client) =
            handshake(&policy, Some(("client-cert.pem", "client-key.pem"))).await;
        assert!(server.is_ok(), "server: {:?}", server);
        assert!(client.is_ok(), "client: {:?}", client);
    }

    #[tokio::test]
    async fn test_anonymous_client_is_accepted() {
        let policy = EncryptionPolicy::from_config(&fixture_config(true)).unwrap();
        let (server, client) = handshake(&policy, None).await;
        assert!(server.is_ok(), "server: {:?}", server);
        assert!(client.is_ok(), "client: {:?}", client);
    }

    #[tokio::test]
    async fn test_untrusted_client_certificate_is_refused() {
        let policy = EncryptionPolicy::from_config(&fixture_config(true)).unwrap();
        let (server, _) = handshake(
            &policy,
            Some(("rogue-client-cert.pem", "rogue-client-key.pem")),
        )
        .await;
        assert!(matches!(server, Err(TlsError::TlsHandshakeError(_))));
    }

    #[tokio::test]
    async fn test_client_certificate_refused_without_client_ca() {
        let mut config = fixture_config(true);
        config.client_ca_file = None;
        let policy = EncryptionPolicy::from_config(&config).unwrap();
        let (server, _) =
            handshake(&policy, Some(("client-cert.pem", "client-key.pem"))).await;
        assert!(matches!(server, Err(TlsError::TlsHandshakeError(_))));
    }

    #[tokio::test]
    async fn test_verification_opt_out() {
        let policy = EncryptionPolicy::from_config(&fixture_config(false)).unwrap();
        assert!(!policy.verifies_client_certs());
        let (server, client) = handshake(
            &policy,
            Some(("rogue-client-cert.pem", "rogue-client-key.pem")),
        )
        .await;
        assert!(server.is_ok(), "server: {:?}", server);
        assert!(client.is_ok(), "client: {:?}", client);
    }
}
