//! rustls server configuration

use std::sync::Arc;

use rustls::ServerConfig;
use rustls::pki_types::PrivateKeyDer;
use tokio_rustls::TlsAcceptor;

use crate::self_signed::{SelfSignedCredential, TlsError};

/// Build a TLS 1.2/1.3 server config presenting `credential`.
pub fn server_config(credential: &SelfSignedCredential) -> Result<Arc<ServerConfig>, TlsError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(
            vec![credential.cert_der().clone()],
            PrivateKeyDer::Pkcs8(credential.key_der().clone_key()),
        )?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    tracing::debug!("🔒 TLS config built");

    Ok(Arc::new(config))
}

/// Build an acceptor for incoming TLS connections
pub fn build_acceptor(credential: &SelfSignedCredential) -> Result<TlsAcceptor, TlsError> {
    Ok(TlsAcceptor::from(server_config(credential)?))
}
