//! Mutual TLS for the admin endpoint
//!
//! The server presents its certificate chain and refuses any client whose
//! certificate does not chain to one of the configured client root CAs.

use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use crate::config::TlsConfig;
use crate::errors::TlsError;

/// Build the server TLS configuration from the PEM files named in `tls`
pub async fn load_server_config(tls: &TlsConfig) -> Result<Arc<ServerConfig>, TlsError> {
    let cert_chain_pem = read_pem(&tls.certificate).await?;
    let key_pem = read_pem(&tls.private_key).await?;

    let mut client_ca_pems = Vec::with_capacity(tls.client_root_cas.len());
    for path in &tls.client_root_cas {
        client_ca_pems.push(read_pem(path).await?);
    }

    server_config_from_pem(&cert_chain_pem, &key_pem, &client_ca_pems)
}

/// Build the server TLS configuration from PEM contents
pub fn server_config_from_pem(
    cert_chain_pem: &[u8],
    key_pem: &[u8],
    client_ca_pems: &[Vec<u8>],
) -> Result<Arc<ServerConfig>, TlsError> {
    let cert_chain = parse_certificates(cert_chain_pem)?;
    if cert_chain.is_empty() {
        return Err(TlsError::Certificate {
            reason: "no server certificates found".to_string(),
        });
    }
    let key = parse_private_key(key_pem)?;

    let mut client_roots = RootCertStore::empty();
    for pem in client_ca_pems {
        for cert in parse_certificates(pem)? {
            client_roots.add(cert).map_err(|e| TlsError::Certificate {
                reason: format!("failed to add client root CA: {}", e),
            })?;
        }
    }
    if client_roots.is_empty() {
        return Err(TlsError::Certificate {
            reason: "no client root CA certificates found".to_string(),
        });
    }
    debug!("Trusting {} client root CA(s)", client_roots.len());

    let provider: Arc<CryptoProvider> = Arc::new(ring::default_provider());

    let client_verifier =
        WebPkiClientVerifier::builder_with_provider(Arc::new(client_roots), provider.clone())
            .build()
            .map_err(|e| TlsError::Config {
                reason: format!("client verifier error: {}", e),
            })?;

    let mut server_config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| TlsError::Config {
            reason: e.to_string(),
        })?
        .with_client_cert_verifier(client_verifier)
        .with_single_cert(cert_chain, key)
        .map_err(|e| TlsError::Config {
            reason: format!("server config error: {}", e),
        })?;
    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(server_config))
}

async fn read_pem(path: &Path) -> Result<Vec<u8>, TlsError> {
    fs::read(path).await.map_err(|e| TlsError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn parse_certificates(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    CertificateDer::pem_slice_iter(pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::Certificate {
            reason: format!("failed to parse certificates: {}", e),
        })
}

fn parse_private_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>, TlsError> {
    PrivateKeyDer::from_pem_slice(pem).map_err(|e| TlsError::PrivateKey {
        reason: format!("failed to parse private key: {}", e),
    })
}
