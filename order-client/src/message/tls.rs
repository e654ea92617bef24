//! rustls client configuration from PEM material

use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::CertificateDer;

use crate::error::MessageError;

/// Build a client TLS configuration
///
/// # Arguments
/// * `ca_pem` - CA bundle used to verify the server (may hold several certificates)
/// * `identity` - Optional client certificate chain and private key for mTLS
pub fn client_config_from_pem(
    ca_pem: &[u8],
    identity: Option<(&[u8], &[u8])>,
) -> Result<ClientConfig, MessageError> {
    let ca_certs = parse_certs(ca_pem, "CA")?;

    let mut root_store = RootCertStore::empty();
    for cert in ca_certs {
        root_store
            .add(cert)
            .map_err(|e| MessageError::Tls(format!("Failed to add CA certificate: {}", e)))?;
    }

    // 检查 root store 是否为空
    if root_store.is_empty() {
        return Err(MessageError::Tls("No valid CA certificates found".to_string()));
    }

    let builder = ClientConfig::builder().with_root_certificates(root_store);

    match identity {
        Some((cert_pem, key_pem)) => {
            let certs = parse_certs(cert_pem, "client")?;
            let key = rustls_pemfile::private_key(&mut std::io::Cursor::new(key_pem))
                .map_err(|e| MessageError::Tls(format!("Failed to parse client key: {}", e)))?
                .ok_or_else(|| MessageError::Tls("No private key found".to_string()))?;

            builder
                .with_client_auth_cert(certs, key)
                .map_err(|e| MessageError::Tls(format!("Failed to set client auth: {}", e)))
        }
        None => Ok(builder.with_no_client_auth()),
    }
}

fn parse_certs(pem: &[u8], what: &str) -> Result<Vec<CertificateDer<'static>>, MessageError> {
    rustls_pemfile::certs(&mut std::io::Cursor::new(pem))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MessageError::Tls(format!("Failed to parse {} certificates: {}", what, e)))
}
