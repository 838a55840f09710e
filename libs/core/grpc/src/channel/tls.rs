use crate::error::{PoolError, PoolResult};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rustls::RootCertStore;
use rustls::pki_types::CertificateDer;

/// Certificate material supplied by the caller when asking for a client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CertMaterial {
  /// Plaintext transport
  #[default]
  None,
  /// One or more PEM-encoded CA certificates to trust
  Pem(Vec<u8>),
}

impl CertMaterial {
  pub fn pem(bytes: impl Into<Vec<u8>>) -> Self {
    CertMaterial::Pem(bytes.into())
  }

  pub fn is_none(&self) -> bool {
    matches!(self, CertMaterial::None)
  }
}

impl From<Option<String>> for CertMaterial {
  fn from(value: Option<String>) -> Self {
    value.map_or(CertMaterial::None, |pem| CertMaterial::Pem(pem.into_bytes()))
  }
}

impl From<&str> for CertMaterial {
  fn from(value: &str) -> Self {
    CertMaterial::Pem(value.as_bytes().to_vec())
  }
}

impl From<Vec<u8>> for CertMaterial {
  fn from(value: Vec<u8>) -> Self {
    CertMaterial::Pem(value)
  }
}

/// Certificates a client accepts as proof of a search node's identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustPool {
  certificates: Vec<CertificateDer<'static>>,
}

impl TrustPool {
  /// Parse PEM input into a trust pool.
  ///
  /// Blocks that are not certificates, fail to decode, or do not parse as a
  /// trust anchor are skipped. Fails when nothing usable remains.
  pub fn from_pem(pem: &[u8]) -> PoolResult<Self> {
    let mut reader = pem;
    let mut store = RootCertStore::empty();
    let mut certificates = Vec::new();

    for cert in rustls_pemfile::certs(&mut reader) {
      let cert = match cert {
        Ok(cert) => cert,
        Err(e) => {
          tracing::warn!(target: "search_rpc", error = %e, "Skipping unreadable PEM block");
          continue;
        }
      };
      match store.add(cert.clone()) {
        Ok(()) => certificates.push(cert),
        Err(e) => {
          tracing::warn!(target: "search_rpc", error = %e, "Skipping unusable CA certificate");
        }
      }
    }

    if certificates.is_empty() {
      return Err(PoolError::CertificateTrust(
        "no usable CA certificates in supplied PEM".to_string(),
      ));
    }

    Ok(Self { certificates })
  }

  pub fn len(&self) -> usize {
    self.certificates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.certificates.is_empty()
  }

  pub fn certificates(&self) -> &[CertificateDer<'static>] {
    &self.certificates
  }

  /// Re-encode the usable certificates as a PEM bundle
  pub fn to_pem(&self) -> String {
    let mut out = String::new();
    for cert in &self.certificates {
      out.push_str("-----BEGIN CERTIFICATE-----\n");
      for (i, ch) in BASE64.encode(cert.as_ref()).chars().enumerate() {
        if i > 0 && i % 64 == 0 {
          out.push('\n');
        }
        out.push(ch);
      }
      out.push('\n');
      out.push_str("-----END CERTIFICATE-----\n");
    }
    out
  }
}
