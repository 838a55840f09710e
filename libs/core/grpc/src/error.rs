use thiserror::Error;

pub type PoolResult<T> = Result<T, PoolError>;

/// Boxed error returned by pluggable transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to resolve per-host credentials from the identity service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
  /// The identity service has no credentials registered for this host
  #[error("no credentials registered for {0}")]
  NotFound(String),

  /// The identity service could not be reached or answered with an error
  #[error("identity service unavailable: {0}")]
  Unavailable(String),
}

/// Errors returned while obtaining a pooled search client
#[derive(Error, Debug)]
pub enum PoolError {
  /// Node identity or host:port was empty or malformed
  #[error("Invalid pool key: {0}")]
  InvalidKey(String),

  /// Credentials for the host could not be resolved
  #[error("Failed to resolve credentials for {host}: {source}")]
  IdentityResolution {
    host: String,
    #[source]
    source: IdentityError,
  },

  /// Supplied certificate material produced no usable trust anchors
  #[error("Cannot trust remote certificate: {0}")]
  CertificateTrust(String),

  /// A channel to the host could not be established
  #[error("Failed to dial {host} (connection {slot}): {source}")]
  Dial {
    host: String,
    slot: usize,
    #[source]
    source: BoxError,
  },
}

/// Coarse error class, for callers that pick a retry strategy per class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  InvalidKey,
  IdentityResolution,
  CertificateTrust,
  Dial,
}

impl PoolError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      PoolError::InvalidKey(_) => ErrorKind::InvalidKey,
      PoolError::IdentityResolution { .. } => ErrorKind::IdentityResolution,
      PoolError::CertificateTrust(_) => ErrorKind::CertificateTrust,
      PoolError::Dial { .. } => ErrorKind::Dial,
    }
  }
}

// Lets gRPC handlers that proxy to other nodes return pool failures with `?`
impl From<PoolError> for tonic::Status {
  fn from(err: PoolError) -> Self {
    match err.kind() {
      ErrorKind::InvalidKey => tonic::Status::invalid_argument(err.to_string()),
      ErrorKind::IdentityResolution => tonic::Status::unauthenticated(err.to_string()),
      ErrorKind::CertificateTrust => tonic::Status::failed_precondition(err.to_string()),
      ErrorKind::Dial => tonic::Status::unavailable(err.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_kind_matches_variant() {
    let err = PoolError::IdentityResolution {
      host: "10.0.0.1:15000".to_string(),
      source: IdentityError::NotFound("10.0.0.1:15000".to_string()),
    };
    assert_eq!(err.kind(), ErrorKind::IdentityResolution);
    assert!(err.to_string().contains("10.0.0.1:15000"));
  }

  #[test]
  fn test_status_codes() {
    let status: tonic::Status = PoolError::InvalidKey("empty node id".into()).into();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);

    let status: tonic::Status = PoolError::CertificateTrust("no certs".into()).into();
    assert_eq!(status.code(), tonic::Code::FailedPrecondition);

    let status: tonic::Status = PoolError::Dial {
      host: "h:1".into(),
      slot: 2,
      source: "connection refused".into(),
    }
    .into();
    assert_eq!(status.code(), tonic::Code::Unavailable);
    assert!(status.message().contains("connection 2"));
  }
}
