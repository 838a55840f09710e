pub mod options;
pub mod tls;

pub use options::{MessageLimits, TransportOptions, TransportSecurity};
pub use tls::{CertMaterial, TrustPool};

use crate::config::TransportDefaults;
use crate::credentials::{CallCredentials, IdentityResolver};
use crate::error::{BoxError, IdentityError, PoolError, PoolResult};
use async_trait::async_trait;
use std::sync::Arc;
use tonic::transport::Channel;

/// Assembles the [`TransportOptions`] for a new pool.
///
/// Credentials are resolved first; a resolver failure aborts before any
/// certificate work is done.
///
/// ## Example
/// ```ignore
/// use search_rpc_client::{ChannelOptionBuilder, CertMaterial, TransportDefaults};
///
/// let builder = ChannelOptionBuilder::new(TransportDefaults::default(), resolver);
/// let options = builder.build("10.0.0.1:15000", &CertMaterial::None).await?;
/// ```
#[derive(Clone)]
pub struct ChannelOptionBuilder {
  defaults: TransportDefaults,
  resolver: Arc<dyn IdentityResolver>,
}

impl ChannelOptionBuilder {
  pub fn new(defaults: TransportDefaults, resolver: Arc<dyn IdentityResolver>) -> Self {
    Self { defaults, resolver }
  }

  pub fn defaults(&self) -> &TransportDefaults {
    &self.defaults
  }

  pub async fn build(&self, host_port: &str, certs: &CertMaterial) -> PoolResult<TransportOptions> {
    let identity_error = |source: IdentityError| PoolError::IdentityResolution {
      host: host_port.to_string(),
      source,
    };

    let credentials = match self.resolver.resolve(host_port).await.map_err(identity_error)? {
      Some(creds) => CallCredentials::basic(&creds).map_err(identity_error)?,
      None => {
        tracing::debug!(target: "search_rpc", host = %host_port, "No credentials for host, calls go unauthenticated");
        CallCredentials::none()
      }
    };

    let security = match certs {
      CertMaterial::None => TransportSecurity::Insecure,
      CertMaterial::Pem(pem) => TransportSecurity::Tls(TrustPool::from_pem(pem)?),
    };

    Ok(TransportOptions::new(&self.defaults, credentials, security))
  }
}

/// Opens one channel to a host with the given options
#[async_trait]
pub trait ChannelConnector: Send + Sync {
  async fn connect(&self, host_port: &str, options: &TransportOptions) -> Result<Channel, BoxError>;
}

/// Default connector backed by tonic's HTTP/2 transport
#[derive(Debug, Clone, Copy, Default)]
pub struct TonicConnector {
  lazy: bool,
}

impl TonicConnector {
  /// Connect eagerly: `connect` returns only once the HTTP/2 handshake is done
  pub fn eager() -> Self {
    Self { lazy: false }
  }

  /// Return immediately; the connection is made on the first RPC
  pub fn lazy() -> Self {
    Self { lazy: true }
  }
}

#[async_trait]
impl ChannelConnector for TonicConnector {
  async fn connect(&self, host_port: &str, options: &TransportOptions) -> Result<Channel, BoxError> {
    let endpoint = options.endpoint(host_port)?;

    if self.lazy {
      tracing::trace!(target: "search_rpc", host = %host_port, "Creating lazy channel");
      return Ok(endpoint.connect_lazy());
    }

    Ok(endpoint.connect().await?)
  }
}
