use super::tls::TrustPool;
use crate::config::TransportDefaults;
use crate::credentials::CallCredentials;
use std::time::Duration;
use tonic::transport::{Certificate, ClientTlsConfig, Endpoint};

/// How the bytes of a channel travel over the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSecurity {
  Insecure,
  /// TLS, trusting exactly the certificates in the pool. The server name is
  /// taken from the host string.
  Tls(TrustPool),
}

impl TransportSecurity {
  pub fn is_tls(&self) -> bool {
    matches!(self, TransportSecurity::Tls(_))
  }

  fn scheme(&self) -> &'static str {
    match self {
      TransportSecurity::Insecure => "http",
      TransportSecurity::Tls(_) => "https",
    }
  }
}

/// Message ceilings applied to clients built on a pooled channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLimits {
  pub max_decoding_message_size: usize,
  pub max_encoding_message_size: usize,
}

/// Everything needed to open channels to one host.
///
/// Built once per pool and shared by every channel in it.
#[derive(Debug, Clone)]
pub struct TransportOptions {
  pub max_backoff_delay: Duration,
  pub keep_alive_interval: Duration,
  pub idle_timeout: Duration,
  pub max_recv_message_size: usize,
  pub max_send_message_size: usize,
  pub max_concurrent_streams: u32,
  pub credentials: CallCredentials,
  pub security: TransportSecurity,
}

impl TransportOptions {
  pub fn new(
    defaults: &TransportDefaults,
    credentials: CallCredentials,
    security: TransportSecurity,
  ) -> Self {
    Self {
      max_backoff_delay: defaults.max_backoff_delay,
      keep_alive_interval: defaults.keep_alive_interval,
      idle_timeout: defaults.idle_timeout,
      max_recv_message_size: defaults.max_recv_message_size,
      max_send_message_size: defaults.max_send_message_size,
      max_concurrent_streams: defaults.max_concurrent_streams,
      credentials,
      security,
    }
  }

  pub fn message_limits(&self) -> MessageLimits {
    MessageLimits {
      max_decoding_message_size: self.max_recv_message_size,
      max_encoding_message_size: self.max_send_message_size,
    }
  }

  /// Build a tonic endpoint for `host_port` carrying these options.
  ///
  /// tonic reconnects on its own schedule, so the backoff ceiling bounds each
  /// connection attempt instead.
  pub fn endpoint(&self, host_port: &str) -> Result<Endpoint, tonic::transport::Error> {
    let uri = format!("{}://{}", self.security.scheme(), host_port);

    let mut endpoint = Endpoint::from_shared(uri)?
      .http2_keep_alive_interval(self.keep_alive_interval)
      .keep_alive_timeout(self.idle_timeout)
      .keep_alive_while_idle(true)
      .connect_timeout(self.max_backoff_delay)
      .concurrency_limit(self.max_concurrent_streams.max(1) as usize)
      .tcp_nodelay(true);

    if let TransportSecurity::Tls(pool) = &self.security {
      let tls = ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pool.to_pem()));
      endpoint = endpoint.tls_config(tls)?;
    }

    Ok(endpoint)
  }
}
