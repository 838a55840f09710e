use crate::error::IdentityError;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use core_config::{ConfigError, env_required};
use std::collections::HashMap;
use std::fmt;
use tonic::metadata::AsciiMetadataValue;
use tonic::{Request, Status};

/// Metadata key carrying the per-call credential
pub const AUTHORIZATION_KEY: &str = "authorization";

pub const USERNAME_ENV: &str = "SEARCH_RPC_USERNAME";
pub const PASSWORD_ENV: &str = "SEARCH_RPC_PASSWORD";

/// Username/password pair issued by the identity service for one host
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Standard base64 of `username:password`, as used by HTTP Basic auth
    pub fn basic_auth(&self) -> String {
        BASE64.encode(format!("{}:{}", self.username, self.password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolves the credentials a client must present to a given host.
///
/// Implementations are called once per pool creation, concurrently for
/// different hosts. `Ok(None)` means the host accepts unauthenticated calls.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, host_port: &str) -> Result<Option<Credentials>, IdentityError>;
}

/// Fixed per-host credential table with an optional fallback entry
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityResolver {
    hosts: HashMap<String, Credentials>,
    fallback: Option<Credentials>,
}

impl StaticIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host_port: impl Into<String>, credentials: Credentials) -> Self {
        self.hosts.insert(host_port.into(), credentials);
        self
    }

    /// Credentials returned for hosts without an explicit entry
    pub fn with_fallback(mut self, credentials: Credentials) -> Self {
        self.fallback = Some(credentials);
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self, host_port: &str) -> Result<Option<Credentials>, IdentityError> {
        self.hosts
            .get(host_port)
            .or(self.fallback.as_ref())
            .cloned()
            .map(Some)
            .ok_or_else(|| IdentityError::NotFound(host_port.to_string()))
    }
}

/// Reads one cluster-wide credential pair from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvIdentityResolver;

#[async_trait]
impl IdentityResolver for EnvIdentityResolver {
    async fn resolve(&self, host_port: &str) -> Result<Option<Credentials>, IdentityError> {
        let not_found = |e: ConfigError| IdentityError::NotFound(format!("{}: {}", host_port, e));
        let username = env_required(USERNAME_ENV).map_err(not_found)?;
        let password = env_required(PASSWORD_ENV).map_err(not_found)?;
        Ok(Some(Credentials::new(username, password)))
    }
}

/// Resolver for clusters that run without per-call authentication
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousResolver;

#[async_trait]
impl IdentityResolver for AnonymousResolver {
    async fn resolve(&self, _host_port: &str) -> Result<Option<Credentials>, IdentityError> {
        Ok(None)
    }
}

/// Per-call credential attached to every request on a pooled channel.
///
/// Holds the pre-encoded `authorization: Basic <base64(user:pass)>` value,
/// or nothing when the host resolved to no credentials. The credential works
/// over plaintext and TLS channels alike.
#[derive(Clone, Debug, Default)]
pub struct CallCredentials {
    header_value: Option<AsciiMetadataValue>,
}

impl CallCredentials {
    /// Credential that attaches nothing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn basic(credentials: &Credentials) -> Result<Self, IdentityError> {
        let value = AsciiMetadataValue::try_from(format!("Basic {}", credentials.basic_auth()))
            .map_err(|e| IdentityError::Unavailable(format!("unusable credential: {}", e)))?;
        Ok(Self {
            header_value: Some(value),
        })
    }

    pub fn is_present(&self) -> bool {
        self.header_value.is_some()
    }

    /// Whether these credentials may only be sent over an encrypted channel.
    ///
    /// Always `false`: credentials and transport security are configured
    /// independently so mixed plaintext/TLS clusters keep working.
    pub fn requires_transport_security(&self) -> bool {
        false
    }
}

impl tonic::service::Interceptor for CallCredentials {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        if let Some(value) = &self.header_value {
            request
                .metadata_mut()
                .insert(AUTHORIZATION_KEY, value.clone());
        }
        Ok(request)
    }
}
