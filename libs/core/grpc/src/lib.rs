//! # Search RPC Client
//!
//! Pooled gRPC clients for talking to remote search nodes.
//!
//! A [`ConnectionRegistry`] keeps a fixed-size pool of channels per remote
//! node, keyed by the node's identity and `host:port`. Pools are created on
//! first use, exactly once per key even under concurrent callers, and each
//! request is served by a channel chosen uniformly at random.
//!
//! Every pool is dialed with the same [`TransportOptions`]: keep-alive and
//! idle timing, message size and concurrency ceilings, a per-call
//! `authorization` credential resolved from an [`IdentityResolver`], and
//! either plaintext or TLS trusting caller-supplied CA certificates.
//!
//! ## Quick Start
//!
//! ```ignore
//! use search_rpc_client::{CertMaterial, ConnectionRegistry, EnvIdentityResolver, PoolConfig};
//! use rpc::search::v1::DocCountRequest;
//! use std::sync::Arc;
//!
//! let registry = ConnectionRegistry::new(PoolConfig::default(), Arc::new(EnvIdentityResolver));
//!
//! let mut client = registry
//!     .get_client("node-A", "10.0.0.1:15000", &CertMaterial::None)
//!     .await?;
//! let count = client.doc_count(DocCountRequest::default()).await?;
//! ```
//!
//! ### With TLS
//! ```ignore
//! let ca = std::fs::read("/etc/search/ca.pem")?;
//! let client = registry
//!     .get_client("node-B", "10.0.0.2:15000", &CertMaterial::Pem(ca))
//!     .await?;
//! ```
//!
//! ### Configuration from the environment
//! ```ignore
//! use core_config::FromEnv;
//! use search_rpc_client::PoolConfig;
//!
//! // SEARCH_RPC_POOL_SIZE, SEARCH_RPC_IDLE_TIMEOUT_SECS, ...
//! let config = PoolConfig::from_env()?;
//! ```

pub mod channel;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod metrics;
pub mod pool;

pub use channel::{
    CertMaterial, ChannelConnector, ChannelOptionBuilder, MessageLimits, TonicConnector,
    TransportOptions, TransportSecurity, TrustPool,
};
pub use client::SearchClient;
pub use config::{PoolConfig, TransportDefaults};
pub use credentials::{
    AnonymousResolver, CallCredentials, Credentials, EnvIdentityResolver, IdentityResolver,
    StaticIdentityResolver,
};
pub use error::{BoxError, ErrorKind, IdentityError, PoolError, PoolResult};
pub use pool::{
    ConnectionPool, ConnectionRegistry, PoolKey, PooledChannel, RandomSelector, SlotSelector,
};
