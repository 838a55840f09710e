pub mod registry;
pub mod selector;

pub use registry::ConnectionRegistry;
pub use selector::{RandomSelector, SlotSelector};

use crate::channel::TransportOptions;
use crate::error::{PoolError, PoolResult};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tonic::transport::{Channel, Uri};

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one remote search node: its unique id plus the address it
/// serves gRPC on. Both parts must match byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey {
    node_id: String,
    host_port: String,
}

impl PoolKey {
    pub fn new(node_id: impl Into<String>, host_port: impl Into<String>) -> PoolResult<Self> {
        let node_id = node_id.into();
        let host_port = host_port.into();

        if node_id.trim().is_empty() {
            return Err(PoolError::InvalidKey("node identity is empty".to_string()));
        }
        if host_port.trim().is_empty() {
            return Err(PoolError::InvalidKey(format!(
                "host:port is empty for node {}",
                node_id
            )));
        }

        let uri: Uri = format!("http://{}", host_port)
            .parse()
            .map_err(|e| PoolError::InvalidKey(format!("{}: {}", host_port, e)))?;
        let authority_matches = uri
            .authority()
            .is_some_and(|authority| authority.as_str() == host_port);
        if !authority_matches || uri.port_u16().is_none() {
            return Err(PoolError::InvalidKey(format!(
                "{} is not a host:port address",
                host_port
            )));
        }

        Ok(Self { node_id, host_port })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn host_port(&self) -> &str {
        &self.host_port
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.node_id, self.host_port)
    }
}

/// One open channel inside a pool.
///
/// Cloning is cheap: tonic channels are handles onto a shared connection.
#[derive(Debug, Clone)]
pub struct PooledChannel {
    id: u64,
    slot: usize,
    channel: Channel,
    options: Arc<TransportOptions>,
}

impl PooledChannel {
    pub(crate) fn new(slot: usize, channel: Channel, options: Arc<TransportOptions>) -> Self {
        Self {
            id: NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed),
            slot,
            channel,
            options,
        }
    }

    /// Process-unique id, stable for the channel's lifetime
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Position inside the owning pool
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }
}

/// Fixed-size set of channels to one search node, all opened with the same
/// options.
///
/// Channels are addressed by slot so that a health checker can later swap a
/// single slot without changing how callers select. Nothing closes or
/// replaces channels today; they live as long as the registry.
#[derive(Debug)]
pub struct ConnectionPool {
    key: PoolKey,
    slots: Box<[PooledChannel]>,
    options: Arc<TransportOptions>,
    created_at: Instant,
}

impl ConnectionPool {
    pub(crate) fn new(key: PoolKey, slots: Vec<PooledChannel>, options: Arc<TransportOptions>) -> Self {
        Self {
            key,
            slots: slots.into_boxed_slice(),
            options,
            created_at: Instant::now(),
        }
    }

    pub fn key(&self) -> &PoolKey {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&PooledChannel> {
        self.slots.get(slot)
    }

    pub fn channels(&self) -> impl Iterator<Item = &PooledChannel> {
        self.slots.iter()
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality_is_component_wise() {
        let a = PoolKey::new("node-A", "10.0.0.1:15000").unwrap();
        let b = PoolKey::new("node-A", "10.0.0.1:15000").unwrap();
        let c = PoolKey::new("node-B", "10.0.0.1:15000").unwrap();
        let d = PoolKey::new("node-A", "10.0.0.2:15000").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.to_string(), "node-A-10.0.0.1:15000");
    }

    #[test]
    fn test_key_rejects_empty_parts() {
        assert!(matches!(
            PoolKey::new("", "10.0.0.1:15000"),
            Err(PoolError::InvalidKey(_))
        ));
        assert!(matches!(PoolKey::new("node-A", "  "), Err(PoolError::InvalidKey(_))));
    }

    #[test]
    fn test_key_rejects_malformed_addresses() {
        for bad in ["10.0.0.1", "10.0.0.1:15000/path", "not a host:1", "http://h:1"] {
            assert!(PoolKey::new("node-A", bad).is_err(), "{} accepted", bad);
        }
    }

    #[test]
    fn test_key_accepts_ipv6_and_names() {
        assert!(PoolKey::new("node-A", "[::1]:15000").is_ok());
        assert!(PoolKey::new("node-A", "search-a.local:15000").is_ok());
    }
}
