use super::selector::{RandomSelector, SlotSelector};
use super::{ConnectionPool, PoolKey, PooledChannel};
use crate::channel::{CertMaterial, ChannelConnector, ChannelOptionBuilder, TonicConnector};
use crate::client::{self, SearchClient};
use crate::config::PoolConfig;
use crate::credentials::IdentityResolver;
use crate::error::{PoolError, PoolResult};
use crate::metrics;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

type PoolCell = Arc<OnceCell<Arc<ConnectionPool>>>;

/// Process-wide store of connection pools, one per search node.
///
/// The first request for a [`PoolKey`] builds the pool: transport options
/// are assembled, `pool_size` channels are opened one after another, and
/// only the complete pool is published. Concurrent requests for the same
/// key wait on that single creation; requests for other keys never wait on
/// it. A failed creation publishes nothing and its empty slot is dropped
/// from the map; the next request retries. Cache hits only take a shard
/// read lock.
///
/// Every request then picks one channel from the pool through the
/// configured [`SlotSelector`] (uniform random by default).
///
/// ## Example
/// ```ignore
/// use search_rpc_client::{CertMaterial, ConnectionRegistry, EnvIdentityResolver, PoolConfig};
/// use std::sync::Arc;
///
/// let registry = ConnectionRegistry::new(PoolConfig::default(), Arc::new(EnvIdentityResolver));
/// let mut client = registry
///     .get_client("node-A", "10.0.0.1:15000", &CertMaterial::None)
///     .await?;
/// ```
pub struct ConnectionRegistry {
    config: PoolConfig,
    options: ChannelOptionBuilder,
    connector: Arc<dyn ChannelConnector>,
    selector: Arc<dyn SlotSelector>,
    pools: DashMap<PoolKey, PoolCell>,
}

impl ConnectionRegistry {
    /// Registry using tonic channels and uniform random selection
    pub fn new(config: PoolConfig, resolver: Arc<dyn IdentityResolver>) -> Self {
        let connector = if config.connect_lazily {
            TonicConnector::lazy()
        } else {
            TonicConnector::eager()
        };

        Self {
            options: ChannelOptionBuilder::new(config.transport.clone(), resolver),
            connector: Arc::new(connector),
            selector: Arc::new(RandomSelector::new()),
            pools: DashMap::new(),
            config,
        }
    }

    /// Replace how channels are opened
    pub fn with_connector(mut self, connector: Arc<dyn ChannelConnector>) -> Self {
        self.connector = connector;
        self
    }

    /// Replace how a channel is picked from a pool
    pub fn with_selector(mut self, selector: Arc<dyn SlotSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Return a search client bound to one channel of the node's pool,
    /// creating the pool on first use.
    ///
    /// `certs` only matters when the pool is created; later calls for the
    /// same key reuse the existing channels.
    pub async fn get_client(
        &self,
        node_id: &str,
        host_port: &str,
        certs: &CertMaterial,
    ) -> PoolResult<SearchClient> {
        let channel = self.checkout(node_id, host_port, certs).await?;
        Ok(client::from_pooled(&channel))
    }

    /// Pick one channel of the node's pool, creating the pool on first use
    pub async fn checkout(
        &self,
        node_id: &str,
        host_port: &str,
        certs: &CertMaterial,
    ) -> PoolResult<PooledChannel> {
        let key = PoolKey::new(node_id, host_port)?;
        let pool = self.pool_for(&key, certs).await?;
        metrics::record_checkout(key.host_port());
        Ok(self.pick(&pool))
    }

    /// Existing pool for `key`, or a freshly created one
    pub async fn pool_for(
        &self,
        key: &PoolKey,
        certs: &CertMaterial,
    ) -> PoolResult<Arc<ConnectionPool>> {
        if let Some(pool) = self.pool(key) {
            debug!(target: "search_rpc", key = %key, "Connection pool cache hit");
            return Ok(pool);
        }

        // Clone the cell out so no map shard lock is held across the dials
        let cell: PoolCell = self.pools.entry(key.clone()).or_default().clone();

        match cell.get_or_try_init(|| self.create_pool(key, certs)).await {
            Ok(pool) => {
                metrics::record_pool_count(self.len());
                Ok(pool.clone())
            }
            Err(e) => {
                self.discard_empty_cell(key, &cell);
                Err(e)
            }
        }
    }

    /// Pool for `key` if one has been created
    pub fn pool(&self, key: &PoolKey) -> Option<Arc<ConnectionPool>> {
        self.pools.get(key).and_then(|cell| cell.get().cloned())
    }

    pub fn contains(&self, key: &PoolKey) -> bool {
        self.pool(key).is_some()
    }

    /// Number of fully created pools
    pub fn len(&self) -> usize {
        self.pools
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of all fully created pools, in no particular order
    pub fn keys(&self) -> Vec<PoolKey> {
        self.pools
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Drop a never-initialised cell once no other caller holds it.
    ///
    /// The shard write lock is held while checking, so nobody can clone the
    /// cell out in between; callers still waiting on it keep it alive and
    /// retry the creation themselves.
    fn discard_empty_cell(&self, key: &PoolKey, cell: &PoolCell) {
        let removed = self.pools.remove_if(key, |_, current| {
            Arc::ptr_eq(current, cell) && !current.initialized() && Arc::strong_count(current) == 2
        });
        if removed.is_some() {
            debug!(target: "search_rpc", key = %key, "Discarded failed pool slot");
        }
    }

    fn pick(&self, pool: &ConnectionPool) -> PooledChannel {
        // Pools hold at least one channel; out-of-range picks clamp to the last slot
        let slot = self
            .selector
            .select(pool.len())
            .min(pool.len().saturating_sub(1));
        tracing::trace!(target: "search_rpc", key = %pool.key(), slot, "Selected pooled channel");
        pool.slots[slot].clone()
    }

    async fn create_pool(
        &self,
        key: &PoolKey,
        certs: &CertMaterial,
    ) -> PoolResult<Arc<ConnectionPool>> {
        let started = Instant::now();
        let result = self.open_pool(key, certs).await;
        match &result {
            Ok(pool) => metrics::record_pool_created(key.host_port(), pool.len(), started.elapsed()),
            Err(e) => metrics::record_pool_create_failed(key.host_port(), e.kind()),
        }
        result
    }

    /// Build options, then dial every slot. Nothing is published here; the
    /// caller stores the finished pool.
    async fn open_pool(
        &self,
        key: &PoolKey,
        certs: &CertMaterial,
    ) -> PoolResult<Arc<ConnectionPool>> {
        let host = key.host_port();

        let options = self.options.build(host, certs).await.map_err(|e| {
            error!(target: "search_rpc", key = %key, error = %e, "Failed to build transport options");
            e
        })?;
        let options = Arc::new(options);

        let size = self.config.pool_size.max(1);
        let mut slots = Vec::with_capacity(size);
        for slot in 0..size {
            let channel = self
                .connector
                .connect(host, &options)
                .await
                .map_err(|source| {
                    error!(target: "search_rpc", key = %key, slot, error = %source, "Failed to dial search node");
                    PoolError::Dial {
                        host: host.to_string(),
                        slot,
                        source,
                    }
                })?;

            info!(target: "search_rpc", key = %key, slot, tls = options.security.is_tls(), "gRPC channel created");
            slots.push(PooledChannel::new(slot, channel, options.clone()));
        }

        Ok(Arc::new(ConnectionPool::new(key.clone(), slots, options)))
    }
}
