//! Search Probe
//!
//! Asks a remote search node for the document count of an index, going
//! through the same pooled, credentialed client the services use.

use clap::Parser;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use eyre::{Result, WrapErr};
use rpc::search::v1::DocCountRequest;
use search_rpc_client::{
    CertMaterial, ConnectionRegistry, EnvIdentityResolver, PoolConfig, PoolKey,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "search-probe")]
#[command(about = "Query a search node's document count through the connection pool")]
struct Cli {
    /// Identity of the search node
    #[arg(short, long)]
    node: String,

    /// Node address as host or host:port. The default port is appended when missing.
    #[arg(short = 'H', long)]
    host: String,

    /// PEM file with CA certificates to trust. Plaintext when omitted.
    #[arg(long)]
    ca_cert: Option<PathBuf>,

    /// Index to count
    #[arg(short, long)]
    index: String,

    /// Index UUID, if the node needs it
    #[arg(long, default_value = "")]
    index_uuid: String,

    /// Number of calls to issue (all share one pool)
    #[arg(short, long, default_value_t = 1)]
    repeat: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();
    let config = PoolConfig::from_env().wrap_err("Invalid pool configuration")?;

    let certs = match &cli.ca_cert {
        Some(path) => CertMaterial::pem(
            std::fs::read(path)
                .wrap_err_with(|| format!("Failed to read CA certificates from {}", path.display()))?,
        ),
        None => CertMaterial::None,
    };

    let host_port = config.host_port(&cli.host);
    let registry = ConnectionRegistry::new(config, Arc::new(EnvIdentityResolver));

    for attempt in 1..=cli.repeat.max(1) {
        let mut client = registry.get_client(&cli.node, &host_port, &certs).await?;

        let response = client
            .doc_count(DocCountRequest {
                index_name: cli.index.clone(),
                index_uuid: cli.index_uuid.clone(),
            })
            .await
            .wrap_err("DocCount call failed")?;

        info!(
            attempt,
            node = %cli.node,
            index = %cli.index,
            doc_count = response.get_ref().doc_count,
            "Document count received"
        );
        println!("{}", response.into_inner().doc_count);
    }

    let key = PoolKey::new(cli.node.as_str(), host_port.as_str())?;
    if let Some(pool) = registry.pool(&key) {
        info!(
            key = %pool.key(),
            channels = pool.len(),
            tls = pool.options().security.is_tls(),
            "Pool summary"
        );
    }

    Ok(())
}
