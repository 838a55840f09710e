use crate::{env_or_default, Environment};
use tracing::{debug, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter, Layer, Registry};

/// Default directives when `RUST_LOG` is unset
const PRODUCTION_FILTER: &str = "info";
const DEVELOPMENT_FILTER: &str = "info,search_rpc=debug";

/// Install the color-eyre panic and error report hooks.
///
/// Call first thing in `main()`. A second install is ignored.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Log line layout, picked with `LOG_FORMAT` (`json`, `pretty`, `compact`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// `LOG_FORMAT` when set and recognised, otherwise JSON in production
    /// and pretty output everywhere else.
    pub fn resolve(environment: &Environment) -> Self {
        let fallback = if environment.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };

        match env_or_default("LOG_FORMAT", "").to_ascii_lowercase().as_str() {
            "" => fallback,
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            other => {
                warn!(format = other, "Unknown LOG_FORMAT, using default");
                fallback
            }
        }
    }

    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let fmt = tracing_subscriber::fmt::layer().with_target(true);
        match self {
            LogFormat::Json => fmt.json().flatten_event(true).boxed(),
            LogFormat::Pretty => fmt.with_file(false).with_line_number(false).pretty().boxed(),
            LogFormat::Compact => fmt.compact().boxed(),
        }
    }
}

fn default_filter(environment: &Environment) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if environment.is_production() {
            EnvFilter::new(PRODUCTION_FILTER)
        } else {
            EnvFilter::new(DEVELOPMENT_FILTER)
        }
    })
}

/// Install the global subscriber: formatted output per [`LogFormat`],
/// `RUST_LOG` filtering and an `ErrorLayer` so eyre reports carry span traces.
///
/// Only the first call installs anything; later calls log at debug and
/// return.
pub fn init_tracing(environment: &Environment) {
    let format = LogFormat::resolve(environment);

    let result = tracing_subscriber::registry()
        .with(format.layer())
        .with(tracing_error::ErrorLayer::default())
        .with(default_filter(environment))
        .try_init();

    match result {
        Ok(()) => info!(environment = ?environment, format = ?format, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_follows_environment() {
        temp_env::with_var_unset("LOG_FORMAT", || {
            assert_eq!(LogFormat::resolve(&Environment::Production), LogFormat::Json);
            assert_eq!(LogFormat::resolve(&Environment::Development), LogFormat::Pretty);
        });
    }

    #[test]
    fn test_log_format_override() {
        temp_env::with_var("LOG_FORMAT", Some("Compact"), || {
            assert_eq!(LogFormat::resolve(&Environment::Production), LogFormat::Compact);
        });
        temp_env::with_var("LOG_FORMAT", Some("xml"), || {
            assert_eq!(LogFormat::resolve(&Environment::Development), LogFormat::Pretty);
        });
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing(&Environment::Development);
        init_tracing(&Environment::Development);
    }

    #[test]
    fn test_init_tracing_respects_rust_log() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            init_tracing(&Environment::Production);
        });
    }
}
