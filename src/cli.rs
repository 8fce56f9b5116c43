//! Command-line interface parsing for the shelf-life server
//!
//! This module handles parsing of CLI arguments using clap. Every flag can also
//! be supplied through an environment variable, which is how the server is
//! configured when it runs in a container.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::http::HeaderValue;
use clap::Parser;
use directories::ProjectDirs;
use thiserror::Error;

use crate::cache::{SweeperConfig, DEFAULT_SEARCH_TTL_SECS};

/// File name looked up in the user's config directory when no catalog is given
pub const CATALOG_FILE_NAME: &str = "products.json";

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The search cache TTL must be positive
    #[error("Invalid search TTL: must be at least 1 second")]
    InvalidSearchTtl,

    /// The CORS origin is not a valid header value
    #[error("Invalid CORS origin: '{0}'")]
    InvalidCorsOrigin(String),

    /// The catalog path given on the command line does not exist
    #[error("Catalog file not found: {0}")]
    CatalogNotFound(PathBuf),
}

/// Shelf-life lookup server
#[derive(Parser, Debug)]
#[command(name = "shelflife")]
#[command(about = "Serve product shelf-life lookups and expiration dates over HTTP")]
#[command(version)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "SHELFLIFE_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// JSON product catalog
    ///
    /// Defaults to products.json in the user config directory if present,
    /// otherwise the built-in catalog is used.
    #[arg(long, env = "SHELFLIFE_CATALOG", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// How long search results stay cached, in seconds
    #[arg(long, env = "SHELFLIFE_SEARCH_TTL_SECS", default_value_t = DEFAULT_SEARCH_TTL_SECS)]
    pub search_ttl_secs: u64,

    /// Seconds between sweeps of expired search results
    ///
    /// 0 disables the background sweeper; expired results are then purged
    /// whenever a new search result is cached.
    #[arg(long, env = "SHELFLIFE_SWEEP_INTERVAL_SECS", default_value_t = 60)]
    pub sweep_interval_secs: u64,

    /// Only allow browser requests from this origin (any origin when unset)
    #[arg(long, env = "SHELFLIFE_CORS_ORIGIN", value_name = "ORIGIN")]
    pub cors_origin: Option<String>,
}

/// Where the product catalog comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Builtin,
}

/// Validated server configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
    pub catalog: CatalogSource,
    pub search_ttl: Duration,
    pub sweeper: SweeperConfig,
    pub cors_origin: Option<HeaderValue>,
}

/// Path of the catalog in the user's config directory, if one can be determined
///
/// Uses `~/.config/shelflife/products.json` on Linux, or the equivalent
/// platform path elsewhere.
pub fn default_catalog_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "shelflife")?;
    Some(project_dirs.config_dir().join(CATALOG_FILE_NAME))
}

/// Picks the catalog: an explicit path, then `default` if it exists, then the
/// built-in catalog
pub fn resolve_catalog(
    cli_path: Option<&Path>,
    default: Option<PathBuf>,
) -> Result<CatalogSource, CliError> {
    match cli_path {
        Some(path) if path.is_file() => Ok(CatalogSource::File(path.to_path_buf())),
        Some(path) => Err(CliError::CatalogNotFound(path.to_path_buf())),
        None => Ok(match default {
            Some(path) if path.is_file() => CatalogSource::File(path),
            _ => CatalogSource::Builtin,
        }),
    }
}

impl ServerConfig {
    /// Creates a ServerConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(ServerConfig)` with validated settings
    /// * `Err(CliError)` if a value is out of range or a given catalog is missing
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.search_ttl_secs == 0 {
            return Err(CliError::InvalidSearchTtl);
        }

        let catalog = resolve_catalog(cli.catalog.as_deref(), default_catalog_path())?;

        let cors_origin = cli
            .cors_origin
            .as_deref()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| CliError::InvalidCorsOrigin(origin.to_string()))
            })
            .transpose()?;

        Ok(ServerConfig {
            address: SocketAddr::new(cli.host, cli.port),
            catalog,
            search_ttl: Duration::from_secs(cli.search_ttl_secs),
            sweeper: SweeperConfig {
                interval: Duration::from_secs(cli.sweep_interval_secs),
                enabled: cli.sweep_interval_secs > 0,
            },
            cors_origin,
        })
    }
}
