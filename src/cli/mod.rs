use std::path::PathBuf;

use clap::{Parser, Subcommand};
use griya::{config::StorefrontConfig, observability::LoggingConfig};

mod catalog;
mod orders;

#[derive(Debug, Parser)]
#[command(name = "griya", about = "Griya Banten storefront CLI", long_about = None)]
pub(crate) struct Cli {
    /// Storefront configuration file (YAML)
    #[arg(short, long, env = "GRIYA_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the catalog
    Catalog(catalog::CatalogCommand),

    /// Review persisted orders
    Orders(orders::OrdersCommand),
}

impl Cli {
    pub(crate) fn run(self) -> Result<(), String> {
        let config = StorefrontConfig::load(self.config.as_deref())
            .map_err(|error| format!("failed to load config: {error}"))?;

        match self.command {
            Commands::Catalog(command) => catalog::run(command),
            Commands::Orders(command) => orders::run(command, &config),
        }
    }
}
