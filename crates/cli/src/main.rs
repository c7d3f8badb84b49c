//! shopcart CLI - browse the catalog and price a cart.
//!
//! # Usage
//!
//! ```bash
//! # List products (refetches when the cached catalog is older than a day)
//! shopcart products
//!
//! # Show the active discount rules
//! shopcart discounts
//!
//! # Price a cart, one code per unit
//! shopcart checkout VOUCHER TSHIRT VOUCHER VOUCHER MUG TSHIRT TSHIRT
//!
//! # Same, as JSON
//! shopcart checkout --json VOUCHER TSHIRT
//! ```
//!
//! # Commands
//!
//! - `products` - List the product catalog
//! - `discounts` - List discount rules
//! - `checkout` - Compute the discounted total for a list of codes
//!
//! Configuration is read from the environment, see
//! [`shopcart_catalog::config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopcart_catalog::CatalogConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "shopcart")]
#[command(author, version, about = "shopcart catalog and checkout")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the product catalog
    Products,
    /// List the active discount rules
    Discounts,
    /// Compute the discounted total for a cart
    Checkout {
        /// Product codes, one per unit (e.g. `VOUCHER VOUCHER MUG`)
        #[arg(required = true)]
        codes: Vec<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CatalogConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
#[allow(clippy::print_stderr)] // tracing is not set up until config has loaded
async fn main() {
    let cli = Cli::parse();

    let config = match CatalogConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output can be piped
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopcart_catalog=info,shopcart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CatalogConfig) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Products => commands::products::list(config).await,
        Commands::Discounts => commands::discounts::list(config).await,
        Commands::Checkout { codes, json } => commands::checkout::run(config, &codes, json).await,
    }
}
