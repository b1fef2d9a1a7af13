//! Shopfront CLI - a command-line storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! shopfront products --search mug
//! shopfront product 3
//!
//! # Cart (works signed in or not)
//! shopfront cart add 3
//! shopfront cart show
//!
//! # Sign in; the anonymous cart is merged into the account cart
//! SHOPFRONT_PASSWORD=... shopfront login -u alice
//!
//! # Checkout: open a payment, collect it in the widget, then confirm
//! shopfront checkout start --address "1 Main St" --city Pune --state MH --zipcode 411001
//! shopfront checkout confirm --payment-id pay_1 --order-id order_1 --signature sig \
//!     --address "1 Main St" --city Pune --state MH --zipcode 411001
//! ```
//!
//! State (tokens and the anonymous cart) is kept under `SHOPFRONT_STATE_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::{AppError, Storefront};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{AccountArgs, CartCommand, CheckoutCommand, RegisterArgs, WishlistCommand};

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only products whose name matches
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a single product
    Product {
        /// Product id
        id: i64,
    },
    /// Show the home page banner
    Banner,
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Show or change the wishlist (signed in only)
    Wishlist {
        #[command(subcommand)]
        action: WishlistCommand,
    },
    /// Sign in and merge this device's cart into the account cart
    Login(AccountArgs),
    /// Sign out
    Logout,
    /// Create an account
    Register(RegisterArgs),
    /// List completed orders
    Orders,
    /// Pay for the cart
    Checkout {
        #[command(subcommand)]
        action: CheckoutCommand,
    },
}

/// Failures surfaced to the terminal.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CliError {
    fn user_message(&self) -> String {
        match self {
            Self::App(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Filter used when `RUST_LOG` is unset. The binary's own target is `shopfront`.
const DEFAULT_LOG_FILTER: &str = "shopfront=info,shopfront_storefront=info";

/// Install the global subscriber. Logs go to stderr so command output stays
/// clean.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => exit_with(&CliError::App(AppError::from(e))),
    };

    // Subscriber first; the Sentry layer resolves the client per event.
    init_tracing();
    let _sentry_guard = init_sentry(&config);

    let mut storefront = match Storefront::new(config) {
        Ok(storefront) => storefront,
        Err(e) => exit_with(&CliError::from(e)),
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = run(cli, &mut storefront, &mut stdout).await {
        exit_with(&e);
    }
}

fn exit_with(error: &CliError) -> ! {
    match error {
        CliError::App(e) => e.report(),
        other => tracing::error!(error = %other, "Command failed"),
    }
    let _ = writeln!(std::io::stderr(), "{}", error.user_message());
    std::process::exit(1);
}

async fn run(cli: Cli, storefront: &mut Storefront, out: &mut impl Write) -> Result<(), CliError> {
    match cli.command {
        Commands::Products { search } => {
            commands::catalog::products(storefront, search.as_deref(), out).await
        }
        Commands::Product { id } => commands::catalog::product(storefront, id, out).await,
        Commands::Banner => commands::catalog::banner(storefront, out).await,
        Commands::Cart { action } => commands::cart::run(storefront, action, out).await,
        Commands::Wishlist { action } => commands::wishlist::run(storefront, action, out).await,
        Commands::Login(args) => commands::account::login(storefront, args, out).await,
        Commands::Logout => commands::account::logout(storefront, out),
        Commands::Register(args) => commands::account::register(storefront, args, out).await,
        Commands::Orders => commands::account::orders(storefront, out).await,
        Commands::Checkout { action } => commands::checkout::run(storefront, action, out).await,
    }
}
