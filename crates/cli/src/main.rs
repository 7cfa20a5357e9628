//! Checkout Kit CLI - Reference data lookups and scripted checkouts.
//!
//! # Usage
//!
//! ```bash
//! # List countries offered in the address dropdowns
//! checkout-cli countries
//!
//! # List the states of a country
//! checkout-cli states CA
//!
//! # Show expiration months and years offered for cards
//! checkout-cli card-dates --year 2027
//!
//! # Run a checkout from a JSON draft, copying shipping into billing
//! checkout-cli submit order.json --copy-shipping
//! ```
//!
//! # Commands
//!
//! - `countries` - List countries
//! - `states` - List states for a country code
//! - `card-dates` - Card expiration months and years
//! - `submit` - Fill the form from a draft and submit it
//!
//! Configuration comes from the environment (see `checkout_kit::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use checkout_kit::clock::SystemClock;
use checkout_kit::config::CheckoutConfig;
use checkout_kit::controller::CheckoutController;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "checkout-cli")]
#[command(author, version, about = "Checkout Kit CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List countries offered for shipping and billing
    Countries,
    /// List the states of a country
    States {
        /// Country code, e.g. `US`
        code: String,
    },
    /// Show card expiration months and years
    CardDates {
        /// Expiration year to list months for (default: current year)
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Run a checkout from a JSON draft
    Submit {
        /// Path to the draft file
        file: PathBuf,

        /// Copy the shipping address into billing
        #[arg(long)]
        copy_shipping: bool,

        /// Cart total to report with the order
        #[arg(long, default_value = "0")]
        total: Decimal,

        /// Cart item count to report with the order
        #[arg(long, default_value_t = 0)]
        quantity: u32,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CheckoutConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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

    let config = match CheckoutConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Tracing is not up yet
            report_startup_error(&e);
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to warn so command output stays readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "checkout_kit=warn,checkout_cli=info".into());

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

#[allow(clippy::print_stderr)]
fn report_startup_error(error: &dyn std::error::Error) {
    eprintln!("Failed to load configuration: {error}");
}

async fn run(cli: Cli, config: &CheckoutConfig) -> Result<(), CliError> {
    let controller = CheckoutController::from_config(config, Arc::new(SystemClock))?;

    match cli.command {
        Commands::Countries => commands::reference::countries(controller).await?,
        Commands::States { code } => commands::reference::states(controller, &code).await?,
        Commands::CardDates { year } => commands::reference::card_dates(controller, year).await?,
        Commands::Submit {
            file,
            copy_shipping,
            total,
            quantity,
        } => {
            let options = commands::submit::SubmitOptions {
                copy_shipping,
                total,
                quantity,
                currency: config.currency,
            };
            commands::submit::run(controller, &file, &options).await?;
        }
    }
    Ok(())
}
