//! PocketShop CLI - drive the storefront stores against a live API.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session is persisted under POCKETSHOP_STORAGE_DIR)
//! pocketshop login --phone +15550100 --password hunter22
//!
//! # Browse the first two listing pages of a category
//! pocketshop products --category shoes --sort price-asc --pages 2
//!
//! # Show one product
//! pocketshop product 64f1c2
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `whoami`, `register` - Account session
//! - `reset` - Password reset by SMS code
//! - `products`, `product`, `popular`, `categories`, `banners` - Catalog reads

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use pocketshop_client::config::SentryConfig;
use pocketshop_client::{ClientConfig, Storefront};
use pocketshop_core::ProductSort;
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use error::CliError;

#[derive(Parser)]
#[command(name = "pocketshop")]
#[command(author, version, about = "PocketShop storefront CLI")]
struct Cli {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the session
    Login {
        /// Account phone number
        #[arg(short, long)]
        phone: String,

        /// Account password
        #[arg(long, env = "POCKETSHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (does not sign in)
    Register {
        #[arg(short, long)]
        phone: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(long, env = "POCKETSHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and clear the persisted session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Reset a forgotten password (prompts for the SMS code)
    Reset {
        #[arg(short, long)]
        phone: String,

        /// New password
        #[arg(long, env = "POCKETSHOP_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List products
    Products {
        /// Category id or slug
        #[arg(short, long)]
        category: Option<String>,

        /// Search text
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order (popular, newest, oldest, price-asc, price-desc, rating)
        #[arg(long)]
        sort: Option<ProductSort>,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show one product
    Product {
        /// Product id
        id: String,
    },
    /// List popular products
    Popular,
    /// List categories
    Categories,
    /// List home banners
    Banners,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SentryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.environment.clone().map(std::borrow::Cow::Owned),
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
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocketshop_client=info,pocketshop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config.sentry);
    init_tracing();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), CliError> {
    let storefront = Storefront::with_file_storage(config)?;
    storefront.start().await?;
    let format = output::Format::from_flag(cli.json);

    match cli.command {
        Commands::Login { phone, password } => {
            let password = SecretString::from(password);
            commands::account::login(&storefront, &phone, &password, format).await?;
        }
        Commands::Register {
            phone,
            first_name,
            last_name,
            email,
            password,
        } => {
            commands::account::register(
                &storefront,
                pocketshop_client::stores::RegisterInput {
                    phone,
                    first_name,
                    last_name,
                    email,
                    password: SecretString::from(password),
                },
            )
            .await?;
        }
        Commands::Logout => commands::account::logout(&storefront).await,
        Commands::Whoami => commands::account::whoami(&storefront, format).await?,
        Commands::Reset { phone, password } => {
            let password = SecretString::from(password);
            commands::account::reset_password(&storefront, &phone, &password).await?;
        }
        Commands::Products {
            category,
            search,
            sort,
            pages,
        } => {
            let query = commands::catalog::ListingQuery {
                category,
                search,
                sort,
                pages,
            };
            commands::catalog::products(&storefront, query, format).await?;
        }
        Commands::Product { id } => commands::catalog::product(&storefront, &id, format).await?,
        Commands::Popular => commands::catalog::popular(&storefront, format).await?,
        Commands::Categories => commands::catalog::categories(&storefront, format).await?,
        Commands::Banners => commands::catalog::banners(&storefront, format).await?,
    }
    Ok(())
}
