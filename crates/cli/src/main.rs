//! Fruity Fruit CLI - Storefront client for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password may also come from FRUITY_PASSWORD)
//! fruity login -e lan@example.com
//!
//! # Browse and fill the cart
//! fruity products --search xoai --sort price-asc
//! fruity cart add 12 --quantity 2
//!
//! # Check out with cash on delivery
//! fruity checkout --payment cod
//!
//! # Follow order status changes until Ctrl+C
//! fruity orders watch
//! ```
//!
//! # Environment Variables
//!
//! See `fruity_storefront::config` for the full list. `RUST_LOG` overrides
//! the default log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fruity_storefront::{Storefront, StorefrontConfig};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "fruity")]
#[command(author, version, about = "Fruity Fruit storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "FRUITY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "FRUITY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Email a password reset link
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },
    /// Set a new password from a reset token
    ResetPassword {
        #[arg(short, long)]
        token: String,

        #[arg(short, long, env = "FRUITY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List products
    Products(commands::catalog::ProductArgs),
    /// Show one product with variants, reviews and related products
    Product {
        /// Product slug
        slug: String,
    },
    /// Show the category tree
    Categories,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: commands::account::WishlistAction,
    },
    /// Manage delivery addresses
    Addresses {
        #[command(subcommand)]
        action: commands::account::AddressAction,
    },
    /// Quote shipping and place an order for the cart
    Checkout(commands::orders::CheckoutArgs),
    /// Order history and tracking
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrderAction,
    },
    /// Handle the payment gateway's return parameters
    PaymentReturn {
        #[arg(long = "order-id")]
        order_id: Option<String>,

        #[arg(long = "result-code")]
        result_code: Option<String>,

        #[arg(long)]
        message: Option<String>,
    },
    /// Show or acknowledge notifications
    Notifications {
        #[command(subcommand)]
        action: commands::orders::NotificationAction,
    },
    /// Read the blog
    Posts {
        #[command(subcommand)]
        action: commands::content::PostAction,
    },
    /// View or edit the profile
    Profile {
        #[command(subcommand)]
        action: commands::account::ProfileAction,
    },
    /// Send a message to the shop
    Contact(commands::content::ContactArgs),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::error(&format!("Cấu hình không hợp lệ: {e}"));
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fruity_storefront=info,fruity_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let storefront = match Storefront::open(config) {
        Ok(storefront) => storefront,
        Err(e) => {
            e.report();
            output::error(&e.user_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, &storefront).await {
        e.report();
        output::error(&e.user_message());
        std::process::exit(1);
    }
}

async fn run(command: Commands, storefront: &Storefront) -> fruity_storefront::Result<()> {
    use commands::{account, auth, cart, catalog, content, orders};

    match command {
        Commands::Login { email, password } => auth::login(storefront, &email, password).await,
        Commands::Register {
            name,
            email,
            password,
        } => auth::register(storefront, &name, &email, password).await,
        Commands::Logout => auth::logout(storefront).await,
        Commands::ForgotPassword { email } => auth::forgot_password(storefront, &email).await,
        Commands::ResetPassword { token, password } => {
            auth::reset_password(storefront, token, password).await
        }
        Commands::Products(args) => catalog::products(storefront, args).await,
        Commands::Product { slug } => catalog::product(storefront, &slug).await,
        Commands::Categories => catalog::categories(storefront).await,
        Commands::Cart { action } => cart::run(storefront, action).await,
        Commands::Wishlist { action } => account::wishlist(storefront, action).await,
        Commands::Addresses { action } => account::addresses(storefront, action).await,
        Commands::Checkout(args) => orders::checkout(storefront, args).await,
        Commands::Orders { action } => orders::run(storefront, action).await,
        Commands::PaymentReturn {
            order_id,
            result_code,
            message,
        } => {
            orders::payment_return(
                storefront,
                order_id.as_deref(),
                result_code.as_deref(),
                message.as_deref(),
            )
            .await
        }
        Commands::Notifications { action } => orders::notifications(storefront, &action),
        Commands::Posts { action } => content::posts(storefront, action).await,
        Commands::Profile { action } => account::profile(storefront, action).await,
        Commands::Contact(args) => content::contact(storefront, args).await,
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_cart_update() {
        let cli = Cli::try_parse_from(["fruity", "cart", "update", "7", "150"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(cli.command, Commands::Cart { .. }));
    }
}
