//! Tsirushka CLI - the storefront and admin console from the terminal.
//!
//! # Usage
//!
//! ```bash
//! export TSIR_API_BASE_URL=https://api.tsirushka.cr/api
//!
//! tsir catalog list --q cacao --sort precio-asc
//! tsir login -e ana@correo.cr
//! tsir cart add 12
//! tsir checkout place --name "Ana Mora" --email ana@correo.cr --pickup --pay sinpe --sinpe-ref 123456
//! tsir orders list
//!
//! tsir admin dashboard
//! tsir --yes admin products delete 7
//! ```
//!
//! # Commands
//!
//! - `login` / `register` / `logout` / `whoami` - Session
//! - `catalog` - Browse products and categories
//! - `cart` - Edit the persisted cart
//! - `checkout` - Quote shipping and place the order
//! - `orders` - Your orders
//! - `contact` - Send the contact form
//! - `admin` - Admin console (requires `ROLE_ADMIN`)
//!
//! Logs go to stderr. `RUST_LOG` sets the filter and `TSIR_LOG_FORMAT=json`
//! switches to JSON lines.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tsirushka_client::{AppState, ClientConfig};

mod commands;
mod error;
mod prompt;
mod render;

use commands::account::{LoginArgs, RegisterArgs};
use commands::admin::AdminCommand;
use commands::cart::{CartCommand, CheckoutCommand};
use commands::shop::{CatalogCommand, ContactArgs, OrdersCommand};

#[derive(Parser)]
#[command(name = "tsir")]
#[command(author, version, about = "Tsirushka storefront and admin console")]
struct Cli {
    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and save the session token
    Login(LoginArgs),
    /// Create an account and log in
    Register(RegisterArgs),
    /// Forget the saved session
    Logout,
    /// Show the current session
    Whoami,
    /// Browse the catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Edit the cart
    Cart {
        #[command(subcommand)]
        command: CartCommand,
    },
    /// Quote and place an order
    Checkout {
        #[command(subcommand)]
        command: CheckoutCommand,
    },
    /// Your orders
    Orders {
        #[command(subcommand)]
        command: OrdersCommand,
    },
    /// Send a message to the shop
    Contact(ContactArgs),
    /// Admin console
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let json = std::env::var("TSIR_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(api = %config.api_base_url, data_dir = %config.data_dir.display(), "Loaded configuration");
    let state = AppState::with_file_storage(config);
    let confirm = prompt::confirmer(cli.yes);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Login(args) => commands::account::login(&state, args, &mut out).await?,
        Commands::Register(args) => commands::account::register(&state, args, &mut out).await?,
        Commands::Logout => commands::account::logout(&state, &mut out)?,
        Commands::Whoami => commands::account::whoami(&state, &mut out)?,
        Commands::Catalog { command } => commands::shop::catalog(&state, command, &mut out).await?,
        Commands::Cart { command } => {
            commands::cart::cart(&state, command, confirm.as_ref(), &mut out).await?;
        }
        Commands::Checkout { command } => {
            commands::cart::checkout(&state, command, &mut out).await?;
        }
        Commands::Orders { command } => commands::shop::orders(&state, command, &mut out).await?,
        Commands::Contact(args) => commands::shop::contact(&state, args, &mut out).await?,
        Commands::Admin { command } => {
            commands::admin::run(&state, command, confirm.as_ref(), &mut out).await?;
        }
    }
    out.flush()?;
    Ok(())
}
