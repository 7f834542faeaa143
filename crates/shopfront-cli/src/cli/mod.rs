//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use shopfront_core::catalog::SortKey;
use shopfront_core::config::{self, CatalogSource};
use shopfront_core::route::Route;
use shopfront_core::storage::{FileStorage, Storage};
use shopfront_core::{Services, logging};

use crate::modes;

mod commands;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(version)]
#[command(about = "Browse and shop the storefront from your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Storefront API base URL (overrides SHOPFRONT_API_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Use the built-in sample catalog instead of the API
    #[arg(long, global = true)]
    demo: bool,

    /// Page to open in the UI, e.g. "/products.html?search=mouse"
    #[arg(long, value_name = "PATH")]
    open: Option<String>,
}

/// Listing filters shared by `products`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ListingArgs {
    /// Match name or description (case-insensitive)
    #[arg(short, long)]
    search: Option<String>,

    /// Category id
    #[arg(short, long, value_name = "ID")]
    category: Option<u64>,

    /// Lowest price to include
    #[arg(long, value_name = "PRICE")]
    min_price: Option<f64>,

    /// Highest price to include
    #[arg(long, value_name = "PRICE")]
    max_price: Option<f64>,

    /// Sort order (newest, price-asc, price-desc, name, rating)
    #[arg(long, value_parser = parse_sort)]
    sort: Option<SortKey>,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

fn parse_sort(value: &str) -> Result<SortKey, String> {
    SortKey::parse(value).ok_or_else(|| {
        let known: Vec<_> = SortKey::ALL.iter().map(|k| k.as_str()).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List products
    Products(ListingArgs),
    /// Show a product with related products and reviews
    Product {
        /// The product slug, e.g. "wireless-mouse"
        #[arg(value_name = "SLUG")]
        slug: String,
    },
    /// List categories
    Categories,
    /// List featured products
    Featured,

    /// Manage the cart (guest cart when logged out)
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },

    /// Log in and move the guest cart to your account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
        /// Your full name
        #[arg(long)]
        name: String,
    },
    /// Log out (clear the stored session)
    Logout,
    /// Show the logged-in user
    Whoami,

    /// Show your order history
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },
    /// Place an order for the current cart
    Checkout,

    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum CartCommands {
    /// Show the cart with its summary
    Show,
    /// Add a product
    Add {
        #[arg(value_name = "PRODUCT_ID")]
        product_id: u64,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 or less removes it)
    Update {
        /// Product id (guest cart) or cart line id (account cart)
        #[arg(value_name = "ITEM_ID")]
        item_id: u64,
        #[arg(value_name = "QUANTITY", allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        #[arg(value_name = "ITEM_ID")]
        item_id: u64,
    },
    /// Move the guest cart into the account cart
    Sync,
    /// Empty the guest cart
    Clear,
}

#[derive(clap::Subcommand)]
enum OrderCommands {
    /// List past orders
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
    /// Show one order with its items
    Show {
        #[arg(value_name = "ORDER_ID")]
        id: u64,
    },
}

#[derive(clap::Subcommand)]
enum AdminCommands {
    /// Show the dashboard summary
    Summary,
    /// Follow live metrics
    Metrics {
        /// Stop after this many updates
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        api_url,
        demo,
        open,
    } = cli;

    // Config commands must work even when the config file is broken.
    let command = match command {
        Some(Commands::Config { command }) => return config_command(&command),
        other => other,
    };

    let mut config = config::Config::load().context("load config")?;
    if let Some(url) = api_url {
        config.api.base_url_override = Some(url);
    }
    if demo {
        config.catalog.source = CatalogSource::Demo;
    }

    let _log_guard = logging::init(&config.log).context("init logging")?;

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open_default());
    let services = Services::new(config, storage).context("create services")?;

    // default to the interactive storefront
    let Some(command) = command else {
        let route = open.as_deref().map_or(Route::Home, Route::parse);
        return modes::run_tui(services, route).await;
    };

    match command {
        Commands::Products(args) => commands::catalog::products(&services, &args).await,
        Commands::Product { slug } => commands::catalog::product(&services, &slug).await,
        Commands::Categories => commands::catalog::categories(&services).await,
        Commands::Featured => commands::catalog::featured(&services).await,

        Commands::Cart { command } => match command {
            CartCommands::Show => commands::cart::show(&services).await,
            CartCommands::Add {
                product_id,
                quantity,
            } => commands::cart::add(&services, product_id, quantity).await,
            CartCommands::Update { item_id, quantity } => {
                commands::cart::update(&services, item_id, quantity).await
            }
            CartCommands::Remove { item_id } => commands::cart::remove(&services, item_id).await,
            CartCommands::Sync => commands::cart::sync(&services).await,
            CartCommands::Clear => commands::cart::clear(&services).await,
        },

        Commands::Login { email, password } => {
            commands::account::login(&services, &email, &password).await
        }
        Commands::Register {
            email,
            password,
            name,
        } => commands::account::register(&services, &email, &password, &name).await,
        Commands::Logout => commands::account::logout(&services).await,
        Commands::Whoami => commands::account::whoami(&services).await,

        Commands::Orders { command } => match command {
            OrderCommands::List { page } => commands::account::orders(&services, page).await,
            OrderCommands::Show { id } => commands::account::order(&services, id).await,
        },
        Commands::Checkout => commands::cart::checkout(&services).await,

        Commands::Admin { command } => match command {
            AdminCommands::Summary => commands::admin::summary(&services).await,
            AdminCommands::Metrics { count } => commands::admin::metrics(&services, count).await,
        },

        Commands::Config { command } => config_command(&command),
    }
}

fn config_command(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
        ConfigCommands::Generate => commands::config::generate(),
    }
}
