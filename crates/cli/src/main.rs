//! Respawn CLI - Operator tools over the REST backend.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and keep the token for later commands
//! export RESPAWN_BACKEND_URL=http://localhost:8080/api/
//! export RESPAWN_TOKEN=$(RESPAWN_PASSWORD=... respawn-cli login ops@respawn.store)
//!
//! # Browse the catalog
//! respawn-cli catalog products --search keyboard --sort price-asc
//!
//! # Cart and favorites of the signed-in account
//! respawn-cli cart add 42 --quantity 2
//! respawn-cli favorites toggle 42
//!
//! # Back-office
//! respawn-cli admin users --status banned
//! respawn-cli admin set-status 1001 shipped
//! respawn-cli admin moderate 7 suspend
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use respawn_core::listing::SortOrder;
use respawn_core::{AccountStatus, CategoryId, ModerationAction, OrderId, OrderStatus, ProductId, UserId};
use url::Url;

mod commands;
mod output;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "respawn-cli")]
#[command(author, version, about = "Respawn operator tools")]
struct Cli {
    /// Origin of the REST backend
    #[arg(long, env = "RESPAWN_BACKEND_URL", global = true)]
    backend_url: Option<Url>,

    /// Bearer token for commands that act as a signed-in user
    #[arg(long, env = "RESPAWN_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and print the bearer token
    Login {
        /// Username or email
        identifier: String,

        /// Password
        #[arg(long, env = "RESPAWN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Browse products and categories
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the signed-in account's cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the signed-in account's favorites
    Favorites {
        #[command(subcommand)]
        action: FavoriteAction,
    },
    /// The signed-in account's orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Back-office operations (admin token required)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    Products {
        /// Case-insensitive name/description filter
        #[arg(short, long)]
        search: Option<String>,

        /// Category id (includes subcategories)
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// featured, price-asc, price-desc, name or newest
        #[arg(long, default_value = "featured")]
        sort: String,

        /// Only products with stock left
        #[arg(long)]
        in_stock: bool,

        /// Page number (12 per page)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// List categories
    Categories,
    /// Show one product
    Show {
        /// Product id
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product
    Add {
        /// Product id
        product: ProductId,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product
    Remove {
        /// Product id
        product: ProductId,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum FavoriteAction {
    /// List favorite products
    List,
    /// Add or remove a favorite
    Toggle {
        /// Product id
        product: ProductId,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List orders, newest first
    List,
    /// Show one order
    Show {
        /// Order id
        id: OrderId,
    },
    /// Cancel an order that is not delivered or cancelled yet
    Cancel {
        /// Order id
        id: OrderId,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List users
    Users {
        /// Username, email or name filter
        #[arg(short, long)]
        search: Option<String>,

        /// active, suspended or banned
        #[arg(long)]
        status: Option<AccountStatus>,
    },
    /// Ban, unban, suspend or unsuspend a user
    Moderate {
        /// User id
        user: UserId,

        /// ban, unban, suspend or unsuspend
        action: ModerationAction,
    },
    /// List all orders
    Orders {
        /// Order id, recipient or item filter
        #[arg(short, long)]
        search: Option<String>,

        /// Order status filter
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Change an order's status
    SetStatus {
        /// Order id
        order: OrderId,

        /// pending, processing, shipped, delivered or cancelled
        status: OrderStatus,
    },
    /// Profit and order count over the last seven days
    Profit,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "respawn_cli=info,respawn_api=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let backend_url = cli.backend_url.ok_or(CliError::MissingBackendUrl)?;
    let ctx = Context::new(backend_url, cli.token, cli.json)?;

    match cli.command {
        Commands::Login {
            identifier,
            password,
        } => commands::auth::login(&ctx, &identifier, password).await,
        Commands::Catalog { action } => match action {
            CatalogAction::Products {
                search,
                category,
                sort,
                in_stock,
                page,
            } => {
                let filter = commands::catalog::ProductFilter {
                    search,
                    category,
                    sort: SortOrder::from_param(Some(&sort)),
                    in_stock,
                    page,
                };
                commands::catalog::products(&ctx, &filter).await
            }
            CatalogAction::Categories => commands::catalog::categories(&ctx).await,
            CatalogAction::Show { id } => commands::catalog::show(&ctx, id).await,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await,
            CartAction::Add { product, quantity } => {
                commands::cart::add(&ctx, product, quantity).await
            }
            CartAction::Remove { product } => commands::cart::remove(&ctx, product).await,
            CartAction::Clear => commands::cart::clear(&ctx).await,
        },
        Commands::Favorites { action } => match action {
            FavoriteAction::List => commands::cart::favorites(&ctx).await,
            FavoriteAction::Toggle { product } => {
                commands::cart::toggle_favorite(&ctx, product).await
            }
        },
        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list(&ctx).await,
            OrderAction::Show { id } => commands::orders::show(&ctx, id).await,
            OrderAction::Cancel { id } => commands::orders::cancel(&ctx, id).await,
        },
        Commands::Admin { action } => match action {
            AdminAction::Users { search, status } => {
                commands::admin::users(&ctx, search.as_deref(), status).await
            }
            AdminAction::Moderate { user, action } => {
                commands::admin::moderate(&ctx, user, action).await
            }
            AdminAction::Orders { search, status } => {
                commands::admin::orders(&ctx, search.as_deref(), status).await
            }
            AdminAction::SetStatus { order, status } => {
                commands::admin::set_status(&ctx, order, status).await
            }
            AdminAction::Profit => commands::admin::profit(&ctx).await,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_admin_set_status() {
        let cli = Cli::try_parse_from([
            "respawn-cli",
            "--backend-url",
            "http://localhost:8080/api/",
            "admin",
            "set-status",
            "1001",
            "shipped",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Commands::Admin {
                action: AdminAction::SetStatus {
                    status: OrderStatus::Shipped,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_moderation_action() {
        let result = Cli::try_parse_from(["respawn-cli", "admin", "moderate", "7", "delete"]);
        assert!(result.is_err());
    }
}
