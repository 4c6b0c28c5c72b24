//! Emporium CLI - terminal front end for the store dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Store the token returned by the login endpoint
//! emporium session set-token <token> --email admin@example.com --staff
//!
//! # Resolve a front-end path through the route table and render it
//! emporium open /dashboard/products
//!
//! # Filter products
//! emporium products list --search jam --stock low_stock --sort -unit_price
//!
//! # Delete a review without prompting
//! emporium --yes reviews delete 12
//! ```
//!
//! # Environment Variables
//!
//! - `EMPORIUM_API_ORIGIN` - Backend API origin (default: local backend)
//! - `EMPORIUM_SITE_HOST` - Legacy host used to pick an origin when no origin is set
//! - `EMPORIUM_STATE_DIR` - Directory holding the session file (default: `.emporium`)
//! - `EMPORIUM_API_TOKEN` - Bearer token overriding the stored one
//! - `EMPORIUM_LOG_JSON` - Emit JSON logs
//! - `SENTRY_DSN` - Sentry DSN for error tracking (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use emporium_client::ClientConfig;
use emporium_core::{CategoryId, ProductId, ReviewId, UserId};

mod commands;
mod prompt;
mod telemetry;

use commands::Context;
use prompt::StdinConfirm;

#[derive(Parser)]
#[command(name = "emporium")]
#[command(author, version, about = "Emporium store dashboard")]
struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a front-end path for the current session and render it
    Open {
        /// Path such as `/dashboard/reviews`
        path: String,
    },
    /// Show the dashboard overview
    Stats,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Moderate reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewAction,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage the stored session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

/// Product form fields shared by create and update.
#[derive(clap::Args)]
struct ProductFields {
    /// Product title
    #[arg(short, long)]
    title: String,

    /// Product description
    #[arg(short, long)]
    description: String,

    /// Unit price, e.g. `4.50`
    #[arg(short, long)]
    price: String,

    /// Units in stock
    #[arg(short, long, default_value_t = 0)]
    stock: u32,

    /// Category ID
    #[arg(short, long)]
    category: i64,

    /// Image file to upload
    #[arg(short, long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Search title, description and category name
        #[arg(short, long, default_value = "")]
        search: String,

        /// Category ID
        #[arg(short, long)]
        category: Option<i64>,

        /// Stock status (`in_stock`, `out_of_stock`, `low_stock`)
        #[arg(long)]
        stock: Option<String>,

        /// Sort order (e.g. `title`, `-unit_price`, `-date_added`)
        #[arg(long, allow_hyphen_values = true)]
        sort: Option<String>,
    },
    /// Show one product
    Show { id: i64 },
    /// Create a product
    Create {
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Update a product
    Update {
        id: i64,

        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    Delete { id: i64 },
    /// Apply the same changes to several products
    BulkUpdate {
        /// Product IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,

        /// New stock level
        #[arg(long)]
        stock: Option<u32>,

        /// New unit price
        #[arg(long)]
        price: Option<String>,

        /// New category ID
        #[arg(long)]
        category: Option<i64>,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List,
    /// Create a category
    Create {
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename a category
    Update {
        id: i64,
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a category (refused while it has products)
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// List reviews
    List {
        /// Search title and content
        #[arg(short, long, default_value = "")]
        search: String,

        /// Star rating, 1 to 5
        #[arg(short, long)]
        rating: Option<i64>,

        /// Product ID
        #[arg(short, long)]
        product: Option<i64>,
    },
    /// Delete a review
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum UserAction {
    /// List users
    List,
    /// Grant admin rights to a user
    Promote { id: i64 },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Store a bearer token
    SetToken {
        token: String,

        /// Email of the signed-in user
        #[arg(short, long)]
        email: Option<String>,

        /// Mark the signed-in user as staff
        #[arg(long)]
        staff: bool,
    },
    /// Forget the stored token
    Clear,
    /// Show the stored session
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init_tracing(false);
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(config.log_json);
    if sentry_guard.is_some() {
        tracing::info!("Sentry initialized");
    }

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let confirm = Box::new(StdinConfirm::new(cli.yes));
    let ctx = Context::load(config, confirm).await?;

    match cli.command {
        Commands::Open { path } => commands::open::open(&ctx, &path).await?,
        Commands::Stats => commands::open::stats(&ctx).await?,
        Commands::Products { action } => match action {
            ProductAction::List {
                search,
                category,
                stock,
                sort,
            } => {
                let filters = commands::products::filters(
                    search,
                    category,
                    stock.as_deref(),
                    sort.as_deref(),
                )?;
                commands::products::list(&ctx, filters).await?;
            }
            ProductAction::Show { id } => {
                commands::products::show(&ctx, ProductId::new(id)).await?;
            }
            ProductAction::Create { fields } => {
                let draft = commands::products::draft(fields).await?;
                commands::products::save(&ctx, None, draft).await?;
            }
            ProductAction::Update { id, fields } => {
                let draft = commands::products::draft(fields).await?;
                commands::products::save(&ctx, Some(ProductId::new(id)), draft).await?;
            }
            ProductAction::Delete { id } => {
                commands::products::delete(&ctx, ProductId::new(id)).await?;
            }
            ProductAction::BulkUpdate {
                ids,
                stock,
                price,
                category,
            } => {
                let ids: Vec<ProductId> = ids.into_iter().map(ProductId::new).collect();
                let changes = commands::products::changes(stock, price.as_deref(), category)?;
                commands::products::bulk_update(&ctx, &ids, &changes).await?;
            }
        },
        Commands::Categories { action } => match action {
            CategoryAction::List => commands::categories::list(&ctx).await?,
            CategoryAction::Create { name, description } => {
                commands::categories::create(&ctx, name, description).await?;
            }
            CategoryAction::Update {
                id,
                name,
                description,
            } => {
                commands::categories::update(&ctx, CategoryId::new(id), name, description)
                    .await?;
            }
            CategoryAction::Delete { id } => {
                commands::categories::delete(&ctx, CategoryId::new(id)).await?;
            }
        },
        Commands::Reviews { action } => match action {
            ReviewAction::List {
                search,
                rating,
                product,
            } => {
                let filters = commands::reviews::filters(search, rating, product)?;
                commands::reviews::list(&ctx, filters).await?;
            }
            ReviewAction::Delete { id } => {
                commands::reviews::delete(&ctx, ReviewId::new(id)).await?;
            }
        },
        Commands::Users { action } => match action {
            UserAction::List => commands::users::list(&ctx).await?,
            UserAction::Promote { id } => {
                commands::users::promote(&ctx, UserId::new(id)).await?;
            }
        },
        Commands::Session { action } => match action {
            SessionAction::SetToken {
                token,
                email,
                staff,
            } => commands::session::set_token(&ctx, token, email, staff).await?,
            SessionAction::Clear => commands::session::clear(&ctx).await?,
            SessionAction::Show => commands::session::show(&ctx).await?,
        },
    }
    Ok(())
}
