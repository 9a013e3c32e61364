//! `orderdesk` command-line front end.
//!
//! # Usage
//!
//! ```bash
//! orderdesk client add --name "Иван" --email ivan@mail.com --phone +79161234567 \
//!     --city Москва --address "ул. Ленина, 1"
//! orderdesk product add --name Ручка --price 10.50
//! orderdesk order create --client CLT001 --item PRD001:2 --item PRD002
//! orderdesk export --table orders --format json orders.json
//! orderdesk report top-clients --limit 3
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use orderdesk::{
    config::{database, settings},
    core::{
        cart::{OrderCart, current_timestamp, place_order},
        client::{self, ClientDraft},
        order, product,
        product::ProductDraft,
        report,
        transfer::{self, Table},
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orderdesk")]
#[command(author, version, about = "Client, product and order records")]
struct Cli {
    /// Store URL, overriding the settings file
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the tables if they do not exist yet
    Init,
    /// Manage clients
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },
    /// Manage the product catalogue
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Write a whole table to a file
    Export {
        /// `clients`, `products`, `orders` or `order_items`
        #[arg(short, long)]
        table: String,
        #[arg(short, long, value_enum, default_value = "csv")]
        format: FileFormat,
        path: PathBuf,
    },
    /// Load a table from a file
    Import {
        /// `clients`, `products`, `orders` or `order_items`
        #[arg(short, long)]
        table: String,
        #[arg(short, long, value_enum, default_value = "csv")]
        format: FileFormat,
        path: PathBuf,
    },
    /// Print aggregate reports
    Report {
        #[command(subcommand)]
        kind: ReportKind,
    },
}

#[derive(Subcommand)]
enum ClientAction {
    /// Register a client under the next free identifier
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        phone: String,
        #[arg(short, long)]
        city: String,
        #[arg(short, long)]
        address: String,
    },
    /// List clients, optionally filtered
    List {
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Delete a client by identifier
    Delete { id: String },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Add a product under the next free identifier
    Add {
        #[arg(short, long)]
        name: String,
        /// Unit price, e.g. `10.50`
        #[arg(short, long)]
        price: String,
    },
    /// List products, optionally filtered
    List {
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Delete a product by identifier
    Delete { id: String },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Place an order priced from the current catalogue
    Create {
        #[arg(short, long)]
        client: String,
        /// `PRODUCT_ID[:QUANTITY]`, repeatable
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,
        /// Order date; defaults to the current local time
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List orders with their lines, optionally filtered
    List {
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show the lines of one order
    Items { id: String },
    /// Delete an order and its lines
    Delete { id: String },
}

#[derive(Subcommand)]
enum ReportKind {
    /// Clients with the most orders
    TopClients {
        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// Order count and sum per date
    Dynamics,
    /// Pairs of clients living in the same city
    CityLinks,
}

#[derive(Clone, Copy, ValueEnum)]
enum FileFormat {
    Csv,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut app_settings = settings::load_default_config()?;
    if let Some(url) = cli.database_url {
        app_settings.database_url = url;
    }
    let db = database::init_database(&app_settings.database_url, app_settings.max_connections)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    match cli.command {
        Commands::Init => println!("Tables ready at {}", app_settings.database_url),
        Commands::Client { action } => run_client(&db, &app_settings, action).await?,
        Commands::Product { action } => run_product(&db, &app_settings, action).await?,
        Commands::Order { action } => run_order(&db, &app_settings, action).await?,
        Commands::Export {
            table,
            format,
            path,
        } => {
            let table: Table = table.parse()?;
            let count = match format {
                FileFormat::Csv => transfer::export_csv(&db, table, &path).await?,
                FileFormat::Json => transfer::export_json(&db, table, &path).await?,
            };
            println!("Exported {count} rows of {table} to {}", path.display());
        }
        Commands::Import {
            table,
            format,
            path,
        } => run_import(&db, &app_settings, &table, format, &path).await?,
        Commands::Report { kind } => run_report(&db, &app_settings, kind).await?,
    }
    Ok(())
}

async fn run_client(
    db: &DatabaseConnection,
    app_settings: &settings::Settings,
    action: ClientAction,
) -> Result<()> {
    match action {
        ClientAction::Add {
            name,
            email,
            phone,
            city,
            address,
        } => {
            let draft = ClientDraft {
                name,
                email,
                phone,
                city,
                address,
            };
            let stored = client::create_client(db, &app_settings.ids, draft).await?;
            println!("Added client {}", stored.id);
        }
        ClientAction::List { filter } => {
            for c in client::get_clients(db, filter.as_deref()).await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    c.id, c.name, c.email, c.phone, c.city, c.address
                );
            }
        }
        ClientAction::Delete { id } => {
            let removed = client::delete_client(db, &id).await?;
            println!("Removed {removed} client(s)");
        }
    }
    Ok(())
}

async fn run_product(
    db: &DatabaseConnection,
    app_settings: &settings::Settings,
    action: ProductAction,
) -> Result<()> {
    match action {
        ProductAction::Add { name, price } => {
            let stored =
                product::create_product(db, &app_settings.ids, ProductDraft::new(name, price))
                    .await?;
            println!("Added product {} at {:.2}", stored.id, stored.price);
        }
        ProductAction::List { filter } => {
            for p in product::get_products(db, filter.as_deref()).await? {
                println!("{}\t{}\t{:.2}", p.id, p.name, p.price);
            }
        }
        ProductAction::Delete { id } => {
            let removed = product::delete_product(db, &id).await?;
            println!("Removed {removed} product(s)");
        }
    }
    Ok(())
}

async fn run_order(
    db: &DatabaseConnection,
    app_settings: &settings::Settings,
    action: OrderAction,
) -> Result<()> {
    match action {
        OrderAction::Create {
            client,
            items,
            date,
        } => {
            let mut cart = OrderCart::new();
            for spec in &items {
                let (product_id, quantity) = parse_item(spec)?;
                cart.add_item(db, product_id, quantity).await?;
            }
            let order_date = date.unwrap_or_else(current_timestamp);
            let placed = place_order(db, &app_settings.ids, &client, order_date, &mut cart).await?;
            println!(
                "Placed order {} totalling {:.2}",
                placed.order.id, placed.order.total_amount
            );
        }
        OrderAction::List { filter } => {
            for entry in order::get_orders(db, filter.as_deref()).await? {
                let o = &entry.order;
                println!(
                    "{}\t{}\t{:.2}\t{}\t{} line(s)",
                    o.id,
                    o.client_id,
                    o.total_amount,
                    o.order_date,
                    entry.items.len()
                );
            }
        }
        OrderAction::Items { id } => {
            for line in order::get_order_items(db, &id).await? {
                println!(
                    "{}\t{}\t{:.2}\tx{}\t{:.2}",
                    line.product_id,
                    line.product_name,
                    line.product_price,
                    line.quantity,
                    line.line_total()
                );
            }
        }
        OrderAction::Delete { id } => {
            let removed = order::delete_order(db, &id).await?;
            println!("Removed {removed} order(s)");
        }
    }
    Ok(())
}

async fn run_import(
    db: &DatabaseConnection,
    app_settings: &settings::Settings,
    table: &str,
    format: FileFormat,
    path: &Path,
) -> Result<()> {
    let table: Table = table.parse()?;
    match format {
        FileFormat::Csv => {
            let count = transfer::import_csv(db, table, path).await?;
            println!("Imported {count} rows into {table}");
        }
        FileFormat::Json => {
            let summary = match table {
                Table::Clients => transfer::import_clients_json(db, &app_settings.ids, path).await?,
                Table::Products => {
                    transfer::import_products_json(db, &app_settings.ids, path).await?
                }
                Table::Orders | Table::OrderItems => {
                    return Err(Error::Config {
                        message: format!("JSON import is not available for {table}"),
                    });
                }
            };
            println!(
                "Imported {} records into {table}, skipped {}",
                summary.imported, summary.skipped
            );
        }
    }
    Ok(())
}

async fn run_report(
    db: &DatabaseConnection,
    app_settings: &settings::Settings,
    kind: ReportKind,
) -> Result<()> {
    match kind {
        ReportKind::TopClients { limit } => {
            let limit = limit.unwrap_or(app_settings.reports.top_clients_limit);
            for row in report::top_clients(db, limit).await? {
                println!("{}\t{}\t{}", row.client_id, row.client_name, row.order_count);
            }
        }
        ReportKind::Dynamics => {
            for row in report::orders_dynamics(db).await? {
                println!(
                    "{}\t{}\t{:.2}",
                    row.order_date, row.order_count, row.total_amount
                );
            }
        }
        ReportKind::CityLinks => {
            for link in report::city_connections(db).await? {
                println!("{} - {}\t{}", link.first, link.second, link.city);
            }
        }
    }
    Ok(())
}

/// Splits `PRD001:2` into product and quantity; a bare id means one unit.
fn parse_item(spec: &str) -> Result<(&str, i64)> {
    let Some((product_id, quantity)) = spec.split_once(':') else {
        return Ok((spec, 1));
    };
    match quantity.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok((product_id, n)),
        _ => Err(Error::InvalidNumber {
            field: "quantity",
            value: quantity.to_string(),
        }),
    }
}
