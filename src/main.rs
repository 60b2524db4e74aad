use clap::Parser;
use miette::{IntoDiagnostic, Result};
use orderflow::application::checkout::CheckoutEngine;
use orderflow::domain::order::LineItem;
use orderflow::domain::ports::{AuditSinkBox, CatalogStoreBox, OrderStoreBox};
use orderflow::error::CheckoutError;
use orderflow::infrastructure::audit::{JsonlAuditSink, TracingAuditSink};
use orderflow::infrastructure::clock::SystemClock;
use orderflow::infrastructure::in_memory::{
    InMemoryCatalog, InMemoryChallengeStore, InMemoryOrderStore,
};
#[cfg(feature = "storage-rocksdb")]
use orderflow::infrastructure::rocksdb::RocksDbStore;
use orderflow::interfaces::csv::catalog_reader::CatalogReader;
use orderflow::interfaces::csv::order_writer::OrderWriter;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Development harness for the checkout flow: loads a catalog, creates a
/// draft order, issues a passcode challenge, confirms payment with the
/// returned code, and prints the owner's orders as CSV.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Product catalog CSV file (id,name,price_cents,stock)
    catalog: PathBuf,

    /// Owner identity to run the flow as
    #[arg(long, default_value = "dev-user")]
    owner: String,

    /// Line item as product:qty (repeatable)
    #[arg(long = "item", required = true)]
    items: Vec<String>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Append audit events to this JSONL file instead of the log stream.
    #[arg(long)]
    audit_log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the order report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let items = cli
        .items
        .iter()
        .map(|spec| parse_item(spec))
        .collect::<orderflow::error::Result<Vec<_>>>()
        .into_diagnostic()?;

    #[cfg(feature = "storage-rocksdb")]
    let (catalog_store, order_store): (CatalogStoreBox, OrderStoreBox) = match &cli.db_path {
        Some(db_path) => {
            // Persistent orders and catalog; challenges stay in-process.
            let store = RocksDbStore::open(db_path).into_diagnostic()?;
            seed_rocksdb(&store, &cli.catalog).into_diagnostic()?;
            let catalog: CatalogStoreBox = Box::new(store.clone());
            let orders: OrderStoreBox = Box::new(store);
            (catalog, orders)
        }
        None => in_memory_stores(&cli.catalog).await.into_diagnostic()?,
    };
    #[cfg(not(feature = "storage-rocksdb"))]
    let (catalog_store, order_store): (CatalogStoreBox, OrderStoreBox) =
        in_memory_stores(&cli.catalog).await.into_diagnostic()?;

    let audit: AuditSinkBox = match &cli.audit_log {
        Some(path) => Box::new(JsonlAuditSink::new(path).into_diagnostic()?),
        None => Box::new(TracingAuditSink::new()),
    };

    let engine = CheckoutEngine::new(
        catalog_store,
        order_store,
        Box::new(InMemoryChallengeStore::new()),
        audit,
        Box::new(SystemClock),
    );

    let order = engine
        .create_order(&cli.owner, items)
        .await
        .into_diagnostic()?;
    tracing::info!(
        order_id = %order.id,
        amount_cents = order.amount_cents.value(),
        "draft order created"
    );

    let issued = engine
        .issue_challenge(&order.id, &cli.owner)
        .await
        .into_diagnostic()?;
    tracing::info!(code = %issued.masked, "challenge issued");

    engine
        .confirm_payment(&order.id, &cli.owner, &issued.raw_code)
        .await
        .into_diagnostic()?;
    tracing::info!(order_id = %order.id, "payment confirmed");

    let orders = engine.list_orders(&cli.owner).await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(orders).into_diagnostic()?;

    Ok(())
}

fn parse_item(spec: &str) -> orderflow::error::Result<LineItem> {
    let (product_id, quantity) = spec.split_once(':').ok_or_else(|| {
        CheckoutError::ValidationError(format!("invalid item spec (want product:qty): {spec}"))
    })?;
    let quantity: u32 = quantity.parse().map_err(|_| {
        CheckoutError::ValidationError(format!("invalid quantity in item spec: {spec}"))
    })?;
    LineItem::new(product_id, quantity)
}

async fn in_memory_stores(
    catalog_path: &Path,
) -> orderflow::error::Result<(CatalogStoreBox, OrderStoreBox)> {
    let catalog = InMemoryCatalog::new();
    let file = File::open(catalog_path)?;
    for row in CatalogReader::new(file).products() {
        match row {
            Ok(product) => catalog.insert(product).await,
            Err(e) => tracing::warn!(error = %e, "skipping malformed catalog row"),
        }
    }
    Ok((Box::new(catalog), Box::new(InMemoryOrderStore::new())))
}

#[cfg(feature = "storage-rocksdb")]
fn seed_rocksdb(store: &RocksDbStore, catalog_path: &Path) -> orderflow::error::Result<()> {
    let file = File::open(catalog_path)?;
    for row in CatalogReader::new(file).products() {
        match row {
            Ok(product) => store.put_product(&product)?,
            Err(e) => tracing::warn!(error = %e, "skipping malformed catalog row"),
        }
    }
    Ok(())
}
