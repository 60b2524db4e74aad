use crate::domain::order::Order;
use crate::domain::ports::{CatalogStore, OrderStore, PaidTransition};
use crate::domain::product::Product;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for the product catalog.
pub const CF_PRODUCTS: &str = "products";
/// Column Family for order records.
pub const CF_ORDERS: &str = "orders";

/// A persistent store implementation using RocksDB.
///
/// Serves both the `CatalogStore` and `OrderStore` ports from separate Column
/// Families, JSON-encoded. Challenges are deliberately not persisted: they are
/// process-lifetime only, and a restart drops all in-flight codes.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    // Serializes the mark_paid read-modify-write within this process, keeping
    // the paid transition a compare-and-set. Cross-process coordination is out
    // of scope for this backend.
    paid_guard: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring the
    /// required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_products = ColumnFamilyDescriptor::new(CF_PRODUCTS, Options::default());
        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_products, cf_orders])?;

        Ok(Self {
            db: Arc::new(db),
            paid_guard: Arc::new(Mutex::new(())),
        })
    }

    /// Seeds or refreshes a catalog entry. Catalog writes sit outside the
    /// `CatalogStore` port, which is read-only to the core.
    pub fn put_product(&self, product: &Product) -> Result<()> {
        let cf = self.cf(CF_PRODUCTS)?;
        self.db
            .put_cf(cf, product.id.as_bytes(), serde_json::to_vec(product)?)?;
        Ok(())
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            CheckoutError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }
}

#[async_trait]
impl CatalogStore for RocksDbStore {
    async fn get(&self, product_id: &str) -> Result<Option<Product>> {
        let cf = self.cf(CF_PRODUCTS)?;
        match self.db.get_cf(cf, product_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderStore for RocksDbStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let cf = self.cf(CF_ORDERS)?;
        self.db
            .put_cf(cf, order.id.as_bytes(), serde_json::to_vec(&order)?)?;
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        match self.db.get_cf(cf, order_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        let mut owned = Vec::new();

        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            let order: Order = serde_json::from_slice(&value)?;
            if order.owner_id == owner_id {
                owned.push(order);
            }
        }

        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn mark_paid(&self, order_id: &str) -> Result<PaidTransition> {
        let _guard = self.paid_guard.lock().await;

        let cf = self.cf(CF_ORDERS)?;
        let Some(bytes) = self.db.get_cf(cf, order_id.as_bytes())? else {
            return Ok(PaidTransition::Missing);
        };
        let mut order: Order = serde_json::from_slice(&bytes)?;
        if order.paid {
            return Ok(PaidTransition::AlreadyPaid);
        }

        order.paid = true;
        self.db
            .put_cf(cf, order_id.as_bytes(), serde_json::to_vec(&order)?)?;
        Ok(PaidTransition::Applied)
    }
}
