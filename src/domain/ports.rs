use super::challenge::Challenge;
use super::order::Order;
use super::product::Product;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub type CatalogStoreBox = Box<dyn CatalogStore>;
pub type OrderStoreBox = Box<dyn OrderStore>;
pub type ChallengeStoreBox = Box<dyn ChallengeStore>;
pub type AuditSinkBox = Box<dyn AuditSink>;
pub type ClockBox = Box<dyn Clock>;

/// Read-only view of the product catalog.
///
/// Catalog maintenance (CRUD, stock adjustments) is an external concern;
/// seeding is an inherent method on the concrete backends, deliberately not
/// part of this port.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get(&self, product_id: &str) -> Result<Option<Product>>;
}

/// Outcome of the conditional `paid` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaidTransition {
    /// The flag flipped false→true in this call.
    Applied,
    /// The order was already paid; nothing changed.
    AlreadyPaid,
    /// No such order.
    Missing,
}

/// Durable store of orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<()>;
    async fn get(&self, order_id: &str) -> Result<Option<Order>>;
    /// All orders belonging to `owner_id`, newest first by creation time.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Order>>;
    /// Compare-and-set on the `paid` flag: flips it only if currently false.
    /// Implementations must condition the update on the stored value, not
    /// blindly overwrite, so two racing confirmations cannot both apply.
    async fn mark_paid(&self, order_id: &str) -> Result<PaidTransition>;
}

/// Ephemeral keyed cache of payment challenges.
///
/// "Issue" is a last-writer-wins overwrite per order id; a user re-requesting
/// a code invalidates the old one intentionally. Consumption must be an atomic
/// check-and-delete so a concurrent confirm cannot observe a code that should
/// already have been invalidated.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn put(&self, challenge: Challenge) -> Result<()>;
    async fn get(&self, order_id: &str) -> Result<Option<Challenge>>;
    /// Deletes the challenge stored under `expected.order_id` only if it still
    /// equals `expected`. Returns whether the delete happened.
    async fn remove_if_matches(&self, expected: &Challenge) -> Result<bool>;
}

/// A fire-and-forget notification record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub name: String,
    pub meta: Map<String, Value>,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(name: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            meta: Map::new(),
            at,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }
}

/// Best-effort event notification.
///
/// The core never depends on this for correctness: failures are logged and
/// swallowed by the caller, and must never roll back the primary operation.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<()>;
}

/// Injected time source so expiry logic is testable without a real clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
