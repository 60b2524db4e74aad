use crate::domain::challenge::Challenge;
use crate::domain::order::Order;
use crate::domain::ports::{CatalogStore, ChallengeStore, OrderStore, PaidTransition};
use crate::domain::product::Product;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory product catalog.
///
/// Uses `Arc<RwLock<HashMap>>` to allow shared concurrent access. The core
/// only reads through the `CatalogStore` port; `insert` exists for seeding
/// from the catalog file or from tests.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, product: Product) {
        let mut products = self.products.write().await;
        products.insert(product.id.clone(), product);
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get(&self, product_id: &str) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(product_id).cloned())
    }
}

/// A thread-safe in-memory order store.
///
/// The write lock covers the whole read-modify-write of `mark_paid`, which is
/// what makes the paid transition a true compare-and-set rather than a blind
/// overwrite.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order_id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut owned: Vec<Order> = orders
            .values()
            .filter(|order| order.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn mark_paid(&self, order_id: &str) -> Result<PaidTransition> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(order_id) {
            None => Ok(PaidTransition::Missing),
            Some(order) if order.paid => Ok(PaidTransition::AlreadyPaid),
            Some(order) => {
                order.paid = true;
                Ok(PaidTransition::Applied)
            }
        }
    }
}

/// A thread-safe in-memory challenge cache.
///
/// `put` is a last-writer-wins overwrite per order id. `remove_if_matches`
/// compares under the write lock before deleting, so a challenge can only be
/// consumed while it is still the exact one the caller validated.
#[derive(Default, Clone)]
pub struct InMemoryChallengeStore {
    challenges: Arc<RwLock<HashMap<String, Challenge>>>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn put(&self, challenge: Challenge) -> Result<()> {
        let mut challenges = self.challenges.write().await;
        challenges.insert(challenge.order_id.clone(), challenge);
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<Challenge>> {
        let challenges = self.challenges.read().await;
        Ok(challenges.get(order_id).cloned())
    }

    async fn remove_if_matches(&self, expected: &Challenge) -> Result<bool> {
        let mut challenges = self.challenges.write().await;
        if challenges.get(&expected.order_id) == Some(expected) {
            challenges.remove(&expected.order_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
