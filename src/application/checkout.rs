use crate::domain::challenge::Challenge;
use crate::domain::order::{Cents, LineItem, Order};
use crate::domain::ports::{
    AuditEvent, AuditSinkBox, CatalogStoreBox, ChallengeStoreBox, ClockBox, OrderStoreBox,
    PaidTransition,
};
use crate::error::{CheckoutError, Result};

/// A freshly issued challenge code in both display and raw form.
pub struct IssuedChallenge {
    /// Masked form for client display, e.g. `****42`.
    pub masked: String,
    /// The full code. Returned to the caller only as a development
    /// convenience; a real deployment delivers it out of band (SMS/email,
    /// out of scope here) and must never expose it on this surface.
    pub raw_code: String,
}

/// The main entry point for the order/payment workflow.
///
/// `CheckoutEngine` owns the storage backends and the clock, all injected at
/// construction, and drives the order lifecycle: draft creation, challenge
/// issuance, and the single `paid: false → true` transition per order.
pub struct CheckoutEngine {
    catalog: CatalogStoreBox,
    orders: OrderStoreBox,
    challenges: ChallengeStoreBox,
    audit: AuditSinkBox,
    clock: ClockBox,
}

impl CheckoutEngine {
    /// Creates a new `CheckoutEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Read-only product catalog.
    /// * `orders` - Durable order store.
    /// * `challenges` - Ephemeral challenge cache.
    /// * `audit` - Best-effort notification sink.
    /// * `clock` - Time source for timestamps and expiry checks.
    pub fn new(
        catalog: CatalogStoreBox,
        orders: OrderStoreBox,
        challenges: ChallengeStoreBox,
        audit: AuditSinkBox,
        clock: ClockBox,
    ) -> Self {
        Self {
            catalog,
            orders,
            challenges,
            audit,
            clock,
        }
    }

    /// Validates a cart against the catalog and persists it as a draft order.
    ///
    /// Every item is checked before anything is written, so a failure leaves
    /// no trace. The amount is a snapshot of catalog prices at this moment;
    /// later catalog changes never re-price an order. Stock is validated but
    /// not reserved: two concurrent orders may both observe sufficient stock
    /// and both succeed.
    pub async fn create_order(&self, owner_id: &str, items: Vec<LineItem>) -> Result<Order> {
        if items.is_empty() {
            return Err(CheckoutError::ValidationError(
                "order must contain at least one item".to_string(),
            ));
        }

        let mut amount = Cents::ZERO;
        for item in &items {
            let product = self.catalog.get(&item.product_id).await?.ok_or_else(|| {
                CheckoutError::ValidationError(format!("product not found: {}", item.product_id))
            })?;
            if item.quantity.value() > product.stock {
                return Err(CheckoutError::InsufficientStockError {
                    product_id: product.id,
                });
            }
            amount = amount.checked_add(product.price_cents.checked_mul(item.quantity)?)?;
        }

        let order = Order::new(owner_id, items, amount, self.clock.now());
        self.orders.insert(order.clone()).await?;

        self.notify(
            AuditEvent::new("cart_saved", self.clock.now())
                .with("owner_id", owner_id)
                .with("order_id", order.id.as_str())
                .with("amount_cents", order.amount_cents.value()),
        )
        .await;

        Ok(order)
    }

    /// All orders of `owner_id`, newest first. Read-only, no events.
    pub async fn list_orders(&self, owner_id: &str) -> Result<Vec<Order>> {
        self.orders.list_by_owner(owner_id).await
    }

    /// Issues a fresh passcode challenge for an unpaid order.
    ///
    /// Any prior unconsumed challenge for the order is overwritten, so at most
    /// one code is ever live per order.
    pub async fn issue_challenge(&self, order_id: &str, owner_id: &str) -> Result<IssuedChallenge> {
        let order = self.owned_order(order_id, owner_id).await?;
        if order.paid {
            return Err(CheckoutError::AlreadyPaidError);
        }

        let challenge = Challenge::issue(order_id, self.clock.now());
        let issued = IssuedChallenge {
            masked: challenge.masked(),
            raw_code: challenge.code.clone(),
        };
        self.challenges.put(challenge).await?;

        self.notify(
            AuditEvent::new("payment_initiated", self.clock.now())
                .with("owner_id", owner_id)
                .with("order_id", order_id),
        )
        .await;

        Ok(issued)
    }

    /// Validates a submitted passcode and marks the order paid exactly once.
    ///
    /// The paid transition is a compare-and-set in the order store, so of two
    /// confirmations racing on the same still-valid code exactly one succeeds
    /// and the loser observes `AlreadyPaidError`. An expired challenge is
    /// evicted on discovery; a mismatched code leaves the challenge in place
    /// for retries until expiry.
    pub async fn confirm_payment(
        &self,
        order_id: &str,
        owner_id: &str,
        submitted_code: &str,
    ) -> Result<()> {
        let order = self.owned_order(order_id, owner_id).await?;
        if order.paid {
            return Err(CheckoutError::AlreadyPaidError);
        }

        let challenge = self
            .challenges
            .get(order_id)
            .await?
            .ok_or(CheckoutError::NoChallengeError)?;

        if challenge.is_expired(self.clock.now()) {
            // Lazy eviction. The conditional delete keeps a concurrent
            // confirm from consuming a code that was already invalidated.
            self.challenges.remove_if_matches(&challenge).await?;
            return Err(CheckoutError::ExpiredChallengeError);
        }

        if !challenge.matches(submitted_code) {
            return Err(CheckoutError::CodeMismatchError);
        }

        match self.orders.mark_paid(order_id).await? {
            PaidTransition::Applied => {}
            PaidTransition::AlreadyPaid => return Err(CheckoutError::AlreadyPaidError),
            PaidTransition::Missing => return Err(CheckoutError::NotFoundError),
        }

        self.challenges.remove_if_matches(&challenge).await?;

        self.notify(
            AuditEvent::new("payment_completed", self.clock.now())
                .with("owner_id", owner_id)
                .with("order_id", order_id),
        )
        .await;

        Ok(())
    }

    /// Looks up an order scoped to its owner. A foreign order is reported
    /// exactly like a missing one.
    async fn owned_order(&self, order_id: &str, owner_id: &str) -> Result<Order> {
        match self.orders.get(order_id).await? {
            Some(order) if order.owner_id == owner_id => Ok(order),
            _ => Err(CheckoutError::NotFoundError),
        }
    }

    /// Notification is best-effort: failures are logged and swallowed, never
    /// surfaced to the caller or allowed to roll back the primary operation.
    async fn notify(&self, event: AuditEvent) {
        let name = event.name.clone();
        if let Err(e) = self.audit.record(event).await {
            tracing::warn!(event = %name, error = %e, "audit notification failed");
        }
    }
}
