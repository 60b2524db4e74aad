use crate::error::{CheckoutError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// A monetary value in whole cents.
///
/// This is a wrapper around `u64` to enforce domain-specific rules: amounts are
/// non-negative by construction and all arithmetic is checked, so a malformed
/// catalog entry can never wrap an order total around zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(pub u64);

impl Cents {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Multiplies a unit price by a quantity, failing on overflow rather than
    /// silently wrapping.
    pub fn checked_mul(self, quantity: Quantity) -> Result<Self> {
        self.0
            .checked_mul(u64::from(quantity.value()))
            .map(Self)
            .ok_or_else(|| CheckoutError::ValidationError("amount overflow".to_string()))
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| CheckoutError::ValidationError("amount overflow".to_string()))
    }
}

impl Add for Cents {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// A positive item count for a line item.
///
/// Ensures that quantities are always at least one; a zero-quantity line is a
/// caller error, not an empty purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(CheckoutError::ValidationError(
                "quantity must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = CheckoutError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

/// One product line of a cart, as requested by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: Quantity,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Result<Self> {
        Ok(Self {
            product_id: product_id.into(),
            quantity: Quantity::new(quantity)?,
        })
    }
}

/// A priced cart awaiting (or past) payment confirmation.
///
/// Orders are created exactly once by the cart assembler and the `paid` flag
/// makes exactly one false→true transition; there is no path back to draft.
/// `amount_cents` is a snapshot of catalog prices at creation time and is
/// never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier, generated at creation.
    pub id: String,
    /// Identity of the creating user; all reads are scoped to it.
    pub owner_id: String,
    /// Line items in the order they were submitted, preserved for display.
    pub items: Vec<LineItem>,
    /// Total price snapshot taken at creation time.
    pub amount_cents: Cents,
    /// Whether payment has been confirmed.
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        owner_id: impl Into<String>,
        items: Vec<LineItem>,
        amount_cents: Cents,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            items,
            amount_cents,
            paid: false,
            created_at,
        }
    }
}
