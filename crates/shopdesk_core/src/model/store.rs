//! Instrument-store entities.
//!
//! # Invariants
//! - `Instrument::stock` never goes below zero through this API; `validate`
//!   rejects negative levels and `debit` refuses overdraws. Counts are signed
//!   so persisted files load whatever they hold.
//! - `Sale::total` is derived from its line items at construction and has no
//!   setter.
//! - Customers only hold identifiers of their sales and support requests; the
//!   store indexes the records themselves.

use super::{
    apply_field, new_entity_id, now_timestamp, require_amount, require_text, CustomerUpdate,
    EntityId, ValidationError,
};
use serde::{Deserialize, Serialize};

/// Initial status of a store support request.
pub const SUPPORT_STATUS_OPEN: &str = "Open";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    #[serde(rename = "instrument_id")]
    id: EntityId,
    pub name: String,
    stock: i64,
}

impl Instrument {
    pub fn new(name: impl Into<String>, stock: i64) -> Self {
        Self::with_id(new_entity_id(), name, stock)
    }

    pub fn with_id(id: EntityId, name: impl Into<String>, stock: i64) -> Self {
        Self {
            id,
            name: name.into(),
            stock,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    /// Removes `quantity` units from stock.
    ///
    /// Returns the unchanged stock level as `Err` when it cannot cover the
    /// request.
    pub fn debit(&mut self, quantity: i64) -> Result<(), i64> {
        if quantity > self.stock {
            return Err(self.stock);
        }
        self.stock -= quantity;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        if self.stock < 0 {
            return Err(ValidationError::NegativeStock(self.stock));
        }
        Ok(())
    }
}

/// One (instrument, quantity, unit price) entry of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub instrument_id: EntityId,
    #[serde(rename = "qty")]
    pub quantity: i64,
    #[serde(rename = "price")]
    pub unit_price: f64,
}

impl LineItem {
    pub fn new(instrument_id: EntityId, quantity: i64, unit_price: f64) -> Self {
        Self {
            instrument_id,
            quantity,
            unit_price,
        }
    }

    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity(self.instrument_id));
        }
        require_amount("price", self.unit_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    id: EntityId,
    customer_id: EntityId,
    created_at: String,
    items: Vec<LineItem>,
    total: f64,
}

impl Sale {
    pub fn new(customer_id: EntityId, items: Vec<LineItem>) -> Self {
        Self::restore(new_entity_id(), customer_id, now_timestamp(), items)
    }

    /// Rebuilds a persisted sale; the total is recomputed from `items`.
    pub fn restore(
        id: EntityId,
        customer_id: EntityId,
        created_at: impl Into<String>,
        items: Vec<LineItem>,
    ) -> Self {
        let total = items.iter().map(LineItem::amount).sum();
        Self {
            id,
            customer_id,
            created_at: created_at.into(),
            items,
            total,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn customer_id(&self) -> EntityId {
        self.customer_id
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportRequest {
    id: EntityId,
    customer_id: EntityId,
    pub subject: String,
    pub message: String,
    created_at: String,
    pub status: String,
}

impl SupportRequest {
    pub fn new(
        customer_id: EntityId,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::restore(
            new_entity_id(),
            customer_id,
            subject,
            message,
            now_timestamp(),
            SUPPORT_STATUS_OPEN,
        )
    }

    pub fn restore(
        id: EntityId,
        customer_id: EntityId,
        subject: impl Into<String>,
        message: impl Into<String>,
        created_at: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id,
            customer_id,
            subject: subject.into(),
            message: message.into(),
            created_at: created_at.into(),
            status: status.into(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn customer_id(&self) -> EntityId {
        self.customer_id
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// Store customer with non-owning references to orders and support requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    order_ids: Vec<EntityId>,
    support_ids: Vec<EntityId>,
}

impl Customer {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self::with_id(new_entity_id(), first_name, last_name, phone, email)
    }

    pub fn with_id(
        id: EntityId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
            email: email.into(),
            order_ids: Vec::new(),
            support_ids: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn order_ids(&self) -> &[EntityId] {
        &self.order_ids
    }

    pub fn support_ids(&self) -> &[EntityId] {
        &self.support_ids
    }

    pub(crate) fn link_order(&mut self, sale_id: EntityId) {
        self.order_ids.push(sale_id);
    }

    pub(crate) fn link_support(&mut self, request_id: EntityId) {
        self.support_ids.push(request_id);
    }

    pub fn apply_update(&mut self, update: &CustomerUpdate) {
        apply_field(&mut self.first_name, update.first_name.as_ref());
        apply_field(&mut self.last_name, update.last_name.as_ref());
        apply_field(&mut self.phone, update.phone.as_ref());
        apply_field(&mut self.email, update.email.as_ref());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_text("phone", &self.phone)?;
        require_text("email", &self.email)
    }
}
