//! Domain model for the CRM and instrument-store record books.
//!
//! # Responsibility
//! - Define the entity types owned by the in-memory stores.
//! - Provide the shared identity, timestamp and validation helpers.
//!
//! # Invariants
//! - Every entity is identified by a stable `EntityId` minted once at creation.
//! - Timestamps are stored as formatted strings and never re-rendered, so a
//!   persisted value survives save/load unchanged.
//! - Entities are never deleted; they live as long as their store does.

pub mod crm;
pub mod store;

use thiserror::Error;
use uuid::Uuid;

/// Stable identifier for every entity in both variants.
pub type EntityId = Uuid;

/// Wire format of entity creation timestamps (local time, seconds resolution).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Validation failures raised before a store mutation is applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required text field is empty. Whitespace counts as content.
    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),
    /// A sale was submitted without any line items.
    #[error("sale must contain at least one item")]
    EmptySale,
    /// A line item requested zero or fewer units.
    #[error("quantity for instrument {0} must be greater than zero")]
    NonPositiveQuantity(EntityId),
    /// A stock level is below zero.
    #[error("stock must not be negative, got {0}")]
    NegativeStock(i64),
    /// A price or amount is negative, NaN or infinite.
    #[error("`{field}` must be a finite, non-negative number, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },
    /// An identifier string could not be parsed.
    #[error("invalid identifier `{0}`")]
    InvalidId(String),
}

/// Mints a fresh identifier for a newly created entity.
pub(crate) fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// Returns the current local time rendered with [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a collaborator-supplied identifier string.
///
/// Surrounding whitespace is ignored so pasted table values still resolve.
pub fn parse_entity_id(raw: &str) -> Result<EntityId, ValidationError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ValidationError::InvalidId(raw.to_string()))
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

pub(crate) fn require_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidAmount { field, value });
    }
    Ok(())
}

/// Partial update of customer contact fields.
///
/// `None` and empty strings both mean "keep the current value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CustomerUpdate {
    /// Builds an update from all four form values.
    pub fn from_form(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            phone: Some(phone.into()),
            email: Some(email.into()),
        }
    }
}

/// Overwrites `slot` only when `value` carries non-empty text.
pub(crate) fn apply_field(slot: &mut String, value: Option<&String>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        slot.clone_from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        apply_field, now_timestamp, parse_entity_id, require_amount, require_text, ValidationError,
        TIMESTAMP_FORMAT,
    };
    use chrono::NaiveDateTime;

    #[test]
    fn now_timestamp_uses_seconds_resolution_format() {
        let stamp = now_timestamp();
        assert_eq!(stamp.len(), 19);
        NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).expect("timestamp should parse");
    }

    #[test]
    fn apply_field_skips_empty_values() {
        let mut slot = "Ayşe".to_string();
        apply_field(&mut slot, Some(&String::new()));
        assert_eq!(slot, "Ayşe");
        apply_field(&mut slot, None);
        assert_eq!(slot, "Ayşe");
        apply_field(&mut slot, Some(&"Fatma".to_string()));
        assert_eq!(slot, "Fatma");
    }

    #[test]
    fn parse_entity_id_trims_and_rejects_garbage() {
        let id = parse_entity_id(" 11111111-2222-4333-8444-555555555555 ")
            .expect("padded id should parse");
        assert_eq!(id.to_string(), "11111111-2222-4333-8444-555555555555");
        assert!(parse_entity_id("not-an-id").is_err());
    }

    #[test]
    fn require_text_rejects_only_empty_values() {
        assert_eq!(
            require_text("ad", ""),
            Err(ValidationError::EmptyField("ad"))
        );
        assert!(require_text("ad", "  ").is_ok());
    }

    #[test]
    fn require_amount_rejects_negative_and_nan() {
        assert!(require_amount("price", 0.0).is_ok());
        assert!(require_amount("price", -1.0).is_err());
        assert!(require_amount("price", f64::NAN).is_err());
    }
}
