//! In-memory record stores for the two variants.
//!
//! # Responsibility
//! - Own all entity collections and mint identifiers through the model.
//! - Enforce store-level invariants (non-negative stock, resolvable ids).
//! - Return data to callers; never reference presentation objects.
//!
//! # Invariants
//! - Collections iterate in insertion order.
//! - A failed mutation leaves the store unchanged.

pub mod crm_book;
mod registry;
pub mod store_manager;

use crate::model::{EntityId, ValidationError};
use crate::repo::RepoError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Entity kinds named in lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Customer,
    Instrument,
    Sale,
    SupportRequest,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Customer => "customer",
            Self::Instrument => "instrument",
            Self::Sale => "sale",
            Self::SupportRequest => "support request",
        };
        f.write_str(label)
    }
}

/// Service error surfaced to the presentation layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: EntityId },
    #[error(
        "insufficient stock for instrument {instrument_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        instrument_id: EntityId,
        requested: i64,
        available: i64,
    },
    #[error(transparent)]
    Persistence(#[from] RepoError),
}

impl StoreError {
    pub(crate) fn not_found(kind: EntityKind, id: EntityId) -> Self {
        Self::NotFound { kind, id }
    }
}
