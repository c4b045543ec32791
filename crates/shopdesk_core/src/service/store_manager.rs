//! Instrument-store manager.
//!
//! # Responsibility
//! - Own instruments, customers, sales and support requests.
//! - Debit stock for sales and keep customer back-references in sync.
//! - Persist through a `StoreRepository`.
//!
//! # Invariants
//! - Instrument stock never goes negative through the manager's mutations.
//! - A sale is validated in full before any stock is debited; a rejected
//!   sale leaves every instrument untouched.
//! - Every id in a customer's `order_ids` / `support_ids` resolves in the
//!   manager's sale / support indexes.

use super::registry::Registry;
use super::{EntityKind, StoreError, StoreResult};
use crate::model::store::{Customer, Instrument, LineItem, Sale, SupportRequest};
use crate::model::{require_text, CustomerUpdate, EntityId, ValidationError};
use crate::repo::store_file::{JsonFileStoreRepository, StoreRepository, StoreSnapshot};
use crate::repo::RepoError;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::Path;

/// Sale line requested by the caller.
pub type SaleLine = LineItem;

/// In-memory instrument store.
#[derive(Debug, Clone, Default)]
pub struct StoreManager {
    instruments: Registry<Instrument>,
    customers: Registry<Customer>,
    sales: Registry<Sale>,
    supports: Registry<SupportRequest>,
}

impl StoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a manager from a repository snapshot.
    ///
    /// Duplicate ids are rejected as invalid data.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> StoreResult<Self> {
        let mut manager = Self::new();
        for instrument in snapshot.instruments {
            let id = instrument.id();
            if !manager.instruments.insert(id, instrument) {
                return Err(duplicate_id(EntityKind::Instrument, id));
            }
        }
        for customer in snapshot.customers {
            let id = customer.id();
            if !manager.customers.insert(id, customer) {
                return Err(duplicate_id(EntityKind::Customer, id));
            }
        }
        for sale in snapshot.sales {
            let id = sale.id();
            if !manager.sales.insert(id, sale) {
                return Err(duplicate_id(EntityKind::Sale, id));
            }
        }
        for request in snapshot.supports {
            let id = request.id();
            if !manager.supports.insert(id, request) {
                return Err(duplicate_id(EntityKind::SupportRequest, id));
            }
        }
        Ok(manager)
    }

    /// Copies the current state into a repository snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            instruments: self.instruments().to_vec(),
            customers: self.customers().to_vec(),
            sales: self.sales().to_vec(),
            supports: self.support_requests().to_vec(),
        }
    }

    /// Registers an instrument; the name is required and stock must not be
    /// negative.
    pub fn add_instrument(&mut self, name: &str, stock: i64) -> StoreResult<&Instrument> {
        let instrument = Instrument::new(name, stock);
        instrument.validate()?;

        let id = instrument.id();
        self.instruments.insert(id, instrument);
        debug!("event=instrument_add module=store status=ok instrument_id={id} stock={stock}");
        self.instruments
            .get(id)
            .ok_or(StoreError::not_found(EntityKind::Instrument, id))
    }

    pub fn instrument(&self, id: EntityId) -> Option<&Instrument> {
        self.instruments.get(id)
    }

    pub fn instruments(&self) -> &[Instrument] {
        self.instruments.as_slice()
    }

    pub fn add_customer(
        &mut self,
        first_name: &str,
        last_name: &str,
        phone: &str,
        email: &str,
    ) -> StoreResult<&Customer> {
        let customer = Customer::new(first_name, last_name, phone, email);
        customer.validate()?;

        let id = customer.id();
        self.customers.insert(id, customer);
        debug!("event=customer_add module=store status=ok customer_id={id}");
        self.customers
            .get(id)
            .ok_or(StoreError::not_found(EntityKind::Customer, id))
    }

    pub fn customer(&self, id: EntityId) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn customers(&self) -> &[Customer] {
        self.customers.as_slice()
    }

    /// Applies a partial update; empty or absent fields keep their value.
    pub fn update_customer(&mut self, id: EntityId, update: &CustomerUpdate) -> StoreResult<()> {
        let customer = self
            .customers
            .get_mut(id)
            .ok_or(StoreError::not_found(EntityKind::Customer, id))?;
        customer.apply_update(update);
        debug!("event=customer_update module=store status=ok customer_id={id}");
        Ok(())
    }

    /// Records a multi-item sale and debits stock for every line.
    ///
    /// Lines naming the same instrument are checked against its stock as a
    /// sum. Nothing is debited unless every line can be served.
    pub fn add_sale(&mut self, customer_id: EntityId, items: &[SaleLine]) -> StoreResult<&Sale> {
        if !self.customers.contains(customer_id) {
            return Err(StoreError::not_found(EntityKind::Customer, customer_id));
        }
        if items.is_empty() {
            return Err(ValidationError::EmptySale.into());
        }

        let mut requested: Vec<(EntityId, i64)> = Vec::new();
        let mut positions: HashMap<EntityId, usize> = HashMap::new();
        for item in items {
            item.validate()?;
            if !self.instruments.contains(item.instrument_id) {
                return Err(StoreError::not_found(
                    EntityKind::Instrument,
                    item.instrument_id,
                ));
            }
            match positions.get(&item.instrument_id) {
                Some(&pos) => {
                    requested[pos].1 = requested[pos].1.saturating_add(item.quantity);
                }
                None => {
                    positions.insert(item.instrument_id, requested.len());
                    requested.push((item.instrument_id, item.quantity));
                }
            }
        }

        for &(instrument_id, quantity) in &requested {
            let available = self
                .instruments
                .get(instrument_id)
                .map_or(0, Instrument::stock);
            if quantity > available {
                warn!(
                    "event=sale_add module=store status=error error_code=insufficient_stock instrument_id={instrument_id} requested={quantity} available={available}"
                );
                return Err(StoreError::InsufficientStock {
                    instrument_id,
                    requested: quantity,
                    available,
                });
            }
        }

        for &(instrument_id, quantity) in &requested {
            let instrument = self
                .instruments
                .get_mut(instrument_id)
                .ok_or(StoreError::not_found(EntityKind::Instrument, instrument_id))?;
            instrument
                .debit(quantity)
                .map_err(|available| StoreError::InsufficientStock {
                    instrument_id,
                    requested: quantity,
                    available,
                })?;
        }

        let sale = Sale::new(customer_id, items.to_vec());
        let sale_id = sale.id();
        self.sales.insert(sale_id, sale);
        if let Some(customer) = self.customers.get_mut(customer_id) {
            customer.link_order(sale_id);
        }

        let sale = self
            .sales
            .get(sale_id)
            .ok_or(StoreError::not_found(EntityKind::Sale, sale_id))?;
        debug!(
            "event=sale_add module=store status=ok customer_id={customer_id} sale_id={sale_id} items={} total={}",
            items.len(),
            sale.total()
        );
        Ok(sale)
    }

    pub fn sale(&self, id: EntityId) -> Option<&Sale> {
        self.sales.get(id)
    }

    pub fn sales(&self) -> &[Sale] {
        self.sales.as_slice()
    }

    /// Sales recorded for `customer_id`, oldest first.
    pub fn customer_orders(&self, customer_id: EntityId) -> StoreResult<Vec<&Sale>> {
        let customer = self
            .customer(customer_id)
            .ok_or(StoreError::not_found(EntityKind::Customer, customer_id))?;
        Ok(customer
            .order_ids()
            .iter()
            .filter_map(|id| self.sales.get(*id))
            .collect())
    }

    pub fn add_support_request(
        &mut self,
        customer_id: EntityId,
        subject: &str,
        message: &str,
    ) -> StoreResult<&SupportRequest> {
        require_text("subject", subject)?;
        require_text("message", message)?;
        let customer = self
            .customers
            .get_mut(customer_id)
            .ok_or(StoreError::not_found(EntityKind::Customer, customer_id))?;

        let request = SupportRequest::new(customer_id, subject, message);
        let request_id = request.id();
        customer.link_support(request_id);
        self.supports.insert(request_id, request);
        debug!(
            "event=support_add module=store status=ok customer_id={customer_id} request_id={request_id}"
        );
        self.supports
            .get(request_id)
            .ok_or(StoreError::not_found(EntityKind::SupportRequest, request_id))
    }

    pub fn support_request(&self, id: EntityId) -> Option<&SupportRequest> {
        self.supports.get(id)
    }

    pub fn support_requests(&self) -> &[SupportRequest] {
        self.supports.as_slice()
    }

    /// Sum of every recorded sale total.
    pub fn total_sales_amount(&self) -> f64 {
        self.sales().iter().map(Sale::total).sum()
    }

    pub fn customer_sales_total(&self, customer_id: EntityId) -> Option<f64> {
        self.customer(customer_id).map(|customer| {
            customer
                .order_ids()
                .iter()
                .filter_map(|id| self.sales.get(*id))
                .map(Sale::total)
                .sum()
        })
    }

    /// Customer with the highest summed sales; the earliest one wins ties.
    pub fn top_customer_by_sales(&self) -> Option<&Customer> {
        let mut best: Option<(&Customer, f64)> = None;
        for customer in self.customers() {
            let total = self.customer_sales_total(customer.id()).unwrap_or(0.0);
            match best {
                Some((_, best_total)) if total <= best_total => {}
                _ => best = Some((customer, total)),
            }
        }
        best.map(|(customer, _)| customer)
    }

    /// Loads a manager from `repo`; nothing stored yields an empty manager.
    pub fn load(repo: &impl StoreRepository) -> StoreResult<Self> {
        let manager = Self::from_snapshot(repo.load()?)?;
        info!(
            "event=book_load module=store status=ok instruments={} customers={} sales={} supports={}",
            manager.instruments.len(),
            manager.customers.len(),
            manager.sales.len(),
            manager.supports.len()
        );
        Ok(manager)
    }

    /// Persists the full state through `repo`.
    pub fn save(&self, repo: &impl StoreRepository) -> StoreResult<()> {
        repo.save(&self.snapshot()).map_err(|err| {
            error!("event=book_save module=store status=error error={err}");
            StoreError::from(err)
        })
    }

    pub fn load_from(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::load(&JsonFileStoreRepository::new(path.as_ref()))
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        self.save(&JsonFileStoreRepository::new(path.as_ref()))
    }
}

fn duplicate_id(kind: EntityKind, id: EntityId) -> StoreError {
    RepoError::InvalidData(format!("duplicate {kind} id {id}")).into()
}

#[cfg(test)]
mod tests {
    use super::{SaleLine, StoreManager};
    use crate::model::ValidationError;
    use crate::service::{EntityKind, StoreError};

    #[test]
    fn add_instrument_rejects_negative_stock() {
        let mut manager = StoreManager::new();
        assert!(matches!(
            manager.add_instrument("Ud", -2),
            Err(StoreError::Validation(ValidationError::NegativeStock(-2)))
        ));
        assert!(manager.instruments().is_empty());
    }

    #[test]
    fn non_positive_quantity_is_rejected_before_debit() {
        let mut manager = StoreManager::new();
        let guitar = manager.add_instrument("Gitar", 3).unwrap().id();
        let customer = manager.add_customer("Can", "Er", "1", "c@e").unwrap().id();

        for quantity in [0, -1] {
            let err = manager
                .add_sale(customer, &[SaleLine::new(guitar, quantity, 100.0)])
                .unwrap_err();
            assert!(matches!(
                err,
                StoreError::Validation(ValidationError::NonPositiveQuantity(id)) if id == guitar
            ));
        }
        assert_eq!(manager.instrument(guitar).unwrap().stock(), 3);
        assert!(manager.sales().is_empty());
    }

    #[test]
    fn sale_for_unknown_customer_is_not_found() {
        let mut manager = StoreManager::new();
        let guitar = manager.add_instrument("Gitar", 3).unwrap().id();
        let stranger = uuid::Uuid::new_v4();

        let err = manager
            .add_sale(stranger, &[SaleLine::new(guitar, 1, 100.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::Customer, id } if id == stranger
        ));
        assert_eq!(manager.instrument(guitar).unwrap().stock(), 3);
    }

    #[test]
    fn repeated_lines_are_checked_against_stock_together() {
        let mut manager = StoreManager::new();
        let guitar = manager.add_instrument("Gitar", 3).unwrap().id();
        let customer = manager.add_customer("Can", "Er", "1", "c@e").unwrap().id();

        let err = manager
            .add_sale(
                customer,
                &[SaleLine::new(guitar, 2, 100.0), SaleLine::new(guitar, 2, 100.0)],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock { requested: 4, available: 3, .. }
        ));
        assert_eq!(manager.instrument(guitar).unwrap().stock(), 3);
    }

    #[test]
    fn empty_sale_is_rejected() {
        let mut manager = StoreManager::new();
        let customer = manager.add_customer("Can", "Er", "1", "c@e").unwrap().id();
        assert!(matches!(
            manager.add_sale(customer, &[]),
            Err(StoreError::Validation(_))
        ));
    }
}
