//! CRM record book.
//!
//! # Responsibility
//! - Register customers and record their sales and support requests.
//! - Provide the report queries (sales total, top customer).
//! - Persist through a `CrmRepository`.
//!
//! # Invariants
//! - Customer ids are unique within the book and never change.
//! - `top_customer_by_sales` breaks ties by insertion order.

use super::registry::Registry;
use super::{EntityKind, StoreError, StoreResult};
use crate::model::crm::{Customer, Sale, SupportRequest};
use crate::model::{require_amount, require_text, CustomerUpdate, EntityId};
use crate::repo::crm_file::{CrmRepository, JsonFileCrmRepository};
use crate::repo::RepoError;
use log::{debug, error, info};
use std::path::Path;

/// Table row projected for customer list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRow {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub sale_count: usize,
    pub support_count: usize,
}

/// In-memory CRM store.
#[derive(Debug, Clone, Default)]
pub struct CrmBook {
    customers: Registry<Customer>,
}

impl CrmBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from persisted customers.
    ///
    /// Fails with `InvalidData` when two customers share an id.
    pub fn from_customers(customers: Vec<Customer>) -> StoreResult<Self> {
        let mut book = Self::new();
        for customer in customers {
            let id = customer.id();
            if !book.customers.insert(id, customer) {
                return Err(RepoError::InvalidData(format!("duplicate customer id {id}")).into());
            }
        }
        Ok(book)
    }

    /// Registers a customer; all four contact fields are required.
    pub fn add_customer(
        &mut self,
        first_name: &str,
        last_name: &str,
        phone: &str,
        email: &str,
    ) -> StoreResult<EntityId> {
        let customer = Customer::new(first_name, last_name, phone, email);
        customer.validate()?;

        let id = customer.id();
        self.customers.insert(id, customer);
        debug!("event=customer_add module=crm status=ok customer_id={id}");
        Ok(id)
    }

    pub fn customer(&self, id: EntityId) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn customers(&self) -> &[Customer] {
        self.customers.as_slice()
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Applies a partial update; empty or absent fields keep their value.
    pub fn update_customer(&mut self, id: EntityId, update: &CustomerUpdate) -> StoreResult<()> {
        let customer = self
            .customers
            .get_mut(id)
            .ok_or(StoreError::not_found(EntityKind::Customer, id))?;
        customer.apply_update(update);
        debug!("event=customer_update module=crm status=ok customer_id={id}");
        Ok(())
    }

    /// Records a sale for an existing customer.
    pub fn add_sale(
        &mut self,
        customer_id: EntityId,
        product: &str,
        quantity: u32,
        total_amount: f64,
    ) -> StoreResult<&Sale> {
        require_text("urun", product)?;
        require_amount("toplam_tutar", total_amount)?;
        let customer = self
            .customers
            .get_mut(customer_id)
            .ok_or(StoreError::not_found(EntityKind::Customer, customer_id))?;

        let sale = customer.push_sale(Sale::new(product, i64::from(quantity), total_amount));
        debug!(
            "event=sale_add module=crm status=ok customer_id={customer_id} sale_id={}",
            sale.id()
        );
        Ok(sale)
    }

    /// Opens a support request for an existing customer.
    pub fn add_support_request(
        &mut self,
        customer_id: EntityId,
        subject: &str,
        description: &str,
    ) -> StoreResult<&SupportRequest> {
        let request = SupportRequest::new(subject, description);
        request.validate()?;
        let customer = self
            .customers
            .get_mut(customer_id)
            .ok_or(StoreError::not_found(EntityKind::Customer, customer_id))?;

        let request = customer.push_support_request(request);
        debug!(
            "event=support_add module=crm status=ok customer_id={customer_id} request_id={}",
            request.id()
        );
        Ok(request)
    }

    /// Sum of every sale total across all customers.
    pub fn total_sales_amount(&self) -> f64 {
        self.customers().iter().map(Customer::sales_total).sum()
    }

    pub fn customer_sales_total(&self, id: EntityId) -> Option<f64> {
        self.customer(id).map(Customer::sales_total)
    }

    /// Customer with the highest summed sales; the earliest one wins ties.
    pub fn top_customer_by_sales(&self) -> Option<&Customer> {
        let mut best: Option<(&Customer, f64)> = None;
        for customer in self.customers() {
            let total = customer.sales_total();
            match best {
                Some((_, best_total)) if total <= best_total => {}
                _ => best = Some((customer, total)),
            }
        }
        best.map(|(customer, _)| customer)
    }

    /// Snapshot rows for the customer table.
    pub fn customer_rows(&self) -> Vec<CustomerRow> {
        self.customers()
            .iter()
            .map(|customer| CustomerRow {
                id: customer.id(),
                first_name: customer.first_name.clone(),
                last_name: customer.last_name.clone(),
                phone: customer.phone.clone(),
                email: customer.email.clone(),
                sale_count: customer.sales().len(),
                support_count: customer.support_requests().len(),
            })
            .collect()
    }

    /// Seeds a demo customer with one sale and one open support request.
    ///
    /// Only an empty book is seeded; otherwise nothing changes and `None` is
    /// returned.
    pub fn seed_demo(&mut self) -> StoreResult<Option<EntityId>> {
        if !self.is_empty() {
            return Ok(None);
        }
        let id = self.add_customer("Ayşe", "Çelik", "05005556677", "ayse@example.com")?;
        self.add_sale(id, "Telefon", 1, 12000.0)?;
        self.add_support_request(id, "Teslimat", "Kargo ne zaman gelir?")?;
        info!("event=demo_seed module=crm status=ok customer_id={id}");
        Ok(Some(id))
    }

    /// Loads a book from `repo`; nothing stored yields an empty book.
    pub fn load(repo: &impl CrmRepository) -> StoreResult<Self> {
        let book = Self::from_customers(repo.load()?)?;
        info!(
            "event=book_load module=crm status=ok customers={}",
            book.len()
        );
        Ok(book)
    }

    /// Persists every customer through `repo`.
    ///
    /// Failures are logged and returned; the in-memory book is untouched.
    pub fn save(&self, repo: &impl CrmRepository) -> StoreResult<()> {
        repo.save(self.customers()).map_err(|err| {
            error!("event=book_save module=crm status=error error={err}");
            StoreError::from(err)
        })
    }

    pub fn load_from(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::load(&JsonFileCrmRepository::new(path.as_ref()))
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        self.save(&JsonFileCrmRepository::new(path.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::CrmBook;
    use crate::model::ValidationError;
    use crate::service::StoreError;

    #[test]
    fn add_customer_requires_every_field() {
        let mut book = CrmBook::new();
        let err = book
            .add_customer("Ayşe", "", "0500", "ayse@example.com")
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptyField("soyad"))
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn top_customer_prefers_first_on_tie() {
        let mut book = CrmBook::new();
        let first = book.add_customer("A", "A", "1", "a@x").unwrap();
        let second = book.add_customer("B", "B", "2", "b@x").unwrap();
        book.add_sale(first, "Kalem", 1, 50.0).unwrap();
        book.add_sale(second, "Defter", 1, 50.0).unwrap();

        assert_eq!(book.top_customer_by_sales().unwrap().id(), first);
    }

    #[test]
    fn seed_demo_fills_only_an_empty_book() {
        let mut book = CrmBook::new();
        let id = book.seed_demo().unwrap().expect("empty book should be seeded");

        let customer = book.customer(id).unwrap();
        assert_eq!(customer.first_name, "Ayşe");
        assert_eq!(customer.sales()[0].product, "Telefon");
        assert_eq!(customer.sales()[0].quantity, 1);
        assert_eq!(customer.support_requests()[0].subject, "Teslimat");
        assert_eq!(book.total_sales_amount(), 12000.0);

        assert_eq!(book.seed_demo().unwrap(), None);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn add_sale_accepts_whitespace_product_but_not_empty() {
        let mut book = CrmBook::new();
        let id = book.add_customer("A", "A", "1", "a@x").unwrap();
        assert!(matches!(
            book.add_sale(id, "", 1, 10.0),
            Err(StoreError::Validation(ValidationError::EmptyField("urun")))
        ));
        book.add_sale(id, " ", 1, 10.0).unwrap();
        assert_eq!(book.customer(id).unwrap().sales().len(), 1);
    }

    #[test]
    fn top_customer_with_no_sales_is_first_customer() {
        let mut book = CrmBook::new();
        assert!(book.top_customer_by_sales().is_none());
        let first = book.add_customer("A", "A", "1", "a@x").unwrap();
        book.add_customer("B", "B", "2", "b@x").unwrap();
        assert_eq!(book.top_customer_by_sales().unwrap().id(), first);
    }
}
