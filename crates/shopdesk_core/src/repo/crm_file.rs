//! CRM repository contract and JSON array file implementation.
//!
//! The file is a JSON array of customer objects with sales and support
//! requests embedded inline (see `model::crm` for the field names). Loading
//! rejects only duplicate identifiers; field values are taken as written.

use super::{read_document, write_document, RepoError, RepoResult};
use crate::model::crm::Customer;
use crate::model::EntityId;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Repository interface for persisting CRM customers.
pub trait CrmRepository {
    /// Returns persisted customers in file order (empty when nothing is stored).
    fn load(&self) -> RepoResult<Vec<Customer>>;
    fn save(&self, customers: &[Customer]) -> RepoResult<()>;
}

/// JSON array file repository for CRM data.
#[derive(Debug, Clone)]
pub struct JsonFileCrmRepository {
    path: PathBuf,
}

impl JsonFileCrmRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CrmRepository for JsonFileCrmRepository {
    fn load(&self) -> RepoResult<Vec<Customer>> {
        let Some(customers) = read_document::<Vec<Customer>>(&self.path, "crm")? else {
            return Ok(Vec::new());
        };
        check_customers(&customers)?;
        Ok(customers)
    }

    fn save(&self, customers: &[Customer]) -> RepoResult<()> {
        write_document(&self.path, customers, "crm")
    }
}

fn check_customers(customers: &[Customer]) -> RepoResult<()> {
    let mut seen = HashSet::<EntityId>::new();
    for customer in customers {
        if !seen.insert(customer.id()) {
            return Err(duplicate("musteri_id", customer.id()));
        }
        for sale in customer.sales() {
            if !seen.insert(sale.id()) {
                return Err(duplicate("satis_id", sale.id()));
            }
        }
        for request in customer.support_requests() {
            if !seen.insert(request.id()) {
                return Err(duplicate("talep_id", request.id()));
            }
        }
    }
    Ok(())
}

fn duplicate(field: &str, id: EntityId) -> RepoError {
    RepoError::InvalidData(format!("duplicate `{field}` value {id}"))
}
