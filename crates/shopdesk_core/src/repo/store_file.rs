//! Instrument-store repository contract and JSON object file implementation.
//!
//! # Wire shape
//! One object with four top-level arrays: `instruments`, `customers`, `sales`
//! and `supports`. Customer objects repeat their sales and support requests
//! inline under `orders` / `supports`; on load only the identifiers of those
//! embedded copies are read, the top-level arrays are authoritative.
//!
//! # Invariants
//! - Sales and support requests are fully reconstructed, not skipped.
//! - Every cross-reference (sale -> customer, sale item -> instrument,
//!   customer -> order/support) must resolve, or the load fails.
//! - A persisted sale total must match the total derived from its items.
//! - Field values are taken as written. Input rules (required text, positive
//!   quantities) belong to the mutation paths, so files written by older
//!   front ends still load.

use super::{read_document, write_document, RepoError, RepoResult};
use crate::model::store::{Customer, Instrument, LineItem, Sale, SupportRequest};
use crate::model::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

const TOTAL_TOLERANCE: f64 = 1e-6;

/// Full store state in insertion order, as exchanged with repositories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub instruments: Vec<Instrument>,
    pub customers: Vec<Customer>,
    pub sales: Vec<Sale>,
    pub supports: Vec<SupportRequest>,
}

/// Repository interface for persisting the instrument store.
pub trait StoreRepository {
    fn load(&self) -> RepoResult<StoreSnapshot>;
    fn save(&self, snapshot: &StoreSnapshot) -> RepoResult<()>;
}

/// JSON object file repository for store data.
#[derive(Debug, Clone)]
pub struct JsonFileStoreRepository {
    path: PathBuf,
}

impl JsonFileStoreRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreRepository for JsonFileStoreRepository {
    fn load(&self) -> RepoResult<StoreSnapshot> {
        match read_document::<StoreDocumentIn>(&self.path, "store")? {
            Some(document) => decode_document(document),
            None => Ok(StoreSnapshot::default()),
        }
    }

    fn save(&self, snapshot: &StoreSnapshot) -> RepoResult<()> {
        write_document(&self.path, &encode_document(snapshot)?, "store")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SaleRecord {
    sale_id: EntityId,
    customer_id: EntityId,
    date: String,
    items: Vec<LineItem>,
    total: f64,
}

impl From<&Sale> for SaleRecord {
    fn from(sale: &Sale) -> Self {
        Self {
            sale_id: sale.id(),
            customer_id: sale.customer_id(),
            date: sale.created_at().to_string(),
            items: sale.items().to_vec(),
            total: sale.total(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SupportRecord {
    request_id: EntityId,
    customer_id: EntityId,
    subject: String,
    message: String,
    date: String,
    status: String,
}

impl From<&SupportRequest> for SupportRecord {
    fn from(request: &SupportRequest) -> Self {
        Self {
            request_id: request.id(),
            customer_id: request.customer_id(),
            subject: request.subject.clone(),
            message: request.message.clone(),
            date: request.created_at().to_string(),
            status: request.status.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CustomerRecordOut<'a> {
    customer_id: EntityId,
    first_name: &'a str,
    last_name: &'a str,
    phone: &'a str,
    email: &'a str,
    orders: Vec<SaleRecord>,
    supports: Vec<SupportRecord>,
}

#[derive(Debug, Serialize)]
struct StoreDocumentOut<'a> {
    instruments: &'a [Instrument],
    customers: Vec<CustomerRecordOut<'a>>,
    sales: Vec<SaleRecord>,
    supports: Vec<SupportRecord>,
}

#[derive(Debug, Deserialize)]
struct OrderRef {
    sale_id: EntityId,
}

#[derive(Debug, Deserialize)]
struct SupportRef {
    request_id: EntityId,
}

#[derive(Debug, Deserialize)]
struct CustomerRecordIn {
    customer_id: EntityId,
    first_name: String,
    last_name: String,
    phone: String,
    email: String,
    #[serde(default)]
    orders: Vec<OrderRef>,
    #[serde(default)]
    supports: Vec<SupportRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoreDocumentIn {
    instruments: Vec<Instrument>,
    customers: Vec<CustomerRecordIn>,
    sales: Vec<SaleRecord>,
    supports: Vec<SupportRecord>,
}

fn encode_document(snapshot: &StoreSnapshot) -> RepoResult<StoreDocumentOut<'_>> {
    let sales_by_id: HashMap<EntityId, &Sale> =
        snapshot.sales.iter().map(|sale| (sale.id(), sale)).collect();
    let supports_by_id: HashMap<EntityId, &SupportRequest> = snapshot
        .supports
        .iter()
        .map(|request| (request.id(), request))
        .collect();

    let mut customers = Vec::with_capacity(snapshot.customers.len());
    for customer in &snapshot.customers {
        let orders = customer
            .order_ids()
            .iter()
            .map(|id| {
                sales_by_id
                    .get(id)
                    .map(|sale| SaleRecord::from(*sale))
                    .ok_or_else(|| dangling("customer order", *id))
            })
            .collect::<RepoResult<Vec<_>>>()?;
        let supports = customer
            .support_ids()
            .iter()
            .map(|id| {
                supports_by_id
                    .get(id)
                    .map(|request| SupportRecord::from(*request))
                    .ok_or_else(|| dangling("customer support request", *id))
            })
            .collect::<RepoResult<Vec<_>>>()?;

        customers.push(CustomerRecordOut {
            customer_id: customer.id(),
            first_name: &customer.first_name,
            last_name: &customer.last_name,
            phone: &customer.phone,
            email: &customer.email,
            orders,
            supports,
        });
    }

    Ok(StoreDocumentOut {
        instruments: &snapshot.instruments,
        customers,
        sales: snapshot.sales.iter().map(SaleRecord::from).collect(),
        supports: snapshot.supports.iter().map(SupportRecord::from).collect(),
    })
}

fn decode_document(document: StoreDocumentIn) -> RepoResult<StoreSnapshot> {
    let mut instrument_ids = HashSet::new();
    for instrument in &document.instruments {
        if !instrument_ids.insert(instrument.id()) {
            return Err(duplicate("instrument_id", instrument.id()));
        }
    }

    let mut customer_ids = HashSet::new();
    for record in &document.customers {
        if !customer_ids.insert(record.customer_id) {
            return Err(duplicate("customer_id", record.customer_id));
        }
    }

    let mut sales = Vec::with_capacity(document.sales.len());
    let mut sale_ids = HashSet::new();
    for record in document.sales {
        if !sale_ids.insert(record.sale_id) {
            return Err(duplicate("sale_id", record.sale_id));
        }
        if !customer_ids.contains(&record.customer_id) {
            return Err(dangling("sale customer", record.customer_id));
        }
        for item in &record.items {
            if !instrument_ids.contains(&item.instrument_id) {
                return Err(dangling("sale instrument", item.instrument_id));
            }
        }

        let sale = Sale::restore(record.sale_id, record.customer_id, record.date, record.items);
        if (sale.total() - record.total).abs() > TOTAL_TOLERANCE {
            return Err(RepoError::InvalidData(format!(
                "sale {} total {} does not match its items ({})",
                sale.id(),
                record.total,
                sale.total()
            )));
        }
        sales.push(sale);
    }

    let mut supports = Vec::with_capacity(document.supports.len());
    let mut support_ids = HashSet::new();
    for record in document.supports {
        if !support_ids.insert(record.request_id) {
            return Err(duplicate("request_id", record.request_id));
        }
        if !customer_ids.contains(&record.customer_id) {
            return Err(dangling("support customer", record.customer_id));
        }
        let request = SupportRequest::restore(
            record.request_id,
            record.customer_id,
            record.subject,
            record.message,
            record.date,
            record.status,
        );
        supports.push(request);
    }

    let mut customers = Vec::with_capacity(document.customers.len());
    for record in document.customers {
        let mut customer = Customer::with_id(
            record.customer_id,
            record.first_name,
            record.last_name,
            record.phone,
            record.email,
        );
        for order in record.orders {
            if !sale_ids.contains(&order.sale_id) {
                return Err(dangling("customer order", order.sale_id));
            }
            customer.link_order(order.sale_id);
        }
        for support in record.supports {
            if !support_ids.contains(&support.request_id) {
                return Err(dangling("customer support request", support.request_id));
            }
            customer.link_support(support.request_id);
        }
        customers.push(customer);
    }

    Ok(StoreSnapshot {
        instruments: document.instruments,
        customers,
        sales,
        supports,
    })
}

fn duplicate(field: &str, id: EntityId) -> RepoError {
    RepoError::InvalidData(format!("duplicate `{field}` value {id}"))
}

fn dangling(kind: &str, id: EntityId) -> RepoError {
    RepoError::InvalidData(format!("{kind} reference {id} does not resolve"))
}
