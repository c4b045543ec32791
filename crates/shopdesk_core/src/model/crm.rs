//! CRM entities: customers owning their sales and support requests.
//!
//! # Invariants
//! - Sales and support requests are owned by exactly one customer and are
//!   serialized inline under it.
//! - Serde field names match the persisted CRM file (`musteri_id`, `ad`, ...).

use super::{
    apply_field, new_entity_id, now_timestamp, require_text, CustomerUpdate, EntityId,
    ValidationError,
};
use serde::{Deserialize, Serialize};

/// Initial status label of a CRM support request ("open").
pub const SUPPORT_STATUS_OPEN: &str = "Açık";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(rename = "satis_id")]
    id: EntityId,
    #[serde(rename = "tarih")]
    created_at: String,
    #[serde(rename = "urun")]
    pub product: String,
    /// Signed on the wire; the sale form only ever records non-negative counts.
    #[serde(rename = "miktar")]
    pub quantity: i64,
    /// Line total as entered at the point of sale.
    #[serde(rename = "toplam_tutar")]
    pub total_amount: f64,
}

impl Sale {
    /// Records a new sale stamped with the current time.
    pub fn new(product: impl Into<String>, quantity: i64, total_amount: f64) -> Self {
        Self::restore(new_entity_id(), now_timestamp(), product, quantity, total_amount)
    }

    /// Rebuilds a persisted sale with its original identity and timestamp.
    pub fn restore(
        id: EntityId,
        created_at: impl Into<String>,
        product: impl Into<String>,
        quantity: i64,
        total_amount: f64,
    ) -> Self {
        Self {
            id,
            created_at: created_at.into(),
            product: product.into(),
            quantity,
            total_amount,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRequest {
    #[serde(rename = "talep_id")]
    id: EntityId,
    #[serde(rename = "konu")]
    pub subject: String,
    #[serde(rename = "aciklama")]
    pub description: String,
    #[serde(rename = "tarih")]
    created_at: String,
    #[serde(rename = "durum")]
    pub status: String,
}

impl SupportRequest {
    /// Opens a new request stamped with the current time.
    pub fn new(subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self::restore(
            new_entity_id(),
            subject,
            description,
            now_timestamp(),
            SUPPORT_STATUS_OPEN,
        )
    }

    pub fn restore(
        id: EntityId,
        subject: impl Into<String>,
        description: impl Into<String>,
        created_at: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id,
            subject: subject.into(),
            description: description.into(),
            created_at: created_at.into(),
            status: status.into(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("konu", &self.subject)?;
        require_text("aciklama", &self.description)
    }
}

/// CRM customer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "musteri_id")]
    id: EntityId,
    #[serde(rename = "ad")]
    pub first_name: String,
    #[serde(rename = "soyad")]
    pub last_name: String,
    #[serde(rename = "telefon")]
    pub phone: String,
    pub email: String,
    #[serde(rename = "satislar")]
    sales: Vec<Sale>,
    #[serde(rename = "destek_talepleri")]
    support_requests: Vec<SupportRequest>,
}

impl Customer {
    /// Creates a customer with a freshly minted identifier and no history.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self::with_id(new_entity_id(), first_name, last_name, phone, email)
    }

    /// Creates a customer with a caller-provided identifier.
    ///
    /// Used by load paths where identity already exists in the data file.
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
            sales: Vec::new(),
            support_requests: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn support_requests(&self) -> &[SupportRequest] {
        &self.support_requests
    }

    pub fn sales_total(&self) -> f64 {
        self.sales.iter().map(|sale| sale.total_amount).sum()
    }

    /// One-line contact summary for list views.
    pub fn summary(&self) -> String {
        format!(
            "{} {} | Tel: {} | Email: {}",
            self.first_name, self.last_name, self.phone, self.email
        )
    }

    pub fn push_sale(&mut self, sale: Sale) -> &Sale {
        self.sales.push(sale);
        &self.sales[self.sales.len() - 1]
    }

    pub fn push_support_request(&mut self, request: SupportRequest) -> &SupportRequest {
        self.support_requests.push(request);
        &self.support_requests[self.support_requests.len() - 1]
    }

    pub fn apply_update(&mut self, update: &CustomerUpdate) {
        apply_field(&mut self.first_name, update.first_name.as_ref());
        apply_field(&mut self.last_name, update.last_name.as_ref());
        apply_field(&mut self.phone, update.phone.as_ref());
        apply_field(&mut self.email, update.email.as_ref());
    }

    /// Checks the contact fields only.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("ad", &self.first_name)?;
        require_text("soyad", &self.last_name)?;
        require_text("telefon", &self.phone)?;
        require_text("email", &self.email)
    }
}
