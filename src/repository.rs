//! Discount lookup
//!
//! The engine's only I/O boundary: fetch a raw discount record by id.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::discounts::{DiscountId, wire::RawDiscount};

/// Errors raised by a discount lookup.
#[derive(Debug, Error)]
pub enum DiscountLookupError {
    /// No record exists for the requested id.
    #[error("discount not found")]
    NotFound,

    /// The stored record did not deserialize into a discount shape.
    #[error("malformed discount record")]
    Malformed(#[source] serde_json::Error),

    /// The lookup transport failed.
    #[error("discount lookup transport failed: {0}")]
    Transport(String),
}

/// Fetch-by-id access to discount records.
#[automock]
#[async_trait]
pub trait DiscountRepository: Send + Sync {
    /// Fetch a single raw discount record.
    async fn get_discount(&self, id: DiscountId) -> Result<RawDiscount, DiscountLookupError>;
}

/// A repository over raw JSON values, deserialized on every lookup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDiscountRepository {
    records: FxHashMap<DiscountId, serde_json::Value>,
}

impl InMemoryDiscountRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record stored for an id.
    pub fn insert(&mut self, id: DiscountId, record: serde_json::Value) {
        self.records.insert(id, record);
    }
}

#[async_trait]
impl DiscountRepository for InMemoryDiscountRepository {
    async fn get_discount(&self, id: DiscountId) -> Result<RawDiscount, DiscountLookupError> {
        let record = self.records.get(&id).ok_or(DiscountLookupError::NotFound)?;

        serde_json::from_value(record.clone()).map_err(DiscountLookupError::Malformed)
    }
}
