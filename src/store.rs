//! Item store clients.
//!
//! [`ItemStore`] is the capability the repository consumes: one method per store request,
//! each scoped to a single item except [`scan`](ItemStore::scan), which returns one page.
//! Two implementations are provided:
//! - [`dynamodb::DynamoDbStore`] issues the requests against a DynamoDB table
//! - [`memory::MemoryStore`] keeps items in process and evaluates updates the way DynamoDB does

/// DynamoDB-backed store.
pub mod dynamodb;

/// In-process store.
pub mod memory;

use crate::common;

use async_trait::async_trait;
use aws_sdk_dynamodb::types;
use std::{collections, error, sync};

/// A stored item in its native representation.
pub type Item = collections::HashMap<String, types::AttributeValue>;

/// Key of a stored item.
pub type ItemKey = common::key::Key<String>;

/// One page of a scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanPage {
    /// Items of this page.
    pub items: Vec<Item>,
    /// Where the next page starts; `None` once the table is exhausted.
    pub last_evaluated_key: Option<Item>,
}

/// Requirement checked atomically with an update.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Precondition {
    /// Apply the update whether or not the item exists.
    #[default]
    None,
    /// Fail with [`StoreError::ConditionFailed`] unless the item exists.
    ItemExists,
}

/// Errors reported by a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The precondition of a conditional write did not hold.
    #[error("the conditional request failed")]
    ConditionFailed,
    /// The store rejected the request as malformed.
    #[error("invalid request: {0}")]
    Validation(String),
    /// An item could not be converted to or from its stored form.
    #[error("item conversion failed: {0}")]
    Serialization(#[from] serde_dynamo::Error),
    /// The request was built but could not be carried out (network, throttling, service error).
    #[error("store request failed: {0}")]
    Service(#[source] Box<dyn error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap any client failure.
    pub fn service(error: impl Into<Box<dyn error::Error + Send + Sync>>) -> Self {
        Self::Service(error.into())
    }
}

/// The store client capability consumed by the repository.
///
/// No method retries; failures surface as [`StoreError`].
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Read one page of items, starting after `exclusive_start_key`.
    async fn scan(&self, exclusive_start_key: Option<Item>) -> Result<ScanPage, StoreError>;

    /// Read one item; `None` when the key is not stored.
    async fn get_item(&self, key: ItemKey) -> Result<Option<Item>, StoreError>;

    /// Write a whole item, replacing any item with the same key.
    async fn put_item(&self, item: Item) -> Result<(), StoreError>;

    /// Apply a compiled update and return the item as it is after the update.
    async fn update_item(
        &self,
        key: ItemKey,
        update: common::CompiledUpdate,
        precondition: Precondition,
    ) -> Result<Item, StoreError>;

    /// Delete one item; deleting a missing key succeeds.
    async fn delete_item(&self, key: ItemKey) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: ItemStore + ?Sized> ItemStore for sync::Arc<S> {
    async fn scan(&self, exclusive_start_key: Option<Item>) -> Result<ScanPage, StoreError> {
        (**self).scan(exclusive_start_key).await
    }

    async fn get_item(&self, key: ItemKey) -> Result<Option<Item>, StoreError> {
        (**self).get_item(key).await
    }

    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        (**self).put_item(item).await
    }

    async fn update_item(
        &self,
        key: ItemKey,
        update: common::CompiledUpdate,
        precondition: Precondition,
    ) -> Result<Item, StoreError> {
        (**self).update_item(key, update, precondition).await
    }

    async fn delete_item(&self, key: ItemKey) -> Result<(), StoreError> {
        (**self).delete_item(key).await
    }
}
