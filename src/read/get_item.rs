use crate::{common, patch::CompileError};

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use std::collections;

/// get item operation
#[derive(Clone, Debug, Default, PartialEq)]
struct GetItemInput {
    consistent_read: Option<bool>,
    keys: collections::HashMap<String, types::AttributeValue>,
    table_name: String,
}

/// Get item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_item_patch::{common, read};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let get_item = read::get_item::GetItem {
///     key: common::key::Key::new("itemId", "1".to_string()),
///     table_name: "items".to_string(),
///     ..Default::default()
/// };
/// get_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetItem<T> {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// The key of the item to retrieve.
    pub key: common::key::Key<T>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl<T: Serialize> TryFrom<GetItem<T>> for GetItemInput {
    type Error = CompileError;

    fn try_from(get_item: GetItem<T>) -> Result<Self, Self::Error> {
        let keys = get_item.key.try_into()?;
        let operation = Self {
            consistent_read: get_item.consistent_read,
            keys,
            table_name: get_item.table_name,
        };
        Ok(operation)
    }
}

impl<T: Serialize> GetItem<T> {
    /// Execute the get item operation.
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::get_item::GetItemOutput,
        error::SdkError<operation::get_item::GetItemError>,
    > {
        let get_item: GetItemInput = self.try_into().map_err(error::BuildError::other)?;
        client
            .get_item()
            .set_key(Some(get_item.keys))
            .set_consistent_read(get_item.consistent_read)
            .table_name(get_item.table_name)
            .send()
            .await
    }
}
