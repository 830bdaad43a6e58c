use crate::{common, patch::CompileError, write};

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use std::collections;

/// update item operation
#[derive(Clone, Debug, Default, PartialEq)]
struct UpdateItemInput {
    keys: collections::HashMap<String, types::AttributeValue>,
    update_expression: String,
    write_operation: write::common::WriteInput,
}

/// Update item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_item_patch::{common, patch::Patch, write};
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let patch = Patch::try_from(json!({"name": {"last": "Ng"}}))?;
/// let update_item = write::update_item::UpdateItem {
///     key: common::key::Key::new("itemId", "1".to_string()),
///     update: patch.compile()?,
///     write_args: write::common::WriteArgs {
///         condition: Some(common::condition::AttributeExists {
///             name: "itemId".to_string(),
///         }),
///         table_name: "items".to_string(),
///         ..Default::default()
///     },
/// };
/// // The request carries: "SET #name.#last = :v0" if "attribute_exists(#itemId)"
/// update_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateItem<T> {
    /// The key of the item to update.
    pub key: common::key::Key<T>,
    /// The compiled update expression.
    pub update: common::CompiledUpdate,
    /// Additional write operation arguments (table name, condition, return values).
    pub write_args: write::common::WriteArgs,
}

impl<T: Serialize> TryFrom<UpdateItem<T>> for UpdateItemInput {
    type Error = CompileError;

    fn try_from(update_item: UpdateItem<T>) -> Result<Self, Self::Error> {
        let keys = update_item.key.try_into()?;
        let update = update_item.update;
        let placeholders = common::NamePlaceholders::from_names(update.expression_attribute_names);
        let write_operation = write::common::WriteInput::build(
            update_item.write_args,
            placeholders,
            update.expression_attribute_values,
        )?;
        let operation = Self {
            keys,
            update_expression: update.update_expression,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> UpdateItem<T> {
    /// Execute the update item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.update_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::update_item::UpdateItemOutput,
        error::SdkError<operation::update_item::UpdateItemError>,
    > {
        let update_item: UpdateItemInput = self.try_into().map_err(error::BuildError::other)?;
        let builder = client
            .update_item()
            .set_key(Some(update_item.keys))
            .update_expression(update_item.update_expression);
        crate::apply_write_operation!(builder, update_item.write_operation)
            .send()
            .await
    }
}
