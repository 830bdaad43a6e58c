use crate::{
    common, read,
    store::{Item, ItemKey, ItemStore, Precondition, ScanPage, StoreError},
    write,
};

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    error::{self, ProvideErrorMetadata},
    operation, types,
};

const VALIDATION_EXCEPTION: &str = "ValidationException";

/// Store backed by a DynamoDB table.
///
/// The client is injected at construction and shared by every request.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_item_patch::store::dynamodb::DynamoDbStore;
///
/// # fn example(client: Client) {
/// let store = DynamoDbStore::new(client, "items");
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct DynamoDbStore {
    client: Client,
    consistent_read: Option<bool>,
    page_size: Option<i32>,
    table_name: String,
}

impl DynamoDbStore {
    /// Build a store over `table_name`.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            consistent_read: None,
            page_size: None,
            table_name: table_name.into(),
        }
    }

    /// Use strongly consistent reads for gets and scans.
    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = Some(consistent_read);
        self
    }

    /// Evaluate at most `page_size` items per scan request.
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// The table this store reads and writes.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn scan_request(&self, exclusive_start_key: Option<Item>) -> read::scan::Scan {
        read::scan::Scan {
            consistent_read: self.consistent_read,
            exclusive_start_key,
            limit: self.page_size,
            table_name: self.table_name.clone(),
        }
    }

    fn write_args(&self) -> write::common::WriteArgs {
        write::common::WriteArgs {
            table_name: self.table_name.clone(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ItemStore for DynamoDbStore {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.scan", skip_all, err)
    )]
    async fn scan(&self, exclusive_start_key: Option<Item>) -> Result<ScanPage, StoreError> {
        let output = self
            .scan_request(exclusive_start_key)
            .send(&self.client)
            .await
            .map_err(|error| store_error(error, rejection))?;
        let page = ScanPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key.filter(|key| !key.is_empty()),
        };
        Ok(page)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.get_item", skip(self), err)
    )]
    async fn get_item(&self, key: ItemKey) -> Result<Option<Item>, StoreError> {
        let get_item = read::get_item::GetItem {
            consistent_read: self.consistent_read,
            key,
            table_name: self.table_name.clone(),
        };
        let output = get_item
            .send(&self.client)
            .await
            .map_err(|error| store_error(error, rejection))?;
        Ok(output.item)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.put_item", skip_all, err)
    )]
    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        let put_item = write::put_item::PutItem {
            item,
            write_args: self.write_args(),
        };
        put_item
            .send(&self.client)
            .await
            .map_err(|error| store_error(error, rejection))?;
        Ok(())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.update_item", skip(self, update), err)
    )]
    async fn update_item(
        &self,
        key: ItemKey,
        update: common::CompiledUpdate,
        precondition: Precondition,
    ) -> Result<Item, StoreError> {
        let condition = match precondition {
            Precondition::None => None,
            Precondition::ItemExists => Some(common::condition::AttributeExists {
                name: key.name.clone(),
            }),
        };
        let update_item = write::update_item::UpdateItem {
            key,
            update,
            write_args: write::common::WriteArgs {
                condition,
                return_values: Some(types::ReturnValue::AllNew),
                ..self.write_args()
            },
        };
        let output = update_item
            .send(&self.client)
            .await
            .map_err(|error| store_error(error, update_rejection))?;
        Ok(output.attributes.unwrap_or_default())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.delete_item", skip(self), err)
    )]
    async fn delete_item(&self, key: ItemKey) -> Result<(), StoreError> {
        let delete_item = write::delete_item::DeleteItem {
            key,
            write_args: self.write_args(),
        };
        delete_item
            .send(&self.client)
            .await
            .map_err(|error| store_error(error, rejection))?;
        Ok(())
    }
}

/// The store error for a request DynamoDB refused as malformed, if `error` is one.
fn rejection<E: ProvideErrorMetadata>(error: &E) -> Option<StoreError> {
    if error.code() != Some(VALIDATION_EXCEPTION) {
        return None;
    }
    let message = error.message().unwrap_or(VALIDATION_EXCEPTION);
    Some(StoreError::Validation(message.to_string()))
}

fn update_rejection(error: &operation::update_item::UpdateItemError) -> Option<StoreError> {
    match error {
        operation::update_item::UpdateItemError::ConditionalCheckFailedException(_) => {
            Some(StoreError::ConditionFailed)
        }
        error => rejection(error),
    }
}

fn store_error<E>(
    error: error::SdkError<E>,
    classify: impl FnOnce(&E) -> Option<StoreError>,
) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    match error.as_service_error().and_then(classify) {
        Some(store_error) => store_error,
        None => StoreError::service(error),
    }
}
