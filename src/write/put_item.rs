use crate::{patch::CompileError, write};

use aws_sdk_dynamodb::{Client, error, operation, types};
use std::collections;

/// put item operation
#[derive(Debug, PartialEq)]
struct PutItemInput {
    item: collections::HashMap<String, types::AttributeValue>,
    write_operation: write::common::WriteInput,
}

/// Put item operation.
///
/// Writes the whole item, replacing any item stored under the same key.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::{Client, types::AttributeValue};
/// use dynamodb_item_patch::write;
/// use std::collections::HashMap;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let put_item = write::put_item::PutItem {
///     item: HashMap::from([
///         ("itemId".to_string(), AttributeValue::S("1".to_string())),
///         ("name".to_string(), AttributeValue::S("Jo".to_string())),
///     ]),
///     write_args: write::common::WriteArgs {
///         table_name: "items".to_string(),
///         ..Default::default()
///     },
/// };
/// put_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq)]
pub struct PutItem {
    /// The item to put into the table.
    pub item: collections::HashMap<String, types::AttributeValue>,
    /// Additional write operation arguments (table name, condition, return values).
    pub write_args: write::common::WriteArgs,
}

impl TryFrom<PutItem> for PutItemInput {
    type Error = CompileError;

    fn try_from(put_item: PutItem) -> Result<Self, Self::Error> {
        let write_operation: write::common::WriteInput = put_item.write_args.try_into()?;
        let operation = Self {
            item: put_item.item,
            write_operation,
        };
        Ok(operation)
    }
}

impl PutItem {
    /// Execute the put item operation.
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::put_item::PutItemOutput,
        error::SdkError<operation::put_item::PutItemError>,
    > {
        let put_item: PutItemInput = self.try_into().map_err(error::BuildError::other)?;
        let builder = client.put_item().set_item(Some(put_item.item));
        crate::apply_write_operation!(builder, put_item.write_operation)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::plain(
        PutItem {
            item: collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::S(
                        "b".to_string()
                    ),
                )]
            ),
            write_args: write::common::WriteArgs {
                table_name: "c".to_string(),
                ..Default::default()
            },
        },
        PutItemInput {
            item: collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::S(
                        "b".to_string()
                    ),
                )]
            ),
            write_operation: write::common::WriteInput {
                table_name: "c".to_string(),
                ..Default::default()
            },
        }
    )]
    #[case::return_old(
        PutItem {
            item: collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::N(
                        "1".to_string()
                    ),
                )]
            ),
            write_args: write::common::WriteArgs {
                return_values: Some(
                    types::ReturnValue::AllOld
                ),
                table_name: "e".to_string(),
                ..Default::default()
            },
        },
        PutItemInput {
            item: collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::N(
                        "1".to_string()
                    ),
                )]
            ),
            write_operation: write::common::WriteInput {
                return_values: Some(
                    types::ReturnValue::AllOld
                ),
                table_name: "e".to_string(),
                ..Default::default()
            },
        }
    )]
    fn test_put_item(#[case] args: PutItem, #[case] expected: PutItemInput) {
        let actual: PutItemInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
