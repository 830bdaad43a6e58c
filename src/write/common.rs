use crate::{common, patch::CompileError};

use aws_sdk_dynamodb::types;
use std::collections;

/// Internal representation of write operation parameters.
///
/// Holds the fully resolved condition expression and attribute mappings ready for the
/// DynamoDB API calls, after merging with the expression of the operation itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct WriteInput {
    pub(crate) condition_expression: Option<String>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) expression_attribute_values:
        Option<collections::HashMap<String, types::AttributeValue>>,
    pub(crate) return_values: Option<types::ReturnValue>,
    pub(crate) table_name: String,
}

impl WriteInput {
    /// Resolve the write arguments on top of placeholders already bound by the operation.
    pub(crate) fn build(
        write_args: WriteArgs,
        mut placeholders: common::NamePlaceholders,
        expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
    ) -> Result<Self, CompileError> {
        let condition_expression = write_args
            .condition
            .map(|condition| condition.get_expression(&mut placeholders))
            .transpose()?;
        let expression_attribute_names = Some(placeholders.into_names())
            .filter(|names| !names.is_empty());
        let expression_attribute_values =
            Some(expression_attribute_values).filter(|values| !values.is_empty());
        let operation = Self {
            condition_expression,
            expression_attribute_names,
            expression_attribute_values,
            return_values: write_args.return_values,
            table_name: write_args.table_name,
        };
        Ok(operation)
    }
}

impl TryFrom<WriteArgs> for WriteInput {
    type Error = CompileError;

    fn try_from(write_args: WriteArgs) -> Result<Self, Self::Error> {
        Self::build(
            write_args,
            common::NamePlaceholders::default(),
            collections::HashMap::new(),
        )
    }
}

/// Arguments common to all write operations (Put, Update, Delete).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteArgs {
    /// Condition that must hold for the write to proceed.
    ///
    /// If the condition is false the operation fails with a conditional check error.
    pub condition: Option<common::condition::AttributeExists>,
    /// Which item attributes to return in the response.
    ///
    /// Options: `AllOld`, `AllNew`, `UpdatedOld`, `UpdatedNew`, or `None`.
    pub return_values: Option<types::ReturnValue>,
    /// The name of the table to write to.
    pub table_name: String,
}

/// apply common write operation settings to a builder
#[macro_export]
macro_rules! apply_write_operation {
    ($builder:expr, $write_operation:expr) => {
        $builder
            .set_condition_expression($write_operation.condition_expression)
            .set_expression_attribute_names($write_operation.expression_attribute_names)
            .set_expression_attribute_values($write_operation.expression_attribute_values)
            .set_return_values($write_operation.return_values)
            .table_name($write_operation.table_name)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::plain(
        WriteArgs {
            table_name: "a".to_string(),
            ..Default::default()
        },
        WriteInput {
            table_name: "a".to_string(),
            ..Default::default()
        }
    )]
    #[case::conditional(
        WriteArgs {
            condition: Some(
                common::condition::AttributeExists {
                    name: "itemId".to_string(),
                }
            ),
            return_values: Some(
                types::ReturnValue::AllOld
            ),
            table_name: "a".to_string(),
        },
        WriteInput {
            condition_expression: Some(
                "attribute_exists(#itemId)".to_string()
            ),
            expression_attribute_names: Some(
                collections::HashMap::from(
                    [
                        ("#itemId".to_string(), "itemId".to_string()),
                    ]
                )
            ),
            return_values: Some(
                types::ReturnValue::AllOld
            ),
            table_name: "a".to_string(),
            ..Default::default()
        }
    )]
    fn test_write_input(#[case] args: WriteArgs, #[case] expected: WriteInput) {
        let actual: WriteInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
