use crate::{common, patch::AttributePath};

use aws_sdk_dynamodb::types;
use serde_json::Value;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Errors raised while compiling a patch.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Nothing to assign; the caller should treat the update as a no-op.
    #[error("no fields to update")]
    NoFields,
    /// The same attribute path was assigned twice.
    #[error("attribute `{0}` is assigned more than once")]
    DuplicatePath(String),
    /// One placeholder ended up standing for two different names.
    #[error("placeholder `{placeholder}` is bound to both `{existing}` and `{name}`")]
    PlaceholderCollision {
        /// The contested placeholder.
        placeholder: String,
        /// The name it was bound to first.
        existing: String,
        /// The name that tried to rebind it.
        name: String,
    },
    /// A value could not be converted to a DynamoDB attribute value.
    #[error("attribute `{path}` cannot be stored: {source}")]
    Value {
        /// The attribute being converted.
        path: String,
        /// The conversion failure.
        #[source]
        source: serde_dynamo::Error,
    },
}

/// Assemble flattened leaves into a `SET` update expression.
///
/// Terms keep the order of `leaves`; value placeholders are `:v0`, `:v1`, … in that order.
///
/// ```rust
/// use dynamodb_item_patch::patch::{Patch, assemble};
/// use serde_json::json;
///
/// let patch = Patch::try_from(json!({"name": {"first": "Jo"}, "tags": ["a"]})).unwrap();
/// let update = assemble(patch.leaves()).unwrap();
/// assert_eq!(update.update_expression, "SET #name.#first = :v0, #tags = :v1");
/// assert_eq!(update.expression_attribute_names.len(), 3);
/// ```
pub fn assemble<'a, I>(leaves: I) -> Result<common::CompiledUpdate, CompileError>
where
    I: IntoIterator<Item = (AttributePath, &'a Value)>,
{
    let mut placeholders = common::NamePlaceholders::default();
    let mut assigned = collections::HashSet::new();
    let mut terms = Vec::new();
    let mut expression_attribute_values = collections::HashMap::new();
    for (index, (path, value)) in leaves.into_iter().enumerate() {
        let mut segments = Vec::with_capacity(path.len());
        for segment in path.segments() {
            segments.push(placeholders.allocate(segment)?);
        }
        let name_path = segments.join(common::PATH_SEPARATOR);
        if !assigned.insert(name_path.clone()) {
            return Err(CompileError::DuplicatePath(path.to_string()));
        }
        let value: types::AttributeValue =
            to_attribute_value(value).map_err(|source| CompileError::Value {
                path: path.to_string(),
                source,
            })?;
        let value_placeholder = format!("{}{index}", common::VALUE_PREFIX);
        terms.push(format!("{name_path} = {value_placeholder}"));
        expression_attribute_values.insert(value_placeholder, value);
    }
    if terms.is_empty() {
        return Err(CompileError::NoFields);
    }
    let operation = common::CompiledUpdate {
        update_expression: format!("SET {}", terms.join(", ")),
        expression_attribute_names: placeholders.into_names(),
        expression_attribute_values,
    };
    Ok(operation)
}
