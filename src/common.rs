//! Common utilities for DynamoDB expressions.
//!
//! This module provides the compiled update type shared by the patch compiler, the
//! request builders and the stores, together with key handling and condition expressions.

/// Condition expressions for conditional writes.
pub mod condition;

/// Key types for identifying items in DynamoDB tables.
pub mod key;

use crate::patch::CompileError;

use aws_sdk_dynamodb::types;
use std::collections;

/// Separator for attribute path components.
pub(crate) const PATH_SEPARATOR: &str = ".";

/// Prefix of every expression attribute name placeholder.
pub(crate) const NAME_PREFIX: &str = "#";

/// Prefix of every expression attribute value placeholder.
pub(crate) const VALUE_PREFIX: &str = ":v";

/// Placeholder stem used for key names that are not plain identifiers.
const FALLBACK_NAME_STEM: &str = "attr";

/// A patch compiled into the native DynamoDB update statement.
///
/// Every `#name` placeholder referenced by [`update_expression`](Self::update_expression)
/// resolves in [`expression_attribute_names`](Self::expression_attribute_names) and every
/// `:value` placeholder resolves in
/// [`expression_attribute_values`](Self::expression_attribute_values).
/// Neither map carries entries the expression does not reference.
///
/// ```rust
/// use dynamodb_item_patch::patch::Patch;
/// use serde_json::json;
///
/// let patch = Patch::try_from(json!({"address": {"city": "Oslo"}})).unwrap();
/// let update = patch.compile().unwrap();
/// assert_eq!(update.update_expression, "SET #address.#city = :v0");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledUpdate {
    /// The `SET` clause.
    pub update_expression: String,
    /// Name placeholders mapped to the attribute names they stand for.
    pub expression_attribute_names: collections::HashMap<String, String>,
    /// Value placeholders mapped to the values they bind.
    pub expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl CompiledUpdate {
    /// Number of assignments in the `SET` clause.
    pub fn len(&self) -> usize {
        self.expression_attribute_values.len()
    }

    /// Whether the update assigns nothing.
    pub fn is_empty(&self) -> bool {
        self.expression_attribute_values.is_empty()
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || character == '_')
}

/// Allocates expression attribute name placeholders.
///
/// One placeholder per distinct attribute name: `#<name>` when the name is a plain
/// identifier that is still free, `#attr<n>` otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NamePlaceholders {
    names: collections::HashMap<String, String>,
    placeholders: collections::HashMap<String, String>,
    fallback: usize,
}

impl NamePlaceholders {
    /// Continue allocating on top of placeholders that are already bound.
    pub(crate) fn from_names(names: collections::HashMap<String, String>) -> Self {
        let placeholders = names
            .iter()
            .map(|(placeholder, name)| (name.clone(), placeholder.clone()))
            .collect();
        Self {
            names,
            placeholders,
            fallback: 0,
        }
    }

    pub(crate) fn allocate(&mut self, name: &str) -> Result<String, CompileError> {
        if let Some(placeholder) = self.placeholders.get(name) {
            return Ok(placeholder.clone());
        }
        let mut placeholder = format!("{NAME_PREFIX}{name}");
        if !is_identifier(name) || self.names.contains_key(&placeholder) {
            loop {
                placeholder = format!("{NAME_PREFIX}{FALLBACK_NAME_STEM}{}", self.fallback);
                self.fallback += 1;
                if !self.names.contains_key(&placeholder) {
                    break;
                }
            }
        }
        self.bind(placeholder, name)
    }

    fn bind(&mut self, placeholder: String, name: &str) -> Result<String, CompileError> {
        if let Some(existing) = self.names.get(&placeholder) {
            if existing != name {
                return Err(CompileError::PlaceholderCollision {
                    placeholder,
                    existing: existing.clone(),
                    name: name.to_owned(),
                });
            }
        }
        self.names.insert(placeholder.clone(), name.to_owned());
        self.placeholders.insert(name.to_owned(), placeholder.clone());
        Ok(placeholder)
    }

    pub(crate) fn into_names(self) -> collections::HashMap<String, String> {
        self.names
    }
}
