use crate::{
    common,
    store::{Item, ItemKey, ItemStore, Precondition, ScanPage, StoreError},
};

use async_trait::async_trait;
use aws_sdk_dynamodb::types;
use parking_lot::RwLock;
use std::{collections, ops};

const SET_KEYWORD: &str = "SET ";
const ASSIGNMENT: char = '=';
const TERM_SEPARATOR: char = ',';

/// Store keeping items in process.
///
/// Updates are evaluated with DynamoDB's rules for `SET` expressions: every placeholder must
/// resolve and be used, key attributes cannot be assigned, and a nested path can only be set
/// when its parent map already exists. Scans return items in key order.
///
/// ```rust
/// use dynamodb_item_patch::store::memory::MemoryStore;
///
/// let store = MemoryStore::new("itemId").with_page_size(100);
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<collections::BTreeMap<String, Item>>,
    key_name: String,
    page_size: Option<usize>,
}

impl MemoryStore {
    /// An empty store whose items are keyed by the `key_name` attribute.
    pub fn new(key_name: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            ..Default::default()
        }
    }

    /// Return at most `page_size` items per scan page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    fn key_value(&self, item: &Item) -> Result<String, StoreError> {
        match item.get(&self.key_name) {
            Some(types::AttributeValue::S(value)) if !value.is_empty() => Ok(value.clone()),
            _ => Err(StoreError::Validation(format!(
                "One of the required keys was not given a value: {}",
                self.key_name
            ))),
        }
    }

    fn check_key(&self, key: &ItemKey) -> Result<(), StoreError> {
        if key.name != self.key_name {
            return Err(StoreError::Validation(format!(
                "The provided key element does not match the schema: expected {}, got {}",
                self.key_name, key.name
            )));
        }
        Ok(())
    }

    fn start_key(&self, exclusive_start_key: Option<&Item>) -> Result<Option<String>, StoreError> {
        exclusive_start_key.map(|key| self.key_value(key)).transpose()
    }

    fn key_item(&self, value: String) -> Item {
        Item::from([(self.key_name.clone(), types::AttributeValue::S(value))])
    }
}

/// One parsed `path = :value` term.
#[derive(Debug)]
struct Assignment {
    path: Vec<String>,
    value: types::AttributeValue,
}

fn parse_assignments(update: &common::CompiledUpdate) -> Result<Vec<Assignment>, StoreError> {
    let clause = update
        .update_expression
        .strip_prefix(SET_KEYWORD)
        .ok_or_else(|| {
            StoreError::Validation(format!(
                "Invalid UpdateExpression: only SET clauses are supported: {}",
                update.update_expression
            ))
        })?;
    let mut used_names = collections::HashSet::new();
    let mut used_values = collections::HashSet::new();
    let mut assignments = Vec::new();
    for term in clause.split(TERM_SEPARATOR) {
        let (path, value) = term.split_once(ASSIGNMENT).ok_or_else(|| {
            StoreError::Validation(format!("Invalid UpdateExpression: malformed term: {term}"))
        })?;
        let mut segments = Vec::new();
        for placeholder in path.trim().split(common::PATH_SEPARATOR) {
            let name = update
                .expression_attribute_names
                .get(placeholder)
                .ok_or_else(|| {
                    StoreError::Validation(format!(
                        "An expression attribute name used in the document path is not defined; attribute name: {placeholder}"
                    ))
                })?;
            used_names.insert(placeholder);
            segments.push(name.clone());
        }
        let placeholder = value.trim();
        let value = update
            .expression_attribute_values
            .get(placeholder)
            .ok_or_else(|| {
                StoreError::Validation(format!(
                    "An expression attribute value used in expression is not defined; attribute value: {placeholder}"
                ))
            })?;
        used_values.insert(placeholder);
        assignments.push(Assignment {
            path: segments,
            value: value.clone(),
        });
    }
    if let Some(unused) = update
        .expression_attribute_names
        .keys()
        .find(|placeholder| !used_names.contains(placeholder.as_str()))
    {
        return Err(StoreError::Validation(format!(
            "Value provided in ExpressionAttributeNames unused in expressions: keys: {{{unused}}}"
        )));
    }
    if let Some(unused) = update
        .expression_attribute_values
        .keys()
        .find(|placeholder| !used_values.contains(placeholder.as_str()))
    {
        return Err(StoreError::Validation(format!(
            "Value provided in ExpressionAttributeValues unused in expressions: keys: {{{unused}}}"
        )));
    }
    Ok(assignments)
}

fn assign(item: &mut Item, assignment: Assignment) -> Result<(), StoreError> {
    let Some((last, parents)) = assignment.path.split_last() else {
        return Err(StoreError::Validation(
            "Invalid UpdateExpression: empty document path".to_string(),
        ));
    };
    let mut current = item;
    for parent in parents {
        current = match current.get_mut(parent) {
            Some(types::AttributeValue::M(map)) => map,
            _ => {
                return Err(StoreError::Validation(
                    "The document path provided in the update expression is invalid for update"
                        .to_string(),
                ));
            }
        };
    }
    current.insert(last.clone(), assignment.value);
    Ok(())
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn scan(&self, exclusive_start_key: Option<Item>) -> Result<ScanPage, StoreError> {
        let start = self.start_key(exclusive_start_key.as_ref())?;
        let items = self.items.read();
        let lower = match start {
            Some(start) => ops::Bound::Excluded(start),
            None => ops::Bound::Unbounded,
        };
        let mut remaining = items.range((lower, ops::Bound::Unbounded));
        let page_size = self.page_size.unwrap_or(usize::MAX);
        let mut page = ScanPage::default();
        let mut last_key = None;
        for (key, item) in remaining.by_ref().take(page_size) {
            page.items.push(item.clone());
            last_key = Some(key.clone());
        }
        if remaining.next().is_some() {
            page.last_evaluated_key = last_key.map(|key| self.key_item(key));
        }
        Ok(page)
    }

    async fn get_item(&self, key: ItemKey) -> Result<Option<Item>, StoreError> {
        self.check_key(&key)?;
        Ok(self.items.read().get(&key.value).cloned())
    }

    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        let key = self.key_value(&item)?;
        self.items.write().insert(key, item);
        Ok(())
    }

    async fn update_item(
        &self,
        key: ItemKey,
        update: common::CompiledUpdate,
        precondition: Precondition,
    ) -> Result<Item, StoreError> {
        self.check_key(&key)?;
        let assignments = parse_assignments(&update)?;
        if let Some(assignment) = assignments
            .iter()
            .find(|assignment| assignment.path.first() == Some(&self.key_name))
        {
            return Err(StoreError::Validation(format!(
                "Cannot update attribute {}. This attribute is part of the key",
                assignment.path.join(common::PATH_SEPARATOR)
            )));
        }
        let mut items = self.items.write();
        let mut item = match items.get(&key.value) {
            Some(item) => item.clone(),
            None if precondition == Precondition::ItemExists => {
                return Err(StoreError::ConditionFailed);
            }
            None => self.key_item(key.value.clone()),
        };
        // all terms apply or none do
        for assignment in assignments {
            assign(&mut item, assignment)?;
        }
        items.insert(key.value, item.clone());
        Ok(item)
    }

    async fn delete_item(&self, key: ItemKey) -> Result<(), StoreError> {
        self.check_key(&key)?;
        self.items.write().remove(&key.value);
        Ok(())
    }
}
