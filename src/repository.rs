//! Item repository.
//!
//! [`ItemRepository`] exposes create, read, update, delete and list over an injected
//! [`ItemStore`]. Items cross this boundary as JSON values and are converted to their stored
//! representation with `serde_dynamo`. Updates take a [`Patch`], which is compiled before
//! the store is contacted.

use crate::{
    error::{Error, Result},
    patch::{CompileError, Patch, PatchValue},
    store::{Item, ItemKey, ItemStore, Precondition, StoreError},
};

use serde_json::Value;

/// Name of the key attribute when none is configured.
pub const DEFAULT_KEY_NAME: &str = "itemId";

/// Result of [`ItemRepository::update`].
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome {
    /// The patch had nothing to write; the store was not contacted.
    NoOp,
    /// The item as stored after the update.
    Updated(Value),
}

impl UpdateOutcome {
    /// The updated item, if anything was written.
    pub fn into_item(self) -> Option<Value> {
        match self {
            Self::NoOp => None,
            Self::Updated(item) => Some(item),
        }
    }
}

/// CRUD operations over a store, keyed by a single string attribute.
///
/// ```rust
/// use dynamodb_item_patch::{
///     patch::Patch,
///     repository::{DEFAULT_KEY_NAME, ItemRepository},
///     store::memory::MemoryStore,
/// };
/// use serde_json::json;
///
/// # async fn example() -> dynamodb_item_patch::error::Result<()> {
/// let repository = ItemRepository::new(MemoryStore::new(DEFAULT_KEY_NAME), DEFAULT_KEY_NAME);
/// repository.create(json!({"itemId": "1", "name": {"first": "Jo"}})).await?;
/// let patch = Patch::try_from(json!({"name": {"last": "Ng"}}))?;
/// repository.update("1", patch).await?;
/// assert_eq!(
///     repository.get("1").await?,
///     Some(json!({"itemId": "1", "name": {"first": "Jo", "last": "Ng"}}))
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ItemRepository<S> {
    store: S,
    key_name: String,
}

impl<S: ItemStore> ItemRepository<S> {
    /// A repository over `store` whose items are keyed by `key_name`.
    pub fn new(store: S, key_name: impl Into<String>) -> Self {
        Self {
            store,
            key_name: key_name.into(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Name of the key attribute.
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    fn key(&self, id: &str) -> Result<ItemKey> {
        if id.is_empty() {
            return Err(Error::Validation(format!("`{}` must not be empty", self.key_name)));
        }
        Ok(ItemKey::new(self.key_name.clone(), id.to_string()))
    }

    /// Write a whole item, replacing any item with the same key. Returns the key value.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.repository.create", skip_all, err)
    )]
    pub async fn create(&self, item: Value) -> Result<String> {
        let Value::Object(fields) = &item else {
            return Err(Error::Validation("item must be a JSON object".to_string()));
        };
        let id = match fields.get(&self.key_name) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => {
                return Err(Error::Validation(format!(
                    "item must carry a non-empty string `{}`",
                    self.key_name
                )));
            }
        };
        let item: Item = serde_dynamo::to_item(item).map_err(StoreError::from)?;
        self.store.put_item(item).await?;
        Ok(id)
    }

    /// Read one item; `None` when nothing is stored under `id`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.repository.get", skip(self), err)
    )]
    pub async fn get(&self, id: &str) -> Result<Option<Value>> {
        let key = self.key(id)?;
        self.store.get_item(key).await?.map(into_value).transpose()
    }

    /// Read every item, following scan pages until the store reports no more.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.repository.list", skip_all, err)
    )]
    pub async fn list(&self) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut exclusive_start_key = None;
        loop {
            let page = self.store.scan(exclusive_start_key).await?;
            items.extend(page.items);
            exclusive_start_key = page.last_evaluated_key;
            if exclusive_start_key.is_none() {
                break;
            }
        }
        items.into_iter().map(into_value).collect()
    }

    /// Merge `patch` into the item stored under `id`.
    ///
    /// The key attribute may appear in the patch only with the value `id`, in which case it is
    /// ignored. A patch without leaves is a no-op that never reaches the store. Updating an
    /// item that does not exist fails with [`Error::NotFound`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.repository.update", skip(self, patch), err)
    )]
    pub async fn update(&self, id: &str, mut patch: Patch) -> Result<UpdateOutcome> {
        let key = self.key(id)?;
        patch.validate()?;
        let repeats_key = match patch.get(&self.key_name) {
            None | Some(PatchValue::Absent) => false,
            Some(PatchValue::Leaf(Value::String(value))) if value == id => true,
            Some(_) => {
                return Err(Error::Validation(format!(
                    "`{}` cannot be changed by an update",
                    self.key_name
                )));
            }
        };
        if repeats_key {
            patch.remove(&self.key_name);
        }
        let update = match patch.compile() {
            Ok(update) => update,
            Err(CompileError::NoFields) => return Ok(UpdateOutcome::NoOp),
            Err(error) => return Err(error.into()),
        };
        let item = match self
            .store
            .update_item(key, update, Precondition::ItemExists)
            .await
        {
            Ok(item) => item,
            Err(StoreError::ConditionFailed) => return Err(Error::NotFound(id.to_string())),
            Err(error) => return Err(error.into()),
        };
        Ok(UpdateOutcome::Updated(into_value(item)?))
    }

    /// Delete the item stored under `id`; deleting a missing item succeeds.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_item_patch.repository.delete", skip(self), err)
    )]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let key = self.key(id)?;
        self.store.delete_item(key).await?;
        Ok(())
    }
}

fn into_value(item: Item) -> Result<Value> {
    let value = serde_dynamo::from_item(item).map_err(StoreError::from)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common, store::ScanPage, store::memory::MemoryStore};

    use async_trait::async_trait;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::{self, atomic};

    #[derive(Debug, Default)]
    struct CountingStore {
        inner: MemoryStore,
        calls: atomic::AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(DEFAULT_KEY_NAME),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(atomic::Ordering::SeqCst)
        }

        fn count(&self) {
            self.calls.fetch_add(1, atomic::Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ItemStore for CountingStore {
        async fn scan(&self, exclusive_start_key: Option<Item>) -> Result<ScanPage, StoreError> {
            self.count();
            self.inner.scan(exclusive_start_key).await
        }

        async fn get_item(&self, key: ItemKey) -> Result<Option<Item>, StoreError> {
            self.count();
            self.inner.get_item(key).await
        }

        async fn put_item(&self, item: Item) -> Result<(), StoreError> {
            self.count();
            self.inner.put_item(item).await
        }

        async fn update_item(
            &self,
            key: ItemKey,
            update: common::CompiledUpdate,
            precondition: Precondition,
        ) -> Result<Item, StoreError> {
            self.count();
            self.inner.update_item(key, update, precondition).await
        }

        async fn delete_item(&self, key: ItemKey) -> Result<(), StoreError> {
            self.count();
            self.inner.delete_item(key).await
        }
    }

    fn repository() -> ItemRepository<MemoryStore> {
        ItemRepository::new(MemoryStore::new(DEFAULT_KEY_NAME), DEFAULT_KEY_NAME)
    }

    fn patch(value: Value) -> Patch {
        Patch::try_from(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let repository = repository();
        let item = json!({
            "itemId": "1",
            "name": {"first": "Jo"},
            "tags": ["a", "b"],
            "age": 42,
            "active": true,
            "note": null,
        });
        let id = repository.create(item.clone()).await.unwrap();
        assert_eq!(id, "1");
        assert_eq!(repository.get("1").await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn test_create_overwrites() {
        let repository = repository();
        repository
            .create(json!({"itemId": "1", "name": "Jo"}))
            .await
            .unwrap();
        repository
            .create(json!({"itemId": "1", "email": "jo@example.com"}))
            .await
            .unwrap();
        assert_eq!(
            repository.get("1").await.unwrap(),
            Some(json!({"itemId": "1", "email": "jo@example.com"}))
        );
    }

    #[rstest]
    #[case::not_an_object(json!(["itemId", "1"]))]
    #[case::missing_key(json!({"name": "Jo"}))]
    #[case::empty_key(json!({"itemId": ""}))]
    #[case::numeric_key(json!({"itemId": 1}))]
    #[tokio::test]
    async fn test_create_rejects(#[case] item: Value) {
        let repository = repository();
        assert!(matches!(
            repository.create(item).await,
            Err(Error::Validation(_))
        ));
        assert!(repository.store().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_nested() {
        let repository = repository();
        repository
            .create(json!({"itemId": "1", "name": {"first": "Jo"}}))
            .await
            .unwrap();
        let outcome = repository
            .update("1", patch(json!({"name": {"last": "Ng"}})))
            .await
            .unwrap();
        let expected = json!({"itemId": "1", "name": {"first": "Jo", "last": "Ng"}});
        assert_eq!(outcome, UpdateOutcome::Updated(expected.clone()));
        assert_eq!(repository.get("1").await.unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_update_replaces_arrays() {
        let repository = repository();
        repository
            .create(json!({"itemId": "1", "tags": ["a", "b", "c"]}))
            .await
            .unwrap();
        repository
            .update("1", patch(json!({"tags": ["z"]})))
            .await
            .unwrap();
        assert_eq!(repository.get("1").await.unwrap(), Some(json!({"itemId": "1", "tags": ["z"]})));
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let repository = repository();
        repository
            .create(json!({"itemId": "1", "name": {"first": "Jo"}, "visits": 1}))
            .await
            .unwrap();
        let patch = patch(json!({"name": {"last": "Ng"}, "visits": 2}));
        let once = repository.update("1", patch.clone()).await.unwrap();
        let twice = repository.update("1", patch).await.unwrap();
        assert_eq!(once, twice);
        assert_eq!(repository.get("1").await.unwrap(), once.into_item());
    }

    #[rstest]
    #[case::empty(Patch::new())]
    #[case::empty_object(patch(json!({})))]
    #[case::absent_only(Patch::new().with("email", None::<Value>))]
    #[case::empty_nested(patch(json!({"name": {}})))]
    #[case::same_key_only(patch(json!({"itemId": "1"})))]
    #[tokio::test]
    async fn test_update_without_leaves_skips_store(#[case] patch: Patch) {
        let repository = ItemRepository::new(CountingStore::new(), DEFAULT_KEY_NAME);
        let outcome = repository.update("1", patch).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::NoOp);
        assert_eq!(outcome.into_item(), None);
        assert_eq!(repository.store().calls(), 0);
    }

    #[tokio::test]
    async fn test_update_drops_matching_key() {
        let repository = repository();
        repository
            .create(json!({"itemId": "1", "name": "Jo"}))
            .await
            .unwrap();
        let outcome = repository
            .update("1", patch(json!({"itemId": "1", "name": "Ng"})))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated(json!({"itemId": "1", "name": "Ng"})));
    }

    #[rstest]
    #[case::other_id(json!({"itemId": "2", "name": "Ng"}))]
    #[case::non_string_id(json!({"itemId": 1}))]
    #[case::nested_id(json!({"itemId": {"value": "1"}}))]
    #[tokio::test]
    async fn test_update_rejects_key_change(#[case] value: Value) {
        let repository = ItemRepository::new(CountingStore::new(), DEFAULT_KEY_NAME);
        assert!(matches!(
            repository.update("1", patch(value)).await,
            Err(Error::Validation(_))
        ));
        assert_eq!(repository.store().calls(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_item_is_not_found() {
        let repository = repository();
        let error = repository
            .update("missing", patch(json!({"name": "Jo"})))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::NotFound(ref id) if id == "missing"));
        assert!(repository.store().is_empty());
    }

    #[tokio::test]
    async fn test_update_under_missing_parent_is_store_error() {
        let repository = repository();
        repository.create(json!({"itemId": "1"})).await.unwrap();
        let error = repository
            .update("1", patch(json!({"address": {"city": "Oslo"}})))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Store(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        assert_eq!(repository().get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let repository = repository();
        repository.create(json!({"itemId": "1"})).await.unwrap();
        repository.delete("1").await.unwrap();
        assert_eq!(repository.get("1").await.unwrap(), None);
        repository.delete("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected() {
        let repository = ItemRepository::new(CountingStore::new(), DEFAULT_KEY_NAME);
        assert!(matches!(
            repository.get("").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            repository.delete("").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            repository.update("", patch(json!({"a": 1}))).await,
            Err(Error::Validation(_))
        ));
        assert_eq!(repository.store().calls(), 0);
    }

    #[tokio::test]
    async fn test_shared_store() {
        let store = sync::Arc::new(CountingStore::new());
        let repository = ItemRepository::new(sync::Arc::clone(&store), DEFAULT_KEY_NAME);
        repository.create(json!({"itemId": "1"})).await.unwrap();
        repository
            .update("1", patch(json!({"name": {"first": "Jo"}})))
            .await
            .unwrap();
        assert_eq!(
            repository.list().await.unwrap(),
            vec![json!({"itemId": "1", "name": {"first": "Jo"}})]
        );
        assert_eq!(store.inner.len(), 1);
        repository.delete("1").await.unwrap();
        assert_eq!(repository.get("1").await.unwrap(), None);
        assert!(store.inner.is_empty());
        assert_eq!(store.calls(), 5);
    }

    #[rstest]
    #[case::empty(1, 0)]
    #[case::single_page(10, 3)]
    #[case::exact_pages(2, 4)]
    #[case::partial_last_page(2, 5)]
    #[case::one_per_page(1, 4)]
    #[tokio::test]
    async fn test_list_exhausts_pages(#[case] page_size: usize, #[case] count: usize) {
        let store = CountingStore {
            inner: MemoryStore::new(DEFAULT_KEY_NAME).with_page_size(page_size),
            ..Default::default()
        };
        let repository = ItemRepository::new(store, DEFAULT_KEY_NAME);
        for index in 0..count {
            repository
                .create(json!({"itemId": index.to_string(), "index": index}))
                .await
                .unwrap();
        }
        let items = repository.list().await.unwrap();
        let expected: Vec<Value> = (0..count)
            .map(|index| json!({"itemId": index.to_string(), "index": index}))
            .collect();
        assert_eq!(items, expected);
        let scans = repository.store().calls() - count;
        assert_eq!(scans, count.div_ceil(page_size).max(1));
    }
}
