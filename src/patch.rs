//! Partial updates and their compilation into DynamoDB update expressions.
//!
//! A [`Patch`] is a partial, possibly nested item with merge semantics: nested objects are
//! merged attribute by attribute, every other value (primitives, `null`, arrays) replaces the
//! stored value wholesale. Compilation happens in two steps:
//! - [`flatten`] walks the patch depth-first and yields one `(path, value)` pair per leaf
//! - [`assemble`] turns those pairs into a [`CompiledUpdate`](crate::common::CompiledUpdate)

/// Expression assembly from flattened leaves.
pub mod assemble;

/// Depth-first flattening of a patch into attribute paths.
pub mod flatten;

pub use assemble::{CompileError, assemble};
pub use flatten::{AttributePath, Leaves, flatten};

use crate::common;

use indexmap::IndexMap;
use serde_json::Value;

/// Errors raised when a value cannot be used as a patch.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum PatchError {
    /// The patch root is not a JSON object.
    #[error("patch must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    /// An attribute name is empty.
    #[error("attribute names must not be empty (under `{0}`)")]
    EmptyKey(String),
}

/// A value inside a patch.
///
/// ```rust
/// use dynamodb_item_patch::patch::PatchValue;
/// use serde_json::json;
///
/// let node = PatchValue::from(json!({"city": "Oslo"}));
/// let absent = PatchValue::from(None::<String>);
/// assert!(matches!(node, PatchValue::Node(_)));
/// assert_eq!(absent, PatchValue::Absent);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum PatchValue {
    /// Key present but intentionally unset: contributes nothing to the update.
    Absent,
    /// Primitive or array value, written as is.
    Leaf(Value),
    /// Nested attributes, merged into the stored map.
    Node(IndexMap<String, PatchValue>),
}

impl From<Value> for PatchValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Node(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            value => Self::Leaf(value),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($primitive:ty),* $(,)?) => {
        $(
            impl From<$primitive> for PatchValue {
                fn from(value: $primitive) -> Self {
                    Self::Leaf(Value::from(value))
                }
            }
        )*
    };
}

impl_from_primitive!(String, &str, bool, i32, i64, u32, u64, f32, f64);

impl<T: Into<PatchValue>> From<Option<T>> for PatchValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl From<Patch> for PatchValue {
    fn from(patch: Patch) -> Self {
        Self::Node(patch.fields)
    }
}

/// Partial item applied with merge semantics.
///
/// ```rust
/// use dynamodb_item_patch::patch::Patch;
/// use serde_json::json;
///
/// let patch = Patch::new()
///     .with("email", json!("jo@example.com"))
///     .with("phone", None::<String>)
///     .with("name", json!({"last": "Ng"}));
/// let paths: Vec<String> = patch.leaves().map(|(path, _)| path.to_string()).collect();
/// assert_eq!(paths, ["email", "name.last"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    fields: IndexMap<String, PatchValue>,
}

impl Patch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level attribute, keeping insertion order.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PatchValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Top-level attribute by name.
    pub fn get(&self, key: &str) -> Option<&PatchValue> {
        self.fields.get(key)
    }

    /// Remove a top-level attribute, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<PatchValue> {
        self.fields.shift_remove(key)
    }

    /// Whether the patch has no top-level attributes at all.
    ///
    /// A non-empty patch may still flatten to nothing.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Top-level attributes.
    pub fn fields(&self) -> &IndexMap<String, PatchValue> {
        &self.fields
    }

    /// Leaves of the patch, depth-first in insertion order.
    pub fn leaves(&self) -> Leaves<'_> {
        flatten(self)
    }

    /// Leaves of the patch with every path rooted under `prefix`.
    pub fn leaves_under(&self, prefix: AttributePath) -> Leaves<'_> {
        Leaves::with_prefix(&self.fields, prefix)
    }

    /// Check that every attribute name is non-empty.
    pub fn validate(&self) -> Result<(), PatchError> {
        validate_fields(&self.fields, &AttributePath::default())
    }

    /// Compile the patch into an update expression.
    ///
    /// Fails with [`CompileError::NoFields`] when no leaf survives flattening.
    pub fn compile(&self) -> Result<common::CompiledUpdate, CompileError> {
        assemble(self.leaves())
    }
}

fn validate_fields(
    fields: &IndexMap<String, PatchValue>,
    path: &AttributePath,
) -> Result<(), PatchError> {
    for (key, value) in fields {
        if key.is_empty() {
            return Err(PatchError::EmptyKey(path.to_string()));
        }
        if let PatchValue::Node(children) = value {
            validate_fields(children, &path.child(key))?;
        }
    }
    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl TryFrom<Value> for Patch {
    type Error = PatchError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(PatchError::NotAnObject(kind(&value)));
        };
        let patch: Self = map
            .into_iter()
            .map(|(key, value)| (key, PatchValue::from(value)))
            .collect();
        patch.validate()?;
        Ok(patch)
    }
}

impl FromIterator<(String, PatchValue)> for Patch {
    fn from_iter<I: IntoIterator<Item = (String, PatchValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
