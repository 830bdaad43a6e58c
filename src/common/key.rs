use crate::patch::CompileError;

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Partition key of an item.
///
/// ```rust
/// use dynamodb_item_patch::common::key;
///
/// let key = key::Key {
///     name: "itemId".to_string(),
///     value: "1".to_string(),
/// };
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

impl<T> Key<T> {
    /// Build a key from its attribute name and value.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl<T: Serialize> TryFrom<Key<T>> for collections::HashMap<String, types::AttributeValue> {
    type Error = CompileError;

    fn try_from(key: Key<T>) -> Result<Self, Self::Error> {
        let value = to_attribute_value(key.value).map_err(|source| CompileError::Value {
            path: key.name.clone(),
            source,
        })?;
        Ok(Self::from([(key.name, value)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case::string(
        Key {
            name: "itemId".to_string(),
            value: Value::String(
                "b".to_string()
            ),
        },
        collections::HashMap::from(
            [(
                "itemId".to_string(),
                types::AttributeValue::S(
                    "b".to_string()
                ),
            )]
        )
    )]
    #[case::number(
        Key {
            name: "a".to_string(),
            value: Value::Number(
                42.into()
            ),
        },
        collections::HashMap::from(
            [(
                "a".to_string(),
                types::AttributeValue::N(
                    "42".to_string()
                ),
            )]
        )
    )]
    fn test_key_to_hash_map(
        #[case] key: Key<Value>,
        #[case] expected: collections::HashMap<String, types::AttributeValue>,
    ) {
        let actual: collections::HashMap<String, types::AttributeValue> = key.try_into().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_key_new() {
        let key = Key::new("itemId", "1".to_string());
        assert_eq!(key.name, "itemId");
        assert_eq!(key.value, "1");
    }
}
