use crate::patch::{Patch, PatchValue};

use indexmap::{IndexMap, map};
use serde_json::Value;
use std::fmt;

/// Address of one attribute inside an item, as a list of key segments.
///
/// Segments are kept verbatim; a segment may itself contain the `.` separator used by
/// [`Display`](fmt::Display).
///
/// ```rust
/// use dynamodb_item_patch::patch::AttributePath;
///
/// let path = AttributePath::from(vec!["address".to_string(), "city".to_string()]);
/// assert_eq!(path.to_string(), "address.city");
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AttributePath(Vec<String>);

impl AttributePath {
    /// Path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The path one level deeper.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(key.to_owned());
        Self(segments)
    }
}

impl From<Vec<String>> for AttributePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(crate::common::PATH_SEPARATOR))
    }
}

/// Lazy depth-first iterator over the leaves of a patch.
///
/// Arrays are leaves, absent values are skipped, nested objects are descended into.
#[derive(Debug)]
pub struct Leaves<'a> {
    stack: Vec<(AttributePath, map::Iter<'a, String, PatchValue>)>,
}

impl<'a> Leaves<'a> {
    pub(crate) fn with_prefix(
        fields: &'a IndexMap<String, PatchValue>,
        prefix: AttributePath,
    ) -> Self {
        Self {
            stack: vec![(prefix, fields.iter())],
        }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = (AttributePath, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (path, entries) = self.stack.last_mut()?;
            match entries.next() {
                None => {
                    self.stack.pop();
                }
                Some((_, PatchValue::Absent)) => {}
                Some((key, PatchValue::Leaf(value))) => return Some((path.child(key), value)),
                Some((key, PatchValue::Node(children))) => {
                    let child = path.child(key);
                    self.stack.push((child, children.iter()));
                }
            }
        }
    }
}

/// Flatten a patch into `(path, value)` pairs.
pub fn flatten(patch: &Patch) -> Leaves<'_> {
    Leaves::with_prefix(patch.fields(), AttributePath::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::json;

    fn collect(patch: &Patch) -> Vec<(String, Value)> {
        flatten(patch)
            .map(|(path, value)| (path.to_string(), value.clone()))
            .collect()
    }

    #[rstest]
    #[case::empty(json!({}), vec![])]
    #[case::flat(
        json!({"a": 1, "b": "x"}),
        vec![
            ("a".to_string(), json!(1)),
            ("b".to_string(), json!("x")),
        ]
    )]
    #[case::nested(
        json!({"name": {"first": "Jo", "last": "Ng"}, "age": 3}),
        vec![
            ("name.first".to_string(), json!("Jo")),
            ("name.last".to_string(), json!("Ng")),
            ("age".to_string(), json!(3)),
        ]
    )]
    #[case::deep(
        json!({"a": {"b": {"c": {"d": true}}}}),
        vec![
            ("a.b.c.d".to_string(), json!(true)),
        ]
    )]
    #[case::array_is_leaf(
        json!({"tags": [{"a": 1}, 2]}),
        vec![
            ("tags".to_string(), json!([{"a": 1}, 2])),
        ]
    )]
    #[case::null_is_leaf(
        json!({"a": null}),
        vec![
            ("a".to_string(), Value::Null),
        ]
    )]
    #[case::empty_node(
        json!({"a": {}, "b": 1}),
        vec![
            ("b".to_string(), json!(1)),
        ]
    )]
    #[case::insertion_order(
        json!({"z": 1, "a": {"y": 2, "b": 3}, "m": 4}),
        vec![
            ("z".to_string(), json!(1)),
            ("a.y".to_string(), json!(2)),
            ("a.b".to_string(), json!(3)),
            ("m".to_string(), json!(4)),
        ]
    )]
    fn test_flatten(#[case] patch: Value, #[case] expected: Vec<(String, Value)>) {
        let patch = Patch::try_from(patch).unwrap();
        assert_eq!(collect(&patch), expected);
    }

    #[test]
    fn test_flatten_skips_absent() {
        let patch = Patch::new()
            .with("a", None::<Value>)
            .with(
                "b",
                PatchValue::Node(IndexMap::from([
                    ("c".to_string(), PatchValue::Absent),
                    ("d".to_string(), PatchValue::Leaf(json!(1))),
                ])),
            )
            .with("e", Some(json!("x")));
        assert_eq!(
            collect(&patch),
            vec![
                ("b.d".to_string(), json!(1)),
                ("e".to_string(), json!("x")),
            ]
        );
    }

    #[test]
    fn test_flatten_keeps_dotted_segments() {
        let patch = Patch::try_from(json!({"a.b": {"c": 1}})).unwrap();
        let leaves: Vec<_> = flatten(&patch).collect();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].0.segments(), ["a.b", "c"]);
    }

    #[test]
    fn test_flatten_is_stable() {
        let patch = Patch::try_from(json!({"x": {"b": 1, "a": 2}, "c": [3], "d": {"e": {"f": 4}}}))
            .unwrap();
        assert_eq!(collect(&patch), collect(&patch));
    }

    #[test]
    fn test_flatten_under_prefix() {
        let patch = Patch::try_from(json!({"city": "Oslo", "geo": {"lat": 1}})).unwrap();
        let prefix = AttributePath::from(vec!["address".to_string()]);
        let paths: Vec<String> = patch
            .leaves_under(prefix)
            .map(|(path, _)| path.to_string())
            .collect();
        assert_eq!(paths, ["address.city", "address.geo.lat"]);
    }

    #[test]
    fn test_attribute_path() {
        let path = AttributePath::default().child("a").child("b");
        assert_eq!(path.len(), 2);
        assert!(!path.is_empty());
        assert!(AttributePath::default().is_empty());
        assert_eq!(path.to_string(), "a.b");
    }
}
