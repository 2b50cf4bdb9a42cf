use serde_json::{Map, Value};

/// Shallow, right-biased merge of partial records.
///
/// A field set on `other` replaces the field on `self` wholesale; nested values
/// (header maps, forms) are never combined.
pub trait Merge: Sized {
    fn merge(self, other: Self) -> Self;

    /// Fold `records` left to right on top of `self`.
    fn merge_all<I>(self, records: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        records.into_iter().fold(self, Merge::merge)
    }
}

impl Merge for Map<String, Value> {
    fn merge(mut self, other: Self) -> Self {
        for (key, value) in other {
            self.insert(key, value);
        }
        self
    }
}

/// Merge JSON objects left to right. Non-object inputs are ignored.
pub fn merge_objects<'a, I>(records: I) -> Map<String, Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    records
        .into_iter()
        .filter_map(Value::as_object)
        .cloned()
        .fold(Map::new(), Merge::merge)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn later_records_win_key_by_key() {
        let a = json!({"a": 1, "b": 2});
        let b = json!({"b": 3, "c": 4});
        let merged = merge_objects([&a, &b]);
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn nested_objects_are_replaced_not_combined() {
        let a = json!({"headers": {"User-Agent": "x", "Accept": "y"}});
        let b = json!({"headers": {"Accept": "z"}});
        let merged = merge_objects([&a, &b]);
        assert_eq!(merged["headers"], json!({"Accept": "z"}));
    }

    #[test]
    fn empty_and_non_object_inputs_contribute_nothing() {
        let a = json!({"a": 1});
        let merged = merge_objects([&a, &Value::Null, &json!({})]);
        assert_eq!(Value::Object(merged), json!({"a": 1}));
        assert!(merge_objects(std::iter::empty()).is_empty());
    }

    #[test]
    fn merge_all_folds_in_order() {
        let base = json!({"k": "base"}).as_object().cloned().unwrap_or_default();
        let first = json!({"k": "first", "x": true}).as_object().cloned().unwrap_or_default();
        let second = json!({"k": "second"}).as_object().cloned().unwrap_or_default();
        let merged = base.merge_all([first, second]);
        assert_eq!(merged["k"], json!("second"));
        assert_eq!(merged["x"], json!(true));
    }
}
