//! Stored records.

use std::collections::BTreeMap;

use crate::model::ModelMeta;
use crate::value::Value;

/// One row of a model: field name to value.
///
/// # Examples
///
/// ```
/// use thanos_db::record::Record;
/// use thanos_db::value::Value;
///
/// let record = Record::new().with("id", 3).with("name", "Ann");
/// assert_eq!(record.get("name"), Some(&Value::from("Ann")));
/// assert_eq!(record.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets a field's value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(field.into(), value.into());
    }

    /// Returns a field's value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Removes a field.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.values.remove(field)
    }

    /// Returns the primary key value under `meta`'s key field.
    pub fn pk(&self, meta: &ModelMeta) -> Option<i64> {
        self.get(meta.pk_name()).and_then(Value::as_int)
    }

    /// Copies every field of `other` into this record.
    pub fn merge(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    /// Iterates over `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of fields set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Renders a field for display, using the choice label when one exists.
    ///
    /// Missing fields render as the empty string.
    pub fn display_value(&self, meta: &ModelMeta, field: &str) -> String {
        let Some(value) = self.get(field) else {
            return String::new();
        };
        meta.get_field(field)
            .ok()
            .and_then(|def| def.choice_label(value))
            .map_or_else(|| value.to_string(), str::to_string)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
