//! Equality filters built from request parameters.

use thanos_core::ThanosResult;

use crate::model::ModelMeta;
use crate::record::Record;
use crate::value::Value;

/// A conjunction of `field == value` conditions.
///
/// # Examples
///
/// ```
/// use thanos_db::filter::Filter;
/// use thanos_db::fields::{FieldDef, FieldType};
/// use thanos_db::model::ModelMeta;
/// use thanos_db::record::Record;
///
/// let meta = ModelMeta::new("crm", "customer")
///     .field(FieldDef::new("age", FieldType::IntegerField));
///
/// let filter = Filter::from_params(&meta, [("age", "30"), ("page", "2")]).unwrap();
/// assert!(filter.matches(&Record::new().with("age", 30)));
/// assert!(!filter.matches(&Record::new().with("age", 31)));
/// assert!(Filter::from_params(&meta, [("colour", "red")]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// Parameters that control the listing rather than filter it.
    pub const RESERVED_PARAMS: &'static [&'static str] = &["page"];

    /// A filter that matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds a condition.
    #[must_use]
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        self.conditions.retain(|(f, _)| *f != field);
        self.conditions.push((field, value.into()));
        self
    }

    /// Builds a filter from raw `(key, value)` request parameters.
    ///
    /// Reserved parameters are skipped. Every other key must name a field of
    /// `meta` and its value must convert to that field's type. When a key
    /// repeats, the last value wins.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::FieldError`](thanos_core::ThanosError::FieldError)
    /// for an unknown field or an unconvertible value.
    pub fn from_params<'a>(
        meta: &ModelMeta,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> ThanosResult<Self> {
        let mut filter = Self::all();
        for (key, raw) in params {
            if Self::RESERVED_PARAMS.contains(&key) {
                continue;
            }
            let value = meta.get_field(key)?.to_value(raw)?;
            filter = filter.and(key, value);
        }
        Ok(filter)
    }

    /// Returns `true` if `record` satisfies every condition.
    ///
    /// A condition on a field the record lacks only matches `Null`.
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            record
                .get(field)
                .map_or_else(|| expected.is_null(), |actual| actual == expected)
        })
    }

    /// Returns `true` if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The conditions in order.
    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }
}
