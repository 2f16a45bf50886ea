//! Model metadata.
//!
//! [`ModelMeta`] describes one model: its app label, model name, verbose
//! names, ordered fields, primary key, and the field used for a record's
//! string form. The console derives URL names, list headers, filters, and
//! forms from it.

use thanos_core::{ThanosError, ThanosResult};

use crate::fields::{FieldDef, FieldType};
use crate::record::Record;

/// Metadata about a model.
///
/// A new model starts with an auto-incrementing `id` primary key. Adding a
/// field marked as primary key replaces it.
///
/// # Examples
///
/// ```
/// use thanos_db::fields::{FieldDef, FieldType};
/// use thanos_db::model::ModelMeta;
///
/// let meta = ModelMeta::new("crm", "customer")
///     .with_verbose_name("customer")
///     .field(FieldDef::new("name", FieldType::CharField).max_length(32))
///     .str_field("name");
///
/// assert_eq!(meta.model_key(), "crm.customer");
/// assert_eq!(meta.pk_name(), "id");
/// assert_eq!(meta.fields().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ModelMeta {
    app_label: String,
    model_name: String,
    verbose_name: String,
    verbose_name_plural: String,
    fields: Vec<FieldDef>,
    str_field: Option<String>,
}

impl ModelMeta {
    /// Creates metadata for `app_label.model_name` with an `id` primary key.
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        let model_name = model_name.into().to_lowercase();
        Self {
            app_label: app_label.into(),
            verbose_name: model_name.clone(),
            verbose_name_plural: format!("{model_name}s"),
            model_name,
            fields: vec![FieldDef::new("id", FieldType::AutoField)
                .primary_key()
                .verbose_name("ID")],
            str_field: None,
        }
    }

    /// Sets the singular verbose name; the plural follows unless set explicitly.
    #[must_use]
    pub fn with_verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self.verbose_name_plural = format!("{}s", self.verbose_name);
        self
    }

    /// Sets the plural verbose name.
    #[must_use]
    pub fn with_verbose_name_plural(mut self, name: impl Into<String>) -> Self {
        self.verbose_name_plural = name.into();
        self
    }

    /// Appends a field. A primary-key field replaces the current key.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        if field.primary_key {
            self.fields.retain(|f| !f.primary_key);
            self.fields.insert(0, field);
        } else {
            self.fields.retain(|f| f.name != field.name);
            self.fields.push(field);
        }
        self
    }

    /// Names the field whose value is a record's string form.
    #[must_use]
    pub fn str_field(mut self, name: impl Into<String>) -> Self {
        self.str_field = Some(name.into());
        self
    }

    /// The application label.
    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    /// The lowercase model name.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// The singular verbose name.
    pub fn verbose_name(&self) -> &str {
        &self.verbose_name
    }

    /// The plural verbose name.
    pub fn verbose_name_plural(&self) -> &str {
        &self.verbose_name_plural
    }

    /// The fields in declaration order, primary key first.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// The registry key, `app_label.model_name`.
    pub fn model_key(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// Looks up a field by name.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::FieldError`] if the model has no such field.
    pub fn get_field(&self, name: &str) -> ThanosResult<&FieldDef> {
        self.fields.iter().find(|f| f.name == name).ok_or_else(|| {
            ThanosError::FieldError(format!(
                "{} has no field named '{name}'",
                self.model_key()
            ))
        })
    }

    /// The primary-key field.
    pub fn pk_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// The primary-key field name; `id` when none is declared.
    pub fn pk_name(&self) -> &str {
        self.pk_field().map_or("id", |f| f.name.as_str())
    }

    /// A record's string form.
    ///
    /// Uses the configured string field when it holds a value, otherwise
    /// `"{verbose_name} object ({pk})"`.
    pub fn display(&self, record: &Record) -> String {
        if let Some(value) = self
            .str_field
            .as_deref()
            .and_then(|name| record.get(name))
            .filter(|v| !v.is_null())
        {
            return value.to_string();
        }
        let pk = record
            .pk(self)
            .map_or_else(|| "None".to_string(), |pk| pk.to_string());
        format!("{} object ({pk})", self.verbose_name)
    }
}
