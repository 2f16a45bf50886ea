//! Forms generated from model metadata.
//!
//! [`ModelFormConfig`] says which fields of a [`ModelMeta`] a form exposes and
//! how they are labelled. [`generate_form_fields`] turns the model's
//! [`FieldDef`]s into [`FormFieldDef`]s, and [`ModelForm`] binds submitted
//! data, cleans it, renders it, and saves it through a [`ModelStore`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thanos_core::{ThanosError, ThanosResult, ValidationError};
use thanos_db::fields::{FieldDef, FieldType};
use thanos_db::model::ModelMeta;
use thanos_db::record::Record;
use thanos_db::store::ModelStore;
use thanos_db::value::Value;
use thanos_http::QueryDict;

use crate::fields::{FormFieldDef, FormFieldType};
use crate::widgets::WidgetType;

/// Which model fields a form includes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModelFormFields {
    /// Every editable field.
    #[default]
    All,
    /// Only the named fields.
    Include(Vec<String>),
    /// Every editable field except the named ones.
    Exclude(Vec<String>),
}

/// How to build a form for a model.
///
/// # Examples
///
/// ```
/// use thanos_forms::model_form::{ModelFormConfig, ModelFormFields};
///
/// let config = ModelFormConfig::new()
///     .with_fields(ModelFormFields::Exclude(vec!["notes".into()]))
///     .with_label("name", "Full name");
/// assert_eq!(config.labels["name"], "Full name");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelFormConfig {
    /// Which model fields to include.
    pub fields: ModelFormFields,
    /// Widget overrides keyed by field name.
    pub widgets: HashMap<String, WidgetType>,
    /// Label overrides keyed by field name.
    pub labels: HashMap<String, String>,
    /// Help text overrides keyed by field name.
    pub help_texts: HashMap<String, String>,
}

impl ModelFormConfig {
    /// A configuration including every editable field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets which fields to include.
    #[must_use]
    pub fn with_fields(mut self, fields: ModelFormFields) -> Self {
        self.fields = fields;
        self
    }

    /// Overrides one field's widget.
    #[must_use]
    pub fn with_widget(mut self, field_name: impl Into<String>, widget: WidgetType) -> Self {
        self.widgets.insert(field_name.into(), widget);
        self
    }

    /// Overrides one field's label.
    #[must_use]
    pub fn with_label(mut self, field_name: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(field_name.into(), label.into());
        self
    }

    /// Overrides one field's help text.
    #[must_use]
    pub fn with_help_text(
        mut self,
        field_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.help_texts.insert(field_name.into(), text.into());
        self
    }

    fn includes(&self, name: &str) -> bool {
        match &self.fields {
            ModelFormFields::All => true,
            ModelFormFields::Include(names) => names.iter().any(|n| n == name),
            ModelFormFields::Exclude(names) => !names.iter().any(|n| n == name),
        }
    }
}

/// Generates form fields for `meta` in model field order.
///
/// Primary keys and non-editable fields are skipped. A field is required
/// unless it is nullable, blank, or has a default.
pub fn generate_form_fields(meta: &ModelMeta, config: &ModelFormConfig) -> Vec<FormFieldDef> {
    meta.fields()
        .iter()
        .filter(|f| f.editable && !f.primary_key && config.includes(&f.name))
        .map(|model_field| {
            let mut form_field = model_field_to_form_field(model_field);
            if let Some(widget) = config.widgets.get(&model_field.name) {
                form_field.widget = *widget;
            }
            if let Some(label) = config.labels.get(&model_field.name) {
                form_field.label.clone_from(label);
            }
            if let Some(text) = config.help_texts.get(&model_field.name) {
                form_field.help_text.clone_from(text);
            }
            form_field
        })
        .collect()
}

fn model_field_to_form_field(field: &FieldDef) -> FormFieldDef {
    let field_type = match (&field.choices, field.field_type) {
        (Some(choices), _) => FormFieldType::Choice {
            choices: choices.clone(),
        },
        (None, FieldType::CharField) => FormFieldType::Char {
            max_length: field.max_length,
        },
        (None, FieldType::TextField) => FormFieldType::Text,
        (None, FieldType::IntegerField | FieldType::AutoField | FieldType::BigAutoField) => {
            FormFieldType::Integer
        }
        (None, FieldType::FloatField) => FormFieldType::Float,
        (None, FieldType::BooleanField) => FormFieldType::Boolean,
        (None, FieldType::DateField) => FormFieldType::Date,
        (None, FieldType::EmailField) => FormFieldType::Email,
    };
    let is_boolean = matches!(field_type, FormFieldType::Boolean);

    let mut form_field = FormFieldDef::new(field.name.clone(), field_type)
        .label(field.verbose_name.clone())
        .help_text(field.help_text.clone());
    if !is_boolean {
        form_field =
            form_field.required(!field.null && !field.blank && field.default.is_none());
    }
    if field.null {
        form_field.empty_value = Value::Null;
    }
    if let Some(default) = &field.default {
        form_field = form_field.initial(default.clone());
    }
    form_field
}

/// A form bound to one model.
///
/// An unbound form renders initial values, or the instance's values when
/// editing. Binding data and calling [`is_valid`](Self::is_valid) runs every
/// field's cleaning and fills [`errors`](Self::errors) and
/// [`cleaned_data`](Self::cleaned_data).
#[derive(Debug, Clone)]
pub struct ModelForm {
    meta: Arc<ModelMeta>,
    fields: Vec<FormFieldDef>,
    instance: Option<Record>,
    data: Option<HashMap<String, Option<String>>>,
    errors: BTreeMap<String, Vec<String>>,
    cleaned_data: Record,
    cleaned: bool,
}

impl ModelForm {
    /// Creates an unbound form for `meta`.
    pub fn new(meta: Arc<ModelMeta>, config: &ModelFormConfig) -> Self {
        let fields = generate_form_fields(&meta, config);
        Self {
            meta,
            fields,
            instance: None,
            data: None,
            errors: BTreeMap::new(),
            cleaned_data: Record::new(),
            cleaned: false,
        }
    }

    /// Attaches an existing record; saving then updates it.
    #[must_use]
    pub fn with_instance(mut self, record: Record) -> Self {
        self.instance = Some(record);
        self
    }

    /// Binds submitted data. Previous cleaning results are discarded.
    pub fn bind(&mut self, data: &QueryDict) {
        let values = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.widget.value_from_data(data, &f.name)))
            .collect();
        self.data = Some(values);
        self.errors.clear();
        self.cleaned_data = Record::new();
        self.cleaned = false;
    }

    /// Returns `true` once data has been bound.
    pub const fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    /// The form's fields in order.
    pub fn fields(&self) -> &[FormFieldDef] {
        &self.fields
    }

    /// The model this form edits.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// The record being edited, if any.
    pub const fn instance(&self) -> Option<&Record> {
        self.instance.as_ref()
    }

    /// Cleans every field. Unbound forms are never valid.
    pub fn is_valid(&mut self) -> bool {
        self.full_clean();
        self.is_bound() && self.errors.is_empty()
    }

    fn full_clean(&mut self) {
        if self.cleaned {
            return;
        }
        let Some(data) = &self.data else {
            return;
        };
        for field in &self.fields {
            let raw = data.get(&field.name).and_then(Option::as_deref);
            match field.clean(raw) {
                Ok(value) => self.cleaned_data.set(field.name.clone(), value),
                Err(messages) => {
                    self.errors.insert(field.name.clone(), messages);
                }
            }
        }
        self.cleaned = true;
    }

    /// Per-field error messages from the last cleaning.
    pub const fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Values of the fields that cleaned successfully.
    pub const fn cleaned_data(&self) -> &Record {
        &self.cleaned_data
    }

    /// Saves a valid form: creates a record, or updates the instance.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::ValidationError`] when the form is unbound or
    /// invalid, or the store's error when the write fails.
    pub async fn save(&mut self, store: &dyn ModelStore) -> ThanosResult<Record> {
        if !self.is_valid() {
            let mut error = ValidationError::with_field_errors(self.errors.clone());
            if !self.is_bound() {
                error.message = "The form has no data bound to it.".to_string();
            }
            return Err(ThanosError::ValidationError(error));
        }
        self.write(store, self.cleaned_data.clone()).await
    }

    /// Writes only the fields that cleaned successfully.
    ///
    /// Fields that failed cleaning are skipped and logged. An unbound form
    /// writes nothing beyond what the store requires.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the write fails.
    pub async fn save_partial(&mut self, store: &dyn ModelStore) -> ThanosResult<Record> {
        self.full_clean();
        for (field, messages) in &self.errors {
            tracing::warn!(
                model = %self.meta.model_key(),
                field = %field,
                errors = ?messages,
                "skipping invalid field"
            );
        }
        self.write(store, self.cleaned_data.clone()).await
    }

    async fn write(&self, store: &dyn ModelStore, values: Record) -> ThanosResult<Record> {
        match self.instance.as_ref().and_then(|r| r.pk(&self.meta)) {
            Some(pk) => store.update(&self.meta, pk, values).await,
            None => store.create(&self.meta, values).await,
        }
    }

    fn display_value(&self, field: &FormFieldDef) -> Option<String> {
        if let Some(data) = &self.data {
            return data.get(&field.name).cloned().flatten();
        }
        self.instance
            .as_ref()
            .and_then(|r| r.get(&field.name))
            .or(field.initial.as_ref())
            .filter(|v| !v.is_null())
            .map(|v| match (field.widget, v) {
                (WidgetType::CheckboxInput, Value::Bool(b)) => {
                    String::from(if *b { "on" } else { "" })
                }
                _ => v.to_string(),
            })
    }

    /// Renders every field as a labelled paragraph with its error list.
    pub fn as_html(&self) -> String {
        let mut html = String::new();
        for field in &self.fields {
            let value = self.display_value(field);
            let mut choices = field.choice_options();
            if !choices.is_empty() && !field.required {
                choices.insert(0, (String::new(), "---------".to_string()));
            }
            let mut attrs = BTreeMap::new();
            if field.required {
                attrs.insert("required".to_string(), "required".to_string());
            }

            html.push_str("<p>");
            if let Some(messages) = self.errors.get(&field.name) {
                html.push_str(&error_list(messages));
            }
            html.push_str(&format!(
                r#"<label for="{}">{}:</label> "#,
                field.widget.id_for_label(&field.name),
                thanos_core::html::escape_html(&field.label)
            ));
            html.push_str(&field.widget.render(
                &field.name,
                value.as_deref(),
                &choices,
                &attrs,
            ));
            if !field.help_text.is_empty() {
                html.push_str(&format!(
                    r#" <span class="helptext">{}</span>"#,
                    thanos_core::html::escape_html(&field.help_text)
                ));
            }
            html.push_str("</p>\n");
        }
        html
    }
}

fn error_list(messages: &[String]) -> String {
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", thanos_core::html::escape_html(m)))
        .collect();
    format!(r#"<ul class="errorlist">{items}</ul>"#)
}
