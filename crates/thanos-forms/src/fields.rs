//! Form field definitions and type-level cleaning.
//!
//! Each [`FormFieldDef`] describes one form input: its type, label, widget,
//! and whether it is required. [`FormFieldDef::clean`] turns the raw submitted
//! string into a typed [`Value`] or a list of error messages.

use std::sync::OnceLock;

use regex::Regex;

use thanos_db::value::Value;

use crate::widgets::WidgetType;

/// The type of a form field, with its type-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldType {
    /// Single-line text.
    Char {
        /// Maximum length in characters.
        max_length: Option<usize>,
    },
    /// Multi-line text.
    Text,
    /// Whole number.
    Integer,
    /// Floating-point number.
    Float,
    /// Checkbox; absent means `false`.
    Boolean,
    /// Date in `YYYY-MM-DD` form.
    Date,
    /// Email address.
    Email,
    /// One of a fixed set of values. The submitted string is matched against
    /// each value's display form.
    Choice {
        /// `(value, label)` pairs.
        choices: Vec<(Value, String)>,
    },
}

/// Complete definition of a form field.
#[derive(Debug, Clone)]
pub struct FormFieldDef {
    /// The field name (HTML `name` attribute).
    pub name: String,
    /// The field type.
    pub field_type: FormFieldType,
    /// Whether an empty submission is an error.
    pub required: bool,
    /// Initial value for unbound forms.
    pub initial: Option<Value>,
    /// Value produced by an empty, non-required submission.
    pub empty_value: Value,
    /// Help text displayed next to the input.
    pub help_text: String,
    /// Human-readable label.
    pub label: String,
    /// The widget used for rendering.
    pub widget: WidgetType,
}

impl FormFieldDef {
    /// Creates a required field with the default widget for its type.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let widget = default_widget_for_field_type(&field_type);
        let empty_value = match field_type {
            FormFieldType::Char { .. } | FormFieldType::Text | FormFieldType::Email => {
                Value::String(String::new())
            }
            FormFieldType::Boolean => Value::Bool(false),
            _ => Value::Null,
        };
        Self {
            label: name.replace('_', " "),
            name,
            required: !matches!(field_type, FormFieldType::Boolean),
            field_type,
            initial: None,
            empty_value,
            help_text: String::new(),
            widget,
        }
    }

    /// Sets whether the field is required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn initial(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Sets the widget.
    #[must_use]
    pub const fn widget(mut self, widget: WidgetType) -> Self {
        self.widget = widget;
        self
    }

    /// Returns the `(value, label)` pairs for choice fields, as strings.
    pub fn choice_options(&self) -> Vec<(String, String)> {
        match &self.field_type {
            FormFieldType::Choice { choices } => choices
                .iter()
                .map(|(v, l)| (v.to_string(), l.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Cleans a raw submitted value.
    ///
    /// `None` means the key was absent from the submission.
    pub fn clean(&self, raw: Option<&str>) -> Result<Value, Vec<String>> {
        if matches!(self.field_type, FormFieldType::Boolean) {
            let checked = raw.is_some_and(|v| {
                matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
            });
            if self.required && !checked {
                return Err(vec!["This field is required.".to_string()]);
            }
            return Ok(Value::Bool(checked));
        }

        let raw_str = raw.unwrap_or("");
        let trimmed = raw_str.trim();
        if trimmed.is_empty() {
            if self.required {
                return Err(vec!["This field is required.".to_string()]);
            }
            return Ok(self.empty_value.clone());
        }

        match &self.field_type {
            FormFieldType::Char { max_length } => {
                let count = trimmed.chars().count();
                match max_length {
                    Some(max) if count > *max => Err(vec![format!(
                        "Ensure this value has at most {max} characters (it has {count})."
                    )]),
                    _ => Ok(Value::String(trimmed.to_string())),
                }
            }
            FormFieldType::Text => Ok(Value::String(raw_str.to_string())),
            FormFieldType::Integer => trimmed
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| vec!["Enter a whole number.".to_string()]),
            FormFieldType::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Float)
                .ok_or_else(|| vec!["Enter a number.".to_string()]),
            FormFieldType::Date => chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| vec!["Enter a valid date.".to_string()]),
            FormFieldType::Email => {
                if email_regex().is_match(trimmed) {
                    Ok(Value::String(trimmed.to_string()))
                } else {
                    Err(vec!["Enter a valid email address.".to_string()])
                }
            }
            FormFieldType::Choice { choices } => choices
                .iter()
                .find(|(value, _)| value.to_string() == trimmed)
                .map(|(value, _)| value.clone())
                .ok_or_else(|| {
                    vec![format!(
                        "Select a valid choice. {trimmed} is not one of the available choices."
                    )]
                }),
            FormFieldType::Boolean => Ok(Value::Bool(true)),
        }
    }
}

/// Returns the default widget for a field type.
pub const fn default_widget_for_field_type(field_type: &FormFieldType) -> WidgetType {
    match field_type {
        FormFieldType::Char { .. } => WidgetType::TextInput,
        FormFieldType::Text => WidgetType::Textarea,
        FormFieldType::Integer | FormFieldType::Float => WidgetType::NumberInput,
        FormFieldType::Boolean => WidgetType::CheckboxInput,
        FormFieldType::Date => WidgetType::DateInput,
        FormFieldType::Email => WidgetType::EmailInput,
        FormFieldType::Choice { .. } => WidgetType::Select,
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
            .expect("email regex is valid")
    })
}
