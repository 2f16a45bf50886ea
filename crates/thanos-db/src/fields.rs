//! Field definitions.
//!
//! [`FieldType`] names the kind of data a model field holds; [`FieldDef`]
//! carries the rest of a field's metadata. Both are read by the console to
//! build list headers, filters, and forms.

use thanos_core::{ThanosError, ThanosResult};

use crate::value::Value;

/// The type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FieldType {
    /// Auto-incrementing 32-bit integer primary key.
    AutoField,
    /// Auto-incrementing 64-bit integer primary key.
    BigAutoField,
    /// Bounded string (see [`FieldDef::max_length`]).
    CharField,
    /// Unbounded text.
    TextField,
    /// Signed integer.
    IntegerField,
    /// Floating-point number.
    FloatField,
    /// Boolean.
    BooleanField,
    /// Calendar date, written `YYYY-MM-DD`.
    DateField,
    /// Email address.
    EmailField,
}

impl FieldType {
    /// Returns `true` for auto-incrementing key types.
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::AutoField | Self::BigAutoField)
    }
}

/// Complete definition of a model field.
///
/// # Examples
///
/// ```
/// use thanos_db::fields::{FieldDef, FieldType};
///
/// let field = FieldDef::new("first_name", FieldType::CharField)
///     .max_length(32)
///     .verbose_name("First name");
/// assert_eq!(field.verbose_name, "First name");
/// assert!(field.editable);
/// ```
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// The attribute name of this field.
    pub name: String,
    /// The type of this field.
    pub field_type: FieldType,
    /// Whether this field is the primary key.
    pub primary_key: bool,
    /// Whether an empty value is stored as `Null`.
    pub null: bool,
    /// Whether the field may be left blank in forms.
    pub blank: bool,
    /// Default value for new records.
    pub default: Option<Value>,
    /// Maximum character length.
    pub max_length: Option<usize>,
    /// Human-readable help text.
    pub help_text: String,
    /// Human-readable name for the field.
    pub verbose_name: String,
    /// Allowed values as `(value, display_label)` pairs.
    pub choices: Option<Vec<(Value, String)>>,
    /// Whether the field appears in generated forms.
    pub editable: bool,
}

impl FieldDef {
    /// Creates a new `FieldDef` with defaults.
    ///
    /// The verbose name defaults to the field name with underscores replaced
    /// by spaces. Auto fields are not editable.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            verbose_name: name.replace('_', " "),
            name,
            field_type,
            primary_key: false,
            null: false,
            blank: false,
            default: None,
            max_length: None,
            help_text: String::new(),
            choices: None,
            editable: !field_type.is_auto(),
        }
    }

    /// Marks this field as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Allows null values.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    /// Allows blank form input.
    #[must_use]
    pub const fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    /// Sets the maximum character length.
    #[must_use]
    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the verbose name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Restricts the field to the given `(value, label)` choices.
    #[must_use]
    pub fn choices<V: Into<Value>, L: Into<String>>(
        mut self,
        choices: impl IntoIterator<Item = (V, L)>,
    ) -> Self {
        self.choices = Some(
            choices
                .into_iter()
                .map(|(v, l)| (v.into(), l.into()))
                .collect(),
        );
        self
    }

    /// Hides the field from generated forms.
    #[must_use]
    pub const fn not_editable(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Returns the display label for `value` if the field has choices.
    pub fn choice_label(&self, value: &Value) -> Option<&str> {
        self.choices
            .as_ref()?
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, label)| label.as_str())
    }

    /// Converts a raw string, as found in a query string, to this field's value type.
    ///
    /// An empty string becomes `Null` for nullable fields.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::FieldError`] when the string cannot be read as
    /// the field's type.
    pub fn to_value(&self, raw: &str) -> ThanosResult<Value> {
        if raw.is_empty() && self.null {
            return Ok(Value::Null);
        }

        let invalid = || {
            ThanosError::FieldError(format!(
                "Invalid value '{raw}' for field '{}'",
                self.name
            ))
        };

        match self.field_type {
            FieldType::AutoField | FieldType::BigAutoField | FieldType::IntegerField => {
                raw.trim().parse::<i64>().map(Value::Int).map_err(|_| invalid())
            }
            FieldType::FloatField => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid()),
            FieldType::BooleanField => match raw.trim().to_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Ok(Value::Bool(true)),
                "false" | "0" | "off" | "no" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            FieldType::DateField => chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| invalid()),
            FieldType::CharField | FieldType::TextField | FieldType::EmailField => {
                Ok(Value::String(raw.to_string()))
            }
        }
    }
}
