//! # thanos-forms
//!
//! Forms for the thanos console, generated from model metadata.
//!
//! ## Modules
//!
//! - [`fields`] - Form field types and value cleaning
//! - [`widgets`] - HTML widgets
//! - [`model_form`] - Model-backed forms: generation, binding, saving, rendering

pub mod fields;
pub mod model_form;
pub mod widgets;

pub use fields::{FormFieldDef, FormFieldType};
pub use model_form::{generate_form_fields, ModelForm, ModelFormConfig, ModelFormFields};
pub use widgets::WidgetType;
