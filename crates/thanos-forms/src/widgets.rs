//! HTML widgets for form fields.
//!
//! A [`WidgetType`] knows how to render its element for a field name and a
//! current value, and how to pull the raw value back out of submitted data.

use std::collections::BTreeMap;
use std::fmt;

use thanos_core::html::escape_html;
use thanos_http::QueryDict;

/// The built-in widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetType {
    /// `<input type="text">`.
    TextInput,
    /// `<input type="number">`.
    NumberInput,
    /// `<input type="email">`.
    EmailInput,
    /// `<input type="date">`.
    DateInput,
    /// `<input type="hidden">`.
    HiddenInput,
    /// `<textarea>`.
    Textarea,
    /// `<input type="checkbox">`.
    CheckboxInput,
    /// `<select>`.
    Select,
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TextInput => "TextInput",
            Self::NumberInput => "NumberInput",
            Self::EmailInput => "EmailInput",
            Self::DateInput => "DateInput",
            Self::HiddenInput => "HiddenInput",
            Self::Textarea => "Textarea",
            Self::CheckboxInput => "CheckboxInput",
            Self::Select => "Select",
        };
        write!(f, "{name}")
    }
}

impl WidgetType {
    const fn input_type(self) -> Option<&'static str> {
        match self {
            Self::TextInput => Some("text"),
            Self::NumberInput => Some("number"),
            Self::EmailInput => Some("email"),
            Self::DateInput => Some("date"),
            Self::HiddenInput => Some("hidden"),
            Self::CheckboxInput => Some("checkbox"),
            Self::Textarea | Self::Select => None,
        }
    }

    /// The `id` attribute used for a field's element and its `<label>`.
    pub fn id_for_label(self, name: &str) -> String {
        format!("id_{name}")
    }

    /// Extracts the raw submitted value for `name`.
    ///
    /// An unchecked checkbox is absent from the submission and yields `None`.
    pub fn value_from_data(self, data: &QueryDict, name: &str) -> Option<String> {
        data.get(name).map(str::to_string)
    }

    /// Renders the element.
    ///
    /// `choices` is only read by [`WidgetType::Select`]; the option whose
    /// value equals `value` is marked selected. Attribute values and content
    /// are HTML-escaped.
    pub fn render(
        self,
        name: &str,
        value: Option<&str>,
        choices: &[(String, String)],
        attrs: &BTreeMap<String, String>,
    ) -> String {
        let id = self.id_for_label(name);
        let name = escape_html(name);
        let extra = render_attrs(attrs);
        match self {
            Self::Textarea => format!(
                r#"<textarea name="{name}" id="{id}" cols="40" rows="10"{extra}>{}</textarea>"#,
                escape_html(value.unwrap_or(""))
            ),
            Self::Select => {
                let mut html = format!(r#"<select name="{name}" id="{id}"{extra}>"#);
                for (option_value, label) in choices {
                    let selected = if value == Some(option_value.as_str()) {
                        " selected"
                    } else {
                        ""
                    };
                    html.push_str(&format!(
                        r#"<option value="{}"{selected}>{}</option>"#,
                        escape_html(option_value),
                        escape_html(label)
                    ));
                }
                html.push_str("</select>");
                html
            }
            Self::CheckboxInput => {
                let checked = value.is_some_and(|v| {
                    matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
                });
                let checked = if checked { " checked" } else { "" };
                format!(r#"<input type="checkbox" name="{name}" id="{id}"{checked}{extra}>"#)
            }
            _ => {
                let input_type = self.input_type().unwrap_or("text");
                let value_attr = value
                    .filter(|v| !v.is_empty())
                    .map(|v| format!(r#" value="{}""#, escape_html(v)))
                    .unwrap_or_default();
                format!(
                    r#"<input type="{input_type}" name="{name}" id="{id}"{value_attr}{extra}>"#
                )
            }
        }
    }
}

fn render_attrs(attrs: &BTreeMap<String, String>) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!(r#" {}="{}""#, escape_html(k), escape_html(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_attrs() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn test_text_input() {
        let html = WidgetType::TextInput.render("name", Some("Ann"), &[], &no_attrs());
        assert_eq!(
            html,
            r#"<input type="text" name="name" id="id_name" value="Ann">"#
        );
    }

    #[test]
    fn test_empty_value_omitted() {
        let html = WidgetType::NumberInput.render("age", Some(""), &[], &no_attrs());
        assert_eq!(html, r#"<input type="number" name="age" id="id_age">"#);
    }

    #[test]
    fn test_value_escaped() {
        let html = WidgetType::TextInput.render("q", Some(r#""><b>"#), &[], &no_attrs());
        assert!(html.contains("value=\"&quot;&gt;&lt;b&gt;\""));
    }

    #[test]
    fn test_textarea() {
        let html = WidgetType::Textarea.render("notes", Some("a<b"), &[], &no_attrs());
        assert!(html.starts_with("<textarea name=\"notes\" id=\"id_notes\""));
        assert!(html.contains(">a&lt;b</textarea>"));
    }

    #[test]
    fn test_checkbox() {
        let on = WidgetType::CheckboxInput.render("vip", Some("true"), &[], &no_attrs());
        assert!(on.contains(" checked"));
        let off = WidgetType::CheckboxInput.render("vip", None, &[], &no_attrs());
        assert!(!off.contains("checked"));
    }

    #[test]
    fn test_select_marks_selected() {
        let choices = vec![
            ("1".to_string(), "Gold".to_string()),
            ("2".to_string(), "Silver".to_string()),
        ];
        let html = WidgetType::Select.render("level", Some("2"), &choices, &no_attrs());
        assert!(html.contains(r#"<option value="1">Gold</option>"#));
        assert!(html.contains(r#"<option value="2" selected>Silver</option>"#));
    }

    #[test]
    fn test_extra_attrs() {
        let mut attrs = BTreeMap::new();
        attrs.insert("class".to_string(), "wide".to_string());
        let html = WidgetType::EmailInput.render("email", None, &[], &attrs);
        assert_eq!(
            html,
            r#"<input type="email" name="email" id="id_email" class="wide">"#
        );
    }

    #[test]
    fn test_value_from_data() {
        let data = QueryDict::parse("name=Ann&name=Bo");
        assert_eq!(
            WidgetType::TextInput.value_from_data(&data, "name"),
            Some("Bo".to_string())
        );
        assert_eq!(WidgetType::CheckboxInput.value_from_data(&data, "vip"), None);
    }
}
