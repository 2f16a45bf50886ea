//! Page templates.
//!
//! The console's pages are rendered with [`tera`]. The built-in templates are
//! compiled into the crate; a file with the same relative name under one of
//! [`Settings::template_dirs`](thanos_core::Settings::template_dirs) replaces
//! the built-in one. Directories are searched in order and the first match
//! wins.

use std::error::Error as _;
use std::path::PathBuf;

use tera::{Context, Tera};
use thanos_core::{ThanosError, ThanosResult};

/// Base layout every page extends.
pub const BASE: &str = "thanos/base.html";
/// The changelist page.
pub const CHANGELIST: &str = "thanos/changelist_view.html";
/// The add page.
pub const ADD: &str = "thanos/add_view.html";
/// The edit page.
pub const EDIT: &str = "thanos/edit_view.html";
/// The delete confirmation page.
pub const DELETE: &str = "thanos/delete_view.html";

const BUILTIN: &[(&str, &str)] = &[
    (BASE, include_str!("../templates/thanos/base.html")),
    (CHANGELIST, include_str!("../templates/thanos/changelist_view.html")),
    (ADD, include_str!("../templates/thanos/add_view.html")),
    (EDIT, include_str!("../templates/thanos/edit_view.html")),
    (DELETE, include_str!("../templates/thanos/delete_view.html")),
];

/// The loaded page templates.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Loads the built-in templates, replacing any found in `dirs`.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::IoError`] when an override cannot be read and
    /// [`ThanosError::TemplateError`] when a template does not compile.
    pub fn new(dirs: &[PathBuf]) -> ThanosResult<Self> {
        let mut sources = Vec::with_capacity(BUILTIN.len());
        for (name, builtin) in BUILTIN {
            let source = match dirs.iter().map(|dir| dir.join(name)).find(|p| p.is_file()) {
                Some(path) => {
                    tracing::debug!(template = *name, path = %path.display(), "template override");
                    std::fs::read_to_string(path)?
                }
                None => (*builtin).to_string(),
            };
            sources.push((*name, source));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(sources).map_err(template_error)?;
        Ok(Self { tera })
    }

    /// The built-in templates only.
    pub fn builtin() -> ThanosResult<Self> {
        Self::new(&[])
    }

    /// Renders template `name`.
    pub fn render(&self, name: &str, context: &Context) -> ThanosResult<String> {
        self.tera.render(name, context).map_err(template_error)
    }
}

fn template_error(err: tera::Error) -> ThanosError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    ThanosError::TemplateError(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("thanos-templates-{name}-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("thanos")).unwrap();
        dir
    }

    #[test]
    fn test_builtin_delete_page() {
        let templates = Templates::builtin().unwrap();
        let mut context = Context::new();
        context.insert("site_title", "Thanos CRM");
        context.insert("model_name", "customer");
        context.insert("verbose_name", "customer");
        context.insert("object_repr", "Ann & Bo");
        context.insert("changelist_url", "/thanos/crm/customer/");
        context.insert("confirm_token", "confirm");
        let html = templates.render(DELETE, &context).unwrap();
        assert!(html.contains("<title>Thanos CRM</title>"));
        assert!(html.contains("Ann &amp; Bo"));
    }

    #[test]
    fn test_unknown_template() {
        let templates = Templates::builtin().unwrap();
        assert!(matches!(
            templates.render("thanos/missing.html", &Context::new()),
            Err(ThanosError::TemplateError(_))
        ));
    }

    #[test]
    fn test_directory_override() {
        let dir = temp_dir("override");
        std::fs::write(
            dir.join(ADD),
            "{% extends \"thanos/base.html\" %}{% block content %}custom {{ model_name }}{% endblock content %}",
        )
        .unwrap();

        let templates = Templates::new(&[dir.clone()]).unwrap();
        let mut context = Context::new();
        context.insert("site_title", "T");
        context.insert("model_name", "school");
        let html = templates.render(ADD, &context).unwrap();
        assert!(html.contains("custom school"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_broken_override() {
        let dir = temp_dir("broken");
        std::fs::write(dir.join(EDIT), "{% if %}").unwrap();
        assert!(matches!(
            Templates::new(&[dir.clone()]),
            Err(ThanosError::TemplateError(_))
        ));
        std::fs::remove_dir_all(dir).ok();
    }
}
