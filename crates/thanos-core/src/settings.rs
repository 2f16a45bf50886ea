//! Settings for the thanos console.
//!
//! [`Settings`] holds all console configuration with sensible defaults. It is
//! constructed explicitly (usually through [`settings_loader`](crate::settings_loader))
//! and handed to the site router; there is no global instance.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The complete set of console settings.
///
/// # Examples
///
/// ```
/// use thanos_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.url_prefix, "/thanos");
/// assert_eq!(settings.list_per_page, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// Title shown in the page header of every console page.
    pub site_title: String,
    /// Address the development server binds to.
    pub bind_address: String,

    // ── Routing ──────────────────────────────────────────────────────

    /// Mount point of the console; every model route lives under it.
    pub url_prefix: String,

    // ── Views ────────────────────────────────────────────────────────

    /// Page size used when a model configuration does not set its own.
    pub list_per_page: usize,
    /// The `opt` value the delete view requires before removing a record.
    pub delete_confirm_token: String,
    /// Largest request body accepted by the views, in bytes.
    pub max_body_bytes: usize,

    // ── Templates ────────────────────────────────────────────────────

    /// Directories searched for templates overriding the built-in ones.
    pub template_dirs: Vec<PathBuf>,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter (e.g. "info", "thanos_crm=debug").
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            site_title: "Thanos CRM".to_string(),
            bind_address: "127.0.0.1:8000".to_string(),
            url_prefix: "/thanos".to_string(),
            list_per_page: 10,
            delete_confirm_token: "confirm".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
            template_dirs: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Returns the URL prefix normalized to a leading slash and no trailing slash.
    ///
    /// An empty or `/` prefix normalizes to the empty string, meaning the
    /// console is mounted at the root.
    pub fn normalized_url_prefix(&self) -> String {
        let trimmed = self.url_prefix.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.site_title, "Thanos CRM");
        assert_eq!(s.bind_address, "127.0.0.1:8000");
        assert_eq!(s.url_prefix, "/thanos");
        assert_eq!(s.list_per_page, 10);
        assert_eq!(s.delete_confirm_token, "confirm");
        assert_eq!(s.max_body_bytes, 2 * 1024 * 1024);
        assert!(s.template_dirs.is_empty());
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn test_normalized_url_prefix() {
        let mut s = Settings::default();
        assert_eq!(s.normalized_url_prefix(), "/thanos");

        s.url_prefix = "crm/".to_string();
        assert_eq!(s.normalized_url_prefix(), "/crm");

        s.url_prefix = "/".to_string();
        assert_eq!(s.normalized_url_prefix(), "");

        s.url_prefix = String::new();
        assert_eq!(s.normalized_url_prefix(), "");
    }
}
