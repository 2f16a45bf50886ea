//! Reverse URL resolution.
//!
//! [`UrlTable`] maps route names to their patterns under a mount prefix and
//! turns a name plus arguments back into an absolute path.

use thanos_core::{ThanosError, ThanosResult};

use super::pattern::RoutePattern;

/// A table of named routes for reverse resolution.
///
/// # Examples
///
/// ```
/// use thanos_http::urls::pattern::RoutePattern;
/// use thanos_http::UrlTable;
///
/// let mut table = UrlTable::new("/thanos");
/// table.insert("crm_customer_change", RoutePattern::parse("crm/customer/<int:id>/change").unwrap());
///
/// assert_eq!(
///     table.reverse("crm_customer_change", &["3"]).unwrap(),
///     "/thanos/crm/customer/3/change"
/// );
/// assert!(table.reverse("crm_customer_add", &[]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct UrlTable {
    prefix: String,
    entries: Vec<(String, RoutePattern)>,
}

impl UrlTable {
    /// Creates an empty table whose URLs are mounted under `prefix`.
    ///
    /// The prefix is normalized to a leading slash and no trailing slash.
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim_matches('/');
        Self {
            prefix: if trimmed.is_empty() {
                String::new()
            } else {
                format!("/{trimmed}")
            },
            entries: Vec::new(),
        }
    }

    /// Returns the normalized mount prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Adds a named route. A later route with the same name wins.
    pub fn insert(&mut self, name: impl Into<String>, pattern: RoutePattern) {
        let name = name.into();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, pattern));
    }

    /// Returns the pattern registered under `name`.
    pub fn get(&self, name: &str) -> Option<&RoutePattern> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, pattern)| pattern)
    }

    /// Returns `true` if a route named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over `(name, pattern)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RoutePattern)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Returns the number of named routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the absolute path for `name` with positional `args`.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::NoReverseMatch`] if no route has that name or
    /// the arguments do not fit its placeholders.
    pub fn reverse(&self, name: &str, args: &[&str]) -> ThanosResult<String> {
        let pattern = self
            .get(name)
            .ok_or_else(|| ThanosError::NoReverseMatch(name.to_string()))?;
        let path = pattern.substitute(args)?;
        Ok(format!("{}/{path}", self.prefix))
    }
}
