//! Query string dictionary for HTTP request parameters.
//!
//! [`QueryDict`] is an ordered, multi-valued, immutable-by-default dictionary
//! used for both query strings and form-encoded POST bodies. Keys keep the
//! order in which they first appeared and [`QueryDict::urlencode`] emits them
//! in that order.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

use thanos_core::{ThanosError, ThanosResult};

/// Characters left unescaped by [`QueryDict::urlencode`].
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// An immutable-by-default dictionary for query string and form data.
///
/// The [`copy`](QueryDict::copy) method returns a mutable clone.
///
/// # Examples
///
/// ```
/// use thanos_http::QueryDict;
///
/// let qd = QueryDict::parse("color=red&color=blue&size=large");
/// assert_eq!(qd.get("color"), Some("blue"));
/// assert_eq!(qd.get_list("color"), Some(&["red".to_string(), "blue".to_string()][..]));
///
/// let mut mutable = qd.copy();
/// mutable.set("color", "green").unwrap();
/// assert_eq!(mutable.get("color"), Some("green"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    entries: Vec<(String, Vec<String>)>,
    mutable: bool,
}

impl QueryDict {
    /// Creates a new, empty, immutable `QueryDict`.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            mutable: false,
        }
    }

    /// Creates a new, empty, mutable `QueryDict`.
    pub const fn new_mutable() -> Self {
        Self {
            entries: Vec::new(),
            mutable: true,
        }
    }

    /// Parses a URL query string (e.g. `"key1=val1&key2=val2"`) into an immutable `QueryDict`.
    ///
    /// Handles percent-encoding and `+` as space, and supports multiple values per key.
    pub fn parse(query_string: &str) -> Self {
        let mut qd = Self::new();

        for pair in query_string.split('&') {
            if pair.is_empty() {
                continue;
            }

            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            qd.push(percent_decode(key), percent_decode(value));
        }

        qd
    }

    /// Returns the last value for the given key, or `None` if not present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_list(key)
            .and_then(<[String]>::last)
            .map(String::as_str)
    }

    /// Returns all values for the given key, or `None` if not present.
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Sets a single value for the given key, replacing any existing values.
    ///
    /// An existing key keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::BadRequest`] if this `QueryDict` is immutable.
    pub fn set(&mut self, key: &str, value: &str) -> ThanosResult<()> {
        self.ensure_mutable()?;
        if let Some((_, values)) = self.entries.iter_mut().find(|(k, _)| k == key) {
            *values = vec![value.to_string()];
        } else {
            self.entries.push((key.to_string(), vec![value.to_string()]));
        }
        Ok(())
    }

    /// Appends a value to the list for the given key.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::BadRequest`] if this `QueryDict` is immutable.
    pub fn append(&mut self, key: &str, value: &str) -> ThanosResult<()> {
        self.ensure_mutable()?;
        self.push(key.to_string(), value.to_string());
        Ok(())
    }

    /// Removes a key and returns its values.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::BadRequest`] if this `QueryDict` is immutable.
    pub fn remove(&mut self, key: &str) -> ThanosResult<Option<Vec<String>>> {
        self.ensure_mutable()?;
        let position = self.entries.iter().position(|(k, _)| k == key);
        Ok(position.map(|idx| self.entries.remove(idx).1))
    }

    /// Returns a mutable copy of this `QueryDict`.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            mutable: true,
        }
    }

    /// Encodes this `QueryDict` as a URL query string.
    ///
    /// Keys appear in insertion order; spaces encode as `+`.
    pub fn urlencode(&self) -> String {
        self.iter()
            .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Iterates over every `(key, value)` pair in order, repeating the key for
    /// each of its values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Returns `true` if this `QueryDict` is mutable.
    pub const fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the `QueryDict` contains no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the specified key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    fn push(&mut self, key: String, value: String) {
        if let Some((_, values)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            values.push(value);
        } else {
            self.entries.push((key, vec![value]));
        }
    }

    fn ensure_mutable(&self) -> ThanosResult<()> {
        if self.mutable {
            Ok(())
        } else {
            Err(ThanosError::BadRequest(
                "This QueryDict instance is immutable".to_string(),
            ))
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryDict {
    /// Collects pairs into a mutable `QueryDict`.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut qd = Self::new_mutable();
        for (key, value) in iter {
            qd.push(key.into(), value.into());
        }
        qd
    }
}

/// Decodes a form-encoded component.
fn percent_decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Encodes a component for a query string.
fn percent_encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, QUERY_ENCODE_SET)
        .to_string()
        .replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let qd = QueryDict::new();
        assert!(qd.is_empty());
        assert_eq!(qd.len(), 0);
        assert!(!qd.is_mutable());
    }

    #[test]
    fn test_parse_multiple_values() {
        let qd = QueryDict::parse("color=red&color=blue&color=green");
        assert_eq!(qd.get("color"), Some("green"));
        assert_eq!(qd.get_list("color").map(<[String]>::len), Some(3));
        assert_eq!(qd.len(), 1);
    }

    #[test]
    fn test_parse_edge_cases() {
        let qd = QueryDict::parse("a=1&&b&c=&");
        assert_eq!(qd.get("a"), Some("1"));
        assert_eq!(qd.get("b"), Some(""));
        assert_eq!(qd.get("c"), Some(""));
        assert_eq!(qd.len(), 3);
        assert!(QueryDict::parse("").is_empty());
    }

    #[test]
    fn test_parse_decoding() {
        let qd = QueryDict::parse("name=hello%20world&city=New+York&eq=a%3Db");
        assert_eq!(qd.get("name"), Some("hello world"));
        assert_eq!(qd.get("city"), Some("New York"));
        assert_eq!(qd.get("eq"), Some("a=b"));
    }

    #[test]
    fn test_immutable_rejects_writes() {
        let mut qd = QueryDict::parse("key=value");
        assert!(qd.set("key", "new").is_err());
        assert!(qd.append("key", "extra").is_err());
        assert!(qd.remove("key").is_err());
        assert_eq!(qd.get("key"), Some("value"));
    }

    #[test]
    fn test_copy_returns_mutable() {
        let qd = QueryDict::parse("key=value");
        let mut copy = qd.copy();
        copy.set("key", "new").unwrap();
        assert_eq!(copy.get("key"), Some("new"));
        assert_eq!(qd.get("key"), Some("value"));
    }

    #[test]
    fn test_set_keeps_position() {
        let mut qd = QueryDict::parse("a=1&b=2&a=3").copy();
        qd.set("a", "9").unwrap();
        assert_eq!(qd.urlencode(), "a=9&b=2");
    }

    #[test]
    fn test_remove() {
        let mut qd = QueryDict::parse("a=1&b=2").copy();
        assert_eq!(qd.remove("a").unwrap(), Some(vec!["1".to_string()]));
        assert_eq!(qd.remove("missing").unwrap(), None);
        assert_eq!(qd.urlencode(), "b=2");
    }

    #[test]
    fn test_urlencode_preserves_order() {
        let qd = QueryDict::parse("z=1&a=2&m=3&a=4");
        assert_eq!(qd.urlencode(), "z=1&a=2&a=4&m=3");
    }

    #[test]
    fn test_urlencode_escaping() {
        let mut qd = QueryDict::new_mutable();
        qd.set("name", "hello world").unwrap();
        qd.set("_list_filter", "page=2&name=a b").unwrap();
        assert_eq!(
            qd.urlencode(),
            "name=hello+world&_list_filter=page%3D2%26name%3Da+b"
        );
    }

    #[test]
    fn test_urlencode_roundtrips_nested_filter() {
        let inner = QueryDict::parse("city=New+York&page=2").urlencode();
        let mut outer = QueryDict::new_mutable();
        outer.set("_list_filter", &inner).unwrap();
        let parsed = QueryDict::parse(&outer.urlencode());
        assert_eq!(parsed.get("_list_filter"), Some("city=New+York&page=2"));
    }

    #[test]
    fn test_iter_and_keys() {
        let qd = QueryDict::parse("b=1&a=2&b=3");
        let pairs: Vec<_> = qd.iter().collect();
        assert_eq!(pairs, vec![("b", "1"), ("b", "3"), ("a", "2")]);
        let keys: Vec<_> = qd.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert!(qd.contains_key("a"));
        assert!(!qd.contains_key("c"));
    }

    #[test]
    fn test_from_iter() {
        let qd: QueryDict = vec![("name", "Ann"), ("age", "30")].into_iter().collect();
        assert!(qd.is_mutable());
        assert_eq!(qd.get("age"), Some("30"));
    }
}
