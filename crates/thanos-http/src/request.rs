//! HTTP request type.
//!
//! [`HttpRequest`] gives the views access to the request method, path, query
//! parameters, form data, and raw body. Instances are usually created from an
//! incoming axum request via [`HttpRequest::from_parts`].

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method};

use crate::querydict::QueryDict;

/// An incoming HTTP request.
///
/// # Examples
///
/// ```
/// use thanos_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::GET)
///     .path("/thanos/crm/customer/")
///     .query_string("page=2")
///     .build();
///
/// assert_eq!(request.method(), &http::Method::GET);
/// assert_eq!(request.get().get("page"), Some("2"));
/// assert_eq!(request.get_full_path(), "/thanos/crm/customer/?page=2");
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    get: QueryDict,
    post: QueryDict,
    headers: HeaderMap,
    body: Bytes,
    path_args: HashMap<String, String>,
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`].
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Creates an `HttpRequest` from axum request parts and the collected body.
    ///
    /// Form-encoded bodies are parsed into [`post`](Self::post); any other
    /// body is left as raw bytes.
    pub fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        let path = parts.uri.path().to_string();
        let query_string = parts.uri.query().unwrap_or("").to_string();
        Self::assemble(parts.method, path, query_string, parts.headers, body)
    }

    fn assemble(
        method: Method,
        path: String,
        query_string: String,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        let content_type = headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let post = if content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        {
            QueryDict::parse(&String::from_utf8_lossy(&body))
        } else {
            QueryDict::new()
        };

        Self {
            get: QueryDict::parse(&query_string),
            method,
            path,
            query_string,
            content_type,
            post,
            headers,
            body,
            path_args: HashMap::new(),
        }
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the content type of the request body, if set.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the query parameters.
    pub const fn get(&self) -> &QueryDict {
        &self.get
    }

    /// Returns the form-encoded POST parameters.
    pub const fn post(&self) -> &QueryDict {
        &self.post
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw request body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns `true` for `POST` requests.
    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    /// Returns the path with the query string appended, if any.
    pub fn get_full_path(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }

    /// Returns the arguments captured from the matched route.
    pub const fn path_args(&self) -> &HashMap<String, String> {
        &self.path_args
    }

    /// Returns one captured route argument.
    pub fn path_arg(&self, name: &str) -> Option<&str> {
        self.path_args.get(name).map(String::as_str)
    }

    /// Records the arguments captured by the router.
    pub fn set_path_args(&mut self, args: HashMap<String, String>) {
        self.path_args = args;
    }
}

/// Builder for constructing [`HttpRequest`] instances, mainly in tests.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    headers: HeaderMap,
    body: Bytes,
    path_args: HashMap<String, String>,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            path_args: HashMap::new(),
        }
    }
}

impl HttpRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string.
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets a form-encoded body and the matching content type.
    #[must_use]
    pub fn form(self, body: &str) -> Self {
        self.header("content-type", "application/x-www-form-urlencoded")
            .body(body.as_bytes().to_vec())
    }

    /// Sets a JSON body and the matching content type.
    #[must_use]
    pub fn json(self, body: &str) -> Self {
        self.header("content-type", "application/json")
            .body(body.as_bytes().to_vec())
    }

    /// Sets the raw body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Bytes::from(body);
        self
    }

    /// Sets a captured route argument.
    #[must_use]
    pub fn path_arg(mut self, name: &str, value: &str) -> Self {
        self.path_args.insert(name.to_string(), value.to_string());
        self
    }

    /// Builds the request.
    pub fn build(self) -> HttpRequest {
        let mut request = HttpRequest::assemble(
            self.method,
            self.path,
            self.query_string,
            self.headers,
            self.body,
        );
        request.path_args = self.path_args;
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = HttpRequest::builder().build();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.get().is_empty());
        assert!(request.post().is_empty());
        assert!(request.body().is_empty());
        assert!(!request.is_post());
    }

    #[test]
    fn test_form_body_parsed() {
        let request = HttpRequest::builder()
            .method(Method::POST)
            .form("name=Ann+Lee&age=30")
            .build();
        assert!(request.is_post());
        assert_eq!(request.post().get("name"), Some("Ann Lee"));
        assert_eq!(request.post().get("age"), Some("30"));
    }

    #[test]
    fn test_json_body_not_parsed_as_form() {
        let request = HttpRequest::builder()
            .method(Method::POST)
            .json(r#"{"opt":"confirm"}"#)
            .build();
        assert!(request.post().is_empty());
        assert_eq!(request.body(), br#"{"opt":"confirm"}"#);
        assert_eq!(request.content_type(), Some("application/json"));
    }

    #[test]
    fn test_full_path() {
        let plain = HttpRequest::builder().path("/a/").build();
        assert_eq!(plain.get_full_path(), "/a/");

        let with_query = HttpRequest::builder().path("/a/").query_string("x=1").build();
        assert_eq!(with_query.get_full_path(), "/a/?x=1");
    }

    #[test]
    fn test_path_args() {
        let mut request = HttpRequest::builder().path_arg("id", "7").build();
        assert_eq!(request.path_arg("id"), Some("7"));

        let mut args = HashMap::new();
        args.insert("id".to_string(), "9".to_string());
        request.set_path_args(args);
        assert_eq!(request.path_arg("id"), Some("9"));
        assert_eq!(request.path_arg("missing"), None);
    }

    #[test]
    fn test_from_parts() {
        let (parts, ()) = http::Request::builder()
            .method(Method::POST)
            .uri("/thanos/crm/customer/add/?_list_filter=page%3D2")
            .header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
            .body(())
            .unwrap()
            .into_parts();

        let request = HttpRequest::from_parts(parts, Bytes::from_static(b"name=Bo"));
        assert_eq!(request.path(), "/thanos/crm/customer/add/");
        assert_eq!(request.get().get("_list_filter"), Some("page=2"));
        assert_eq!(request.post().get("name"), Some("Bo"));
    }
}
