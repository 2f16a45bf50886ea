//! HTTP response types.
//!
//! [`HttpResponse`] is what every view returns. [`JsonResponse`] and
//! [`HttpResponseRedirect`] are constructors for the two other shapes the
//! console produces. Errors raised by views are turned into responses through
//! `From<ThanosError>`.

use axum::response::IntoResponse;
use http::{HeaderMap, HeaderValue, StatusCode};

use thanos_core::html::escape_html;
use thanos_core::ThanosError;

/// An HTTP response with a text body.
///
/// # Examples
///
/// ```
/// use thanos_http::HttpResponse;
///
/// let response = HttpResponse::ok("<h1>Customers</h1>");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.content_type(), "text/html");
/// ```
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    content: String,
    content_type: String,
}

impl HttpResponse {
    /// Creates a new HTML response with the given status code and body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: body.into(),
            content_type: "text/html".to_string(),
        }
    }

    /// Creates a 200 OK response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request(body: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    /// Creates a 405 Method Not Allowed response listing the permitted methods.
    pub fn not_allowed(permitted_methods: &[&str]) -> Self {
        let allowed = permitted_methods.join(", ");
        let mut response = Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method Not Allowed. Permitted: {allowed}"),
        );
        if let Ok(value) = HeaderValue::from_str(&allowed) {
            response.headers.insert(http::header::ALLOW, value);
        }
        response
    }

    /// Creates a 500 Internal Server Error response.
    pub fn server_error(body: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the content type, without charset.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Sets the content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Returns the body.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the `Location` header of a redirect.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    fn full_content_type(&self) -> String {
        format!("{}; charset=utf-8", self.content_type)
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        let content_type = self.full_content_type();
        let mut response = (self.status, self.content).into_response();
        if let Ok(value) = HeaderValue::from_str(&content_type) {
            response
                .headers_mut()
                .insert(http::header::CONTENT_TYPE, value);
        }
        for (key, value) in &self.headers {
            response.headers_mut().insert(key, value.clone());
        }
        response
    }
}

impl From<ThanosError> for HttpResponse {
    fn from(err: ThanosError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %err, "view failed");
        } else {
            tracing::debug!(error = %err, status = status.as_u16(), "view rejected request");
        }
        let body = format!(
            "<h1>{} {}</h1><p>{}</p>",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            escape_html(&err.to_string())
        );
        Self::new(status, body)
    }
}

/// A JSON response.
pub struct JsonResponse;

impl JsonResponse {
    /// Creates a 200 OK JSON response from a serializable value.
    ///
    /// Serialization failures produce a 500 response.
    pub fn new<T: serde::Serialize>(data: &T) -> HttpResponse {
        Self::with_status(StatusCode::OK, data)
    }

    /// Creates a JSON response with a custom status code.
    pub fn with_status<T: serde::Serialize>(status: StatusCode, data: &T) -> HttpResponse {
        match serde_json::to_string(data) {
            Ok(json) => {
                let mut response = HttpResponse::new(status, json);
                response.set_content_type("application/json");
                response
            }
            Err(e) => HttpResponse::server_error(format!("JSON serialization error: {e}")),
        }
    }
}

/// A 302 Found redirect.
pub struct HttpResponseRedirect;

impl HttpResponseRedirect {
    /// Creates a 302 Found redirect to the given URL.
    pub fn new(url: &str) -> HttpResponse {
        let mut response = HttpResponse::new(StatusCode::FOUND, "");
        if let Ok(value) = HeaderValue::from_str(url) {
            response.headers.insert(http::header::LOCATION, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_constructors() {
        assert_eq!(HttpResponse::ok("x").status(), StatusCode::OK);
        assert_eq!(HttpResponse::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(HttpResponse::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            HttpResponse::server_error("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_allowed_sets_allow_header() {
        let response = HttpResponse::not_allowed(&["GET", "POST"]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(http::header::ALLOW).unwrap(),
            "GET, POST"
        );
    }

    #[test]
    fn test_json_response() {
        let response = JsonResponse::new(&serde_json::json!({"status": true}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), "application/json");
        assert_eq!(response.content(), r#"{"status":true}"#);
    }

    #[test]
    fn test_redirect() {
        let response = HttpResponseRedirect::new("/thanos/crm/customer/?page=2");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.location(), Some("/thanos/crm/customer/?page=2"));
    }

    #[test]
    fn test_from_error() {
        let response: HttpResponse = ThanosError::FieldError("no field <x>".into()).into();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.content().contains("&lt;x&gt;"));

        let response: HttpResponse = ThanosError::DoesNotExist("gone".into()).into();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response: HttpResponse = ThanosError::DatabaseError("down".into()).into();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_into_response() {
        let mut response = HttpResponse::ok("<p>hi</p>");
        response
            .headers_mut()
            .insert("x-thanos", HeaderValue::from_static("1"));
        let axum_response = response.into_response();

        assert_eq!(axum_response.status(), StatusCode::OK);
        assert_eq!(
            axum_response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        assert_eq!(axum_response.headers().get("x-thanos").unwrap(), "1");

        let body = axum_response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<p>hi</p>");
    }
}
