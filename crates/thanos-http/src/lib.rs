//! # thanos-http
//!
//! HTTP layer for the thanos console: request and response types, ordered
//! query dictionaries, and named URL patterns with reverse resolution.

pub mod querydict;
pub mod request;
pub mod response;
pub mod urls;

use std::future::Future;
use std::pin::Pin;

pub use querydict::QueryDict;
pub use request::HttpRequest;
pub use response::{HttpResponse, HttpResponseRedirect, JsonResponse};
pub use urls::pattern::RoutePattern;
pub use urls::reverse::UrlTable;

/// A boxed, `Send` future, used for view handlers stored behind trait objects.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
