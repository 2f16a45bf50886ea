//! The console registry and router.
//!
//! [`CrmSite`] collects one [`CrmConfig`] per model during startup. Its
//! [`routes`](CrmSite::routes) concatenate every model's routes under
//! `{app_label}/{model_name}/`, and [`into_router`](CrmSite::into_router)
//! consumes the registry into an axum [`Router`] serving them under the
//! configured mount prefix.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use thanos_core::logging::request_span;
use thanos_core::{Settings, ThanosError, ThanosResult};
use thanos_db::model::ModelMeta;
use thanos_db::store::ModelStore;
use thanos_http::{HttpRequest, HttpResponse, UrlTable};

use crate::config::{CrmConfig, CrmRoute, RouteView};
use crate::templates::Templates;
use crate::views::{self, ViewContext};

/// A route of the composed table, with the configuration it belongs to.
#[derive(Debug, Clone)]
pub struct SiteRoute {
    /// The owning model's configuration.
    pub config: Arc<CrmConfig>,
    /// The route, its pattern prefixed with `{app_label}/{model_name}/`.
    pub route: CrmRoute,
}

/// The registry of model configurations.
///
/// # Examples
///
/// ```
/// use thanos_crm::site::CrmSite;
/// use thanos_db::model::ModelMeta;
///
/// let mut site = CrmSite::new();
/// site.register(ModelMeta::new("crm", "customer"));
///
/// let urls = site.url_table("/thanos").unwrap();
/// assert_eq!(
///     urls.reverse("crm_customer_change", &["3"]).unwrap(),
///     "/thanos/crm/customer/3/change"
/// );
/// ```
#[derive(Debug, Default)]
pub struct CrmSite {
    registry: Vec<(String, Arc<CrmConfig>)>,
}

impl CrmSite {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `meta` with the default configuration.
    pub fn register(&mut self, meta: ModelMeta) {
        self.register_with(meta, CrmConfig::new);
    }

    /// Registers `meta` with the configuration built by `factory`.
    ///
    /// Registering a model again replaces its configuration in place.
    pub fn register_with<F>(&mut self, meta: ModelMeta, factory: F)
    where
        F: FnOnce(Arc<ModelMeta>) -> CrmConfig,
    {
        let key = meta.model_key();
        let config = Arc::new(factory(Arc::new(meta)));
        if let Some(entry) = self.registry.iter_mut().find(|(k, _)| *k == key) {
            tracing::warn!(model = %key, "model registered twice; replacing configuration");
            entry.1 = config;
        } else {
            tracing::debug!(model = %key, "model registered");
            self.registry.push((key, config));
        }
    }

    /// Returns whether `model_key` (`app_label.model_name`) is registered.
    pub fn is_registered(&self, model_key: &str) -> bool {
        self.registry.iter().any(|(k, _)| k == model_key)
    }

    /// Returns the configuration registered for `model_key`.
    pub fn get(&self, model_key: &str) -> Option<&CrmConfig> {
        self.registry
            .iter()
            .find(|(k, _)| k == model_key)
            .map(|(_, config)| config.as_ref())
    }

    /// The registered model keys in registration order.
    pub fn registered_models(&self) -> Vec<&str> {
        self.registry.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// The number of registered models.
    pub fn model_count(&self) -> usize {
        self.registry.len()
    }

    /// Every model's routes, prefixed with `{app_label}/{model_name}/`, in
    /// registration order.
    ///
    /// # Errors
    ///
    /// Returns an error when a configured route does not parse.
    pub fn routes(&self) -> ThanosResult<Vec<SiteRoute>> {
        let mut routes = Vec::new();
        for (_, config) in &self.registry {
            let prefix = config.url_prefix();
            for route in config.routes()? {
                routes.push(SiteRoute {
                    config: Arc::clone(config),
                    route: CrmRoute {
                        pattern: route.pattern.with_prefix(&prefix)?,
                        ..route
                    },
                });
            }
        }
        Ok(routes)
    }

    /// The reverse-resolution table of [`routes`](Self::routes) mounted
    /// under `prefix`.
    pub fn url_table(&self, prefix: &str) -> ThanosResult<UrlTable> {
        Ok(build_url_table(prefix, &self.routes()?))
    }

    /// Consumes the registry into a router serving every route under
    /// `settings.url_prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::ImproperlyConfigured`] when two routes share a
    /// name or a path, and template errors when the page templates fail to
    /// load.
    pub fn into_router(
        self,
        store: Arc<dyn ModelStore>,
        settings: &Settings,
    ) -> ThanosResult<Router> {
        let routes = self.routes()?;
        check_unique(&routes)?;

        let urls = Arc::new(build_url_table(&settings.normalized_url_prefix(), &routes));
        let state = Arc::new(SiteState {
            templates: Arc::new(Templates::new(&settings.template_dirs)?),
            settings: Arc::new(settings.clone()),
            store,
            urls,
            routes,
        });

        let mut router = Router::new();
        for (index, site_route) in state.routes.iter().enumerate() {
            let path = format!(
                "{}/{}",
                state.urls.prefix(),
                site_route.route.pattern.to_axum_path()
            );
            tracing::debug!(route = %site_route.route.name, path = %path, "mounting route");
            let route_state = Arc::clone(&state);
            router = router.route(
                &path,
                any(move |request: Request| dispatch(Arc::clone(&route_state), index, request)),
            );
        }

        tracing::info!(
            models = self.registry.len(),
            routes = state.routes.len(),
            prefix = %state.urls.prefix(),
            "console router built"
        );
        Ok(router.layer(TraceLayer::new_for_http()))
    }
}

struct SiteState {
    routes: Vec<SiteRoute>,
    store: Arc<dyn ModelStore>,
    urls: Arc<UrlTable>,
    templates: Arc<Templates>,
    settings: Arc<Settings>,
}

fn build_url_table(prefix: &str, routes: &[SiteRoute]) -> UrlTable {
    let mut table = UrlTable::new(prefix);
    for site_route in routes {
        table.insert(site_route.route.name.clone(), site_route.route.pattern.clone());
    }
    table
}

/// The path with placeholder names erased; axum rejects two routes that
/// differ only in placeholder names.
fn route_shape(path: &str) -> String {
    let mut shape = String::with_capacity(path.len());
    let mut in_param = false;
    for c in path.chars() {
        match c {
            '{' => {
                in_param = true;
                shape.push_str("{}");
            }
            '}' => in_param = false,
            _ if !in_param => shape.push(c),
            _ => {}
        }
    }
    shape
}

fn check_unique(routes: &[SiteRoute]) -> ThanosResult<()> {
    let mut names = HashSet::new();
    let mut shapes = HashSet::new();
    for site_route in routes {
        let route = &site_route.route;
        if !names.insert(route.name.as_str()) {
            return Err(ThanosError::ImproperlyConfigured(format!(
                "Duplicate route name '{}'",
                route.name
            )));
        }
        if !shapes.insert(route_shape(&route.pattern.to_axum_path())) {
            return Err(ThanosError::ImproperlyConfigured(format!(
                "Route '{}' ({}) overlaps an earlier route",
                route.name,
                route.pattern.route()
            )));
        }
    }
    Ok(())
}

async fn dispatch(state: Arc<SiteState>, index: usize, request: Request) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = request_span(&request_id, &state.routes[index].route.name);
    handle(state, index, request)
        .instrument(span)
        .await
        .unwrap_or_else(HttpResponse::from)
        .into_response()
}

async fn handle(
    state: Arc<SiteState>,
    index: usize,
    request: Request,
) -> ThanosResult<HttpResponse> {
    let site_route = &state.routes[index];
    let (parts, body) = request.into_parts();

    let path = parts.uri.path();
    let relative = path
        .strip_prefix(state.urls.prefix())
        .unwrap_or(path)
        .trim_start_matches('/');
    let args = site_route
        .route
        .pattern
        .full_match(relative)
        .ok_or_else(|| ThanosError::NotFound(path.to_string()))?;

    let body = axum::body::to_bytes(body, state.settings.max_body_bytes)
        .await
        .map_err(|e| ThanosError::BadRequest(format!("Failed to read request body: {e}")))?;
    let mut request = HttpRequest::from_parts(parts, body);
    request.set_path_args(args);
    tracing::debug!(method = %request.method(), path = %request.get_full_path(), "dispatch");

    let ctx = ViewContext {
        config: Arc::clone(&site_route.config),
        store: Arc::clone(&state.store),
        urls: Arc::clone(&state.urls),
        templates: Arc::clone(&state.templates),
        settings: Arc::clone(&state.settings),
    };
    match &site_route.route.view {
        RouteView::Changelist => views::changelist_view(&ctx, &request).await,
        RouteView::Add => views::add_view(&ctx, &request).await,
        RouteView::Change => views::change_view(&ctx, &request).await,
        RouteView::Delete => views::delete_view(&ctx, &request).await,
        RouteView::Custom(handler) => handler(ctx, request).await,
    }
}
