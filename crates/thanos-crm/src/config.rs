//! Per-model console configuration.
//!
//! A [`CrmConfig`] wraps one model's metadata and decides how the console
//! shows it: which columns the changelist displays, whether the add button
//! appears, which form the add and edit pages use, the page size, and any
//! extra routes. It also derives the model's URL names
//! (`{app_label}_{model_name}_{action}`) and its route table.

use std::fmt;
use std::sync::Arc;

use thanos_core::html::escape_html;
use thanos_core::ThanosResult;
use thanos_db::model::ModelMeta;
use thanos_db::record::Record;
use thanos_forms::ModelFormConfig;
use thanos_http::{BoxFuture, HttpRequest, HttpResponse, RoutePattern, UrlTable};

use crate::columns::ListColumn;
use crate::views::ViewContext;

/// A handler for an extra route.
pub type ViewHandler = Arc<
    dyn Fn(ViewContext, HttpRequest) -> BoxFuture<'static, ThanosResult<HttpResponse>>
        + Send
        + Sync,
>;

/// Which view a route dispatches to.
#[derive(Clone)]
pub enum RouteView {
    /// The paginated record list.
    Changelist,
    /// The add form.
    Add,
    /// The edit form.
    Change,
    /// The delete confirmation and JSON endpoint.
    Delete,
    /// A configured extra route.
    Custom(ViewHandler),
}

impl fmt::Debug for RouteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changelist => write!(f, "Changelist"),
            Self::Add => write!(f, "Add"),
            Self::Change => write!(f, "Change"),
            Self::Delete => write!(f, "Delete"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// A named route of one model, relative to the model's URL prefix.
#[derive(Debug, Clone)]
pub struct CrmRoute {
    /// The route pattern.
    pub pattern: RoutePattern,
    /// The reverse-resolution name.
    pub name: String,
    /// The view it dispatches to.
    pub view: RouteView,
}

#[derive(Clone)]
struct ExtraRoute {
    route: String,
    action: String,
    handler: ViewHandler,
}

impl fmt::Debug for ExtraRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraRoute")
            .field("route", &self.route)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// Console configuration for one model.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use thanos_crm::config::CrmConfig;
/// use thanos_db::fields::{FieldDef, FieldType};
/// use thanos_db::model::ModelMeta;
///
/// let meta = ModelMeta::new("crm", "customer")
///     .field(FieldDef::new("name", FieldType::CharField));
/// let config = CrmConfig::new(Arc::new(meta))
///     .with_list_display(["name"])
///     .with_add_btn(true);
///
/// assert_eq!(config.url_name("change"), "crm_customer_change");
/// assert_eq!(config.display_columns().len(), 4);
/// assert!(config.show_add_btn());
/// ```
#[derive(Debug, Clone)]
pub struct CrmConfig {
    meta: Arc<ModelMeta>,
    list_display: Vec<ListColumn>,
    show_add_btn: bool,
    model_form: Option<ModelFormConfig>,
    list_per_page: Option<usize>,
    extra_routes: Vec<ExtraRoute>,
}

impl CrmConfig {
    /// Label of the edit column.
    pub const CHANGE_LABEL: &'static str = "Edit";
    /// Label of the delete column.
    pub const DELETE_LABEL: &'static str = "Delete";

    /// Creates the default configuration: no display columns, no add
    /// button, a form over every editable field, and the site's page size.
    pub fn new(meta: Arc<ModelMeta>) -> Self {
        Self {
            meta,
            list_display: Vec::new(),
            show_add_btn: false,
            model_form: None,
            list_per_page: None,
            extra_routes: Vec::new(),
        }
    }

    /// Sets the changelist columns.
    #[must_use]
    pub fn with_list_display<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ListColumn>,
    {
        self.list_display = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether the changelist shows the add button.
    #[must_use]
    pub const fn with_add_btn(mut self, show: bool) -> Self {
        self.show_add_btn = show;
        self
    }

    /// Sets the form used by the add and edit pages.
    #[must_use]
    pub fn with_model_form(mut self, form: ModelFormConfig) -> Self {
        self.model_form = Some(form);
        self
    }

    /// Sets the changelist page size.
    #[must_use]
    pub const fn with_list_per_page(mut self, per_page: usize) -> Self {
        self.list_per_page = Some(per_page);
        self
    }

    /// Adds an extra route named `{app_label}_{model_name}_{action}`.
    ///
    /// `route` is relative to the model's prefix and uses `<int:name>` /
    /// `<str:name>` placeholders. It is parsed when the routes are built.
    #[must_use]
    pub fn with_extra_route<F>(mut self, route: &str, action: &str, handler: F) -> Self
    where
        F: Fn(ViewContext, HttpRequest) -> BoxFuture<'static, ThanosResult<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.extra_routes.push(ExtraRoute {
            route: route.to_string(),
            action: action.to_string(),
            handler: Arc::new(handler),
        });
        self
    }

    /// The model metadata.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// A shared handle to the model metadata.
    pub fn meta_arc(&self) -> Arc<ModelMeta> {
        Arc::clone(&self.meta)
    }

    /// The configured changelist columns, without the built-in ones.
    pub fn list_display(&self) -> &[ListColumn] {
        &self.list_display
    }

    /// Whether the changelist shows the add button.
    pub const fn show_add_btn(&self) -> bool {
        self.show_add_btn
    }

    /// The form configuration: the configured one, or every editable field.
    pub fn model_form_config(&self) -> ModelFormConfig {
        self.model_form.clone().unwrap_or_default()
    }

    /// The page size, falling back to `default`.
    pub fn list_per_page(&self, default: usize) -> usize {
        self.list_per_page.unwrap_or(default)
    }

    /// The reverse-resolution name for `action`.
    pub fn url_name(&self, action: &str) -> String {
        format!(
            "{}_{}_{action}",
            self.meta.app_label(),
            self.meta.model_name()
        )
    }

    /// The URL prefix of this model's routes, `{app_label}/{model_name}/`.
    pub fn url_prefix(&self) -> String {
        format!("{}/{}/", self.meta.app_label(), self.meta.model_name())
    }

    /// Reverse-resolves `action` for this model.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::NoReverseMatch`](thanos_core::ThanosError::NoReverseMatch)
    /// when no route has that name or the arguments do not fit it.
    pub fn compute_url(
        &self,
        urls: &UrlTable,
        action: &str,
        args: &[&str],
    ) -> ThanosResult<String> {
        urls.reverse(&self.url_name(action), args)
    }

    /// The changelist URL.
    pub fn changelist_url(&self, urls: &UrlTable) -> ThanosResult<String> {
        self.compute_url(urls, "changelist", &[])
    }

    /// The add URL.
    pub fn add_url(&self, urls: &UrlTable) -> ThanosResult<String> {
        self.compute_url(urls, "add", &[])
    }

    /// The edit URL of record `pk`.
    pub fn change_url(&self, urls: &UrlTable, pk: i64) -> ThanosResult<String> {
        self.compute_url(urls, "change", &[&pk.to_string()])
    }

    /// The delete URL of record `pk`.
    pub fn delete_url(&self, urls: &UrlTable, pk: i64) -> ThanosResult<String> {
        self.compute_url(urls, "delete", &[&pk.to_string()])
    }

    fn record_pk(&self, record: &Record) -> String {
        record
            .get(self.meta.pk_name())
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// The selection checkbox: the header selects all rows.
    pub fn render_checkbox(&self, record: Option<&Record>) -> String {
        record.map_or_else(
            || r####"<input type="checkbox" name="obj_list" value="###">"####.to_string(),
            |record| {
                format!(
                    r#"<input type="checkbox" name="obj" value="{}">"#,
                    escape_html(&self.record_pk(record))
                )
            },
        )
    }

    /// The edit link, carrying the current filter; the header is the label.
    pub fn render_change_link(
        &self,
        urls: &UrlTable,
        params: &str,
        record: Option<&Record>,
    ) -> ThanosResult<String> {
        self.render_link(urls, "change", Self::CHANGE_LABEL, params, record)
    }

    /// The delete link, carrying the current filter; the header is the label.
    pub fn render_delete_link(
        &self,
        urls: &UrlTable,
        params: &str,
        record: Option<&Record>,
    ) -> ThanosResult<String> {
        self.render_link(urls, "delete", Self::DELETE_LABEL, params, record)
    }

    fn render_link(
        &self,
        urls: &UrlTable,
        action: &str,
        label: &str,
        params: &str,
        record: Option<&Record>,
    ) -> ThanosResult<String> {
        let Some(record) = record else {
            return Ok(label.to_string());
        };
        let url = self.compute_url(urls, action, &[&self.record_pk(record)])?;
        Ok(format!(
            r#"<a href="{}">{label}</a>"#,
            escape_html(&format!("{url}?{params}"))
        ))
    }

    /// The changelist columns.
    ///
    /// Empty when no columns are configured; otherwise the checkbox, the
    /// configured columns, then the edit and delete links.
    pub fn display_columns(&self) -> Vec<ListColumn> {
        if self.list_display.is_empty() {
            return Vec::new();
        }
        let mut columns = Vec::with_capacity(self.list_display.len() + 3);
        columns.push(ListColumn::Checkbox);
        columns.extend(self.list_display.iter().cloned());
        columns.push(ListColumn::ChangeLink);
        columns.push(ListColumn::DeleteLink);
        columns
    }

    /// This model's routes, relative to [`url_prefix`](Self::url_prefix).
    ///
    /// The four built-in routes come first, then the extra routes in the
    /// order they were added.
    ///
    /// # Errors
    ///
    /// Returns an error when an extra route does not parse.
    pub fn routes(&self) -> ThanosResult<Vec<CrmRoute>> {
        let builtin = [
            ("", "changelist", RouteView::Changelist),
            ("add/", "add", RouteView::Add),
            ("<int:id>/delete", "delete", RouteView::Delete),
            ("<int:id>/change", "change", RouteView::Change),
        ];
        let mut routes = Vec::with_capacity(builtin.len() + self.extra_routes.len());
        for (route, action, view) in builtin {
            routes.push(CrmRoute {
                pattern: RoutePattern::parse(route)?,
                name: self.url_name(action),
                view,
            });
        }
        for extra in &self.extra_routes {
            routes.push(CrmRoute {
                pattern: RoutePattern::parse(&extra.route)?,
                name: self.url_name(&extra.action),
                view: RouteView::Custom(Arc::clone(&extra.handler)),
            });
        }
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::RenderContext;
    use thanos_core::ThanosError;
    use thanos_db::fields::{FieldDef, FieldType};

    fn meta() -> Arc<ModelMeta> {
        Arc::new(
            ModelMeta::new("crm", "customer")
                .field(FieldDef::new("name", FieldType::CharField).verbose_name("Name"))
                .field(FieldDef::new("city", FieldType::CharField)),
        )
    }

    fn urls(config: &CrmConfig) -> UrlTable {
        let mut table = UrlTable::new("/thanos");
        for route in config.routes().unwrap() {
            table.insert(
                route.name,
                route.pattern.with_prefix(&config.url_prefix()).unwrap(),
            );
        }
        table
    }

    #[test]
    fn test_defaults() {
        let config = CrmConfig::new(meta());
        assert!(!config.show_add_btn());
        assert!(config.list_display().is_empty());
        assert!(config.display_columns().is_empty());
        assert_eq!(config.list_per_page(10), 10);
        assert_eq!(config.with_list_per_page(3).list_per_page(10), 3);
    }

    #[test]
    fn test_url_names_and_routes() {
        let config = CrmConfig::new(meta());
        let routes = config.routes().unwrap();
        let listed: Vec<_> = routes
            .iter()
            .map(|r| (r.pattern.route(), r.name.as_str()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("", "crm_customer_changelist"),
                ("add/", "crm_customer_add"),
                ("<int:id>/delete", "crm_customer_delete"),
                ("<int:id>/change", "crm_customer_change"),
            ]
        );
        assert_eq!(config.url_prefix(), "crm/customer/");
    }

    #[test]
    fn test_extra_routes_follow_builtin() {
        let config = CrmConfig::new(meta()).with_extra_route("<int:id>/detail", "detail", |_, _| {
            Box::pin(async { Ok(HttpResponse::ok("detail")) })
        });
        let routes = config.routes().unwrap();
        assert_eq!(routes.len(), 5);
        assert_eq!(routes[4].name, "crm_customer_detail");
        assert!(matches!(routes[4].view, RouteView::Custom(_)));
    }

    #[test]
    fn test_bad_extra_route() {
        let config = CrmConfig::new(meta()).with_extra_route("<int:id", "broken", |_, _| {
            Box::pin(async { Ok(HttpResponse::ok("")) })
        });
        assert!(matches!(
            config.routes(),
            Err(ThanosError::ImproperlyConfigured(_))
        ));
    }

    #[test]
    fn test_compute_url() {
        let config = CrmConfig::new(meta());
        let urls = urls(&config);
        assert_eq!(config.changelist_url(&urls).unwrap(), "/thanos/crm/customer/");
        assert_eq!(config.add_url(&urls).unwrap(), "/thanos/crm/customer/add/");
        assert_eq!(
            config.change_url(&urls, 7).unwrap(),
            "/thanos/crm/customer/7/change"
        );
        assert!(matches!(
            config.compute_url(&urls, "export", &[]),
            Err(ThanosError::NoReverseMatch(_))
        ));
        assert!(config.changelist_url(&UrlTable::new("/thanos")).is_err());
    }

    #[test]
    fn test_render_checkbox() {
        let config = CrmConfig::new(meta());
        assert_eq!(
            config.render_checkbox(None),
            r####"<input type="checkbox" name="obj_list" value="###">"####
        );
        assert_eq!(
            config.render_checkbox(Some(&Record::new().with("id", 4))),
            r#"<input type="checkbox" name="obj" value="4">"#
        );
    }

    #[test]
    fn test_render_links() {
        let config = CrmConfig::new(meta());
        let urls = urls(&config);
        let record = Record::new().with("id", 4);
        let params = "_list_filter=city%3DParis";

        assert_eq!(config.render_change_link(&urls, params, None).unwrap(), "Edit");
        assert_eq!(
            config.render_change_link(&urls, params, Some(&record)).unwrap(),
            r#"<a href="/thanos/crm/customer/4/change?_list_filter=city%3DParis">Edit</a>"#
        );
        assert_eq!(config.render_delete_link(&urls, params, None).unwrap(), "Delete");
        assert_eq!(
            config.render_delete_link(&urls, params, Some(&record)).unwrap(),
            r#"<a href="/thanos/crm/customer/4/delete?_list_filter=city%3DParis">Delete</a>"#
        );
    }

    #[test]
    fn test_display_columns_wrap_list_display() {
        let config = CrmConfig::new(meta()).with_list_display(["name", "city"]);
        let columns = config.display_columns();
        assert_eq!(columns.len(), 5);
        assert!(matches!(columns[0], ListColumn::Checkbox));
        assert!(matches!(&columns[1], ListColumn::Field(name) if name == "name"));
        assert!(matches!(columns[3], ListColumn::ChangeLink));
        assert!(matches!(columns[4], ListColumn::DeleteLink));
    }

    #[test]
    fn test_column_rendering() {
        let config = CrmConfig::new(meta()).with_list_display(vec![
            ListColumn::from("name"),
            ListColumn::custom(|ctx, record| {
                Ok(record.map_or_else(
                    || "Shout".to_string(),
                    |r| r.display_value(ctx.config.meta(), "name").to_uppercase(),
                ))
            }),
        ]);
        let urls = urls(&config);
        let ctx = RenderContext {
            config: &config,
            urls: &urls,
            params: "_list_filter=",
        };
        let record = Record::new().with("id", 1).with("name", "<Ann>");

        let headers: Vec<_> = config
            .display_columns()
            .iter()
            .map(|c| c.header(&ctx).unwrap())
            .collect();
        assert_eq!(headers[1..], ["Name", "Shout", "Edit", "Delete"]);

        let cells: Vec<_> = config
            .display_columns()
            .iter()
            .map(|c| c.cell(&ctx, &record).unwrap())
            .collect();
        assert_eq!(cells[1], "&lt;Ann&gt;");
        assert_eq!(cells[2], "<ANN>");
    }

    #[test]
    fn test_unknown_field_column_is_misconfiguration() {
        let config = CrmConfig::new(meta()).with_list_display(["email"]);
        let urls = urls(&config);
        let ctx = RenderContext {
            config: &config,
            urls: &urls,
            params: "",
        };
        assert!(matches!(
            ListColumn::from("email").header(&ctx),
            Err(ThanosError::ImproperlyConfigured(_))
        ));
    }

    #[test]
    fn test_model_form_config() {
        use thanos_forms::ModelFormFields;

        let config = CrmConfig::new(meta());
        assert_eq!(config.model_form_config().fields, ModelFormFields::All);

        let config = config.with_model_form(
            ModelFormConfig::new().with_fields(ModelFormFields::Include(vec!["name".into()])),
        );
        assert_eq!(
            config.model_form_config().fields,
            ModelFormFields::Include(vec!["name".into()])
        );
    }
}
