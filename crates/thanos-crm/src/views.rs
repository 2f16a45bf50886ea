//! The console's views.
//!
//! Every view receives a [`ViewContext`] carrying the model's configuration
//! and the shared site services, plus the [`HttpRequest`]. Errors propagate
//! as [`ThanosError`] and become HTTP error responses, except in the delete
//! view, which reports a failed deletion inside its JSON answer.

use std::sync::Arc;

use http::Method;
use serde::{Deserialize, Serialize};
use tera::Context;

use thanos_core::html::escape_html;
use thanos_core::{Settings, ThanosError, ThanosResult};
use thanos_db::filter::Filter;
use thanos_db::record::Record;
use thanos_db::store::ModelStore;
use thanos_forms::ModelForm;
use thanos_http::{
    HttpRequest, HttpResponse, HttpResponseRedirect, JsonResponse, QueryDict, UrlTable,
};

use crate::columns::RenderContext;
use crate::config::CrmConfig;
use crate::paginator::Paginator;
use crate::templates::{self, Templates};

/// Query parameter carrying the changelist filter through add, edit, and
/// delete pages.
pub const LIST_FILTER_PARAM: &str = "_list_filter";

/// Header shown when a model has no display columns.
pub const GENERIC_HEADER: &str = "Record";

/// Everything a view needs besides the request.
#[derive(Clone)]
pub struct ViewContext {
    /// The configuration of the model the route belongs to.
    pub config: Arc<CrmConfig>,
    /// The record store.
    pub store: Arc<dyn ModelStore>,
    /// The site's URL table.
    pub urls: Arc<UrlTable>,
    /// The page templates.
    pub templates: Arc<Templates>,
    /// The console settings.
    pub settings: Arc<Settings>,
}

impl std::fmt::Debug for ViewContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewContext")
            .field("model", &self.config.meta().model_key())
            .field("prefix", &self.urls.prefix())
            .finish_non_exhaustive()
    }
}

impl ViewContext {
    /// A template context with the entries every page uses.
    pub fn base_context(&self) -> ThanosResult<Context> {
        let meta = self.config.meta();
        let mut context = Context::new();
        context.insert("site_title", &self.settings.site_title);
        context.insert("app_label", meta.app_label());
        context.insert("model_name", meta.model_name());
        context.insert("verbose_name", meta.verbose_name());
        context.insert("verbose_name_plural", meta.verbose_name_plural());
        context.insert(
            "changelist_url",
            &escape_html(&self.config.changelist_url(&self.urls)?),
        );
        Ok(context)
    }

    fn render(&self, name: &str, context: &Context) -> ThanosResult<HttpResponse> {
        Ok(HttpResponse::ok(self.templates.render(name, context)?))
    }
}

/// The JSON answer of the delete view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// `false` when the deletion failed.
    pub status: bool,
    /// The failure message.
    pub error_msg: Option<String>,
    /// Where to go next: the changelist with the original filter.
    pub rtn_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteRequest {
    #[serde(default)]
    opt: Option<serde_json::Value>,
}

fn ensure_get_or_post(request: &HttpRequest) -> ThanosResult<bool> {
    let method = request.method();
    if *method == Method::POST {
        Ok(true)
    } else if *method == Method::GET || *method == Method::HEAD {
        Ok(false)
    } else {
        Err(ThanosError::MethodNotAllowed(method.to_string()))
    }
}

fn record_id(request: &HttpRequest) -> ThanosResult<i64> {
    request
        .path_arg("id")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| ThanosError::NotFound(request.path().to_string()))
}

/// The changelist URL followed by the request's `_list_filter` value,
/// appended verbatim. Without a filter the bare changelist URL is returned.
pub fn changelist_return_url(ctx: &ViewContext, request: &HttpRequest) -> ThanosResult<String> {
    let url = ctx.config.changelist_url(&ctx.urls)?;
    Ok(match request.get().get(LIST_FILTER_PARAM) {
        Some(filter) => format!("{url}?{filter}"),
        None => url,
    })
}

fn page_number(params: &QueryDict) -> usize {
    params
        .get("page")
        .and_then(|page| page.trim().parse::<usize>().ok())
        .filter(|&page| page >= 1)
        .unwrap_or(1)
}

/// Lists the model's records.
///
/// Every query parameter except `page` filters by equality on the field it
/// names; an unknown field or a value of the wrong type is a bad request.
/// The page number comes from `page` and falls back to 1.
pub async fn changelist_view(
    ctx: &ViewContext,
    request: &HttpRequest,
) -> ThanosResult<HttpResponse> {
    ensure_get_or_post(request)?;
    let config = &ctx.config;
    let meta = config.meta();

    let mut list_filter = QueryDict::new_mutable();
    list_filter.set(LIST_FILTER_PARAM, &request.get().urlencode())?;
    let params = list_filter.urlencode();
    let add_url = format!("{}?{params}", config.add_url(&ctx.urls)?);

    let render_ctx = RenderContext {
        config,
        urls: &ctx.urls,
        params: &params,
    };
    let columns = config.display_columns();
    let head_list = if columns.is_empty() {
        vec![GENERIC_HEADER.to_string()]
    } else {
        columns
            .iter()
            .map(|column| column.header(&render_ctx))
            .collect::<ThanosResult<Vec<_>>>()?
    };

    let filter = Filter::from_params(meta, request.get().iter())
        .map_err(|e| ThanosError::BadRequest(e.to_string()))?;
    let pager_params: QueryDict = request
        .get()
        .iter()
        .filter(|(key, _)| !Filter::RESERVED_PARAMS.contains(key))
        .collect();

    let records = ctx.store.filter(meta, &filter).await?;
    let count = records.len();
    let paginator = Paginator::new(
        pager_params,
        records,
        page_number(request.get()),
        request.path(),
        config.list_per_page(ctx.settings.list_per_page),
    );

    let data_list = paginator
        .show_obj_list()
        .iter()
        .map(|record| {
            if columns.is_empty() {
                return Ok(vec![escape_html(&meta.display(record))]);
            }
            columns
                .iter()
                .map(|column| column.cell(&render_ctx, record))
                .collect::<ThanosResult<Vec<_>>>()
        })
        .collect::<ThanosResult<Vec<_>>>()?;

    tracing::debug!(
        model = %meta.model_key(),
        filters = filter.conditions().len(),
        count,
        page = paginator.current_page(),
        "changelist"
    );

    let mut context = ctx.base_context()?;
    context.insert("show_add_btn", &config.show_add_btn());
    context.insert("add_url", &escape_html(&add_url));
    context.insert("head_list", &head_list);
    context.insert("data_list", &data_list);
    context.insert("count", &count);
    context.insert("pager_html", &paginator.pager_html()?);
    ctx.render(templates::CHANGELIST, &context)
}

/// Shows a blank form, or creates a record from a valid submission.
///
/// An invalid submission re-renders the form with its errors and saves
/// nothing. After a save the client is sent back to the changelist with
/// the original filter.
pub async fn add_view(ctx: &ViewContext, request: &HttpRequest) -> ThanosResult<HttpResponse> {
    let is_post = ensure_get_or_post(request)?;
    let config = &ctx.config;
    let mut form = ModelForm::new(config.meta_arc(), &config.model_form_config());

    if is_post {
        form.bind(request.post());
        if form.is_valid() {
            let record = form.save(ctx.store.as_ref()).await?;
            tracing::info!(
                model = %config.meta().model_key(),
                pk = record.pk(config.meta()),
                "record added"
            );
            return Ok(HttpResponseRedirect::new(&changelist_return_url(ctx, request)?));
        }
        tracing::debug!(
            model = %config.meta().model_key(),
            errors = ?form.errors(),
            "add form invalid"
        );
    }

    let mut context = ctx.base_context()?;
    context.insert("form_html", &form.as_html());
    context.insert("has_errors", &!form.errors().is_empty());
    ctx.render(templates::ADD, &context)
}

/// Shows the edit form, or saves a submission and returns to the changelist.
///
/// A missing record redirects to the changelist. Submissions are saved
/// without a validity gate: fields that clean are written, the rest are
/// skipped, and the client is always redirected.
pub async fn change_view(ctx: &ViewContext, request: &HttpRequest) -> ThanosResult<HttpResponse> {
    let is_post = ensure_get_or_post(request)?;
    let config = &ctx.config;
    let meta = config.meta();
    let id = record_id(request)?;

    let Some(record) = ctx.store.get(meta, id).await? else {
        tracing::debug!(model = %meta.model_key(), pk = id, "edit of missing record");
        return Ok(HttpResponseRedirect::new(&config.changelist_url(&ctx.urls)?));
    };
    let object_repr = meta.display(&record);
    let mut form =
        ModelForm::new(config.meta_arc(), &config.model_form_config()).with_instance(record);

    if is_post {
        form.bind(request.post());
        form.save_partial(ctx.store.as_ref()).await?;
        tracing::info!(model = %meta.model_key(), pk = id, "record changed");
        return Ok(HttpResponseRedirect::new(&changelist_return_url(ctx, request)?));
    }

    let mut context = ctx.base_context()?;
    context.insert("object_repr", &object_repr);
    context.insert("form_html", &form.as_html());
    ctx.render(templates::EDIT, &context)
}

/// Shows the delete confirmation, or deletes on a confirmed JSON request.
///
/// The POST body is `{"opt": ...}`; the record is deleted only when `opt`
/// equals [`Settings::delete_confirm_token`]. The answer is always a
/// [`DeleteResult`]. When the deletion fails, `status` is `false`,
/// `error_msg` holds the failure, and `rtn_url` stays unset.
pub async fn delete_view(ctx: &ViewContext, request: &HttpRequest) -> ThanosResult<HttpResponse> {
    let is_post = ensure_get_or_post(request)?;
    let config = &ctx.config;
    let meta = config.meta();
    let id = record_id(request)?;

    if !is_post {
        let object_repr = ctx.store.get(meta, id).await?.map_or_else(
            || meta.display(&Record::new().with(meta.pk_name(), id)),
            |record| meta.display(&record),
        );
        let mut context = ctx.base_context()?;
        context.insert("object_repr", &object_repr);
        context.insert("confirm_token", &ctx.settings.delete_confirm_token);
        return ctx.render(templates::DELETE, &context);
    }

    let body: DeleteRequest = serde_json::from_slice(request.body())
        .map_err(|e| ThanosError::BadRequest(format!("Malformed delete request: {e}")))?;
    let confirmed = body
        .opt
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .is_some_and(|opt| opt == ctx.settings.delete_confirm_token);

    let mut result = DeleteResult {
        status: true,
        error_msg: None,
        rtn_url: None,
    };
    let outcome = async {
        if confirmed {
            let removed = ctx.store.delete(meta, id).await?;
            tracing::info!(model = %meta.model_key(), pk = id, removed, "record deleted");
        }
        changelist_return_url(ctx, request)
    }
    .await;
    match outcome {
        Ok(url) => result.rtn_url = Some(url),
        Err(err) => {
            tracing::warn!(model = %meta.model_key(), pk = id, error = %err, "delete failed");
            result.status = false;
            result.error_msg = Some(err.to_string());
        }
    }
    Ok(JsonResponse::new(&result))
}
