//! Changelist columns.
//!
//! A [`ListColumn`] renders one header cell and one cell per record. Field
//! columns print a model field; the built-in checkbox, edit, and delete
//! columns are added around them by
//! [`CrmConfig::display_columns`](crate::config::CrmConfig::display_columns).
//! [`ListColumn::Custom`] wraps a render function that is called with no
//! record for the header.

use std::fmt;
use std::sync::Arc;

use thanos_core::html::escape_html;
use thanos_core::{ThanosError, ThanosResult};
use thanos_db::record::Record;
use thanos_http::UrlTable;

use crate::config::CrmConfig;

/// A custom column renderer. `None` asks for the header.
///
/// The returned string is inserted as HTML.
pub type RenderFn =
    Arc<dyn Fn(&RenderContext<'_>, Option<&Record>) -> ThanosResult<String> + Send + Sync>;

/// What a column renderer can see.
pub struct RenderContext<'a> {
    /// The model configuration being rendered.
    pub config: &'a CrmConfig,
    /// The site's URL table.
    pub urls: &'a UrlTable,
    /// The encoded `_list_filter=...` parameter carrying the current filter.
    pub params: &'a str,
}

/// One column of the changelist.
#[derive(Clone)]
pub enum ListColumn {
    /// A model field, headed by its verbose name.
    Field(String),
    /// The row-selection checkbox.
    Checkbox,
    /// A link to the record's edit page.
    ChangeLink,
    /// A link to the record's delete page.
    DeleteLink,
    /// A render function.
    Custom(RenderFn),
}

impl ListColumn {
    /// Wraps a render function.
    pub fn custom<F>(render: F) -> Self
    where
        F: Fn(&RenderContext<'_>, Option<&Record>) -> ThanosResult<String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(render))
    }

    /// Renders the header cell.
    ///
    /// # Errors
    ///
    /// A field column naming a field the model lacks is a configuration
    /// error.
    pub fn header(&self, ctx: &RenderContext<'_>) -> ThanosResult<String> {
        match self {
            Self::Field(name) => ctx
                .config
                .meta()
                .get_field(name)
                .map(|field| escape_html(&field.verbose_name))
                .map_err(|e| ThanosError::ImproperlyConfigured(e.to_string())),
            Self::Checkbox => Ok(ctx.config.render_checkbox(None)),
            Self::ChangeLink => ctx.config.render_change_link(ctx.urls, ctx.params, None),
            Self::DeleteLink => ctx.config.render_delete_link(ctx.urls, ctx.params, None),
            Self::Custom(render) => render(ctx, None),
        }
    }

    /// Renders the cell for `record`.
    pub fn cell(&self, ctx: &RenderContext<'_>, record: &Record) -> ThanosResult<String> {
        match self {
            Self::Field(name) => Ok(escape_html(
                &record.display_value(ctx.config.meta(), name),
            )),
            Self::Checkbox => Ok(ctx.config.render_checkbox(Some(record))),
            Self::ChangeLink => ctx
                .config
                .render_change_link(ctx.urls, ctx.params, Some(record)),
            Self::DeleteLink => ctx
                .config
                .render_delete_link(ctx.urls, ctx.params, Some(record)),
            Self::Custom(render) => render(ctx, Some(record)),
        }
    }
}

impl From<&str> for ListColumn {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for ListColumn {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl fmt::Debug for ListColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Checkbox => write!(f, "Checkbox"),
            Self::ChangeLink => write!(f, "ChangeLink"),
            Self::DeleteLink => write!(f, "DeleteLink"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
