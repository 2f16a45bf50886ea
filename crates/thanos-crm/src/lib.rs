//! # thanos-crm
//!
//! The auto-generated CRUD console. Models are registered on a
//! [`CrmSite`], optionally with a [`CrmConfig`] choosing the changelist
//! columns, the add button, the form, and extra routes. The site then
//! builds an axum router serving a list, add, edit, and delete page for
//! every model.
//!
//! ## Modules
//!
//! - [`site`] - The registry and router
//! - [`config`] - Per-model configuration and route tables
//! - [`columns`] - Changelist columns
//! - [`views`] - The four page views
//! - [`paginator`] - Page slicing and the pager widget
//! - [`templates`] - Page templates

pub mod columns;
pub mod config;
pub mod paginator;
pub mod site;
pub mod templates;
pub mod views;

pub use columns::{ListColumn, RenderContext};
pub use config::{CrmConfig, CrmRoute, RouteView};
pub use paginator::Paginator;
pub use site::{CrmSite, SiteRoute};
pub use templates::Templates;
pub use views::{DeleteResult, ViewContext};
