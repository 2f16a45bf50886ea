//! # thanos
//!
//! An auto-generated CRUD console. Register model metadata on a
//! [`CrmSite`](crm::CrmSite) and mount the router it builds; every model
//! gets a paginated changelist and add, edit, and delete pages.
//!
//! This crate re-exports the workspace crates. Depend on the individual
//! crates for finer-grained control.
//!
//! ```
//! use std::sync::Arc;
//! use thanos::prelude::*;
//!
//! let mut site = CrmSite::new();
//! site.register_with(
//!     ModelMeta::new("crm", "customer")
//!         .field(FieldDef::new("name", FieldType::CharField).max_length(50))
//!         .str_field("name"),
//!     |meta| CrmConfig::new(meta).with_list_display(["name"]).with_add_btn(true),
//! );
//!
//! let store: Arc<dyn ModelStore> = Arc::new(InMemoryStore::new());
//! let router = site.into_router(store, &Settings::default()).unwrap();
//! # drop(router);
//! ```

/// Errors, settings, logging, and HTML escaping.
pub use thanos_core as core;

/// Requests, responses, query dictionaries, and named URL patterns.
pub use thanos_http as http;

/// Model metadata, records, filters, and the model store.
pub use thanos_db as db;

/// Model-backed forms and widgets.
pub use thanos_forms as forms;

/// The console: registry, configuration, views, and pagination.
pub use thanos_crm as crm;

/// The types most console setups need.
pub mod prelude {
    pub use thanos_core::{Settings, ThanosError, ThanosResult};
    pub use thanos_crm::{CrmConfig, CrmSite, ListColumn, RenderContext, ViewContext};
    pub use thanos_db::{
        FieldDef, FieldType, Filter, InMemoryStore, ModelMeta, ModelStore, Record, Value,
    };
    pub use thanos_forms::{ModelFormConfig, WidgetType};
    pub use thanos_http::{
        HttpRequest, HttpResponse, HttpResponseRedirect, JsonResponse, QueryDict,
    };
}
