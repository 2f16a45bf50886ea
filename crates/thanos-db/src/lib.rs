//! # thanos-db
//!
//! Model metadata and storage for the thanos console.
//!
//! ## Modules
//!
//! - [`fields`] - Field types and definitions
//! - [`model`] - Model metadata
//! - [`value`] - Field values
//! - [`record`] - Stored records
//! - [`filter`] - Equality filters built from request parameters
//! - [`store`] - The async store interface and an in-memory implementation

pub mod fields;
pub mod filter;
pub mod model;
pub mod record;
pub mod store;
pub mod value;

pub use fields::{FieldDef, FieldType};
pub use filter::Filter;
pub use model::ModelMeta;
pub use record::Record;
pub use store::{InMemoryStore, ModelStore};
pub use value::Value;
