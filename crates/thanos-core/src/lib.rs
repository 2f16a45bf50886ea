//! # thanos-core
//!
//! Core types for the thanos CRM console. This crate has no web framework
//! dependencies and provides the foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`html`] - HTML escaping
//! - [`settings`] - Console settings with defaults
//! - [`settings_loader`] - Loading settings from TOML/JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod html;
pub mod logging;
pub mod settings;
pub mod settings_loader;

pub use error::{ThanosError, ThanosResult, ValidationError};
pub use settings::Settings;
