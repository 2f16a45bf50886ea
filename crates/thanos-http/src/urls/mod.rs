//! URL patterns and reverse resolution.
//!
//! - [`pattern`]: route strings with `<int:name>` / `<str:name>` placeholders
//! - [`reverse`]: a named route table that builds paths from names and arguments

pub mod pattern;
pub mod reverse;
