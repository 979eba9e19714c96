//! Dependency scanners: sources of [`DependencyRecord`]s.
//!
//! - [`document`] — a license-checker / nlf style JSON document.
//! - [`node_modules`] — walks an installed `node_modules` tree.

use crate::error::GenResult;
use crate::models::DependencyRecord;

pub mod document;
pub mod node_modules;

pub trait Scanner {
    fn scan(&self) -> GenResult<Vec<DependencyRecord>>;
}

/// Split a combined `name@version` identifier at its last `@`.
///
/// Scoped names keep their leading `@`: `@scope/pkg@1.0.0 → ("@scope/pkg", "1.0.0")`.
pub fn split_package_id(id: &str) -> (String, String) {
    match id.rfind('@') {
        Some(idx) if idx > 0 => (id[..idx].to_string(), id[idx + 1..].to_string()),
        _ => (id.to_string(), String::new()),
    }
}
