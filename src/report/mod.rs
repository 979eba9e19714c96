//! Console reporting.
//!
//! - [`terminal`] — per-package colored status lines and the end-of-run summary table.
//! - [`missing`] — audit of the JSON builder's state for packages lacking text or links.

pub mod missing;
pub mod terminal;
