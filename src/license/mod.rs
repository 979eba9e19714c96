//! License text resolution.
//!
//! - [`text`] — normalizes raw license text.
//! - [`cache`] — read-only prior-run lookup table.
//! - [`readme`] — isolates and classifies the license section of a README.
//! - [`cascade`] — ordered fallback strategies producing one
//!   [`Resolution`](crate::models::Resolution) per dependency.

pub mod cache;
pub mod cascade;
pub mod readme;
pub mod text;
