//! Document-level use cases.
//!
//! # Responsibility
//! - Expose `RdmlDocument`, the single entry point for loading, editing,
//!   validating and exporting RDML documents.
//! - Keep callers decoupled from element and XML details.

pub mod document;
pub mod projection;
