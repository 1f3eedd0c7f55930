//! Record group repository over the element tree.
//!
//! # Responsibility
//! - Keep lookup, construction, field and position rules in one layer.
//! - Operate on borrowed `Element` trees; no I/O happens here.
//!
//! # See also
//! - `service::document` for the facade composing these steps.

pub mod fields;
pub mod group_repo;
pub mod position;
