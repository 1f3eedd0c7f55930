//! RDML document model.
//!
//! # Responsibility
//! - Define the owned element tree every layer operates on.
//! - Describe record kinds, their fields and the root group order as data.
//!
//! # Invariants
//! - Records are identified by their `id` attribute, unique per group only.
//! - Group order under the root is defined once, in `RootGroup::ORDER`.

pub mod element;
pub mod experimenter;
pub mod record_kind;
pub mod version;
