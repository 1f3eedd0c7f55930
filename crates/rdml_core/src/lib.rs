//! Core library for reading, editing and validating RDML documents.
//!
//! `RdmlDocument` is the entry point; the `repo` layer holds the reusable
//! record group operations it composes.

pub mod contract;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod xml;

pub use contract::{
    BuiltinContract, ContractProvider, ContractRegistry, ContractRegistryError, Diagnostic,
    StructuralContract, ValidationReport,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::element::{Element, SourcePosition, RDML_NAMESPACE};
pub use model::experimenter::{Experimenter, ExperimenterDraft, ExperimenterField};
pub use model::record_kind::{FieldSpec, RecordDraft, RecordKind, RootGroup};
pub use model::version::FormatVersion;
pub use repo::group_repo::{GroupRepoError, GroupRepoResult};
pub use service::document::{validate_file, DocumentError, DocumentResult, RdmlDocument};
pub use service::projection::{DocumentProjection, ProjectionEnvelope, RecordProjection};
pub use xml::XmlError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
