//! Versioned structural contracts and their registry.
//!
//! # Responsibility
//! - Define the validator seam (`StructuralContract`) and how contracts are
//!   resolved by version (`ContractProvider`).
//! - Ship built-in contracts for every supported `FormatVersion`.
//!
//! # Invariants
//! - Contracts only read the tree; validation never mutates a document.
//! - A registry holds at most one contract per version.

use crate::model::element::Element;
use crate::model::version::FormatVersion;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod builtin;

pub use builtin::BuiltinContract;

/// One structural violation with its source location.
///
/// Line and column are `0` for elements that were not parsed from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn at(element: &Element, message: impl Into<String>) -> Self {
        let (line, column) = element
            .position()
            .map_or((0, 0), |position| (position.line, position.column));
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Line {}, Column {}: {}",
            self.line, self.column, self.message
        )
    }
}

/// Outcome of checking one tree against one contract version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub version: FormatVersion,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Renders the report as `label\tTrue|False\tdetail` rows.
    pub fn to_table(&self) -> String {
        let mut table = format!("RDML version:\tTrue\t{}\n", self.version);
        if self.is_valid() {
            table.push_str("Schema validation result:\tTrue\tRDML file is valid.\n");
        } else {
            table.push_str("Schema validation result:\tFalse\tRDML file is not valid.\n");
        }
        for diagnostic in &self.diagnostics {
            table.push_str(&format!("Schema validation error:\tFalse\t{diagnostic}\n"));
        }
        table
    }
}

/// Structural contract for one format version.
pub trait StructuralContract: Send + Sync {
    fn version(&self) -> FormatVersion;
    /// Checks `root` and returns every violation found, in document order.
    fn check(&self, root: &Element) -> Vec<Diagnostic>;
}

/// Resolves contracts by version.
pub trait ContractProvider {
    fn contract_for(&self, version: FormatVersion) -> Option<Arc<dyn StructuralContract>>;
}

/// Contract registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractRegistryError {
    DuplicateVersion(FormatVersion),
}

impl Display for ContractRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateVersion(version) => {
                write!(f, "contract already registered for version {version}")
            }
        }
    }
}

impl Error for ContractRegistryError {}

/// In-process contract registry keyed by format version.
#[derive(Default)]
pub struct ContractRegistry {
    contracts: BTreeMap<FormatVersion, Arc<dyn StructuralContract>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a `BuiltinContract` for every supported version.
    pub fn with_builtin_contracts() -> Self {
        let mut registry = Self::new();
        for version in FormatVersion::ALL {
            registry
                .contracts
                .insert(version, Arc::new(BuiltinContract::new(version)));
        }
        registry
    }

    /// Registers one contract under its own version.
    pub fn register(
        &mut self,
        contract: Arc<dyn StructuralContract>,
    ) -> Result<(), ContractRegistryError> {
        let version = contract.version();
        if self.contracts.contains_key(&version) {
            return Err(ContractRegistryError::DuplicateVersion(version));
        }
        self.contracts.insert(version, contract);
        Ok(())
    }

    /// Registered versions, oldest first.
    pub fn versions(&self) -> Vec<FormatVersion> {
        self.contracts.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl ContractProvider for ContractRegistry {
    fn contract_for(&self, version: FormatVersion) -> Option<Arc<dyn StructuralContract>> {
        self.contracts.get(&version).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BuiltinContract, ContractProvider, ContractRegistry, ContractRegistryError, Diagnostic,
        ValidationReport,
    };
    use crate::model::version::FormatVersion;
    use std::sync::Arc;

    #[test]
    fn builtin_registry_covers_every_version() {
        let registry = ContractRegistry::with_builtin_contracts();
        assert_eq!(registry.versions(), FormatVersion::ALL.to_vec());
        for version in FormatVersion::ALL {
            let contract = registry.contract_for(version).unwrap();
            assert_eq!(contract.version(), version);
        }
    }

    #[test]
    fn register_rejects_duplicate_versions() {
        let mut registry = ContractRegistry::new();
        assert!(registry.is_empty());
        registry
            .register(Arc::new(BuiltinContract::new(FormatVersion::V1_1)))
            .unwrap();
        let err = registry
            .register(Arc::new(BuiltinContract::new(FormatVersion::V1_1)))
            .unwrap_err();
        assert_eq!(err, ContractRegistryError::DuplicateVersion(FormatVersion::V1_1));
        assert!(registry.contract_for(FormatVersion::V1_2).is_none());
    }

    #[test]
    fn report_table_lists_result_and_errors() {
        let report = ValidationReport {
            version: FormatVersion::V1_2,
            diagnostics: vec![Diagnostic {
                line: 4,
                column: 3,
                message: "missing `lastName`".to_string(),
            }],
        };
        let table = report.to_table();
        assert!(table.starts_with("RDML version:\tTrue\t1.2\n"));
        assert!(table.contains("Schema validation result:\tFalse\tRDML file is not valid.\n"));
        assert!(table.contains("Schema validation error:\tFalse\tLine 4, Column 3: missing `lastName`\n"));
    }
}
