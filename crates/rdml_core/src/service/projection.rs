//! Plain projection of a document for JSON export and import.
//!
//! # Responsibility
//! - Define the wire shape exported by `RdmlDocument::export()`.
//! - Feed projected records back through the normal record creation path.
//!
//! # Invariants
//! - Optional fields are omitted, never exported as empty strings.
//! - Bulk measurement data is never part of a projection.

use crate::model::record_kind::{FieldSpec, RecordDraft, RecordKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exported view of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentProjection {
    pub version: String,
    #[serde(rename = "dateMade", default, skip_serializing_if = "Option::is_none")]
    pub date_made: Option<String>,
    #[serde(rename = "dateUpdated", default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<String>,
    #[serde(default)]
    pub experimenters: Vec<RecordProjection>,
}

impl DocumentProjection {
    /// Projected records of `kind`.
    pub fn records(&self, kind: RecordKind) -> &[RecordProjection] {
        match kind {
            RecordKind::Experimenter => &self.experimenters,
        }
    }

    pub(crate) fn records_mut(&mut self, kind: RecordKind) -> &mut Vec<RecordProjection> {
        match kind {
            RecordKind::Experimenter => &mut self.experimenters,
        }
    }
}

/// Exported view of one record: its id plus field tag/text pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordProjection {
    pub id: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

/// JSON envelope `{"rdml": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionEnvelope {
    pub rdml: DocumentProjection,
}

/// Adapts one projected record to the record creation path.
pub(crate) struct ProjectedRecord<'a> {
    pub kind: RecordKind,
    pub record: &'a RecordProjection,
}

impl ProjectedRecord<'_> {
    /// First field key the kind does not define, if any.
    pub fn unknown_field(&self) -> Option<&str> {
        let specs = self.kind.field_specs();
        self.record
            .fields
            .keys()
            .map(String::as_str)
            .find(|key| !specs.iter().any(|spec| spec.tag == *key))
    }
}

impl RecordDraft for ProjectedRecord<'_> {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn id(&self) -> &str {
        &self.record.id
    }

    fn field_value(&self, spec: &FieldSpec) -> Option<&str> {
        self.record.fields.get(spec.tag).map(String::as_str)
    }
}
