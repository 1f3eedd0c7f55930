//! RDML document facade.
//!
//! # Responsibility
//! - Create, load, save and export RDML documents.
//! - Compose record construction, field materialization and position
//!   resolution into single atomic edits.
//! - Delegate structural checks to an injected `ContractProvider`.
//!
//! # Invariants
//! - A document always has an `rdml` root with a supported version.
//! - Every edit either applies one tree mutation or leaves the tree as is.
//! - Validation and export never mutate the tree.
//! - Deleting a record leaves references to its id elsewhere untouched.

use crate::contract::{ContractProvider, ValidationReport};
use crate::model::element::{Element, RDML_NAMESPACE};
use crate::model::experimenter::{Experimenter, ExperimenterDraft};
use crate::model::record_kind::{RecordDraft, RecordKind, RootGroup};
use crate::model::version::FormatVersion;
use crate::repo::fields::{collect_fields, materialize};
use crate::repo::group_repo::{
    all_children, count_children, create_record, find_by_id_or_position, find_record,
    first_child_text, GroupRepoError,
};
use crate::repo::position::{clamp_offset, resolve_insert_index};
use crate::service::projection::{
    DocumentProjection, ProjectedRecord, ProjectionEnvelope, RecordProjection,
};
use crate::xml::{parse_document, write_document, XmlError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

const ROOT_TAG: &str = "rdml";
const VERSION_ATTRIBUTE: &str = "version";
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors from document-level operations.
#[derive(Debug)]
pub enum DocumentError {
    /// Text is not an RDML document (wrong root, unsupported version, empty).
    Format(String),
    /// Text is not well-formed XML, or the tree could not be written.
    Xml(XmlError),
    /// Record lookup or construction rule violated.
    Repo(GroupRepoError),
    /// No structural contract is registered for the version.
    ContractUnavailable(FormatVersion),
    /// Projection cannot be turned into a document.
    Projection(String),
    /// File could not be read or written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format(message) => write!(f, "{message}"),
            Self::Xml(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::ContractUnavailable(version) => {
                write!(f, "no structural contract available for RDML version {version}")
            }
            Self::Projection(message) => write!(f, "invalid projection: {message}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Xml(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Format(_) | Self::ContractUnavailable(_) | Self::Projection(_) => None,
        }
    }
}

impl From<XmlError> for DocumentError {
    fn from(value: XmlError) -> Self {
        Self::Xml(value)
    }
}

impl From<GroupRepoError> for DocumentError {
    fn from(value: GroupRepoError) -> Self {
        Self::Repo(value)
    }
}

/// One RDML document owned by a single editor.
#[derive(Debug, Clone)]
pub struct RdmlDocument {
    root: Element,
    version: FormatVersion,
}

impl Default for RdmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl RdmlDocument {
    /// Creates an empty latest-version document stamped with the current UTC time.
    pub fn new() -> Self {
        let version = FormatVersion::latest();
        let created_at = chrono::Utc::now().format(DATE_FORMAT).to_string();
        let root = empty_root(version, Some(&created_at), None);
        info!(
            "event=doc_new module=document status=ok version={} created_at={}",
            version, created_at
        );
        Self { root, version }
    }

    /// Parses RDML text into a new document.
    ///
    /// # Errors
    /// - `Xml` when the text is not well-formed.
    /// - `Format` when the root is not `rdml` or the version is unsupported.
    pub fn parse(data: &str) -> DocumentResult<Self> {
        let started_at = Instant::now();
        match parse_rdml(data) {
            Ok(document) => {
                info!(
                    "event=doc_load module=document status=ok version={} experimenters={} duration_ms={}",
                    document.version,
                    document.record_count(RecordKind::Experimenter),
                    started_at.elapsed().as_millis()
                );
                Ok(document)
            }
            Err(err) => {
                warn!(
                    "event=doc_load module=document status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Replaces this document with parsed `data`; on failure nothing changes.
    pub fn load(&mut self, data: &str) -> DocumentResult<()> {
        *self = Self::parse(data)?;
        Ok(())
    }

    /// Reads and parses a plain-text RDML file.
    pub fn load_file(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if data.trim().is_empty() {
            return Err(DocumentError::Format(format!(
                "file `{}` is empty, not a valid RDML or XML file",
                path.display()
            )));
        }
        Self::parse(&data)
    }

    /// Serializes the tree and writes it to `path`.
    pub fn save_file(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        let path = path.as_ref();
        let data = self.to_xml_string()?;
        std::fs::write(path, data).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "event=doc_save module=document status=ok version={}",
            self.version
        );
        Ok(())
    }

    pub fn to_xml_string(&self) -> DocumentResult<String> {
        Ok(write_document(&self.root)?)
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// `dateMade` text; `None` when absent or blank.
    pub fn created_at(&self) -> Option<&str> {
        non_blank(first_child_text(&self.root, RootGroup::DateMade.tag()))
    }

    /// `dateUpdated` text; `None` when absent or blank.
    pub fn updated_at(&self) -> Option<&str> {
        non_blank(first_child_text(&self.root, RootGroup::DateUpdated.tag()))
    }

    pub fn record_count(&self, kind: RecordKind) -> usize {
        count_children(&self.root, kind.tag())
    }

    /// Record elements of `kind` in document order.
    pub fn records(&self, kind: RecordKind) -> Vec<&Element> {
        all_children(&self.root, kind.tag())
    }

    /// Looks up one record by id or by position within its group.
    pub fn find_record(
        &self,
        kind: RecordKind,
        id: Option<&str>,
        position: Option<i64>,
    ) -> DocumentResult<&Element> {
        Ok(find_record(&self.root, kind, id, position)?)
    }

    pub fn experimenters(&self) -> Vec<Experimenter<'_>> {
        self.records(RecordKind::Experimenter)
            .into_iter()
            .map(Experimenter::new)
            .collect()
    }

    pub fn experimenter(&self, id: &str) -> Option<Experimenter<'_>> {
        self.find_record(RecordKind::Experimenter, Some(id), None)
            .ok()
            .map(Experimenter::new)
    }

    /// Adds one record at `position` within its group.
    ///
    /// `None` or a negative position puts the record first in its group, a
    /// position past the end appends it. Returns the slot it landed in.
    ///
    /// # Errors
    /// - `Repo(MissingId | DuplicateId | MissingRequiredField)`; the tree is
    ///   unchanged in every error case.
    pub fn add_record(
        &mut self,
        draft: &dyn RecordDraft,
        position: Option<i64>,
    ) -> DocumentResult<usize> {
        let kind = draft.kind();
        match self.insert_record(draft, position) {
            Ok(slot) => {
                info!(
                    "event=record_add module=document status=ok kind={} id={} slot={}",
                    kind,
                    draft.id(),
                    slot
                );
                Ok(slot)
            }
            Err(err) => {
                warn!(
                    "event=record_add module=document status=error kind={} error={}",
                    kind, err
                );
                Err(err)
            }
        }
    }

    pub fn add_experimenter(
        &mut self,
        draft: &ExperimenterDraft,
        position: Option<i64>,
    ) -> DocumentResult<usize> {
        self.add_record(draft, position)
    }

    /// Removes one record selected by id or by position within its group.
    ///
    /// Other records referring to the removed id keep their references.
    pub fn delete_record(
        &mut self,
        kind: RecordKind,
        id: Option<&str>,
        position: Option<i64>,
    ) -> DocumentResult<Element> {
        let index = match find_by_id_or_position(&self.root, kind, id, position) {
            Ok(index) => index,
            Err(err) => {
                warn!(
                    "event=record_delete module=document status=error kind={} error={}",
                    kind, err
                );
                return Err(err.into());
            }
        };
        let removed = self.root.remove_child(index);
        info!(
            "event=record_delete module=document status=ok kind={} id={}",
            kind,
            removed.attribute(kind.id_attribute()).unwrap_or("")
        );
        Ok(removed)
    }

    /// Checks the tree against the contract registered for `version`.
    ///
    /// # Errors
    /// - `ContractUnavailable` when `provider` has no contract for `version`.
    pub fn validate_against(
        &self,
        provider: &dyn ContractProvider,
        version: FormatVersion,
    ) -> DocumentResult<ValidationReport> {
        let contract = provider
            .contract_for(version)
            .ok_or(DocumentError::ContractUnavailable(version))?;
        let report = ValidationReport {
            version,
            diagnostics: contract.check(&self.root),
        };
        info!(
            "event=doc_validate module=document status=ok version={} valid={} diagnostics={}",
            version,
            report.is_valid(),
            report.diagnostics.len()
        );
        Ok(report)
    }

    /// Checks the tree against the contract for its own declared version.
    pub fn validate(&self, provider: &dyn ContractProvider) -> DocumentResult<ValidationReport> {
        self.validate_against(provider, self.version)
    }

    /// Returns `false` on any diagnostic or when no contract is available.
    pub fn is_valid(&self, provider: &dyn ContractProvider) -> bool {
        self.validate(provider)
            .map(|report| report.is_valid())
            .unwrap_or(false)
    }

    /// Builds the plain projection of header values and records.
    pub fn export(&self) -> DocumentProjection {
        let mut projection = DocumentProjection {
            version: self.version.as_str().to_string(),
            date_made: self.created_at().map(str::to_string),
            date_updated: self.updated_at().map(str::to_string),
            experimenters: Vec::new(),
        };
        for kind in RecordKind::ALL {
            let records = self
                .records(kind)
                .into_iter()
                .map(|node| RecordProjection {
                    id: node.attribute(kind.id_attribute()).unwrap_or("").to_string(),
                    fields: collect_fields(node, kind.field_specs()),
                })
                .collect();
            *projection.records_mut(kind) = records;
        }
        projection
    }

    /// Projection wrapped as `{"rdml": {...}}`.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(ProjectionEnvelope {
            rdml: self.export(),
        })
    }

    /// Rebuilds a document from a projection, keeping record order.
    ///
    /// # Errors
    /// - `Format` for an unsupported version.
    /// - `Projection` for a field the record kind does not define.
    /// - `Repo` for records violating identity or required-field rules.
    pub fn from_projection(projection: &DocumentProjection) -> DocumentResult<Self> {
        let version = FormatVersion::parse(&projection.version).ok_or_else(|| {
            DocumentError::Format(format!(
                "unknown or unsupported RDML version `{}`",
                projection.version
            ))
        })?;
        let mut document = Self {
            root: empty_root(
                version,
                projection.date_made.as_deref(),
                projection.date_updated.as_deref(),
            ),
            version,
        };

        for kind in RecordKind::ALL {
            for record in projection.records(kind) {
                let draft = ProjectedRecord { kind, record };
                if let Some(field) = draft.unknown_field() {
                    return Err(DocumentError::Projection(format!(
                        "{kind} `{}` has unknown field `{field}`",
                        record.id
                    )));
                }
                document.insert_record(&draft, Some(i64::MAX))?;
            }
        }
        Ok(document)
    }

    fn insert_record(
        &mut self,
        draft: &dyn RecordDraft,
        position: Option<i64>,
    ) -> DocumentResult<usize> {
        let kind = draft.kind();
        let mut record = create_record(&self.root, kind, draft.id())?;
        materialize(&mut record, draft)?;

        let slot = clamp_offset(position, self.record_count(kind));
        let index = resolve_insert_index(&self.root, kind, position);
        self.root.insert_child(index, record);
        Ok(slot)
    }
}

/// Loads `path` and validates it, rendering the outcome as a report table.
///
/// Load failures become a `RDML file structure` row instead of an error.
pub fn validate_file(path: impl AsRef<Path>, provider: &dyn ContractProvider) -> String {
    let document = match RdmlDocument::load_file(path) {
        Ok(document) => document,
        Err(err) => return format!("RDML file structure:\tFalse\t{err}\n"),
    };
    let mut notes = String::from("RDML file structure:\tTrue\tValid file structure.\n");
    match document.validate(provider) {
        Ok(report) => notes.push_str(&report.to_table()),
        Err(err) => notes.push_str(&format!("RDML version:\tFalse\t{err}\n")),
    }
    notes
}

fn parse_rdml(data: &str) -> DocumentResult<RdmlDocument> {
    let root = parse_document(data)?;
    if !root.is_rdml(ROOT_TAG) {
        return Err(DocumentError::Format(format!(
            "root element is `{}`, not `{ROOT_TAG}`; not a valid RDML file",
            root.name()
        )));
    }
    let declared = root.attribute(VERSION_ATTRIBUTE).unwrap_or("");
    let version = FormatVersion::parse(declared).ok_or_else(|| {
        DocumentError::Format(format!(
            "unknown or unsupported RDML file version `{declared}`"
        ))
    })?;
    Ok(RdmlDocument { root, version })
}

fn empty_root(version: FormatVersion, date_made: Option<&str>, date_updated: Option<&str>) -> Element {
    let mut root = Element::rdml(ROOT_TAG)
        .with_attribute(VERSION_ATTRIBUTE, version.as_str())
        .with_attribute("xmlns:rdml", RDML_NAMESPACE)
        .with_attribute("xmlns", RDML_NAMESPACE);
    for (group, value) in [
        (RootGroup::DateMade, date_made),
        (RootGroup::DateUpdated, date_updated),
    ] {
        if let Some(value) = value.and_then(non_blank) {
            let header = root.new_child(group.tag()).with_text(value);
            root.push_child(header);
        }
    }
    root
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{empty_root, DocumentError, RdmlDocument};
    use crate::model::experimenter::ExperimenterDraft;
    use crate::model::version::FormatVersion;

    #[test]
    fn new_document_has_latest_version_and_timestamp() {
        let document = RdmlDocument::new();
        assert_eq!(document.version(), FormatVersion::V1_2);
        let created_at = document.created_at().unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(created_at, "%Y-%m-%dT%H:%M:%S").is_ok());
        assert_eq!(document.updated_at(), None);
    }

    #[test]
    fn empty_root_skips_blank_dates() {
        let root = empty_root(FormatVersion::V1_0, Some(""), Some("2024-02-02T00:00:00"));
        assert_eq!(root.children().len(), 1);
        assert!(root.children()[0].is_rdml("dateUpdated"));
    }

    #[test]
    fn load_keeps_previous_document_on_failure() {
        let mut document = RdmlDocument::new();
        document
            .add_experimenter(&ExperimenterDraft::new("exp1", "Ada", "Lovelace"), None)
            .unwrap();
        let err = document.load("<rdml xmlns='http://www.rdml.org' version='9.9'/>").unwrap_err();
        assert!(matches!(err, DocumentError::Format(_)));
        assert_eq!(document.experimenters().len(), 1);
    }
}
