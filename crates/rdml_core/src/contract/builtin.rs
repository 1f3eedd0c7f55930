//! Built-in structural contract derived from the model tables.
//!
//! Checks root identity and version, root group order and cardinality, record
//! identity, and the field layout of every modeled record kind. Record kinds
//! without a field table only get their `id` checked.

use super::{Diagnostic, StructuralContract};
use crate::model::element::{Element, RDML_NAMESPACE};
use crate::model::record_kind::{FieldSpec, RecordKind, RootGroup};
use crate::model::version::FormatVersion;
use std::collections::{HashMap, HashSet};

const ROOT_TAG: &str = "rdml";
const ID_ATTRIBUTE: &str = "id";

/// Contract built from `RootGroup::ORDER` and the record kind field tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinContract {
    version: FormatVersion,
}

impl BuiltinContract {
    pub fn new(version: FormatVersion) -> Self {
        Self { version }
    }
}

impl StructuralContract for BuiltinContract {
    fn version(&self) -> FormatVersion {
        self.version
    }

    fn check(&self, root: &Element) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if !root.is_rdml(ROOT_TAG) {
            diagnostics.push(Diagnostic::at(
                root,
                format!(
                    "root element must be `{ROOT_TAG}` in namespace {RDML_NAMESPACE}, found `{}`",
                    root.name()
                ),
            ));
            return diagnostics;
        }

        match root.attribute("version") {
            Some(value) if value == self.version.as_str() => {}
            Some(value) => diagnostics.push(Diagnostic::at(
                root,
                format!(
                    "version `{value}` does not match contract version {}",
                    self.version
                ),
            )),
            None => diagnostics.push(Diagnostic::at(root, "attribute `version` is required")),
        }

        check_root_children(root, &mut diagnostics);
        diagnostics
    }
}

fn check_root_children(root: &Element, diagnostics: &mut Vec<Diagnostic>) {
    let mut latest: Option<RootGroup> = None;
    let mut occurrences: HashMap<RootGroup, usize> = HashMap::new();
    let mut seen_ids: HashMap<RootGroup, HashSet<&str>> = HashMap::new();

    for child in root.children() {
        let group = (child.namespace() == Some(RDML_NAMESPACE))
            .then(|| RootGroup::from_tag(child.local_name()))
            .flatten();
        let Some(group) = group else {
            diagnostics.push(Diagnostic::at(
                child,
                format!("element `{}` is not expected here", child.name()),
            ));
            continue;
        };

        if let Some(previous) = latest {
            if group.rank() < previous.rank() {
                diagnostics.push(Diagnostic::at(
                    child,
                    format!(
                        "element `{}` must precede `{}`",
                        group.tag(),
                        previous.tag()
                    ),
                ));
            }
        }
        if latest.map_or(true, |previous| group.rank() > previous.rank()) {
            latest = Some(group);
        }

        let count = occurrences.entry(group).or_insert(0);
        *count += 1;
        if group.max_occurs().is_some_and(|max| *count > max) {
            diagnostics.push(Diagnostic::at(
                child,
                format!("element `{}` may occur at most once", group.tag()),
            ));
        }

        if group.is_header() {
            continue;
        }
        check_record_identity(child, group, &mut seen_ids, diagnostics);
        if let Some(kind) = RecordKind::from_tag(group.tag()) {
            check_record_fields(child, kind.field_specs(), diagnostics);
        }
    }
}

fn check_record_identity<'a>(
    record: &'a Element,
    group: RootGroup,
    seen_ids: &mut HashMap<RootGroup, HashSet<&'a str>>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match record.attribute(ID_ATTRIBUTE) {
        Some(id) if !id.trim().is_empty() => {
            if !seen_ids.entry(group).or_default().insert(id) {
                diagnostics.push(Diagnostic::at(
                    record,
                    format!("duplicate {} id `{id}`", group.tag()),
                ));
            }
        }
        _ => diagnostics.push(Diagnostic::at(
            record,
            format!("element `{}` requires a non-empty `id`", group.tag()),
        )),
    }
}

fn check_record_fields(record: &Element, specs: &[FieldSpec], diagnostics: &mut Vec<Diagnostic>) {
    let mut last_rank: Option<usize> = None;
    let mut present = HashSet::new();

    for field in record.children() {
        let rank = (field.namespace() == Some(RDML_NAMESPACE))
            .then(|| specs.iter().position(|spec| spec.tag == field.local_name()))
            .flatten();
        let Some(rank) = rank else {
            diagnostics.push(Diagnostic::at(
                field,
                format!(
                    "element `{}` is not expected in `{}`",
                    field.name(),
                    record.local_name()
                ),
            ));
            continue;
        };

        let tag = specs[rank].tag;
        if !present.insert(tag) {
            diagnostics.push(Diagnostic::at(
                field,
                format!("element `{tag}` may occur at most once"),
            ));
        } else if last_rank.is_some_and(|last| rank < last) {
            diagnostics.push(Diagnostic::at(
                field,
                format!("element `{tag}` is out of order"),
            ));
        }
        last_rank = Some(last_rank.map_or(rank, |last| last.max(rank)));

        if specs[rank].required && field.text().map_or(true, |text| text.trim().is_empty()) {
            diagnostics.push(Diagnostic::at(
                field,
                format!("element `{tag}` must not be empty"),
            ));
        }
    }

    for spec in specs.iter().filter(|spec| spec.required) {
        if !present.contains(spec.tag) {
            diagnostics.push(Diagnostic::at(
                record,
                format!(
                    "element `{}` is missing required child `{}`",
                    record.local_name(),
                    spec.tag
                ),
            ));
        }
    }
}
