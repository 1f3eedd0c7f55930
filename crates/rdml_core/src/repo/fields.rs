//! Field materialization for record elements.
//!
//! # Responsibility
//! - Write record field elements according to required/optional specs.
//! - Read fields back with the blank-means-absent convention.
//!
//! # Invariants
//! - Required fields are never written blank.
//! - Blank optional values are omitted on write and read back as `None`.
//! - `materialize` writes fields in the kind's table order.

use crate::model::element::Element;
use crate::model::record_kind::{FieldSpec, RecordDraft, RecordKind};
use crate::repo::group_repo::{first_child_text, GroupRepoError, GroupRepoResult};
use std::collections::BTreeMap;

/// Appends one field element to `record`.
///
/// # Errors
/// - `MissingRequiredField` when `spec` is required and `text` is blank or
///   absent. Blank optional values are skipped without error.
pub fn set_field(
    record: &mut Element,
    kind: RecordKind,
    spec: &FieldSpec,
    text: Option<&str>,
) -> GroupRepoResult<()> {
    let Some(text) = text.filter(|value| !value.trim().is_empty()) else {
        if spec.required {
            return Err(GroupRepoError::MissingRequiredField {
                kind,
                field: spec.tag,
            });
        }
        return Ok(());
    };

    let field = record.new_child(spec.tag).with_text(text);
    record.push_child(field);
    Ok(())
}

/// Returns the field text, or `""` when the field is absent.
pub fn get_field<'a>(record: &'a Element, tag: &str) -> &'a str {
    first_child_text(record, tag)
}

/// Returns the field text, treating absent and blank alike as `None`.
pub fn get_optional_field<'a>(record: &'a Element, tag: &str) -> Option<&'a str> {
    let value = first_child_text(record, tag);
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Builds the exported field map of one record.
///
/// Required fields are always present (possibly empty for malformed input);
/// optional fields only when they carry text.
pub fn collect_fields(record: &Element, specs: &[FieldSpec]) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for spec in specs {
        if spec.required {
            fields.insert(spec.tag.to_string(), get_field(record, spec.tag).to_string());
        } else if let Some(value) = get_optional_field(record, spec.tag) {
            fields.insert(spec.tag.to_string(), value.to_string());
        }
    }
    fields
}

/// Writes every field of `draft` onto a detached `record`, in table order.
///
/// Stops at the first missing required field; callers discard `record` then.
pub fn materialize(record: &mut Element, draft: &dyn RecordDraft) -> GroupRepoResult<()> {
    let kind = draft.kind();
    for spec in kind.field_specs() {
        set_field(record, kind, spec, draft.field_value(spec))?;
    }
    Ok(())
}
