//! Record group queries and record construction.
//!
//! # Responsibility
//! - Locate direct children of one kind by tag, id or position.
//! - Build detached record elements after identity checks.
//!
//! # Invariants
//! - Results are always in document order.
//! - `id` is unique within one group under one base, not globally.
//! - `create_record` never mutates `base`; attaching is a separate step.

use crate::model::element::Element;
use crate::model::record_kind::RecordKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by record group operations.
pub type GroupRepoResult<T> = Result<T, GroupRepoError>;

/// Errors from record group lookup and construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRepoError {
    /// New record has a blank id.
    MissingId { kind: RecordKind },
    /// Another record of the same kind already uses this id.
    DuplicateId { kind: RecordKind, id: String },
    /// Required field value is blank or missing.
    MissingRequiredField {
        kind: RecordKind,
        field: &'static str,
    },
    /// Lookup got both or neither of id and position.
    AmbiguousSelector { kind: RecordKind },
    /// No record of the kind has this id.
    NotFound { kind: RecordKind, id: String },
    /// Position is outside `[0, count - 1]`.
    IndexOutOfRange {
        kind: RecordKind,
        position: i64,
        count: usize,
    },
}

impl Display for GroupRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId { kind } => write!(f, "{kind} id must not be empty"),
            Self::DuplicateId { kind, id } => write!(f, "{kind} id already exists: `{id}`"),
            Self::MissingRequiredField { kind, field } => {
                write!(f, "{kind} field `{field}` is required")
            }
            Self::AmbiguousSelector { kind } => write!(
                f,
                "{kind} lookup requires exactly one of id or position"
            ),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: `{id}`"),
            Self::IndexOutOfRange {
                kind,
                position,
                count,
            } => write!(
                f,
                "{kind} position {position} is out of range for {count} record(s)"
            ),
        }
    }
}

impl Error for GroupRepoError {}

/// Returns the first direct child of `base` named `tag`.
pub fn first_child<'a>(base: &'a Element, tag: &str) -> Option<&'a Element> {
    base.children().iter().find(|node| node.is_rdml(tag))
}

/// Returns the text of the first `tag` child, or `""` when absent.
pub fn first_child_text<'a>(base: &'a Element, tag: &str) -> &'a str {
    first_child(base, tag)
        .and_then(Element::text)
        .unwrap_or("")
}

/// Returns all direct `tag` children in document order.
pub fn all_children<'a>(base: &'a Element, tag: &str) -> Vec<&'a Element> {
    base.children()
        .iter()
        .filter(|node| node.is_rdml(tag))
        .collect()
}

pub fn count_children(base: &Element, tag: &str) -> usize {
    base.children()
        .iter()
        .filter(|node| node.is_rdml(tag))
        .count()
}

/// Child indices (into `base.children()`) of every `tag` child.
pub(crate) fn child_indices(base: &Element, tag: &str) -> Vec<usize> {
    base.children()
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_rdml(tag))
        .map(|(index, _)| index)
        .collect()
}

/// Resolves one record of `kind` to its child index under `base`.
///
/// Exactly one of `id` and `position` must be supplied; `position` counts
/// records of `kind` only.
pub fn find_by_id_or_position(
    base: &Element,
    kind: RecordKind,
    id: Option<&str>,
    position: Option<i64>,
) -> GroupRepoResult<usize> {
    let indices = child_indices(base, kind.tag());
    match (id, position) {
        (Some(id), None) => indices
            .into_iter()
            .find(|index| {
                base.children()[*index].attribute(kind.id_attribute()) == Some(id)
            })
            .ok_or_else(|| GroupRepoError::NotFound {
                kind,
                id: id.to_string(),
            }),
        (None, Some(position)) => usize::try_from(position)
            .ok()
            .and_then(|slot| indices.get(slot).copied())
            .ok_or(GroupRepoError::IndexOutOfRange {
                kind,
                position,
                count: indices.len(),
            }),
        _ => Err(GroupRepoError::AmbiguousSelector { kind }),
    }
}

/// Like `find_by_id_or_position`, returning the record element.
pub fn find_record<'a>(
    base: &'a Element,
    kind: RecordKind,
    id: Option<&str>,
    position: Option<i64>,
) -> GroupRepoResult<&'a Element> {
    let index = find_by_id_or_position(base, kind, id, position)?;
    Ok(&base.children()[index])
}

/// Returns `false` when a record of `kind` under `base` already has `id`.
pub fn is_unique(base: &Element, kind: RecordKind, id: &str) -> bool {
    !all_children(base, kind.tag())
        .into_iter()
        .any(|node| node.attribute(kind.id_attribute()) == Some(id))
}

/// Builds a detached, field-less record of `kind` carrying `id`.
///
/// # Errors
/// - `MissingId` when `id` is blank.
/// - `DuplicateId` when `id` is already used in the group.
pub fn create_record(base: &Element, kind: RecordKind, id: &str) -> GroupRepoResult<Element> {
    if id.trim().is_empty() {
        return Err(GroupRepoError::MissingId { kind });
    }
    if !is_unique(base, kind, id) {
        return Err(GroupRepoError::DuplicateId {
            kind,
            id: id.to_string(),
        });
    }

    let mut record = base.new_child(kind.tag());
    record.set_attribute(kind.id_attribute(), id);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::{
        all_children, count_children, create_record, find_by_id_or_position, first_child_text,
        is_unique, GroupRepoError,
    };
    use crate::model::element::Element;
    use crate::model::record_kind::RecordKind;

    fn root_with(ids: &[&str]) -> Element {
        let mut root = Element::rdml("rdml");
        root.push_child(Element::rdml("dateMade").with_text("2024-01-01T00:00:00"));
        for id in ids {
            root.push_child(Element::rdml("experimenter").with_attribute("id", *id));
        }
        root.push_child(Element::rdml("dye").with_attribute("id", "FAM"));
        root
    }

    #[test]
    fn queries_follow_document_order() {
        let root = root_with(&["a", "b", "c"]);
        let ids: Vec<_> = all_children(&root, "experimenter")
            .into_iter()
            .filter_map(|node| node.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(count_children(&root, "experimenter"), 3);
        assert_eq!(count_children(&root, "sample"), 0);
        assert_eq!(first_child_text(&root, "dateMade"), "2024-01-01T00:00:00");
        assert_eq!(first_child_text(&root, "dateUpdated"), "");
    }

    #[test]
    fn find_resolves_id_and_position_to_child_index() {
        let root = root_with(&["a", "b"]);
        let kind = RecordKind::Experimenter;
        assert_eq!(find_by_id_or_position(&root, kind, Some("b"), None), Ok(2));
        assert_eq!(find_by_id_or_position(&root, kind, None, Some(0)), Ok(1));
    }

    #[test]
    fn find_rejects_ambiguous_missing_and_out_of_range_selectors() {
        let root = root_with(&["a", "b"]);
        let kind = RecordKind::Experimenter;
        assert_eq!(
            find_by_id_or_position(&root, kind, Some("a"), Some(0)),
            Err(GroupRepoError::AmbiguousSelector { kind })
        );
        assert_eq!(
            find_by_id_or_position(&root, kind, None, None),
            Err(GroupRepoError::AmbiguousSelector { kind })
        );
        assert_eq!(
            find_by_id_or_position(&root, kind, Some("zz"), None),
            Err(GroupRepoError::NotFound {
                kind,
                id: "zz".to_string()
            })
        );
        for position in [-1, 2, 50] {
            assert_eq!(
                find_by_id_or_position(&root, kind, None, Some(position)),
                Err(GroupRepoError::IndexOutOfRange {
                    kind,
                    position,
                    count: 2
                })
            );
        }
    }

    #[test]
    fn uniqueness_is_scoped_to_the_group() {
        let root = root_with(&["a"]);
        assert!(!is_unique(&root, RecordKind::Experimenter, "a"));
        // `FAM` is a dye id, not an experimenter id.
        assert!(is_unique(&root, RecordKind::Experimenter, "FAM"));
    }

    #[test]
    fn create_record_checks_identity_and_leaves_base_untouched() {
        let root = root_with(&["a"]);
        let kind = RecordKind::Experimenter;

        assert_eq!(
            create_record(&root, kind, "  "),
            Err(GroupRepoError::MissingId { kind })
        );
        assert_eq!(
            create_record(&root, kind, "a"),
            Err(GroupRepoError::DuplicateId {
                kind,
                id: "a".to_string()
            })
        );

        let record = create_record(&root, kind, "b").unwrap();
        assert!(record.is_rdml("experimenter"));
        assert_eq!(record.attribute("id"), Some("b"));
        assert!(record.children().is_empty());
        assert_eq!(count_children(&root, "experimenter"), 1);
    }

    #[test]
    fn error_messages_name_kind_and_value() {
        let err = GroupRepoError::IndexOutOfRange {
            kind: RecordKind::Experimenter,
            position: 7,
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "experimenter position 7 is out of range for 2 record(s)"
        );
    }
}
