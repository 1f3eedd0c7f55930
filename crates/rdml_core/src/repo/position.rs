//! Insertion index resolution for new records.
//!
//! # Responsibility
//! - Map a caller position inside one record group to a child index of the
//!   shared root child list.
//!
//! # Invariants
//! - Requested positions are clamped to `[0, count]`; absent means `0`.
//! - A new group is anchored by `RootGroup::ORDER`: after every child of an
//!   earlier group, before the first child of this or a later group.

use crate::model::element::{Element, RDML_NAMESPACE};
use crate::model::record_kind::{RecordKind, RootGroup};
use crate::repo::group_repo::child_indices;

/// Clamps a requested intra-group position to a slot in `[0, count]`.
pub fn clamp_offset(requested: Option<i64>, count: usize) -> usize {
    match requested {
        Some(value) if value > 0 => usize::try_from(value).map_or(count, |slot| slot.min(count)),
        _ => 0,
    }
}

/// Child index where `group` starts, or would start if it were present.
pub fn group_anchor(base: &Element, group: RootGroup) -> usize {
    let rank = group.rank();
    base.children()
        .iter()
        .position(|node| {
            node.namespace() == Some(RDML_NAMESPACE)
                && RootGroup::from_tag(node.local_name()).is_some_and(|other| other.rank() >= rank)
        })
        .unwrap_or(base.children().len())
}

/// Resolves the child index for a new record of `kind` at `requested`.
///
/// For a contiguous group this is `group_anchor + offset`. When foreign
/// children are interleaved, slot `offset` is taken relative to the group's
/// own records so the new record still lands between the right neighbours.
pub fn resolve_insert_index(base: &Element, kind: RecordKind, requested: Option<i64>) -> usize {
    let indices = child_indices(base, kind.tag());
    let offset = clamp_offset(requested, indices.len());

    if let Some(index) = indices.get(offset) {
        return *index;
    }
    match indices.last() {
        Some(last) => last + 1,
        None => group_anchor(base, kind.group()),
    }
}
