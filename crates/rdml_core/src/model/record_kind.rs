//! Record kinds, field specs and the root group ordering table.
//!
//! # Responsibility
//! - Describe every child group allowed under the `rdml` root and their
//!   mandated relative order.
//! - Describe each modeled record kind as static data (tag, group, fields).
//!
//! # Invariants
//! - `RootGroup::ORDER` is a total order; position resolution and the
//!   built-in contracts both read it, nothing else encodes group order.
//! - Field specs of a kind are listed in schema order.

use crate::model::experimenter::EXPERIMENTER_FIELDS;
use std::fmt::{Display, Formatter};

/// One kind of direct child of the `rdml` root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootGroup {
    DateMade,
    DateUpdated,
    Id,
    Experimenter,
    Documentation,
    Dye,
    Sample,
    Target,
    ThermalCyclingConditions,
    Experiment,
}

impl RootGroup {
    /// Mandated order of root children.
    pub const ORDER: [RootGroup; 10] = [
        Self::DateMade,
        Self::DateUpdated,
        Self::Id,
        Self::Experimenter,
        Self::Documentation,
        Self::Dye,
        Self::Sample,
        Self::Target,
        Self::ThermalCyclingConditions,
        Self::Experiment,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::DateMade => "dateMade",
            Self::DateUpdated => "dateUpdated",
            Self::Id => "id",
            Self::Experimenter => "experimenter",
            Self::Documentation => "documentation",
            Self::Dye => "dye",
            Self::Sample => "sample",
            Self::Target => "target",
            Self::ThermalCyclingConditions => "thermalCyclingConditions",
            Self::Experiment => "experiment",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|group| group.tag() == tag)
    }

    /// Zero-based rank in `ORDER`.
    pub fn rank(self) -> usize {
        Self::ORDER
            .iter()
            .position(|group| *group == self)
            .unwrap_or(Self::ORDER.len())
    }

    /// Header children carry document metadata and precede every record group.
    pub fn is_header(self) -> bool {
        matches!(self, Self::DateMade | Self::DateUpdated | Self::Id)
    }

    /// Maximum occurrences under the root; `None` means unbounded.
    pub fn max_occurs(self) -> Option<usize> {
        match self {
            Self::DateMade | Self::DateUpdated => Some(1),
            _ => None,
        }
    }
}

/// Presence rule of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Local tag of the field element.
    pub tag: &'static str,
    /// Required fields must be present with non-empty text.
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(tag: &'static str) -> Self {
        Self {
            tag,
            required: true,
        }
    }

    pub const fn optional(tag: &'static str) -> Self {
        Self {
            tag,
            required: false,
        }
    }
}

/// Closed set of record kinds the repository can create, read and delete.
///
/// Adding a kind means adding a variant plus its field table; lookup,
/// construction and positioning stay generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Experimenter,
}

impl RecordKind {
    pub const ALL: [RecordKind; 1] = [Self::Experimenter];

    /// Root group this kind lives in.
    pub fn group(self) -> RootGroup {
        match self {
            Self::Experimenter => RootGroup::Experimenter,
        }
    }

    pub fn tag(self) -> &'static str {
        self.group().tag()
    }

    /// Attribute carrying the record identity.
    pub fn id_attribute(self) -> &'static str {
        "id"
    }

    /// Field specs in schema order.
    pub fn field_specs(self) -> &'static [FieldSpec] {
        match self {
            Self::Experimenter => &EXPERIMENTER_FIELDS,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

/// Caller input for one new record of a known kind.
pub trait RecordDraft {
    fn kind(&self) -> RecordKind;
    fn id(&self) -> &str;
    /// Value supplied for `spec`; `None` when the caller left it out.
    fn field_value(&self, spec: &FieldSpec) -> Option<&str>;
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
