//! Experimenter record kind.
//!
//! # Responsibility
//! - Declare the experimenter field table.
//! - Provide typed read access over an experimenter element and a typed
//!   draft used to create one.
//!
//! # Invariants
//! - `firstName` and `lastName` are required, the rest optional.
//! - Blank optional values read back as `None`.

use crate::model::element::Element;
use crate::model::record_kind::{FieldSpec, RecordDraft, RecordKind};
use crate::repo::fields::{get_field, get_optional_field};

/// Fields of an experimenter record, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimenterField {
    FirstName,
    LastName,
    Email,
    LabName,
    LabAddress,
}

impl ExperimenterField {
    pub const ALL: [ExperimenterField; 5] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::LabName,
        Self::LabAddress,
    ];

    pub const fn spec(self) -> FieldSpec {
        match self {
            Self::FirstName => FieldSpec::required("firstName"),
            Self::LastName => FieldSpec::required("lastName"),
            Self::Email => FieldSpec::optional("email"),
            Self::LabName => FieldSpec::optional("labName"),
            Self::LabAddress => FieldSpec::optional("labAddress"),
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.spec().tag == tag)
    }
}

/// Field table of `RecordKind::Experimenter`.
pub const EXPERIMENTER_FIELDS: [FieldSpec; 5] = [
    ExperimenterField::FirstName.spec(),
    ExperimenterField::LastName.spec(),
    ExperimenterField::Email.spec(),
    ExperimenterField::LabName.spec(),
    ExperimenterField::LabAddress.spec(),
];

/// Read-only typed view over one `experimenter` element.
#[derive(Debug, Clone, Copy)]
pub struct Experimenter<'a> {
    node: &'a Element,
}

impl<'a> Experimenter<'a> {
    pub fn new(node: &'a Element) -> Self {
        Self { node }
    }

    pub fn element(&self) -> &'a Element {
        self.node
    }

    pub fn id(&self) -> &'a str {
        self.node
            .attribute(RecordKind::Experimenter.id_attribute())
            .unwrap_or("")
    }

    pub fn first_name(&self) -> &'a str {
        get_field(self.node, ExperimenterField::FirstName.spec().tag)
    }

    pub fn last_name(&self) -> &'a str {
        get_field(self.node, ExperimenterField::LastName.spec().tag)
    }

    pub fn email(&self) -> Option<&'a str> {
        get_optional_field(self.node, ExperimenterField::Email.spec().tag)
    }

    pub fn lab_name(&self) -> Option<&'a str> {
        get_optional_field(self.node, ExperimenterField::LabName.spec().tag)
    }

    pub fn lab_address(&self) -> Option<&'a str> {
        get_optional_field(self.node, ExperimenterField::LabAddress.spec().tag)
    }

    /// Reads any field; required fields report `None` only when blank.
    pub fn get(&self, field: ExperimenterField) -> Option<&'a str> {
        get_optional_field(self.node, field.spec().tag)
    }
}

/// Input for creating one experimenter record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperimenterDraft {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub lab_name: Option<String>,
    pub lab_address: Option<String>,
}

impl ExperimenterDraft {
    /// Creates a draft with the required values and no optional ones.
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_lab_name(mut self, lab_name: impl Into<String>) -> Self {
        self.lab_name = Some(lab_name.into());
        self
    }

    pub fn with_lab_address(mut self, lab_address: impl Into<String>) -> Self {
        self.lab_address = Some(lab_address.into());
        self
    }

    pub fn value(&self, field: ExperimenterField) -> Option<&str> {
        match field {
            ExperimenterField::FirstName => Some(self.first_name.as_str()),
            ExperimenterField::LastName => Some(self.last_name.as_str()),
            ExperimenterField::Email => self.email.as_deref(),
            ExperimenterField::LabName => self.lab_name.as_deref(),
            ExperimenterField::LabAddress => self.lab_address.as_deref(),
        }
    }
}

impl RecordDraft for ExperimenterDraft {
    fn kind(&self) -> RecordKind {
        RecordKind::Experimenter
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field_value(&self, spec: &FieldSpec) -> Option<&str> {
        ExperimenterField::from_tag(spec.tag).and_then(|field| self.value(field))
    }
}
