//! XML text parsing and serialization for RDML element trees.
//!
//! # Responsibility
//! - Turn RDML text into an owned `Element` tree and back.
//! - Strip entity declarations before parsing.
//!
//! # Invariants
//! - Whitespace-only text of elements with element children is dropped on
//!   parse; leaf text is kept exactly. The writer re-indents output, so
//!   parse/write/parse yields an identical tree.
//! - Element names keep their prefix; namespaces are resolved on parse.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod parse;
mod write;

pub use parse::{parse_document, strip_entity_declarations};
pub use write::write_document;

pub type XmlResult<T> = Result<T, XmlError>;

/// Errors from XML text handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// Input is not well-formed XML.
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    /// Tree could not be serialized.
    Write(String),
}

impl Display for XmlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax {
                line,
                column,
                message,
            } => write!(f, "XML syntax error at line {line}, column {column}: {message}"),
            Self::Write(message) => write!(f, "XML write error: {message}"),
        }
    }
}

impl Error for XmlError {}
