//! Syntactic type names as they appear in a document.
//!
//! A `type`/`returntype` field holds either one of the primitive keywords
//! (`BOOLEAN`, `NUMBER`, `TEXT`, `VOID`) or a dotted item path naming a
//! class (`Project.pkg.Clazz`). Whether such a path actually resolves to a
//! class is checked by `casey_types`, not here.

use std::fmt;

/// A type name as written in the document.
///
/// `Undefined` is a loader-internal sentinel: a variable whose `type` field
/// has not been applied yet carries `Undefined` until the second load phase
/// resolves it. It must never survive a successful load.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeName {
    Boolean,
    Number,
    Text,
    Void,
    /// A dotted item path naming a user-defined class.
    Object(String),
    Undefined,
}

impl TypeName {
    /// Parse a document type string. Returns `None` for an empty string.
    pub fn parse(text: &str) -> Option<TypeName> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed {
            "BOOLEAN" => TypeName::Boolean,
            "NUMBER" => TypeName::Number,
            "TEXT" => TypeName::Text,
            "VOID" => TypeName::Void,
            path => TypeName::Object(path.to_owned()),
        })
    }

    /// The string written back into a document.
    pub fn as_document_str(&self) -> &str {
        match self {
            TypeName::Boolean => "BOOLEAN",
            TypeName::Number => "NUMBER",
            TypeName::Text => "TEXT",
            TypeName::Void => "VOID",
            TypeName::Object(path) => path,
            TypeName::Undefined => "",
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeName::Boolean | TypeName::Number | TypeName::Text | TypeName::Void
        )
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, TypeName::Undefined)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Undefined => write!(f, "<undefined>"),
            other => write!(f, "{}", other.as_document_str()),
        }
    }
}
