//! Emission errors.

use std::path::PathBuf;

use casey_diagnostic::{Diagnostic, ErrorCode, Origin};
use thiserror::Error;

/// Error raised while rendering or writing Java sources.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The structured IR contains a construct Java cannot express.
    ///
    /// The structurer guarantees totality by degrading irreducible graphs
    /// to label/goto pairs; Java has no goto, so those functions are
    /// rejected here, individually.
    #[error("function `{function}` needs a `{construct}`, which Java cannot express")]
    Unsupported {
        function: String,
        construct: &'static str,
    },

    /// A referenced item's type failed to resolve during rendering.
    #[error("type of `{item}` could not be resolved")]
    UnresolvedType { item: String },

    #[error("could not write `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EmitError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            EmitError::Unsupported { function, .. } => Diagnostic::error(ErrorCode::C4001)
                .with_message(self.to_string())
                .with_label(Origin::item(function.clone()), "")
                .with_note("restructure the flowchart to avoid crossing jumps into shared blocks"),
            EmitError::UnresolvedType { item } => Diagnostic::error(ErrorCode::C2003)
                .with_message(self.to_string())
                .with_label(Origin::item(item.clone()), ""),
            EmitError::Io { .. } => {
                Diagnostic::error(ErrorCode::C4002).with_message(self.to_string())
            }
        }
    }
}
