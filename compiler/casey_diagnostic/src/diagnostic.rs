use std::fmt;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// Where a diagnostic points.
///
/// Documents are block graphs, not text, so "where" is a dotted item path,
/// optionally narrowed to a block uid and/or a 1-based operand position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Origin {
    pub item_path: Option<String>,
    pub block_uid: Option<String>,
    pub operand: Option<usize>,
}

impl Origin {
    pub fn item(path: impl Into<String>) -> Self {
        Origin {
            item_path: Some(path.into()),
            ..Origin::default()
        }
    }

    pub fn block(path: impl Into<String>, uid: impl Into<String>) -> Self {
        Origin {
            item_path: Some(path.into()),
            block_uid: Some(uid.into()),
            operand: None,
        }
    }

    pub fn with_operand(mut self, index: usize) -> Self {
        self.operand = Some(index);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.item_path.is_none() && self.block_uid.is_none() && self.operand.is_none()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if let Some(path) = &self.item_path {
            write!(f, "{path}")?;
            wrote = true;
        }
        if let Some(uid) = &self.block_uid {
            if wrote {
                write!(f, ", ")?;
            }
            write!(f, "block {uid}")?;
            wrote = true;
        }
        if let Some(operand) = self.operand {
            if wrote {
                write!(f, ", ")?;
            }
            write!(f, "operand {operand}")?;
        }
        Ok(())
    }
}

/// A labeled origin attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label {
    pub origin: Origin,
    pub message: String,
}

/// A single diagnostic: severity, code, message, origin labels and notes.
///
/// Built with the usual chain:
///
/// ```
/// use casey_diagnostic::{Diagnostic, ErrorCode, Origin};
///
/// let diag = Diagnostic::error(ErrorCode::C2001)
///     .with_message("operand type mismatch")
///     .with_label(Origin::item("Prj.main").with_operand(1), "expected NUMBER, found TEXT");
/// assert_eq!(diag.code, ErrorCode::C2001);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: ErrorCode) -> Self {
        Diagnostic {
            severity,
            code,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn error(code: ErrorCode) -> Self {
        Self::new(Severity::Error, code)
    }

    pub fn warning(code: ErrorCode) -> Self {
        Self::new(Severity::Warning, code)
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_label(mut self, origin: Origin, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            origin,
            message: message.into(),
        });
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The primary origin, if any label was attached.
    pub fn origin(&self) -> Option<&Origin> {
        self.labels.first().map(|l| &l.origin)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        for label in &self.labels {
            write!(f, "\n  --> {}", label.origin)?;
            if !label.message.is_empty() {
                write!(f, ": {}", label.message)?;
            }
        }
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}
