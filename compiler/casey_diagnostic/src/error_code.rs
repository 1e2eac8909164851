use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: C#### where the first digit indicates the phase:
/// - C0xxx: Document load errors
/// - C1xxx: Block graph errors
/// - C2xxx: Type errors
/// - C3xxx: Reference resolution errors
/// - C4xxx: Emission errors
/// - C5xxx: Native toolchain errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Document load errors (C0xxx)
    /// Malformed document (not valid JSON, or root is not an object)
    C0001,
    /// Unknown item kind
    C0002,
    /// Missing required field
    C0003,
    /// Duplicate sibling item name
    C0004,
    /// Invalid or missing type name
    C0005,
    /// Referenced item does not exist
    C0006,
    /// Connection references an unknown block or side
    C0007,
    /// Invalid statement (unknown tag, missing value or operands)
    C0008,
    /// Assignment value does not fit the variable's declared type
    C0009,

    // Block graph errors (C1xxx)
    /// Missing start block
    C1001,
    /// More than one start block
    C1002,
    /// Start block has incoming connections
    C1003,
    /// Block unreachable from start
    C1004,
    /// Outgoing connection count does not match the block kind
    C1005,
    /// Connection side already occupied
    C1006,
    /// Block is missing its statement or variable content
    C1007,

    // Type errors (C2xxx)
    /// Operand type mismatch
    C2001,
    /// Operand count does not match the operator's arity
    C2002,
    /// Unknown type name
    C2003,
    /// Argument count mismatch in a function call
    C2004,
    /// Argument type mismatch in a function call
    C2005,
    /// Void value used as an operand
    C2006,

    // Reference errors (C3xxx)
    /// Call-chain segment is not a variable, parameter or function
    C3001,
    /// Call-chain segment applied to a non-object value
    C3002,
    /// Member not found on the class
    C3003,

    // Emission errors (C4xxx)
    /// Construct not expressible in the target language
    C4001,
    /// Input/output failure while writing generated sources
    C4002,
    /// Input block bound to an unsupported variable type
    C4003,
    /// Entry function parameter missing on the command line
    C4004,

    // Native toolchain errors (C5xxx)
    /// No usable compiler toolchain found
    C5001,
    /// Toolchain exited with a failure status
    C5002,
    /// Toolchain did not finish within the allotted time
    C5003,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::C0001 => "C0001",
            ErrorCode::C0002 => "C0002",
            ErrorCode::C0003 => "C0003",
            ErrorCode::C0004 => "C0004",
            ErrorCode::C0005 => "C0005",
            ErrorCode::C0006 => "C0006",
            ErrorCode::C0007 => "C0007",
            ErrorCode::C0008 => "C0008",
            ErrorCode::C0009 => "C0009",
            ErrorCode::C1001 => "C1001",
            ErrorCode::C1002 => "C1002",
            ErrorCode::C1003 => "C1003",
            ErrorCode::C1004 => "C1004",
            ErrorCode::C1005 => "C1005",
            ErrorCode::C1006 => "C1006",
            ErrorCode::C1007 => "C1007",
            ErrorCode::C2001 => "C2001",
            ErrorCode::C2002 => "C2002",
            ErrorCode::C2003 => "C2003",
            ErrorCode::C2004 => "C2004",
            ErrorCode::C2005 => "C2005",
            ErrorCode::C2006 => "C2006",
            ErrorCode::C3001 => "C3001",
            ErrorCode::C3002 => "C3002",
            ErrorCode::C3003 => "C3003",
            ErrorCode::C4001 => "C4001",
            ErrorCode::C4002 => "C4002",
            ErrorCode::C4003 => "C4003",
            ErrorCode::C4004 => "C4004",
            ErrorCode::C5001 => "C5001",
            ErrorCode::C5002 => "C5002",
            ErrorCode::C5003 => "C5003",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
