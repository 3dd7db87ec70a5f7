use std::error;
use std::fmt;

/// The unified error type for the chissembler: both lexing and parsing/emission failures
/// surface through this single enum so hosts can match on `Result<Vec<u8>, AssemblerError>`
/// from [`crate::chissembler::assemble`] without needing to know which pass produced the
/// failure.
///
/// Every variant carries its location (`filename`, `line`, `column`) alongside structured
/// fields describing what went wrong, so tests can assert on the structure of a failure
/// instead of scraping its message text. [`fmt::Display`] renders the conventional
/// `"<filename>:<line>:<column>: <detail>"` one-line form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblerError {
    /// The lexer encountered a byte that cannot begin or continue any token.
    InvalidCharacter {
        filename: String,
        line: usize,
        column: usize,
        character: char,
    },
    /// The parser expected one kind of token and found another.
    UnexpectedToken {
        filename: String,
        line: usize,
        column: usize,
        found: &'static str,
        expected: &'static str,
    },
    /// An integer literal used as an immediate operand does not fit in 8 bits.
    ImmediateOutOfRange {
        filename: String,
        line: usize,
        column: usize,
        value: i64,
    },
    /// An integer literal used as a jump address does not fit in 12 bits.
    AddressOutOfRange {
        filename: String,
        line: usize,
        column: usize,
        value: i64,
    },
    /// An offset register in a `label + register` / `address + register` jump target was
    /// something other than `V0`.
    InvalidOffsetRegister {
        filename: String,
        line: usize,
        column: usize,
        register: String,
    },
    /// `and`/`or`/`xor` was given an immediate operand, which none of the three support.
    ImmediateOperandNotAllowed {
        filename: String,
        line: usize,
        column: usize,
        mnemonic: &'static str,
    },
    /// The same label was defined more than once.
    DuplicateLabel {
        filename: String,
        line: usize,
        column: usize,
        label: String,
    },
    /// A jump referenced a label that was never defined anywhere in the source.
    UnknownLabel {
        filename: String,
        line: usize,
        column: usize,
        label: String,
    },
}

impl AssemblerError {
    fn location(&self) -> (&str, usize, usize) {
        match self {
            AssemblerError::InvalidCharacter {
                filename,
                line,
                column,
                ..
            }
            | AssemblerError::UnexpectedToken {
                filename,
                line,
                column,
                ..
            }
            | AssemblerError::ImmediateOutOfRange {
                filename,
                line,
                column,
                ..
            }
            | AssemblerError::AddressOutOfRange {
                filename,
                line,
                column,
                ..
            }
            | AssemblerError::InvalidOffsetRegister {
                filename,
                line,
                column,
                ..
            }
            | AssemblerError::ImmediateOperandNotAllowed {
                filename,
                line,
                column,
                ..
            }
            | AssemblerError::DuplicateLabel {
                filename,
                line,
                column,
                ..
            }
            | AssemblerError::UnknownLabel {
                filename,
                line,
                column,
                ..
            } => (filename.as_str(), *line, *column),
        }
    }

    fn detail(&self) -> String {
        match self {
            AssemblerError::InvalidCharacter { character, .. } => {
                format!("'{}' is not a valid source character", character)
            }
            AssemblerError::UnexpectedToken {
                found, expected, ..
            } => format!("expected {}, found {}", expected, found),
            AssemblerError::ImmediateOutOfRange { value, .. } => {
                format!("'{}' is not a valid 8 bit value", value)
            }
            AssemblerError::AddressOutOfRange { value, .. } => {
                format!("'{}' is not a valid 12 bit address", value)
            }
            AssemblerError::InvalidOffsetRegister { register, .. } => {
                format!("'{}' cannot be used as a jump offset register, only V0 can", register)
            }
            AssemblerError::ImmediateOperandNotAllowed { mnemonic, .. } => {
                format!("'{}' does not accept an immediate operand", mnemonic)
            }
            AssemblerError::DuplicateLabel { label, .. } => {
                format!("label '{}' is already defined", label)
            }
            AssemblerError::UnknownLabel { label, .. } => {
                format!("label '{}' is never defined", label)
            }
        }
    }
}

impl error::Error for AssemblerError {}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (filename, line, column) = self.location();
        write!(f, "{}:{}:{}: {}", filename, line, column, self.detail())
    }
}
