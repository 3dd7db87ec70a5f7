//! A small two-pass assembler for a CHIP-8 subset: `copy`/`add`/`sub`/`and`/`or`/`xor`/`jump`
//! statements and colon-terminated labels, compiled directly to the machine code the
//! [`crate::Interpreter`] executes.

mod ast;
mod emit;
mod error;
mod lexer;
mod parser;
mod source_span;
mod token;

pub use error::AssemblerError;

/// Assembles `source` into CHIP-8 machine code, ready to hand to [`crate::Interpreter::load_rom`].
///
/// `filename` is used only to label errors; it need not correspond to a real file (callers
/// assembling from a string literal or stdin commonly pass `"stdin"`).
pub fn assemble(filename: &str, source: &str) -> Result<Vec<u8>, AssemblerError> {
    let tokens = lexer::tokenize(filename, source)?;
    let instructions = parser::parse(&tokens)?;
    emit::emit(&instructions)
}
