use crate::font::FONT_START_ADDRESS;
use crate::memory::DEFAULT_MEMORY_SIZE_BYTES;

/// The default CHIP-8 program start address within memory.
const DEFAULT_PROGRAM_ADDRESS: u16 = 0x200;

/// A struct to allow specification of interpreter start-up parameters.
///
/// Rather than a long constructor argument list, construction-time options (memory size,
/// program load address, font load address) are grouped here and passed as a single value to
/// [`crate::Interpreter::new`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub memory_size_bytes: usize,
    pub program_start_address: u16,
    pub font_start_address: usize,
}

impl Default for InterpreterConfig {
    /// Constructor that returns an [`InterpreterConfig`] instance using typical default
    /// settings.
    fn default() -> Self {
        InterpreterConfig {
            memory_size_bytes: DEFAULT_MEMORY_SIZE_BYTES,
            program_start_address: DEFAULT_PROGRAM_ADDRESS,
            font_start_address: FONT_START_ADDRESS,
        }
    }
}
