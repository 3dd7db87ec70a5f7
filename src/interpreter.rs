use crate::error::HaltReason;
use crate::font::{FONT_DATA, FONT_START_ADDRESS};
use crate::memory::Memory;
use crate::options::InterpreterConfig;
use crate::stack::Stack;
use crate::traits::{InputSource, ScreenSink, TimeSource};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

mod execute;

/// The number of general-purpose variable registers.
const VARIABLE_REGISTER_COUNT: usize = 16;

/// The rate, in Hz, at which the delay and sound timers decrement.
const TIMER_FREQUENCY_HZ: f64 = 60.0;

/// A `(set_time, set_value)` pair from which the current value of a 60 Hz timer is derived on
/// read, rather than ticked down by a background clock. This keeps the interpreter's timer
/// behaviour a pure function of its [`TimeSource`], which is what makes [`VirtualTimeSource`]
/// tests deterministic.
///
/// [`VirtualTimeSource`]: crate::time::VirtualTimeSource
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct TimerSetPoint {
    set_time_seconds: f64,
    set_value: u8,
}

impl TimerSetPoint {
    fn set(&mut self, now: f64, value: u8) {
        self.set_time_seconds = now;
        self.set_value = value;
    }

    fn current(&self, now: f64) -> u8 {
        let elapsed = (now - self.set_time_seconds).max(0.0);
        let decremented = (elapsed * TIMER_FREQUENCY_HZ).floor() as i64;
        (self.set_value as i64 - decremented).max(0) as u8
    }
}

/// A CHIP-8 interpreter: registers, memory, stack, the decode-execute loop and the two 60 Hz
/// timers, generic over the three host-provided collaborators ([`ScreenSink`], [`InputSource`],
/// [`TimeSource`]).
///
/// Decode/execute failures never panic or return `Result` from [`Interpreter::execute_next_instruction`]:
/// they set the sticky [`Interpreter::halted`] flag, recorded as a [`HaltReason`] retrievable via
/// [`Interpreter::halt_reason`]. The only panics this type can produce are out-of-range `read`/`write`
/// calls, which are a programmer error at the public API boundary, not a recoverable runtime condition.
pub struct Interpreter<S: ScreenSink, I: InputSource, T: TimeSource> {
    screen: S,
    input: I,
    time: T,
    memory: Memory,
    stack: Stack,
    // Shared with the closure stashed by `FX0A` via `InputSource::await_keypress`, so the
    // keypad can write the captured key into a register without the interpreter borrowing
    // itself mutably across the callback boundary.
    registers: Rc<RefCell<[u8; VARIABLE_REGISTER_COUNT]>>,
    index_register: u16,
    program_counter: u16,
    delay_timer: TimerSetPoint,
    sound_timer: TimerSetPoint,
    halted: bool,
    halt_reason: Option<HaltReason>,
}

impl<S: ScreenSink, I: InputSource, T: TimeSource> Interpreter<S, I, T> {
    /// Constructor that returns a freshly-initialised [`Interpreter`] with default
    /// [`InterpreterConfig`] settings: zeroed registers and memory, the built-in font loaded at
    /// `0x000`, `PC = 0x200`.
    pub fn new(screen: S, input: I, time: T) -> Self {
        Self::with_config(screen, input, time, InterpreterConfig::default())
    }

    /// Constructor that returns a freshly-initialised [`Interpreter`] using the supplied
    /// [`InterpreterConfig`].
    pub fn with_config(screen: S, input: I, time: T, config: InterpreterConfig) -> Self {
        let mut memory = Memory::new(config.memory_size_bytes);
        memory.write_bytes(config.font_start_address, &FONT_DATA);
        Interpreter {
            screen,
            input,
            time,
            memory,
            stack: Stack::new(),
            registers: Rc::new(RefCell::new([0x0; VARIABLE_REGISTER_COUNT])),
            index_register: 0x0,
            program_counter: config.program_start_address,
            delay_timer: TimerSetPoint::default(),
            sound_timer: TimerSetPoint::default(),
            halted: false,
            halt_reason: None,
        }
    }

    /// Copies `bytes` into memory starting at the configured program start address
    /// (`0x200` by default). This is a pure in-memory byte copy; loading a ROM file from disk
    /// is the host's responsibility.
    pub fn load_rom(&mut self, bytes: &[u8]) {
        self.memory
            .write_bytes(self.program_counter as usize, bytes);
    }

    /// Reads the byte at `address`. Panics if `address` is outside the configured memory size:
    /// this is the caller's bounds contract to honour, not a recoverable runtime condition.
    pub fn read(&self, address: u16) -> u8 {
        self.memory.read_byte(address as usize)
    }

    /// Writes `value` to `address`. Panics if `address` is outside the configured memory size.
    pub fn write(&mut self, address: u16, value: u8) {
        self.memory.write_byte(address as usize, value);
    }

    /// Returns the current value of variable register `V[x]`.
    pub fn v(&self, x: usize) -> u8 {
        self.registers.borrow()[x]
    }

    /// Returns a copy of all sixteen variable registers.
    pub fn registers(&self) -> [u8; VARIABLE_REGISTER_COUNT] {
        *self.registers.borrow()
    }

    /// Returns the current value of the 12-bit address register `I`.
    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    /// Returns the current value of the program counter.
    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    /// Returns a reference to the interpreter's memory.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Returns a reference to the interpreter's screen.
    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Returns a mutable reference to the interpreter's input source, so a host can feed it
    /// key events between steps.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Returns the current call stack depth.
    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Returns the current delay timer value, derived from the configured [`TimeSource`].
    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.current(self.time.elapsed_seconds())
    }

    /// Returns the current sound timer value, derived from the configured [`TimeSource`].
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.current(self.time.elapsed_seconds())
    }

    /// Returns whether the interpreter has entered its sticky halted state.
    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Returns the reason the interpreter halted, if it has.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halt_reason
    }

    fn halt(&mut self, reason: HaltReason) {
        warn!(%reason, "interpreter halted");
        self.halted = true;
        self.halt_reason = Some(reason);
    }

    /// Advances the interpreter by exactly one instruction, unless already halted.
    pub fn execute_next_instruction(&mut self) {
        if self.halted {
            return;
        }
        let pc = self.program_counter;
        let Some(opcode) = self.memory.try_read_opcode(pc as usize) else {
            self.halt(HaltReason::MemoryExhausted {
                program_counter: pc,
            });
            return;
        };
        let Some(instruction) = crate::instruction::Instruction::decode_from(opcode) else {
            self.halt(HaltReason::UnknownOpcode { opcode });
            return;
        };
        debug!(opcode = %format!("{:#06X}", opcode), name = instruction.name(), "executing instruction");
        execute::dispatch(self, instruction);
    }
}
