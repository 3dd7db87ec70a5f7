use super::{Interpreter, TimerSetPoint};
use crate::font::glyph_address;
use crate::instruction::Instruction;
use crate::screen::draw_sprite;
use crate::traits::{InputSource, ScreenSink, TimeSource};
use rand::Rng;
use tracing::debug;

/// Dispatches a single decoded instruction against `interp`, committing every observable state
/// change (register writes, the flag write, memory writes, the `PC` update) before returning.
pub(super) fn dispatch<S: ScreenSink, I: InputSource, T: TimeSource>(
    interp: &mut Interpreter<S, I, T>,
    instruction: Instruction,
) {
    let mut next_pc = interp.program_counter.wrapping_add(2);

    match instruction {
        Instruction::Op00E0 => interp.screen.clear(),
        Instruction::Op00EE => match interp.stack.pop() {
            Ok(address) => next_pc = address,
            Err(reason) => {
                interp.halt(reason);
                return;
            }
        },
        Instruction::Op1NNN { nnn } => next_pc = nnn,
        Instruction::Op2NNN { nnn } => {
            interp.stack.push(next_pc);
            next_pc = nnn;
        }
        Instruction::Op3XNN { x, nn } => {
            if interp.v(x) == nn {
                next_pc = next_pc.wrapping_add(2);
            }
        }
        Instruction::Op4XNN { x, nn } => {
            if interp.v(x) != nn {
                next_pc = next_pc.wrapping_add(2);
            }
        }
        Instruction::Op5XY0 { x, y } => {
            if interp.v(x) == interp.v(y) {
                next_pc = next_pc.wrapping_add(2);
            }
        }
        Instruction::Op6XNN { x, nn } => set_register(interp, x, nn),
        Instruction::Op7XNN { x, nn } => {
            let result = interp.v(x).wrapping_add(nn);
            set_register(interp, x, result);
        }
        Instruction::Op8XY0 { x, y } => {
            let vy = interp.v(y);
            set_register(interp, x, vy);
        }
        Instruction::Op8XY1 { x, y } => {
            let result = interp.v(x) | interp.v(y);
            set_register(interp, x, result);
        }
        Instruction::Op8XY2 { x, y } => {
            let result = interp.v(x) & interp.v(y);
            set_register(interp, x, result);
        }
        Instruction::Op8XY3 { x, y } => {
            let result = interp.v(x) ^ interp.v(y);
            set_register(interp, x, result);
        }
        Instruction::Op8XY4 { x, y } => {
            let (result, carry) = interp.v(x).overflowing_add(interp.v(y));
            set_register(interp, x, result);
            set_register(interp, 0xF, carry as u8);
        }
        Instruction::Op8XY5 { x, y } => {
            let (vx, vy) = (interp.v(x), interp.v(y));
            let borrow = vy > vx;
            set_register(interp, x, vx.wrapping_sub(vy));
            set_register(interp, 0xF, !borrow as u8);
        }
        Instruction::Op8XY6 { x, y } => {
            let vy = interp.v(y);
            set_register(interp, x, vy >> 1);
            set_register(interp, 0xF, vy & 0x1);
        }
        Instruction::Op8XY7 { x, y } => {
            let (vx, vy) = (interp.v(x), interp.v(y));
            let borrow = vx > vy;
            set_register(interp, x, vy.wrapping_sub(vx));
            set_register(interp, 0xF, !borrow as u8);
        }
        Instruction::Op8XYE { x, y } => {
            let vy = interp.v(y);
            set_register(interp, x, vy.wrapping_shl(1));
            set_register(interp, 0xF, (vy >> 7) & 0x1);
        }
        Instruction::Op9XY0 { x, y } => {
            if interp.v(x) != interp.v(y) {
                next_pc = next_pc.wrapping_add(2);
            }
        }
        Instruction::OpANNN { nnn } => interp.index_register = nnn,
        Instruction::OpBNNN { nnn } => next_pc = nnn.wrapping_add(interp.v(0) as u16),
        Instruction::OpCXNN { x, nn } => {
            let random: u8 = rand::thread_rng().gen();
            set_register(interp, x, random & nn);
        }
        Instruction::OpDXYN { x, y, n } => execute_dxyn(interp, x, y, n),
        Instruction::OpEX9E { x } => {
            if interp.input.is_key_pressed(interp.v(x)) {
                next_pc = next_pc.wrapping_add(2);
            }
        }
        Instruction::OpEXA1 { x } => {
            if !interp.input.is_key_pressed(interp.v(x)) {
                next_pc = next_pc.wrapping_add(2);
            }
        }
        Instruction::OpFX07 { x } => {
            let delay = interp.delay_timer();
            set_register(interp, x, delay);
        }
        Instruction::OpFX0A { x } => execute_fx0a(interp, x),
        Instruction::OpFX15 { x } => {
            let value = interp.v(x);
            let now = interp.time.elapsed_seconds();
            interp.delay_timer = TimerSetPoint::default();
            interp.delay_timer.set(now, value);
        }
        Instruction::OpFX18 { x } => {
            let value = interp.v(x);
            let now = interp.time.elapsed_seconds();
            interp.sound_timer = TimerSetPoint::default();
            interp.sound_timer.set(now, value);
        }
        Instruction::OpFX1E { x } => {
            interp.index_register = interp.index_register.wrapping_add(interp.v(x) as u16);
        }
        Instruction::OpFX29 { x } => {
            interp.index_register = glyph_address(interp.v(x) & 0xF) as u16;
        }
        Instruction::OpFX33 { x } => {
            let value = interp.v(x);
            let i = interp.index_register as usize;
            interp.memory.write_byte(i, value / 100);
            interp.memory.write_byte(i + 1, (value / 10) % 10);
            interp.memory.write_byte(i + 2, value % 10);
        }
        Instruction::OpFX55 { x } => {
            let i = interp.index_register as usize;
            for offset in 0..=x {
                let value = interp.v(offset);
                interp.memory.write_byte(i + offset, value);
            }
            interp.index_register = interp.index_register.wrapping_add(x as u16 + 1);
        }
        Instruction::OpFX65 { x } => {
            let i = interp.index_register as usize;
            for offset in 0..=x {
                let value = interp.memory.read_byte(i + offset);
                set_register(interp, offset, value);
            }
            interp.index_register = interp.index_register.wrapping_add(x as u16 + 1);
        }
    }

    interp.program_counter = next_pc;
}

fn set_register<S: ScreenSink, I: InputSource, T: TimeSource>(
    interp: &mut Interpreter<S, I, T>,
    x: usize,
    value: u8,
) {
    interp.registers.borrow_mut()[x] = value;
}

fn execute_dxyn<S: ScreenSink, I: InputSource, T: TimeSource>(
    interp: &mut Interpreter<S, I, T>,
    x: usize,
    y: usize,
    n: u8,
) {
    let width = interp.screen.width();
    let height = interp.screen.height();
    let x_start = (interp.v(x) as usize % width) as u8;
    let y_start = (interp.v(y) as usize % height) as u8;
    let i = interp.index_register as usize;
    let sprite = interp.memory.read_bytes(i, n as usize).to_vec();
    let collision = draw_sprite(&mut interp.screen, x_start, y_start, &sprite);
    set_register(interp, 0xF, collision as u8);
}

/// `FX0A`: stashes a one-shot callback with the keypad rather than spinning. The interpreter
/// does not block and does not re-decode; `PC` still advances normally. When the host later
/// reports a key-down edge, the callback (holding a clone of the shared register cell) writes
/// the key into `V[x]`.
fn execute_fx0a<S: ScreenSink, I: InputSource, T: TimeSource>(
    interp: &mut Interpreter<S, I, T>,
    x: usize,
) {
    debug!(register = x, "FX0A wait begins");
    let registers = interp.registers.clone();
    interp.input.await_keypress(Box::new(move |key| {
        debug!(register = x, key, "FX0A wait ends");
        registers.borrow_mut()[x] = key;
    }));
}
