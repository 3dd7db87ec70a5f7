#![allow(non_snake_case)]

use super::*;
use crate::error::HaltReason;
use crate::input::Keypad;
use crate::screen::BitmapScreen;
use crate::time::VirtualTimeSource;
use crate::traits::ScreenSink;

type TestInterpreter = Interpreter<BitmapScreen, Keypad, VirtualTimeSource>;

fn setup() -> TestInterpreter {
    Interpreter::new(BitmapScreen::new(), Keypad::new(), VirtualTimeSource::new())
}

fn setup_at(opcode_bytes: &[u8]) -> TestInterpreter {
    let mut interpreter = setup();
    interpreter.load_rom(opcode_bytes);
    interpreter
}

#[test]
fn test_new_interpreter_has_expected_initial_state() {
    let interpreter = setup();
    assert_eq!(interpreter.program_counter(), 0x200);
    assert_eq!(interpreter.index_register(), 0);
    assert_eq!(interpreter.registers(), [0x0; VARIABLE_REGISTER_COUNT]);
    assert!(!interpreter.halted());
    assert_eq!(interpreter.halt_reason(), None);
}

#[test]
fn test_font_glyphs_are_loaded_at_construction() {
    let interpreter = setup();
    assert_eq!(interpreter.memory().read_byte(0x000), 0xF0);
    assert_eq!(interpreter.memory().read_byte(0x004), 0xF0);
}

#[test]
fn test_load_rom_writes_at_program_start_address() {
    let interpreter = setup_at(&[0xA1, 0x23]);
    assert_eq!(interpreter.memory().read_byte(0x200), 0xA1);
    assert_eq!(interpreter.memory().read_byte(0x201), 0x23);
}

#[test]
fn test_00e0_clears_the_screen() {
    let mut interpreter = setup_at(&[0x00, 0xE0]);
    interpreter.screen.set_pixel(1, 1, true);
    interpreter.execute_next_instruction();
    assert!(!interpreter.screen().get_pixel(1, 1));
    assert_eq!(interpreter.program_counter(), 0x202);
}

#[test]
fn test_00ee_returns_to_address_on_stack() {
    let mut interpreter = setup_at(&[0x00, 0xEE]);
    interpreter.stack.push(0x308);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x308);
}

#[test]
fn test_00ee_with_empty_stack_halts() {
    let mut interpreter = setup_at(&[0x00, 0xEE]);
    interpreter.execute_next_instruction();
    assert!(interpreter.halted());
    assert_eq!(interpreter.halt_reason(), Some(HaltReason::StackUnderflow));
    // PC is left untouched on halt.
    assert_eq!(interpreter.program_counter(), 0x200);
}

#[test]
fn test_1nnn_jumps() {
    let mut interpreter = setup_at(&[0x13, 0x00]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x300);
}

#[test]
fn test_2nnn_pushes_return_address_and_jumps() {
    let mut interpreter = setup_at(&[0x23, 0x00]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x300);
    assert_eq!(interpreter.stack_depth(), 1);
}

#[test]
fn test_3xnn_skips_when_equal() {
    let mut interpreter = setup_at(&[0x30, 0x2A]);
    interpreter.registers.borrow_mut()[0] = 0x2A;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x204);
}

#[test]
fn test_3xnn_does_not_skip_when_unequal() {
    let mut interpreter = setup_at(&[0x30, 0x2A]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x202);
}

#[test]
fn test_4xnn_skips_when_unequal() {
    let mut interpreter = setup_at(&[0x40, 0x01]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x204);
}

#[test]
fn test_5xy0_skips_when_registers_equal() {
    let mut interpreter = setup_at(&[0x51, 0x20]);
    interpreter.registers.borrow_mut()[1] = 0x7;
    interpreter.registers.borrow_mut()[2] = 0x7;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x204);
}

#[test]
fn test_6xnn_sets_register() {
    let mut interpreter = setup_at(&[0x60, 0x2E]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(0), 0x2E);
}

#[test]
fn test_7xnn_adds_without_touching_vf() {
    let mut interpreter = setup_at(&[0x70, 0xFF]);
    interpreter.registers.borrow_mut()[0] = 0x02;
    interpreter.registers.borrow_mut()[0xF] = 0x9;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(0), 0x01);
    assert_eq!(interpreter.v(0xF), 0x9);
}

#[test]
fn test_8xy4_sets_carry_flag_on_overflow() {
    let mut interpreter = setup_at(&[0x81, 0x24]);
    interpreter.registers.borrow_mut()[1] = 0xFF;
    interpreter.registers.borrow_mut()[2] = 0x02;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(1), 0x01);
    assert_eq!(interpreter.v(0xF), 0x1);
}

#[test]
fn test_8xy4_clears_carry_flag_without_overflow() {
    let mut interpreter = setup_at(&[0x81, 0x24]);
    interpreter.registers.borrow_mut()[1] = 0x01;
    interpreter.registers.borrow_mut()[2] = 0x02;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(1), 0x03);
    assert_eq!(interpreter.v(0xF), 0x0);
}

#[test]
fn test_8xy5_sets_vf_when_no_borrow() {
    let mut interpreter = setup_at(&[0x81, 0x25]);
    interpreter.registers.borrow_mut()[1] = 0x05;
    interpreter.registers.borrow_mut()[2] = 0x02;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(1), 0x03);
    assert_eq!(interpreter.v(0xF), 0x1);
}

#[test]
fn test_8xy5_clears_vf_on_borrow() {
    let mut interpreter = setup_at(&[0x81, 0x25]);
    interpreter.registers.borrow_mut()[1] = 0x02;
    interpreter.registers.borrow_mut()[2] = 0x05;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(1), 0xFD);
    assert_eq!(interpreter.v(0xF), 0x0);
}

#[test]
fn test_8xy6_copies_from_vy_then_shifts() {
    let mut interpreter = setup_at(&[0x81, 0x26]);
    interpreter.registers.borrow_mut()[2] = 0b0000_0011;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(1), 0b0000_0001);
    assert_eq!(interpreter.v(0xF), 0x1);
}

#[test]
fn test_8xye_copies_from_vy_then_shifts() {
    let mut interpreter = setup_at(&[0x81, 0x2E]);
    interpreter.registers.borrow_mut()[2] = 0b1000_0001;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(1), 0b0000_0010);
    assert_eq!(interpreter.v(0xF), 0x1);
}

#[test]
fn test_9xy0_skips_when_unequal() {
    let mut interpreter = setup_at(&[0x91, 0x20]);
    interpreter.registers.borrow_mut()[1] = 0x1;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x204);
}

#[test]
fn test_annn_sets_index_register() {
    let mut interpreter = setup_at(&[0xA4, 0x1C]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.index_register(), 0x41C);
}

#[test]
fn test_bnnn_jumps_to_nnn_plus_v0() {
    let mut interpreter = setup_at(&[0xB3, 0x00]);
    interpreter.registers.borrow_mut()[0] = 0x10;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x310);
}

#[test]
fn test_cxnn_masks_random_value_with_nn() {
    let mut interpreter = setup_at(&[0xC0, 0x0F]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(0) & !0x0F, 0);
}

#[test]
fn test_dxyn_draws_font_glyph_with_no_collision_then_collides_on_redraw() {
    // Font glyph "0" (0xF0 90 90 90 F0) lives at the default font start address; point I
    // there and draw at (0,0). Row 0 is 0xF0 = pixels 0-3 set.
    let mut interpreter = setup_at(&[0xD0, 0x15, 0xD0, 0x15]);
    interpreter.index_register = 0x000;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(0xF), 0);
    assert!(interpreter.screen().get_pixel(0, 0));
    assert!(interpreter.screen().get_pixel(3, 0));
    assert!(!interpreter.screen().get_pixel(1, 1));
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(0xF), 1);
    assert!(!interpreter.screen().get_pixel(0, 0));
}

#[test]
fn test_ex9e_skips_when_key_pressed() {
    let mut interpreter = setup_at(&[0xE0, 0x9E]);
    interpreter.registers.borrow_mut()[0] = 0x5;
    interpreter.input.set_key_status(0x5, true);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x204);
}

#[test]
fn test_exa1_skips_when_key_not_pressed() {
    let mut interpreter = setup_at(&[0xE0, 0xA1]);
    interpreter.registers.borrow_mut()[0] = 0x5;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x204);
}

#[test]
fn test_fx07_reads_delay_timer() {
    let mut interpreter = setup_at(&[0xF0, 0x07]);
    interpreter.registers.borrow_mut()[1] = 60;
    interpreter.delay_timer.set(0.0, 60);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(0), 60);
}

#[test]
fn test_fx0a_blocks_logically_but_advances_pc_and_fires_on_next_keydown() {
    let mut interpreter = setup_at(&[0xF2, 0x0A]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x202);
    assert_eq!(interpreter.v(2), 0);
    interpreter.input_mut().set_key_status(0x9, true);
    assert_eq!(interpreter.v(2), 0x9);
}

#[test]
fn test_fx15_and_delay_timer_decay_over_virtual_time() {
    let mut interpreter = setup_at(&[0xF0, 0x15]);
    interpreter.registers.borrow_mut()[0] = 60;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.delay_timer(), 60);
    interpreter.time.advance(0.5);
    assert_eq!(interpreter.delay_timer(), 30);
    interpreter.time.advance(0.5);
    assert_eq!(interpreter.delay_timer(), 0);
    interpreter.time.advance(1000.0);
    assert_eq!(interpreter.delay_timer(), 0);
}

#[test]
fn test_fx18_sets_sound_timer() {
    let mut interpreter = setup_at(&[0xF0, 0x18]);
    interpreter.registers.borrow_mut()[0] = 10;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.sound_timer(), 10);
}

#[test]
fn test_fx1e_adds_vx_to_index_register() {
    let mut interpreter = setup_at(&[0xF0, 0x1E]);
    interpreter.index_register = 0x10;
    interpreter.registers.borrow_mut()[0] = 0x5;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.index_register(), 0x15);
}

#[test]
fn test_fx29_points_at_font_glyph() {
    let mut interpreter = setup_at(&[0xF0, 0x29]);
    interpreter.registers.borrow_mut()[0] = 0x0;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.index_register(), 0x000);
}

#[test]
fn test_fx29_computes_five_times_digit_with_no_offset() {
    let mut interpreter = setup_at(&[0xF0, 0x29]);
    interpreter.registers.borrow_mut()[0] = 0x3;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.index_register(), 15);
}

#[test]
fn test_fx33_writes_bcd_digits() {
    let mut interpreter = setup_at(&[0xF0, 0x33]);
    interpreter.index_register = 0x300;
    interpreter.registers.borrow_mut()[0] = 156;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.memory().read_byte(0x300), 1);
    assert_eq!(interpreter.memory().read_byte(0x301), 5);
    assert_eq!(interpreter.memory().read_byte(0x302), 6);
}

#[test]
fn test_fx55_stores_registers_and_advances_index() {
    let mut interpreter = setup_at(&[0xF2, 0x55]);
    interpreter.index_register = 0x300;
    interpreter.registers.borrow_mut()[0] = 0x1;
    interpreter.registers.borrow_mut()[1] = 0x2;
    interpreter.registers.borrow_mut()[2] = 0x3;
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.memory().read_bytes(0x300, 3), &[0x1, 0x2, 0x3]);
    assert_eq!(interpreter.index_register(), 0x303);
}

#[test]
fn test_fx65_loads_registers_and_advances_index() {
    let mut interpreter = setup_at(&[0xF2, 0x65]);
    interpreter.index_register = 0x300;
    interpreter.memory.write_bytes(0x300, &[0x1, 0x2, 0x3]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.registers()[0..3], [0x1, 0x2, 0x3]);
    assert_eq!(interpreter.index_register(), 0x303);
}

#[test]
fn test_unknown_opcode_halts() {
    let mut interpreter = setup_at(&[0xFF, 0xFF]);
    interpreter.execute_next_instruction();
    assert!(interpreter.halted());
    assert_eq!(
        interpreter.halt_reason(),
        Some(HaltReason::UnknownOpcode { opcode: 0xFFFF })
    );
}

#[test]
fn test_execute_next_instruction_is_noop_once_halted() {
    let mut interpreter = setup_at(&[0xFF, 0xFF]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x200);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x200);
}

#[test]
fn test_fetch_past_end_of_memory_halts() {
    let mut interpreter = Interpreter::new(BitmapScreen::new(), Keypad::new(), VirtualTimeSource::new());
    interpreter.program_counter = (interpreter.memory().size() - 1) as u16;
    interpreter.execute_next_instruction();
    assert!(interpreter.halted());
    assert!(matches!(
        interpreter.halt_reason(),
        Some(HaltReason::MemoryExhausted { .. })
    ));
}

#[test]
fn test_scenario_s1_copy_immediate_then_execute() {
    // "copy 42 V0" assembles to 60 2A; executing sets V[0]=0x2A, PC=0x202.
    let mut interpreter = setup_at(&[0x60, 0x2A]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.v(0), 0x2A);
    assert_eq!(interpreter.program_counter(), 0x202);
}

#[test]
fn test_scenario_s4_mutual_jump_alternates_pc_forever() {
    // start: jump later / later: jump start -> 12 02 12 00
    let mut interpreter = setup_at(&[0x12, 0x02, 0x12, 0x00]);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x202);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x200);
    interpreter.execute_next_instruction();
    assert_eq!(interpreter.program_counter(), 0x202);
}

#[test]
fn test_scenario_s6_timer_decay_values() {
    let mut interpreter = setup_at(&[0xF0, 0x15]);
    interpreter.registers.borrow_mut()[0] = 60;
    interpreter.time.set(0.0);
    interpreter.execute_next_instruction();
    interpreter.time.set(0.5);
    assert_eq!(interpreter.delay_timer(), 30);
    interpreter.time.set(1.0);
    assert_eq!(interpreter.delay_timer(), 0);
    interpreter.time.set(1000.0);
    assert_eq!(interpreter.delay_timer(), 0);
}
