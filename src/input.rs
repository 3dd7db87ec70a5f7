#![allow(non_snake_case)]

use crate::traits::InputSource;

/// The number of keys on the CHIP-8 keypad.
const NUMBER_OF_KEYS: usize = 16;

/// A default [`InputSource`] tracking a 16-entry pressed/unpressed table plus a single stashed
/// `FX0A` callback.
///
/// Hosts drive this type through [`Keypad::set_key_status`], the edge-detecting setter that
/// both updates the table and, on a detected down-edge, fires and clears the stashed callback.
/// This is the boundary where the interpreter's blocking-input model (§4.B/§9) meets a real
/// keyboard or gamepad: the interpreter itself never polls or blocks.
pub struct Keypad {
    keys_pressed: [bool; NUMBER_OF_KEYS],
    awaiting: Option<Box<dyn FnOnce(u8)>>,
}

impl Default for Keypad {
    fn default() -> Self {
        Keypad {
            keys_pressed: [false; NUMBER_OF_KEYS],
            awaiting: None,
        }
    }
}

impl Keypad {
    /// Constructor that returns a [`Keypad`] with no keys pressed and no outstanding callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the pressed/unpressed state of `key` (`0x0..=0xF`; out-of-range values are
    /// silently ignored since no CHIP-8 opcode can address them). If this call is a down-edge
    /// (previously unpressed, now pressed) and a callback is stashed via
    /// [`InputSource::await_keypress`], the callback fires with `key` and is cleared.
    pub fn set_key_status(&mut self, key: u8, pressed: bool) {
        let key = key as usize;
        if key >= NUMBER_OF_KEYS {
            return;
        }
        let was_pressed = self.keys_pressed[key];
        self.keys_pressed[key] = pressed;
        if pressed && !was_pressed {
            if let Some(callback) = self.awaiting.take() {
                callback(key as u8);
            }
        }
    }

    /// Returns the hex ordinals of all keys currently pressed.
    pub fn keys_pressed(&self) -> Vec<u8> {
        (0..NUMBER_OF_KEYS as u8)
            .filter(|&k| self.keys_pressed[k as usize])
            .collect()
    }
}

impl InputSource for Keypad {
    fn await_keypress(&mut self, callback: Box<dyn FnOnce(u8)>) {
        self.awaiting = Some(callback);
    }

    fn is_key_pressed(&self, key: u8) -> bool {
        let key = key as usize;
        key < NUMBER_OF_KEYS && self.keys_pressed[key]
    }
}
