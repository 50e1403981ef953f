//! Modifier key state, tracked as an 8-bit field.
//!
//! Bit layout (fixed, matches the HID boot-report modifier byte):
//!
//! | bit | key           |
//! |-----|---------------|
//! | 0   | Left Control  |
//! | 1   | Left Shift    |
//! | 2   | Left Alt      |
//! | 3   | Left GUI      |
//! | 4   | Right Control |
//! | 5   | Right Shift   |
//! | 6   | Right Alt     |
//! | 7   | Right GUI     |
//!
//! The tracker stores full left/right fidelity; deciding that the two
//! variants of a class are equivalent is translation policy and happens
//! in [`super::combo`].

use serde::{Deserialize, Serialize};

/// Mask matching either Control bit (left = bit 0, right = bit 4).
pub const CTRL_MASK: u8 = 0b0001_0001;
/// Mask matching either Shift bit (left = bit 1, right = bit 5).
pub const SHIFT_MASK: u8 = 0b0010_0010;
/// Mask matching either Alt bit (left = bit 2, right = bit 6).
pub const ALT_MASK: u8 = 0b0100_0100;

/// The set of modifier keys currently held down.
///
/// Mutated only by modifier press/release events; the translator reads
/// it but never writes it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierState(pub u8);

impl ModifierState {
    /// An empty state with no modifiers held.
    pub const fn new() -> Self {
        ModifierState(0)
    }

    /// Sets or clears the bit at `position` (0..8).
    ///
    /// Positions outside 0..8 are ignored; the caller has already
    /// range-checked the keycode.
    pub fn set(&mut self, position: u8, pressed: bool) {
        if position >= 8 {
            return;
        }
        if pressed {
            self.0 |= 1 << position;
        } else {
            self.0 &= !(1 << position);
        }
    }

    /// Returns `true` if either Control key is held.
    pub fn ctrl(self) -> bool {
        self.0 & CTRL_MASK != 0
    }

    /// Returns `true` if either Shift key is held.
    pub fn shift(self) -> bool {
        self.0 & SHIFT_MASK != 0
    }

    /// Returns `true` if either Alt key is held.
    pub fn alt(self) -> bool {
        self.0 & ALT_MASK != 0
    }

    /// Returns `true` if any modifier at all is held.
    pub fn any(self) -> bool {
        self.0 != 0
    }
}
