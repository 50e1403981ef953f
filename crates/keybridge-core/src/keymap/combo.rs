//! The derived 16-bit lookup key for the command table.
//!
//! Layout:
//!
//! ```text
//! 0xF000 | keycode              standard key
//! 0xE000 | (1 << (kc - 103))    modifier key as the primary key
//!        | 0x0200               any Control held
//!        | 0x0400               any Shift held
//!        | 0x0800               any Alt held
//! ```
//!
//! The high nibble tags the encoding space; the three chord bits coalesce
//! left/right modifier variants into one class each. A `KeyCombo` exists
//! only for the duration of one table lookup and is never stored.

use super::modifier::ModifierState;
use super::{is_modifier_keycode, MODIFIER_BASE};

/// Tag for the standard-key encoding space.
pub const STANDARD_SPACE: u16 = 0xF000;
/// Tag for the modifier-as-primary-key encoding space.
pub const MODIFIER_SPACE: u16 = 0xE000;
/// Chord bit set when any Control variant is held.
pub const CHORD_CTRL: u16 = 1 << 9;
/// Chord bit set when any Shift variant is held.
pub const CHORD_SHIFT: u16 = 1 << 10;
/// Chord bit set when any Alt variant is held.
pub const CHORD_ALT: u16 = 1 << 11;

/// A lookup key combining a keycode with coalesced modifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo(pub u16);

impl KeyCombo {
    /// Builds the combo for `keycode` with the currently held modifiers.
    ///
    /// Modifier keycodes (103..111) encode as a one-hot bit in the
    /// `0xE000` space; everything else is `keycode | 0xF000`. The chord
    /// bits are ORed in only when at least one of ctrl/shift/alt is held,
    /// matching the original matcher construction bit for bit.
    pub fn new(keycode: u8, modifiers: ModifierState) -> Self {
        let mut matcher = Self::base(keycode).0;
        if modifiers.ctrl() || modifiers.shift() || modifiers.alt() {
            if modifiers.ctrl() {
                matcher |= CHORD_CTRL;
            }
            if modifiers.shift() {
                matcher |= CHORD_SHIFT;
            }
            if modifiers.alt() {
                matcher |= CHORD_ALT;
            }
        }
        KeyCombo(matcher)
    }

    /// Builds the combo for `keycode` with no chord bits set.
    ///
    /// This is the fallback tier: the key as if no modifier were held.
    pub fn base(keycode: u8) -> Self {
        if is_modifier_keycode(keycode) {
            let keybit = 1u16 << (keycode - MODIFIER_BASE);
            KeyCombo(keybit | MODIFIER_SPACE)
        } else {
            KeyCombo(u16::from(keycode) | STANDARD_SPACE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_key_without_modifiers() {
        // Arrange
        let mods = ModifierState::new();

        // Act
        let combo = KeyCombo::new(0x0A, mods); // "G"

        // Assert
        assert_eq!(combo.0, 0xF00A);
    }

    #[test]
    fn test_standard_key_with_ctrl() {
        // Arrange – left ctrl held
        let mut mods = ModifierState::new();
        mods.set(0, true);

        // Act
        let combo = KeyCombo::new(0x0A, mods);

        // Assert – 0xF000 | 0x0A | ctrl bit (1 << 9)
        assert_eq!(combo.0, 0xF20A);
    }

    #[test]
    fn test_right_variant_sets_same_chord_bit_as_left() {
        let mut left = ModifierState::new();
        left.set(1, true); // left shift
        let mut right = ModifierState::new();
        right.set(5, true); // right shift

        assert_eq!(KeyCombo::new(0x3A, left), KeyCombo::new(0x3A, right));
    }

    #[test]
    fn test_all_three_chord_bits() {
        let mut mods = ModifierState::new();
        mods.set(4, true); // right ctrl
        mods.set(1, true); // left shift
        mods.set(6, true); // right alt

        let combo = KeyCombo::new(0x04, mods);
        assert_eq!(combo.0, 0xF004 | CHORD_CTRL | CHORD_SHIFT | CHORD_ALT);
    }

    #[test]
    fn test_modifier_keycode_encodes_one_hot_in_modifier_space() {
        // Keycode 103 is Left Ctrl → bit 0; 110 is Right GUI → bit 7
        assert_eq!(KeyCombo::base(103).0, 0xE001);
        assert_eq!(KeyCombo::base(110).0, 0xE080);
    }

    #[test]
    fn test_gui_only_modifiers_set_no_chord_bits() {
        // GUI keys have no chord class; the combo stays unmodified
        let mut mods = ModifierState::new();
        mods.set(3, true);

        let combo = KeyCombo::new(0x0A, mods);
        assert_eq!(combo.0, 0xF00A);
    }

    #[test]
    fn test_base_ignores_held_modifiers() {
        let mut mods = ModifierState::new();
        mods.set(0, true);

        assert_eq!(KeyCombo::base(0x0A), KeyCombo(0xF00A));
        assert_ne!(KeyCombo::new(0x0A, mods), KeyCombo::base(0x0A));
    }
}
