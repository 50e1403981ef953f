//! Key code translation for the keyboard-to-console bridge.
//!
//! The canonical key representation is USB HID Usage IDs (page 0x07,
//! Keyboard/Keypad), with one convention inherited from the capture
//! collaborator: the eight modifier usages 0xE0–0xE7 arrive *remapped*
//! into the contiguous range 103–110 (`MODIFIER_BASE..MODIFIER_END`).
//! Everything in this module assumes that remapped form.
//!
//! Resolution pipeline:
//!
//! 1. [`modifier::ModifierState`] tracks which of the eight modifier keys
//!    are currently held, with full left/right fidelity.
//! 2. [`combo::KeyCombo`] derives a 16-bit lookup key from a keycode plus
//!    *coalesced* ctrl/shift/alt flags (left and right variants of a
//!    class are equivalent; that policy lives here, not in the tracker).
//! 3. [`eos::translate`] resolves the combo against the compiled-in Eos
//!    command table with a two-tier fallback.

pub mod combo;
pub mod eos;
pub mod linux_evdev;
pub mod modifier;

/// First remapped modifier keycode (Left Ctrl).
pub const MODIFIER_BASE: u8 = 103;

/// One past the last remapped modifier keycode (Right GUI is 110).
pub const MODIFIER_END: u8 = 111;

/// Returns `true` if `keycode` is one of the eight remapped modifier keys.
///
/// The range test reproduces the capture collaborator's contract exactly:
/// `keycode >= 103 && keycode < 111`.
pub fn is_modifier_keycode(keycode: u8) -> bool {
    (MODIFIER_BASE..MODIFIER_END).contains(&keycode)
}

/// Returns the modifier bit position (0..8) for a modifier keycode,
/// or `None` for ordinary keys.
pub fn modifier_position(keycode: u8) -> Option<u8> {
    if is_modifier_keycode(keycode) {
        Some(keycode - MODIFIER_BASE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_range_matches_collaborator_contract() {
        // Boundary values of the remapped window
        assert!(!is_modifier_keycode(102));
        assert!(is_modifier_keycode(103));
        assert!(is_modifier_keycode(110));
        assert!(!is_modifier_keycode(111));
    }

    #[test]
    fn test_modifier_position_is_offset_from_base() {
        assert_eq!(modifier_position(103), Some(0));
        assert_eq!(modifier_position(110), Some(7));
        assert_eq!(modifier_position(4), None);
        assert_eq!(modifier_position(111), None);
    }
}
