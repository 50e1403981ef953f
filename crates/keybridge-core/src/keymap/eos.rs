//! The compiled-in Eos command table and the two-tier key translator.
//!
//! Commands are the short tokens the console expects after the OSC
//! address prefix, e.g. `"group"` becomes `/eos/key/group`. The table is
//! a build-once map keyed by [`KeyCombo`] values; absence of an entry is
//! an expected outcome, not an error.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::combo::{KeyCombo, CHORD_CTRL, CHORD_SHIFT};
use super::modifier::ModifierState;
use super::is_modifier_keycode;

/// A console command token.
pub type Command = &'static str;

/// Standard-space combo for a bare keycode.
const fn key(keycode: u8) -> u16 {
    keycode as u16 | 0xF000
}

/// Adds the Control chord bit.
const fn ctrl(combo: u16) -> u16 {
    combo | CHORD_CTRL
}

/// Adds the Shift chord bit.
const fn shift(combo: u16) -> u16 {
    combo | CHORD_SHIFT
}

/// The default Eos layout, as (combo, command) pairs.
///
/// Keycodes are USB HID usages (page 0x07). Keypad digits deliberately
/// map to the same command strings as the digit row: the pending-down
/// queue dedupes by command, so pressing both before a drain emits one
/// event.
const EOS_LAYOUT: &[(u16, Command)] = &[
    // Letters
    (key(0x04), "at"),              // A
    (key(0x05), "block"),           // B
    (ctrl(key(0x05)), "blind"),
    (key(0x06), "chan"),            // C
    (ctrl(key(0x06)), "copy_to"),
    (key(0x07), "delay"),           // D
    (key(0x08), "effect"),          // E
    (key(0x09), "full"),            // F
    (key(0x0A), "group"),           // G
    (ctrl(key(0x0A)), "go_to_cue"),
    (key(0x0B), "highlight"),       // H
    (key(0x0F), "label"),           // L
    (ctrl(key(0x0F)), "live"),
    (key(0x10), "mark"),            // M
    (ctrl(key(0x10)), "macro"),
    (key(0x11), "next"),            // N
    (key(0x12), "out"),             // O
    (key(0x13), "part"),            // P
    (ctrl(key(0x13)), "park"),
    (key(0x14), "cue"),             // Q
    (ctrl(key(0x14)), "query"),
    (key(0x15), "record"),          // R
    (ctrl(key(0x15)), "record_only"),
    (key(0x16), "sub"),             // S
    (ctrl(key(0x16)), "sneak"),
    (key(0x17), "thru"),            // T
    (ctrl(key(0x17)), "time"),
    (key(0x18), "update"),          // U
    (ctrl(key(0x18)), "undo"),
    (key(0x1A), "recall_from"),     // W
    // Digit row 1..9, 0
    (key(0x1E), "1"),
    (key(0x1F), "2"),
    (key(0x20), "3"),
    (key(0x21), "4"),
    (key(0x22), "5"),
    (key(0x23), "6"),
    (key(0x24), "7"),
    (key(0x25), "8"),
    (key(0x26), "9"),
    (key(0x27), "0"),
    // Keypad digits collapse onto the digit-row commands
    (key(0x59), "1"),
    (key(0x5A), "2"),
    (key(0x5B), "3"),
    (key(0x5C), "4"),
    (key(0x5D), "5"),
    (key(0x5E), "6"),
    (key(0x5F), "7"),
    (key(0x60), "8"),
    (key(0x61), "9"),
    (key(0x62), "0"),
    // Command line / transport
    (key(0x28), "enter"),           // Enter
    (key(0x58), "enter"),           // Keypad Enter
    (key(0x29), "escape"),
    (key(0x2A), "clear_cmd"),       // Backspace
    (key(0x2B), "tab"),
    (key(0x2C), "go"),              // Space
    (ctrl(key(0x2C)), "stop"),
    (key(0x4C), "delete"),
    (key(0x4A), "home"),
    // Operators
    (key(0x2D), "-"),               // Minus row key
    (key(0x56), "-"),               // Keypad minus
    (shift(key(0x2E)), "+"),        // Shift+Equal
    (key(0x57), "+"),               // Keypad plus
    (key(0x37), "."),               // Period
    (key(0x63), "."),               // Keypad dot
    // Cue list navigation
    (key(0x52), "last"),            // Arrow Up
    (key(0x51), "next"),            // Arrow Down
    // Softkeys: F1–F6, shifted for 7–12
    (key(0x3A), "softkey_1"),
    (key(0x3B), "softkey_2"),
    (key(0x3C), "softkey_3"),
    (key(0x3D), "softkey_4"),
    (key(0x3E), "softkey_5"),
    (key(0x3F), "softkey_6"),
    (shift(key(0x3A)), "softkey_7"),
    (shift(key(0x3B)), "softkey_8"),
    (shift(key(0x3C)), "softkey_9"),
    (shift(key(0x3D)), "softkey_10"),
    (shift(key(0x3E)), "softkey_11"),
    (shift(key(0x3F)), "softkey_12"),
];

fn table() -> &'static HashMap<u16, Command> {
    static TABLE: OnceLock<HashMap<u16, Command>> = OnceLock::new();
    TABLE.get_or_init(|| EOS_LAYOUT.iter().copied().collect())
}

/// Looks up a raw combo value in the command table.
pub fn lookup(combo: KeyCombo) -> Option<Command> {
    table().get(&combo.0).copied()
}

/// Resolves `(keycode, modifiers)` to a console command.
///
/// Pure: same inputs always produce the same output, no side effects.
///
/// Tier order:
/// 1. Modifier keycodes (103..111) are the tracker's business and always
///    return `None` here.
/// 2. The combo with the held chord bits.
/// 3. The unmodified combo for the same keycode.
///
/// Known quirk, preserved deliberately: tier 3 means an unmapped modified
/// chord silently degrades to the plain key instead of being suppressed
/// (Ctrl+A with no Ctrl mapping still emits "at"). Operators may depend
/// on this; flagged for product review rather than changed.
pub fn translate(keycode: u8, modifiers: ModifierState) -> Option<Command> {
    if is_modifier_keycode(keycode) {
        return None;
    }
    lookup(KeyCombo::new(keycode, modifiers)).or_else(|| lookup(KeyCombo::base(keycode)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl_held() -> ModifierState {
        let mut m = ModifierState::new();
        m.set(0, true);
        m
    }

    #[test]
    fn test_table_has_no_duplicate_combos() {
        // The map collapses duplicate keys silently; the literal must not
        // contain any for the table to mean what it says.
        assert_eq!(table().len(), EOS_LAYOUT.len());
    }

    #[test]
    fn test_plain_g_translates_to_group() {
        assert_eq!(translate(0x0A, ModifierState::new()), Some("group"));
    }

    #[test]
    fn test_ctrl_g_translates_to_go_to_cue() {
        assert_eq!(translate(0x0A, ctrl_held()), Some("go_to_cue"));
    }

    #[test]
    fn test_right_ctrl_is_equivalent_to_left() {
        let mut m = ModifierState::new();
        m.set(4, true);
        assert_eq!(translate(0x0A, m), Some("go_to_cue"));
    }

    #[test]
    fn test_unmapped_chord_falls_back_to_unmodified_mapping() {
        // Ctrl+A has no explicit entry; the preserved quirk degrades the
        // chord to the plain key rather than suppressing it.
        assert_eq!(translate(0x04, ctrl_held()), Some("at"));

        // Same for Alt
        let mut alt = ModifierState::new();
        alt.set(2, true);
        assert_eq!(translate(0x04, alt), Some("at"));
    }

    #[test]
    fn test_fully_unmapped_keycode_returns_none() {
        // 0x0C ("I") has no entry at either tier
        assert_eq!(translate(0x0C, ModifierState::new()), None);
        assert_eq!(translate(0x0C, ctrl_held()), None);
    }

    #[test]
    fn test_modifier_keycodes_never_translate() {
        for kc in 103..111u8 {
            assert_eq!(translate(kc, ModifierState::new()), None);
            assert_eq!(translate(kc, ctrl_held()), None);
        }
    }

    #[test]
    fn test_translation_is_deterministic() {
        // Repeated calls with identical inputs agree
        let first = translate(0x2C, ModifierState::new());
        for _ in 0..10 {
            assert_eq!(translate(0x2C, ModifierState::new()), first);
        }
        assert_eq!(first, Some("go"));
    }

    #[test]
    fn test_keypad_and_digit_row_share_commands() {
        assert_eq!(translate(0x1E, ModifierState::new()), Some("1"));
        assert_eq!(translate(0x59, ModifierState::new()), Some("1"));
        assert_eq!(translate(0x28, ModifierState::new()), Some("enter"));
        assert_eq!(translate(0x58, ModifierState::new()), Some("enter"));
    }

    #[test]
    fn test_shifted_softkeys() {
        let mut m = ModifierState::new();
        m.set(5, true); // right shift
        assert_eq!(translate(0x3A, ModifierState::new()), Some("softkey_1"));
        assert_eq!(translate(0x3A, m), Some("softkey_7"));
    }

    #[test]
    fn test_ctrl_space_is_stop_not_go() {
        assert_eq!(translate(0x2C, ctrl_held()), Some("stop"));
    }

    #[test]
    fn test_gui_modifier_does_not_alter_lookup() {
        // GUI keys set no chord bit, so the plain mapping applies
        let mut m = ModifierState::new();
        m.set(7, true);
        assert_eq!(translate(0x0A, m), Some("group"));
    }
}
