//! Keycode-to-byte mapping table
//!
//! Maps composite labels (bucky prefix + evdev keycode name, e.g. `S-KEY_A`)
//! to the bytes written to the shell.

use std::collections::HashMap;

/// ASCII control code constants used by the keymap.
pub mod control {
    pub const NUL: u8 = 0;
    pub const EOT: u8 = 4;
    pub const HT: u8 = 9;
    pub const LF: u8 = 10;
    pub const CR: u8 = 13;
    pub const ESC: u8 = 27;
    pub const DEL: u8 = 127;
}

/// Bytes produced by a single mapped key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// A single byte.
    Byte(u8),
    /// An ordered byte sequence (arrow keys and the like).
    Seq(&'static [u8]),
}

impl Output {
    /// Append this output onto a byte buffer.
    pub fn push_onto(&self, buf: &mut Vec<u8>) {
        match self {
            Output::Byte(b) => buf.push(*b),
            Output::Seq(s) => buf.extend_from_slice(s),
        }
    }
}

/// Lookup table from composite label to output bytes.
///
/// The label is the dash-joined bucky prefix (possibly empty) followed by the
/// base keycode name. There is deliberately no fallback from a prefixed label
/// to the unprefixed one: `S-KEY_F5` stays unmapped even though `KEY_F5`
/// might not be.
pub struct KeyMapTable {
    map: HashMap<String, Output>,
}

impl Default for KeyMapTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMapTable {
    pub fn new() -> Self {
        let mut map = HashMap::new();

        let byte = |map: &mut HashMap<String, Output>, label: &str, b: u8| {
            map.insert(label.to_string(), Output::Byte(b));
        };

        // Punctuation and its shifted pair
        byte(&mut map, "KEY_GRAVE", b'`');
        byte(&mut map, "S-KEY_GRAVE", b'~');
        byte(&mut map, "KEY_SPACE", b' ');
        byte(&mut map, "KEY_MINUS", b'-');
        byte(&mut map, "S-KEY_MINUS", b'_');
        byte(&mut map, "KEY_EQUAL", b'=');
        byte(&mut map, "S-KEY_EQUAL", b'+');
        byte(&mut map, "KEY_SEMICOLON", b';');
        byte(&mut map, "S-KEY_SEMICOLON", b':');
        byte(&mut map, "KEY_APOSTROPHE", b'\'');
        byte(&mut map, "S-KEY_APOSTROPHE", b'"');
        byte(&mut map, "KEY_COMMA", b',');
        byte(&mut map, "S-KEY_COMMA", b'<');
        byte(&mut map, "KEY_DOT", b'.');
        byte(&mut map, "S-KEY_DOT", b'>');
        byte(&mut map, "KEY_SLASH", b'/');
        byte(&mut map, "S-KEY_SLASH", b'?');
        byte(&mut map, "KEY_LEFTBRACE", b'[');
        byte(&mut map, "S-KEY_LEFTBRACE", b'{');
        byte(&mut map, "KEY_RIGHTBRACE", b']');
        byte(&mut map, "S-KEY_RIGHTBRACE", b'}');
        byte(&mut map, "KEY_BACKSLASH", b'\\');
        byte(&mut map, "S-KEY_BACKSLASH", b'|');

        // Editing and control keys
        byte(&mut map, "KEY_TAB", control::HT);
        byte(&mut map, "KEY_BACKSPACE", control::DEL);
        byte(&mut map, "KEY_ESC", control::ESC);
        byte(&mut map, "C-KEY_D", control::EOT);
        byte(&mut map, "KEY_ENTER", control::CR);
        byte(&mut map, "KEY_RETURN", control::LF);
        byte(&mut map, "C-KEY_SPACE", control::NUL);
        byte(&mut map, "C-KEY_LEFTBRACE", control::ESC);

        // Cursor and paging escape sequences, exactly ESC [ <letter>
        let seq = |map: &mut HashMap<String, Output>, label: &str, s: &'static [u8]| {
            map.insert(label.to_string(), Output::Seq(s));
        };
        seq(&mut map, "KEY_UP", b"\x1b[A");
        seq(&mut map, "KEY_DOWN", b"\x1b[B");
        seq(&mut map, "KEY_RIGHT", b"\x1b[C");
        seq(&mut map, "KEY_LEFT", b"\x1b[D");
        seq(&mut map, "KEY_PAGEUP", b"\x1b[V");
        seq(&mut map, "KEY_PAGEDOWN", b"\x1b[U");

        // Letters: plain, shifted, and control (Ctrl+A = 1 .. Ctrl+Z = 26)
        for (i, letter) in (b'a'..=b'z').enumerate() {
            let upper = letter.to_ascii_uppercase();
            byte(&mut map, &format!("KEY_{}", upper as char), letter);
            byte(&mut map, &format!("S-KEY_{}", upper as char), upper);
            byte(&mut map, &format!("C-KEY_{}", upper as char), i as u8 + 1);
        }

        // Digit row: plain digits and their shifted symbols
        const SHIFTED_DIGITS: &[u8; 10] = b")!@#$%^&*(";
        for digit in b'0'..=b'9' {
            byte(&mut map, &format!("KEY_{}", digit as char), digit);
            byte(
                &mut map,
                &format!("S-KEY_{}", digit as char),
                SHIFTED_DIGITS[(digit - b'0') as usize],
            );
        }

        Self { map }
    }

    /// Look up a composite label. `None` means the key is unmapped.
    pub fn lookup(&self, label: &str) -> Option<&Output> {
        self.map.get(label)
    }

    /// Number of mapped labels.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
