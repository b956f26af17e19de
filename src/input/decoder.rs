//! Key event decoding
//!
//! Turns raw (keycode, transition) events into shell input bytes. Bucky keys
//! (shift, control, meta, compose, and caps-lock remapped to control) toggle
//! persistent modifier state; alt is tracked separately and prefixes the next
//! mapped output with ESC. A reserved quit key requests orderly shutdown
//! instead of producing bytes.

use bitflags::bitflags;
use tracing::info;

use super::keymap::{control, KeyMapTable};
use super::source::Transition;

bitflags! {
    /// Currently held bucky keys.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Buckies: u8 {
        const SHIFT   = 0b0001;
        const COMPOSE = 0b0010;
        const META    = 0b0100;
        const CTRL    = 0b1000;
    }
}

/// Abbreviations in descending alphabetical order, so the composite label is
/// the same no matter which physical order the keys went down in.
const PREFIX_ORDER: [(Buckies, char); 4] = [
    (Buckies::SHIFT, 'S'),
    (Buckies::COMPOSE, 'P'),
    (Buckies::META, 'M'),
    (Buckies::CTRL, 'C'),
];

impl Buckies {
    /// Which bucky a keycode maps to, if any. Caps lock acts as control.
    fn from_keycode(code: &str) -> Option<Buckies> {
        match code {
            "KEY_LEFTSHIFT" | "KEY_RIGHTSHIFT" => Some(Buckies::SHIFT),
            "KEY_LEFTCTRL" | "KEY_RIGHTCTRL" | "KEY_CAPSLOCK" => Some(Buckies::CTRL),
            "KEY_LEFTMETA" | "KEY_RIGHTMETA" => Some(Buckies::META),
            "KEY_COMPOSE" => Some(Buckies::COMPOSE),
            _ => None,
        }
    }

    /// Dash-delimited prefix with trailing dash, e.g. `"S-C-"`, or empty when
    /// no bucky is held.
    pub fn prefix(&self) -> String {
        let mut out = String::new();
        for (flag, abbrev) in PREFIX_ORDER {
            if self.contains(flag) {
                out.push(abbrev);
                out.push('-');
            }
        }
        out
    }
}

/// Result of decoding one key event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    /// Bytes to deliver to the shell.
    Bytes(Vec<u8>),
    /// No output (bucky transition, key release, or unmapped key).
    Nothing,
    /// The reserved quit key was pressed.
    Quit,
}

/// Stateful keycode-to-bytes decoder.
///
/// Holds the modifier state for the process lifetime; never blocks and never
/// fails the caller. Unmapped keys are logged and swallowed.
pub struct KeyDecoder {
    table: KeyMapTable,
    buckies: Buckies,
    alt: bool,
    quit_key: String,
}

impl KeyDecoder {
    pub fn new(table: KeyMapTable, quit_key: impl Into<String>) -> Self {
        Self {
            table,
            buckies: Buckies::empty(),
            alt: false,
            quit_key: quit_key.into(),
        }
    }

    /// Decode a single key event.
    pub fn decode(&mut self, code: &str, transition: Transition) -> Decoded {
        // Bucky keys only toggle state, even on release.
        if let Some(bucky) = Buckies::from_keycode(code) {
            match transition {
                Transition::Pressed | Transition::Repeating => self.buckies.insert(bucky),
                Transition::Released => self.buckies.remove(bucky),
            }
            return Decoded::Nothing;
        }

        // Alt is tracked independently of the bucky set.
        if code == "KEY_LEFTALT" || code == "KEY_RIGHTALT" {
            self.alt = matches!(transition, Transition::Pressed | Transition::Repeating);
            return Decoded::Nothing;
        }

        // Content keys act on press and auto-repeat only.
        if transition == Transition::Released {
            return Decoded::Nothing;
        }

        // The quit key bypasses the table entirely.
        if code == self.quit_key {
            return Decoded::Quit;
        }

        let label = format!("{}{}", self.buckies.prefix(), code);
        match self.table.lookup(&label) {
            Some(output) => {
                let mut bytes = Vec::new();
                if self.alt {
                    bytes.push(control::ESC);
                }
                output.push_onto(&mut bytes);
                Decoded::Bytes(bytes)
            }
            None => {
                info!(keycode = code, buckies = %self.buckies.prefix(), "unmapped key");
                Decoded::Nothing
            }
        }
    }

    /// Currently held buckies (for diagnostics).
    pub fn buckies(&self) -> Buckies {
        self.buckies
    }

    /// Whether alt is currently held (for diagnostics).
    #[allow(dead_code)]
    pub fn alt(&self) -> bool {
        self.alt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> KeyDecoder {
        KeyDecoder::new(KeyMapTable::new(), "KEY_F1")
    }

    #[test]
    fn test_plain_letter() {
        let mut d = decoder();
        assert_eq!(
            d.decode("KEY_A", Transition::Pressed),
            Decoded::Bytes(vec![b'a'])
        );
        // Release of a content key produces nothing.
        assert_eq!(d.decode("KEY_A", Transition::Released), Decoded::Nothing);
    }

    #[test]
    fn test_shifted_digit() {
        let mut d = decoder();
        d.decode("KEY_LEFTSHIFT", Transition::Pressed);
        assert_eq!(
            d.decode("KEY_1", Transition::Pressed),
            Decoded::Bytes(vec![b'!'])
        );
        d.decode("KEY_LEFTSHIFT", Transition::Released);
        assert_eq!(
            d.decode("KEY_1", Transition::Pressed),
            Decoded::Bytes(vec![b'1'])
        );
    }

    #[test]
    fn test_control_letter() {
        let mut d = decoder();
        d.decode("KEY_LEFTCTRL", Transition::Pressed);
        assert_eq!(
            d.decode("KEY_D", Transition::Pressed),
            Decoded::Bytes(vec![4])
        );
    }

    #[test]
    fn test_capslock_acts_as_control() {
        let mut caps = decoder();
        let mut ctrl = decoder();
        caps.decode("KEY_CAPSLOCK", Transition::Pressed);
        ctrl.decode("KEY_RIGHTCTRL", Transition::Pressed);
        assert_eq!(
            caps.decode("KEY_A", Transition::Pressed),
            ctrl.decode("KEY_A", Transition::Pressed)
        );
    }

    #[test]
    fn test_alt_prefixes_escape() {
        let mut d = decoder();
        d.decode("KEY_LEFTALT", Transition::Pressed);
        assert!(d.alt());
        assert_eq!(
            d.decode("KEY_A", Transition::Pressed),
            Decoded::Bytes(vec![27, b'a'])
        );
        d.decode("KEY_LEFTALT", Transition::Released);
        assert_eq!(
            d.decode("KEY_A", Transition::Pressed),
            Decoded::Bytes(vec![b'a'])
        );
    }

    #[test]
    fn test_arrow_key_sequence() {
        let mut d = decoder();
        assert_eq!(
            d.decode("KEY_UP", Transition::Pressed),
            Decoded::Bytes(vec![27, b'[', b'A'])
        );
    }

    #[test]
    fn test_bucky_press_order_is_irrelevant() {
        let orderings: &[&[&str]] = &[
            &["KEY_LEFTSHIFT", "KEY_LEFTCTRL", "KEY_LEFTMETA"],
            &["KEY_LEFTMETA", "KEY_LEFTSHIFT", "KEY_LEFTCTRL"],
            &["KEY_LEFTCTRL", "KEY_LEFTMETA", "KEY_LEFTSHIFT"],
            &["KEY_LEFTCTRL", "KEY_LEFTSHIFT", "KEY_LEFTMETA"],
            &["KEY_LEFTMETA", "KEY_LEFTCTRL", "KEY_LEFTSHIFT"],
            &["KEY_LEFTSHIFT", "KEY_LEFTMETA", "KEY_LEFTCTRL"],
        ];
        let mut results = Vec::new();
        for order in orderings {
            let mut d = decoder();
            for key in *order {
                d.decode(key, Transition::Pressed);
            }
            assert_eq!(d.buckies().prefix(), "S-M-C-");
            results.push(d.decode("KEY_A", Transition::Pressed));
        }
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_release_of_unheld_bucky_is_noop() {
        let mut d = decoder();
        assert_eq!(
            d.decode("KEY_LEFTSHIFT", Transition::Released),
            Decoded::Nothing
        );
        assert_eq!(d.buckies(), Buckies::empty());
        assert_eq!(
            d.decode("KEY_A", Transition::Pressed),
            Decoded::Bytes(vec![b'a'])
        );
    }

    #[test]
    fn test_either_shift_release_clears_shift() {
        // Both shifts held map to one set member; releasing either clears it.
        let mut d = decoder();
        d.decode("KEY_LEFTSHIFT", Transition::Pressed);
        d.decode("KEY_RIGHTSHIFT", Transition::Pressed);
        d.decode("KEY_LEFTSHIFT", Transition::Released);
        assert_eq!(d.buckies(), Buckies::empty());
    }

    #[test]
    fn test_unmapped_key_is_silent() {
        let mut d = decoder();
        assert_eq!(d.decode("KEY_F5", Transition::Pressed), Decoded::Nothing);
        // No fallback from prefixed label to unprefixed one.
        d.decode("KEY_LEFTSHIFT", Transition::Pressed);
        assert_eq!(d.decode("KEY_TAB", Transition::Pressed), Decoded::Nothing);
    }

    #[test]
    fn test_quit_key() {
        let mut d = decoder();
        assert_eq!(d.decode("KEY_F1", Transition::Pressed), Decoded::Quit);
        assert_eq!(d.decode("KEY_F1", Transition::Released), Decoded::Nothing);
    }

    #[test]
    fn test_repeat_emits_like_press() {
        let mut d = decoder();
        assert_eq!(
            d.decode("KEY_A", Transition::Repeating),
            Decoded::Bytes(vec![b'a'])
        );
    }
}
