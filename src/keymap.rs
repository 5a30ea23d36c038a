//! Virtual-key names and codes accepted by the keyboard methods.
//!
//! `key_str` is the name `KeyPressChar` and friends take, `id` the
//! virtual-key code `KeyPress` and friends take.

use serde::Serialize;

use crate::Result;
use crate::keyboard_mouse::KeyboardMouse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KeyMap {
    pub key_str: &'static str,
    pub id: i32,
}

macro_rules! keys {
    ($($ident:ident => ($key_str:literal, $id:literal)),* $(,)?) => {
        impl KeyMap {
            $(
                #[doc = concat!("`", $key_str, "`, code ", stringify!($id))]
                pub const $ident: KeyMap = KeyMap {
                    key_str: $key_str,
                    id: $id,
                };
            )*

            /// Every known key, in declaration order.
            pub const ALL: &'static [KeyMap] = &[$(KeyMap::$ident),*];
        }
    };
}

keys! {
    KEY_0 => ("0", 48),
    KEY_1 => ("1", 49),
    KEY_2 => ("2", 50),
    KEY_3 => ("3", 51),
    KEY_4 => ("4", 52),
    KEY_5 => ("5", 53),
    KEY_6 => ("6", 54),
    KEY_7 => ("7", 55),
    KEY_8 => ("8", 56),
    KEY_9 => ("9", 57),
    KEY_MINUS => ("-", 189),
    KEY_EQUAL => ("=", 187),
    KEY_BACK => ("back", 8),
    KEY_A => ("a", 65),
    KEY_B => ("b", 66),
    KEY_C => ("c", 67),
    KEY_D => ("d", 68),
    KEY_E => ("e", 69),
    KEY_F => ("f", 70),
    KEY_G => ("g", 71),
    KEY_H => ("h", 72),
    KEY_I => ("i", 73),
    KEY_J => ("j", 74),
    KEY_K => ("k", 75),
    KEY_L => ("l", 76),
    KEY_M => ("m", 77),
    KEY_N => ("n", 78),
    KEY_O => ("o", 79),
    KEY_P => ("p", 80),
    KEY_Q => ("q", 81),
    KEY_R => ("r", 82),
    KEY_S => ("s", 83),
    KEY_T => ("t", 84),
    KEY_U => ("u", 85),
    KEY_V => ("v", 86),
    KEY_W => ("w", 87),
    KEY_X => ("x", 88),
    KEY_Y => ("y", 89),
    KEY_Z => ("z", 90),
    KEY_CTRL => ("ctrl", 17),
    KEY_ALT => ("alt", 18),
    KEY_SHIFT => ("shift", 16),
    KEY_WIN => ("win", 91),
    KEY_SPACE => ("space", 32),
    KEY_CAP => ("cap", 20),
    KEY_TAB => ("tab", 9),
    KEY_WAVY_LINES => ("~", 192),
    KEY_ESC => ("esc", 27),
    KEY_ENTER => ("enter", 13),
    KEY_UP => ("up", 38),
    KEY_DOWN => ("down", 40),
    KEY_LEFT => ("left", 37),
    KEY_RIGHT => ("right", 39),
    KEY_OPTION => ("option", 93),
    KEY_PRINT => ("print", 44),
    KEY_DELETE => ("delete", 46),
    KEY_HOME => ("home", 36),
    KEY_END => ("end", 35),
    KEY_PGUP => ("pgup", 33),
    KEY_PGDN => ("pgdn", 34),
    KEY_F1 => ("f1", 112),
    KEY_F2 => ("f2", 113),
    KEY_F3 => ("f3", 114),
    KEY_F4 => ("f4", 115),
    KEY_F5 => ("f5", 116),
    KEY_F6 => ("f6", 117),
    KEY_F7 => ("f7", 118),
    KEY_F8 => ("f8", 119),
    KEY_F9 => ("f9", 120),
    KEY_F10 => ("f10", 121),
    KEY_F11 => ("f11", 122),
    KEY_F12 => ("f12", 123),
    KEY_OPEN_BRACKET => ("[", 219),
    KEY_CLOSE_BRACKET => ("]", 221),
    KEY_BACKSLASH => ("\\", 220),
    KEY_SEMICOLON => (";", 186),
    KEY_SINGLE_QUOTES => ("'", 222),
    KEY_COMMA => (",", 188),
    KEY_DOT => (".", 190),
    KEY_SLASH => ("/", 191),
}

impl KeyMap {
    /// Case-insensitive lookup by key name.
    pub fn by_name(name: &str) -> Option<KeyMap> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.key_str.eq_ignore_ascii_case(name))
    }

    pub fn by_id(id: i32) -> Option<KeyMap> {
        Self::ALL.iter().copied().find(|key| key.id == id)
    }
}

/// Key presses by [`KeyMap`] instead of raw codes.
pub trait KeyMapExt: KeyboardMouse {
    fn press(&self, key: KeyMap) -> Result<i32> {
        self.key_press(key.id)
    }

    fn hold(&self, key: KeyMap) -> Result<i32> {
        self.key_down(key.id)
    }

    fn lift(&self, key: KeyMap) -> Result<i32> {
        self.key_up(key.id)
    }
}

impl<T: KeyboardMouse> KeyMapExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(KeyMap::by_name("A"), Some(KeyMap::KEY_A));
        assert_eq!(KeyMap::by_name("f5").map(|key| key.id), Some(116));
        assert_eq!(KeyMap::by_name("no-such-key"), None);
    }

    #[test]
    fn test_codes_are_unique() {
        let mut ids: Vec<i32> = KeyMap::ALL.iter().map(|key| key.id).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }
}
