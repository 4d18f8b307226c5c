//! Key decoding for raw-mode input.
//!
//! Bytes arrive in arbitrary chunks; [`KeyDecoder`] keeps incomplete escape or UTF-8 tails
//! until more bytes arrive or the caller decides the tail is final via [`KeyDecoder::flush`].

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const CTRL_H: u8 = 0x08;
const TAB: u8 = 0x09;
const LINE_FEED: u8 = 0x0a;
const CARRIAGE_RETURN: u8 = 0x0d;
const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// One decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Tab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    CtrlC,
    CtrlD,
    /// A control byte or escape sequence with no meaning for this crate.
    Unknown,
}

impl Key {
    /// Printable characters that a text buffer should accept.
    pub fn printable(self) -> Option<char> {
        match self {
            Self::Char(ch) if !ch.is_control() => Some(ch),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum Parsed {
    Key(Key, usize),
    Incomplete,
}

/// Stateful byte-to-key decoder.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    pending: Vec<u8>,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` and returns every key that is now complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Key> {
        self.pending.extend_from_slice(bytes);

        let mut keys = Vec::new();
        let mut idx = 0;
        while idx < self.pending.len() {
            match parse_one(&self.pending[idx..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    idx += consumed;
                }
                Parsed::Incomplete => break,
            }
        }
        self.pending.drain(..idx);
        keys
    }

    /// True when an incomplete sequence is waiting for more bytes.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Resolves the pending tail as-is: a lone ESC becomes [`Key::Escape`], anything else
    /// incomplete becomes [`Key::Unknown`].
    pub fn flush(&mut self) -> Vec<Key> {
        if self.pending.is_empty() {
            return Vec::new();
        }

        let key = if self.pending == [ESC] {
            Key::Escape
        } else {
            Key::Unknown
        };
        self.pending.clear();
        vec![key]
    }
}

/// Decodes a complete chunk in one go, treating any trailing partial sequence as final.
pub fn parse_keys(bytes: &[u8]) -> Vec<Key> {
    let mut decoder = KeyDecoder::new();
    let mut keys = decoder.feed(bytes);
    keys.extend(decoder.flush());
    keys
}

fn parse_one(bytes: &[u8]) -> Parsed {
    let Some(&first) = bytes.first() else {
        return Parsed::Incomplete;
    };

    match first {
        ESC => parse_escape(bytes),
        CTRL_C => Parsed::Key(Key::CtrlC, 1),
        CTRL_D => Parsed::Key(Key::CtrlD, 1),
        CARRIAGE_RETURN | LINE_FEED => Parsed::Key(Key::Enter, 1),
        DEL | CTRL_H => Parsed::Key(Key::Backspace, 1),
        TAB => Parsed::Key(Key::Tab, 1),
        byte if byte < 0x20 => Parsed::Key(Key::Unknown, 1),
        byte if byte < 0x80 => Parsed::Key(Key::Char(byte as char), 1),
        byte => parse_utf8(bytes, byte),
    }
}

fn parse_escape(bytes: &[u8]) -> Parsed {
    let Some(&next) = bytes.get(1) else {
        return Parsed::Incomplete;
    };

    match next {
        b'[' => {
            for (offset, &byte) in bytes.iter().enumerate().skip(2) {
                if (0x40..=0x7e).contains(&byte) {
                    return Parsed::Key(arrow_key(byte), offset + 1);
                }
                if !(0x20..=0x3f).contains(&byte) {
                    // Malformed CSI: drop the introducer and let the byte parse on its own.
                    return Parsed::Key(Key::Unknown, offset);
                }
            }
            Parsed::Incomplete
        }
        b'O' => match bytes.get(2) {
            Some(&last) => Parsed::Key(arrow_key(last), 3),
            None => Parsed::Incomplete,
        },
        // Alt-modified key: report the escape and leave the byte for the next parse.
        _ => Parsed::Key(Key::Escape, 1),
    }
}

fn arrow_key(final_byte: u8) -> Key {
    match final_byte {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        _ => Key::Unknown,
    }
}

fn parse_utf8(bytes: &[u8], lead: u8) -> Parsed {
    let len = match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Parsed::Key(Key::Unknown, 1),
    };

    if bytes.len() < len {
        return Parsed::Incomplete;
    }

    match std::str::from_utf8(&bytes[..len])
        .ok()
        .and_then(|text| text.chars().next())
    {
        Some(ch) => Parsed::Key(Key::Char(ch), len),
        None => Parsed::Key(Key::Unknown, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_keys, Key, KeyDecoder};

    #[test]
    fn control_bytes_map_to_keys() {
        assert_eq!(
            parse_keys(b"\x03\x04\r\n\x7f\x08\t"),
            vec![
                Key::CtrlC,
                Key::CtrlD,
                Key::Enter,
                Key::Enter,
                Key::Backspace,
                Key::Backspace,
                Key::Tab,
            ]
        );
    }

    #[test]
    fn csi_and_ss3_arrows_decode() {
        assert_eq!(
            parse_keys(b"\x1b[A\x1b[B\x1bOC\x1bOD"),
            vec![Key::Up, Key::Down, Key::Right, Key::Left]
        );
    }

    #[test]
    fn unrelated_csi_sequences_are_consumed_whole() {
        assert_eq!(
            parse_keys(b"\x1b[3~x\x1b[1;5H"),
            vec![Key::Unknown, Key::Char('x'), Key::Unknown]
        );
    }

    #[test]
    fn lone_escape_waits_for_flush() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert!(decoder.has_pending());
        assert_eq!(decoder.flush(), vec![Key::Escape]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn split_sequences_complete_across_feeds() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed(b"\x1b[").is_empty());
        assert_eq!(decoder.feed(b"B"), vec![Key::Down]);

        let snowman = "☃".as_bytes();
        assert!(decoder.feed(&snowman[..1]).is_empty());
        assert_eq!(decoder.feed(&snowman[1..]), vec![Key::Char('☃')]);
    }

    #[test]
    fn alt_prefixed_char_reports_escape_then_char() {
        assert_eq!(parse_keys(b"\x1bx"), vec![Key::Escape, Key::Char('x')]);
    }

    #[test]
    fn printable_excludes_control_chars() {
        assert_eq!(Key::Char('a').printable(), Some('a'));
        assert_eq!(Key::Enter.printable(), None);
        assert_eq!(Key::Char('\u{7}').printable(), None);
    }
}
