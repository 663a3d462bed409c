/// Name of the key that ends a scan explicitly
pub const TERMINATOR_KEY: &str = "Enter";

/// A single key press as seen by the scan aggregator
///
/// Producers (terminal UI, stdin reader) translate their own event types into
/// this before handing them over, so the aggregator never depends on a
/// particular input backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    /// One printable character
    Char(char),
    /// End-of-scan key
    Terminator,
    /// Any other named key (Tab, arrows, function keys...)
    Other(String),
}

impl KeyInput {
    /// Classify a key identifier
    ///
    /// `"Enter"` is the terminator, a one-character string is a character
    /// (unless it is a control character), everything else is ignored by
    /// the aggregator.
    pub fn from_key_name(name: &str) -> Self {
        if name == TERMINATOR_KEY {
            return KeyInput::Terminator;
        }

        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => KeyInput::from(c),
            _ => KeyInput::Other(name.to_string()),
        }
    }

    /// Printable character carried by this key, if any
    pub fn printable(&self) -> Option<char> {
        match self {
            KeyInput::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<char> for KeyInput {
    fn from(c: char) -> Self {
        match c {
            '\r' | '\n' => KeyInput::Terminator,
            c if c.is_control() => KeyInput::Other(format!("{:?}", c)),
            c => KeyInput::Char(c),
        }
    }
}

/// Expand one line of text into the keys a keyboard-wedge scanner would send
pub fn keys_for_line(line: &str) -> Vec<KeyInput> {
    let mut keys: Vec<KeyInput> = line
        .trim_end_matches(['\r', '\n'])
        .chars()
        .map(KeyInput::from)
        .collect();
    keys.push(KeyInput::Terminator);
    keys
}
