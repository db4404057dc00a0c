//! Named character classes and the escaping rules for literal text.

use phf::{Map, phf_map};

use crate::error::BuildError;

/// The class may carry a quantifier.
pub const QUANTIFIABLE: u8 = 1;
/// The class may appear inside a character set.
pub const IN_SET: u8 = 2;
/// The class may appear outside a character set.
pub const IN_PATTERN: u8 = 4;

const EVERYWHERE: u8 = QUANTIFIABLE | IN_SET | IN_PATTERN;

/// Characters escaped in free (non-set) context.
const PATTERN_META: &str = "^$/.*+?|()[]{}\\";
/// Characters escaped inside a character set.
const SET_META: &str = "^/[]\\-";

/// A symbolic name for a fixed pattern fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedClass {
    Digit,
    AlphaNumeric,
    WhiteSpace,
    WordBoundary,
    AnyChar,
    Tab,
    VTab,
    CReturn,
    NewLine,
    FormFeed,
    Null,
    Slash,
    Backslash,
    Backspace,
    TheStart,
    TheEnd,
}

/// Fragment text and capabilities of one [`NamedClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDef {
    pub positive: &'static str,
    pub negated: Option<&'static str>,
    pub caps: u8,
}

impl ClassDef {
    const fn new(positive: &'static str, negated: Option<&'static str>, caps: u8) -> Self {
        Self {
            positive,
            negated,
            caps,
        }
    }

    /// Fragment text, complemented when `negate` is set and a complement exists.
    pub fn fragment(&self, negate: bool) -> &'static str {
        match self.negated {
            Some(negated) if negate => negated,
            _ => self.positive,
        }
    }

    pub fn is_negatable(&self) -> bool {
        self.negated.is_some()
    }

    pub fn allows(&self, cap: u8) -> bool {
        self.caps & cap == cap
    }
}

/// Class table keyed by the names used in chain scripts.
static CLASS_NAMES: Map<&'static str, NamedClass> = phf_map! {
    "alphaNumeric" => NamedClass::AlphaNumeric,
    "anyChar" => NamedClass::AnyChar,
    "backslash" => NamedClass::Backslash,
    "backspace" => NamedClass::Backspace,
    "cReturn" => NamedClass::CReturn,
    "digit" => NamedClass::Digit,
    "formFeed" => NamedClass::FormFeed,
    "newLine" => NamedClass::NewLine,
    "null" => NamedClass::Null,
    "slash" => NamedClass::Slash,
    "tab" => NamedClass::Tab,
    "theEnd" => NamedClass::TheEnd,
    "theStart" => NamedClass::TheStart,
    "vTab" => NamedClass::VTab,
    "whiteSpace" => NamedClass::WhiteSpace,
    "wordBoundary" => NamedClass::WordBoundary,
};

impl NamedClass {
    pub const fn def(self) -> ClassDef {
        match self {
            NamedClass::Digit => ClassDef::new("\\d", Some("\\D"), EVERYWHERE),
            NamedClass::AlphaNumeric => ClassDef::new("\\w", Some("\\W"), EVERYWHERE),
            NamedClass::WhiteSpace => ClassDef::new("\\s", Some("\\S"), EVERYWHERE),
            NamedClass::WordBoundary => ClassDef::new("\\b", Some("\\B"), IN_PATTERN),
            NamedClass::AnyChar => ClassDef::new(".", None, QUANTIFIABLE | IN_PATTERN),
            NamedClass::Tab => ClassDef::new("\\t", None, EVERYWHERE),
            NamedClass::VTab => ClassDef::new("\\v", None, EVERYWHERE),
            NamedClass::CReturn => ClassDef::new("\\r", None, EVERYWHERE),
            NamedClass::NewLine => ClassDef::new("\\n", None, EVERYWHERE),
            NamedClass::FormFeed => ClassDef::new("\\f", None, EVERYWHERE),
            NamedClass::Null => ClassDef::new("\\0", None, EVERYWHERE),
            NamedClass::Slash => ClassDef::new("\\/", None, EVERYWHERE),
            NamedClass::Backslash => ClassDef::new("\\\\", None, EVERYWHERE),
            // Inside a set `\b` is the backspace character, outside it is a boundary.
            NamedClass::Backspace => ClassDef::new("\\b", None, IN_SET),
            NamedClass::TheStart => ClassDef::new("^", None, IN_PATTERN),
            NamedClass::TheEnd => ClassDef::new("$", None, IN_PATTERN),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CLASS_NAMES.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        CLASS_NAMES
            .entries()
            .find(|(_, class)| **class == self)
            .map_or("?", |(name, _)| *name)
    }
}

/// Escape literal text for use outside a character set.
pub fn escape_text(text: &str) -> String {
    escape_with(text, PATTERN_META)
}

/// Escape literal text for use as character set members.
pub fn escape_set(text: &str) -> String {
    escape_with(text, SET_META)
}

fn escape_with(text: &str, meta: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if meta.contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Argument accepted by the character-code escape producers.
///
/// Text is escaped one character (or code point) at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeInput {
    Number(i64),
    Text(String),
}

impl From<i32> for CodeInput {
    fn from(n: i32) -> Self {
        CodeInput::Number(n.into())
    }
}

impl From<i64> for CodeInput {
    fn from(n: i64) -> Self {
        CodeInput::Number(n)
    }
}

impl From<u8> for CodeInput {
    fn from(n: u8) -> Self {
        CodeInput::Number(n.into())
    }
}

impl From<u32> for CodeInput {
    fn from(n: u32) -> Self {
        CodeInput::Number(n.into())
    }
}

impl From<char> for CodeInput {
    fn from(ch: char) -> Self {
        CodeInput::Text(ch.to_string())
    }
}

impl From<&str> for CodeInput {
    fn from(text: &str) -> Self {
        CodeInput::Text(text.to_string())
    }
}

impl From<String> for CodeInput {
    fn from(text: String) -> Self {
        CodeInput::Text(text)
    }
}

/// `\xhh` escapes for codes 0–255.
pub fn ascii(input: CodeInput) -> Result<String, BuildError> {
    match input {
        CodeInput::Number(code) => hex_escape(code),
        CodeInput::Text(text) => per_char(&text, |ch| hex_escape(i64::from(u32::from(ch)))),
    }
}

fn hex_escape(code: i64) -> Result<String, BuildError> {
    if !(0..=0xff).contains(&code) {
        return Err(BuildError::CharCode(code.to_string()));
    }
    Ok(format!("\\x{code:02x}"))
}

/// `\uhhhh` escapes for any code point.
///
/// Above the 16-bit range a code point becomes a surrogate pair, or a single
/// `\u{…}` escape when `wide` (the unicode flag) is set.
pub fn code_point(input: CodeInput, wide: bool) -> Result<String, BuildError> {
    match input {
        CodeInput::Number(code) => {
            let code = u32::try_from(code)
                .ok()
                .filter(|code| *code <= 0x10ffff)
                .ok_or_else(|| BuildError::CharCode(code.to_string()))?;
            Ok(unicode_escape(code, wide))
        }
        CodeInput::Text(text) => per_char(&text, |ch| Ok(unicode_escape(ch.into(), wide))),
    }
}

fn unicode_escape(code: u32, wide: bool) -> String {
    if code <= 0xffff {
        format!("\\u{code:04x}")
    } else if wide {
        format!("\\u{{{code:x}}}")
    } else {
        let offset = code - 0x10000;
        let high = 0xd800 + (offset >> 10);
        let low = 0xdc00 + (offset & 0x3ff);
        format!("\\u{high:04x}\\u{low:04x}")
    }
}

fn per_char(
    text: &str,
    escape: impl Fn(char) -> Result<String, BuildError>,
) -> Result<String, BuildError> {
    if text.is_empty() {
        return Err(BuildError::CharCode("empty string".into()));
    }
    text.chars()
        .map(|ch| escape(ch).map_err(|_| BuildError::CharCode(format!("{ch:?}"))))
        .collect()
}

/// `\cX` control escape for an ASCII letter.
pub fn control(letter: char) -> Result<String, BuildError> {
    if !letter.is_ascii_alphabetic() {
        return Err(BuildError::ControlCode(letter));
    }
    Ok(format!("\\c{}", letter.to_ascii_uppercase()))
}

/// True when `source` denotes exactly one character: a lone character or a
/// single escape unit.
pub fn is_single_char(source: &str) -> bool {
    let mut chars = source.chars();
    match (chars.next(), chars.next()) {
        (Some(_), None) => true,
        (Some('\\'), Some(kind)) => {
            let rest = chars.as_str();
            match kind {
                'x' => is_hex(rest, 2),
                'u' => is_unicode_unit(rest),
                'c' => rest.len() == 1 && rest.chars().all(|c| c.is_ascii_alphabetic()),
                'd' | 'D' | 'w' | 'W' | 's' | 'S' | 'B' => false,
                _ => rest.is_empty(),
            }
        }
        _ => false,
    }
}

fn is_hex(text: &str, len: usize) -> bool {
    text.len() == len && text.chars().all(|c| c.is_ascii_hexdigit())
}

/// The part after `\u`: `hhhh`, `{h…}`, or a surrogate pair `hhhh\uhhhh`.
fn is_unicode_unit(rest: &str) -> bool {
    if let Some(inner) = rest.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        return !inner.is_empty() && inner.len() <= 6 && inner.chars().all(|c| c.is_ascii_hexdigit());
    }
    if is_hex(rest, 4) {
        return true;
    }
    match (rest.get(..4), rest.get(4..6), rest.get(6..)) {
        (Some(high), Some("\\u"), Some(low)) if is_hex(high, 4) && is_hex(low, 4) => {
            let high = u32::from_str_radix(high, 16).unwrap_or(0);
            let low = u32::from_str_radix(low, 16).unwrap_or(0);
            (0xd800..0xdc00).contains(&high) && (0xdc00..0xe000).contains(&low)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_text_covers_all_metacharacters() {
        assert_eq!(escape_text("a[b]"), "a\\[b\\]");
        assert_eq!(
            escape_text("f(x) = {4.5}^\\3"),
            "f\\(x\\) = \\{4\\.5\\}\\^\\\\3"
        );
        assert_eq!(escape_text("$/*+?|"), "\\$\\/\\*\\+\\?\\|");
        assert_eq!(escape_text("a-z"), "a-z");
    }

    #[test]
    fn escape_set_only_touches_set_metacharacters() {
        assert_eq!(escape_set("a-z"), "a\\-z");
        assert_eq!(escape_set("^[]"), "\\^\\[\\]");
        assert_eq!(escape_set(".*+?()"), ".*+?()");
    }

    #[test]
    fn class_fragments() {
        assert_eq!(NamedClass::Digit.def().fragment(false), "\\d");
        assert_eq!(NamedClass::Digit.def().fragment(true), "\\D");
        assert_eq!(NamedClass::WordBoundary.def().fragment(true), "\\B");
        assert_eq!(NamedClass::Tab.def().fragment(true), "\\t");
    }

    #[test]
    fn capabilities() {
        assert!(!NamedClass::TheStart.def().allows(QUANTIFIABLE));
        assert!(!NamedClass::WordBoundary.def().allows(IN_SET));
        assert!(!NamedClass::AnyChar.def().allows(IN_SET));
        assert!(NamedClass::AnyChar.def().allows(QUANTIFIABLE));
        assert!(!NamedClass::Backspace.def().allows(IN_PATTERN));
        assert!(NamedClass::Digit.def().allows(QUANTIFIABLE | IN_SET));
    }

    #[test]
    fn names_round_trip() {
        assert_eq!(NamedClass::from_name("alphaNumeric"), Some(NamedClass::AlphaNumeric));
        assert_eq!(NamedClass::WhiteSpace.name(), "whiteSpace");
        assert_eq!(NamedClass::from_name("bogus"), None);
    }

    #[test]
    fn ascii_escapes() {
        assert_eq!(ascii(160.into()).unwrap(), "\\xa0");
        assert_eq!(ascii(7.into()).unwrap(), "\\x07");
        assert_eq!(ascii("ABC".into()).unwrap(), "\\x41\\x42\\x43");
    }

    #[test]
    fn ascii_rejects_out_of_range() {
        assert!(ascii(256.into()).unwrap_err().is_range_error());
        assert!(ascii((-1).into()).unwrap_err().is_range_error());
        assert!(ascii("\u{2661}".into()).unwrap_err().is_range_error());
        assert!(ascii("".into()).unwrap_err().is_range_error());
    }

    #[test]
    fn code_point_escapes() {
        assert_eq!(code_point(0x2661.into(), false).unwrap(), "\\u2661");
        assert_eq!(code_point('\u{2661}'.into(), false).unwrap(), "\\u2661");
        assert_eq!(code_point(0x1f370.into(), false).unwrap(), "\\ud83c\\udf70");
        assert_eq!(
            code_point("I\u{2661}\u{1f370}".into(), false).unwrap(),
            "\\u0049\\u2661\\ud83c\\udf70"
        );
    }

    #[test]
    fn code_point_wide_mode() {
        assert_eq!(code_point(0x1f370.into(), true).unwrap(), "\\u{1f370}");
        assert_eq!(
            code_point("I\u{2661}\u{1f370}".into(), true).unwrap(),
            "\\u0049\\u2661\\u{1f370}"
        );
    }

    #[test]
    fn code_point_rejects_out_of_range() {
        assert!(code_point(0x200000.into(), false).unwrap_err().is_range_error());
        assert!(code_point((-5).into(), true).unwrap_err().is_range_error());
    }

    #[test]
    fn control_escapes() {
        assert_eq!(control('M').unwrap(), "\\cM");
        assert_eq!(control('j').unwrap(), "\\cJ");
        assert_eq!(control('1'), Err(BuildError::ControlCode('1')));
    }

    #[test]
    fn single_char_detection() {
        for source in [
            "a", "\\x80", "\\u2001", "\\u{1f370}", "\\ud83c\\udf70", "\\cM", "\\0", "\\t", "\\/",
            "\\\\", "\\b",
        ] {
            assert!(is_single_char(source), "expected single char: {source}");
        }
        for source in ["", "ab", "\\d", "\\W", "\\x8", "\\u20", "\\cMN", "[a]"] {
            assert!(!is_single_char(source), "expected multiple: {source}");
        }
    }
}
