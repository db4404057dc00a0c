//! Translation of composed pattern source into `fancy-regex` syntax.
//!
//! Composed source follows the JavaScript pattern dialect. The engine we
//! compile with differs on a handful of escapes and on literal braces, so the
//! source is rewritten just before compilation. Composition itself never sees
//! the translated text.

use tracing::trace;

use crate::error::BuildError;
use crate::flags::Flags;

const NOT_DIGIT_MEMBERS: &str = "\\x{0}-\\x{2F}\\x{3A}-\\x{10FFFF}";
const NOT_WORD_MEMBERS: &str =
    "\\x{0}-\\x{2F}\\x{3A}-\\x{40}\\x{5B}-\\x{5E}\\x{60}\\x{7B}-\\x{10FFFF}";
/// `.` outside a set: anything but a line terminator.
const ANY_BUT_LINE_END: &str = "[^\\n\\r\\x{2028}\\x{2029}]";
/// `\b` over ASCII word characters.
const WORD_BOUNDARY: &str =
    "(?:(?<=[A-Za-z0-9_])(?![A-Za-z0-9_])|(?<![A-Za-z0-9_])(?=[A-Za-z0-9_]))";
/// `\B` over ASCII word characters.
const NOT_WORD_BOUNDARY: &str =
    "(?:(?<=[A-Za-z0-9_])(?=[A-Za-z0-9_])|(?<![A-Za-z0-9_])(?![A-Za-z0-9_]))";

/// Rewrite `source` for the engine, folding `flags` into inline groups.
pub fn translate(source: &str, flags: Flags) -> Result<String, BuildError> {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len() + 16);
    if flags.ignore_case {
        out.push_str("(?i)");
    }
    if flags.multiline {
        out.push_str("(?m)");
    }

    let mut in_set = false;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\\' if i + 1 < chars.len() => {
                i = translate_escape(&chars, i, in_set, &mut out, source)?;
                continue;
            }
            '[' if !in_set => {
                // `[^]` matches any character at all.
                if chars.get(i + 1) == Some(&'^') && chars.get(i + 2) == Some(&']') {
                    out.push_str("(?s:.)");
                    i += 3;
                    continue;
                }
                in_set = true;
                out.push('[');
                if chars.get(i + 1) == Some(&'^') {
                    out.push('^');
                    i += 1;
                }
            }
            ']' if in_set => {
                in_set = false;
                out.push(']');
            }
            // Nested classes and set operators are literal here.
            '[' | '&' | '~' if in_set => {
                out.push('\\');
                out.push(ch);
            }
            '{' if !in_set => match repetition(&chars[i..]) {
                Some((len, text)) => {
                    out.push_str(&text);
                    i += len;
                    continue;
                }
                None => out.push_str("\\{"),
            },
            '}' if !in_set => out.push_str("\\}"),
            '.' if !in_set => out.push_str(ANY_BUT_LINE_END),
            _ => out.push(ch),
        }
        i += 1;
    }

    trace!(source, translated = %out, "translated pattern");
    Ok(out)
}

/// Recognise a `{n}`, `{n,}`, `{n,m}` or `{,m}` quantifier at the start of
/// `chars`, returning its length and engine spelling.
fn repetition(chars: &[char]) -> Option<(usize, String)> {
    let close = chars.iter().position(|&c| c == '}')?;
    let body: String = chars[1..close].iter().collect();
    let (min, max) = match body.split_once(',') {
        Some((min, max)) => (min, Some(max)),
        None => (body.as_str(), None),
    };
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    let text = match (min, max) {
        (min, None) if digits(min) => format!("{{{min}}}"),
        (min, Some("")) if digits(min) => format!("{{{min},}}"),
        ("", Some(max)) if digits(max) => format!("{{0,{max}}}"),
        (min, Some(max)) if digits(min) && digits(max) => format!("{{{min},{max}}}"),
        _ => return None,
    };
    Some((close + 1, text))
}

/// Translate the escape starting at `chars[i]`, returning the index after it.
fn translate_escape(
    chars: &[char],
    i: usize,
    in_set: bool,
    out: &mut String,
    source: &str,
) -> Result<usize, BuildError> {
    let next = chars[i + 1];
    let after = chars.get(i + 2).copied();
    match next {
        'd' => out.push_str(if in_set { "0-9" } else { "[0-9]" }),
        'D' if in_set => out.push_str(NOT_DIGIT_MEMBERS),
        'D' => out.push_str("[^0-9]"),
        'w' => out.push_str(if in_set { "A-Za-z0-9_" } else { "[A-Za-z0-9_]" }),
        'W' if in_set => out.push_str(NOT_WORD_MEMBERS),
        'W' => out.push_str("[^A-Za-z0-9_]"),
        'b' if in_set => out.push_str("\\x{8}"),
        'b' => out.push_str(WORD_BOUNDARY),
        'B' if !in_set => out.push_str(NOT_WORD_BOUNDARY),
        'v' => out.push_str("\\x{B}"),
        '0' if !after.is_some_and(|c| c.is_ascii_digit()) => out.push_str("\\x{0}"),
        'c' if after.is_some_and(|c| c.is_ascii_alphabetic()) => {
            let letter = after.map_or(0, u32::from);
            out.push_str(&format!("\\x{{{:X}}}", letter % 32));
            return Ok(i + 3);
        }
        'u' => return translate_unicode(chars, i, out, source),
        '/' => out.push('/'),
        _ => {
            out.push('\\');
            out.push(next);
        }
    }
    Ok(i + 2)
}

/// `\uhhhh` (joining surrogate pairs) and `\u{h…}`.
fn translate_unicode(
    chars: &[char],
    i: usize,
    out: &mut String,
    source: &str,
) -> Result<usize, BuildError> {
    if chars.get(i + 2) == Some(&'{')
        && let Some(len) = chars[i + 3..].iter().position(|&c| c == '}')
    {
        let digits: String = chars[i + 3..i + 3 + len].iter().collect();
        if let Ok(code) = u32::from_str_radix(&digits, 16) {
            push_code(out, code, source)?;
            return Ok(i + 4 + len);
        }
    }

    let Some(high) = hex4(chars, i + 2) else {
        out.push_str("\\u");
        return Ok(i + 2);
    };
    if (0xd800..0xdc00).contains(&high)
        && chars.get(i + 6) == Some(&'\\')
        && chars.get(i + 7) == Some(&'u')
        && let Some(low) = hex4(chars, i + 8)
        && (0xdc00..0xe000).contains(&low)
    {
        let code = 0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00);
        push_code(out, code, source)?;
        return Ok(i + 12);
    }
    push_code(out, high, source)?;
    Ok(i + 6)
}

fn hex4(chars: &[char], start: usize) -> Option<u32> {
    let digits: String = chars.get(start..start + 4)?.iter().collect();
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok()
}

fn push_code(out: &mut String, code: u32, source: &str) -> Result<(), BuildError> {
    if char::from_u32(code).is_none() {
        return Err(BuildError::Compile {
            pattern: source.to_string(),
            message: format!("lone surrogate or invalid code point \\u{{{code:x}}}"),
        });
    }
    out.push_str(&format!("\\x{{{code:X}}}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(source: &str) -> String {
        translate(source, Flags::new()).unwrap()
    }

    #[test]
    fn flags_become_inline_groups() {
        assert_eq!(translate("a", Flags::parse("im")).unwrap(), "(?i)(?m)a");
        assert_eq!(translate("a|b", Flags::parse("y")).unwrap(), "a|b");
        assert_eq!(translate("a", Flags::parse("gu")).unwrap(), "a");
    }

    #[test]
    fn ascii_classes() {
        assert_eq!(plain("\\d\\w"), "[0-9][A-Za-z0-9_]");
        assert_eq!(plain("[\\d_]"), "[0-9_]");
        assert_eq!(plain("\\D"), "[^0-9]");
    }

    #[test]
    fn character_escapes() {
        assert_eq!(plain("\\v"), "\\x{B}");
        assert_eq!(plain("\\0"), "\\x{0}");
        assert_eq!(plain("\\cM"), "\\x{D}");
        assert_eq!(plain("[\\b]"), "[\\x{8}]");
        assert_eq!(plain("\\b"), WORD_BOUNDARY);
        assert_eq!(plain("\\B"), NOT_WORD_BOUNDARY);
        assert_eq!(plain("a\\/b"), "a/b");
        assert_eq!(plain("\\xa0"), "\\xa0");
    }

    #[test]
    fn dot_excludes_line_terminators() {
        assert_eq!(plain("a.b"), format!("a{ANY_BUT_LINE_END}b"));
        assert_eq!(plain("[.]"), "[.]");
        assert_eq!(plain("\\."), "\\.");
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(plain("\\u2661"), "\\x{2661}");
        assert_eq!(plain("\\ud83c\\udf70"), "\\x{1F370}");
        assert_eq!(plain("\\u{1f370}"), "\\x{1F370}");
    }

    #[test]
    fn lone_surrogate_is_a_compile_error() {
        assert!(matches!(
            translate("\\ud83c", Flags::new()),
            Err(BuildError::Compile { .. })
        ));
    }

    #[test]
    fn braces() {
        assert_eq!(plain("a{,2}"), "a{0,2}");
        assert_eq!(plain("a{2}b{2,}c{2,4}"), "a{2}b{2,}c{2,4}");
        assert_eq!(plain("\\{x}"), "\\{x\\}");
        assert_eq!(plain("{x}"), "\\{x\\}");
    }

    #[test]
    fn set_contents() {
        assert_eq!(plain("[&&~]"), "[\\&\\&\\~]");
        assert_eq!(plain("[\\[\\]]"), "[\\[\\]]");
        assert_eq!(plain("[^abc]"), "[^abc]");
        assert_eq!(plain("[^]"), "(?s:.)");
    }
}
