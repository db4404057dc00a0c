//! Thin facade over the compiled engine: test, exec, replace, split, search.
//!
//! All indices are **byte** offsets into the subject text.
//!
//! Case-insensitive matching uses the engine's Unicode simple case folding,
//! so under the `i` flag a few non-ASCII characters (KELVIN SIGN for `k`,
//! LONG S for `s`) match where a non-Unicode JavaScript regex would not.

use fancy_regex::{Captures, Regex};
use tracing::debug;

use crate::dialect;
use crate::error::BuildError;
use crate::flags::Flags;

/// A compiled pattern ready for matching.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    flags: Flags,
}

/// One successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The whole matched text.
    pub text: String,
    /// Capture groups in order; `None` for a group that did not take part.
    pub groups: Vec<Option<String>>,
    /// Byte offset of the match in the subject.
    pub index: usize,
}

impl Match {
    fn from_captures(captures: &Captures<'_>) -> Self {
        let whole = captures.get(0);
        Self {
            text: whole.map_or_else(String::new, |m| m.as_str().to_string()),
            groups: (1..captures.len())
                .map(|n| captures.get(n).map(|m| m.as_str().to_string()))
                .collect(),
            index: whole.map_or(0, |m| m.start()),
        }
    }

    /// Group `n`, where group 0 is the whole match.
    pub fn group(&self, n: usize) -> Option<&str> {
        match n {
            0 => Some(&self.text),
            _ => self.groups.get(n - 1)?.as_deref(),
        }
    }

    fn end(&self) -> usize {
        self.index + self.text.len()
    }
}

impl Matcher {
    /// Compile pattern `source` with `flags`.
    pub fn compile(source: &str, flags: Flags) -> Result<Self, BuildError> {
        let translated = dialect::translate(source, flags)?;
        debug!(source, %flags, "compiling pattern");
        let regex = Regex::new(&translated).map_err(|err| BuildError::Compile {
            pattern: source.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self { regex, flags })
    }

    /// The underlying engine regex. The sticky flag is enforced by this
    /// facade and is not part of the native regex.
    pub fn as_native(&self) -> &Regex {
        &self.regex
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn test(&self, text: &str) -> Result<bool, BuildError> {
        if self.flags.sticky {
            return Ok(self.exec(text)?.is_some());
        }
        self.regex.is_match(text).map_err(match_error)
    }

    /// First match in `text`, with its capture groups.
    pub fn exec(&self, text: &str) -> Result<Option<Match>, BuildError> {
        self.anchored_match_at(text, 0)
    }

    /// Byte offset of the first match, if any.
    pub fn search(&self, text: &str) -> Result<Option<usize>, BuildError> {
        let found = self.regex.find(text).map_err(match_error)?;
        Ok(found
            .map(|found| found.start())
            .filter(|&start| !self.flags.sticky || start == 0))
    }

    /// Replace the first match, or every match under the global flag.
    ///
    /// The template understands `$$`, `$&`, `` $` ``, `$'` and `$n`/`$nn`.
    pub fn replace(&self, text: &str, template: &str) -> Result<String, BuildError> {
        self.replace_with(text, |found| expand(template, found, text))
    }

    /// Like [`Matcher::replace`], computing each replacement with a closure.
    pub fn replace_with(
        &self,
        text: &str,
        mut replacement: impl FnMut(&Match) -> String,
    ) -> Result<String, BuildError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut pos = 0;
        while pos <= text.len() {
            let Some(found) = self.anchored_match_at(text, pos)? else {
                break;
            };
            out.push_str(&text[last..found.index]);
            out.push_str(&replacement(&found));
            last = found.end();
            if !self.flags.global {
                break;
            }
            pos = step_past(text, &found);
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    /// Split `text` around matches. Capture groups of each separator are
    /// included in the output, with empty strings for groups that did not
    /// take part. The sticky flag does not apply here.
    pub fn split(&self, text: &str) -> Result<Vec<String>, BuildError> {
        if text.is_empty() {
            return Ok(match self.match_at(text, 0)? {
                Some(_) => vec![],
                None => vec![String::new()],
            });
        }
        let mut parts = Vec::new();
        let mut last = 0;
        let mut pos = 0;
        while pos < text.len() {
            let Some(found) = self.match_at(text, pos)? else {
                break;
            };
            if found.index >= text.len() {
                break;
            }
            if found.end() == last {
                pos = step_past(text, &found);
                continue;
            }
            parts.push(text[last..found.index].to_string());
            parts.extend(found.groups.into_iter().map(Option::unwrap_or_default));
            last = found.index + found.text.len();
            pos = last;
        }
        parts.push(text[last..].to_string());
        Ok(parts)
    }

    /// First match at or after `pos`; under the sticky flag only a match
    /// starting exactly at `pos` counts.
    fn anchored_match_at(&self, text: &str, pos: usize) -> Result<Option<Match>, BuildError> {
        let found = self.match_at(text, pos)?;
        Ok(found.filter(|found| !self.flags.sticky || found.index == pos))
    }

    fn match_at(&self, text: &str, pos: usize) -> Result<Option<Match>, BuildError> {
        Ok(self
            .regex
            .captures_from_pos(text, pos)
            .map_err(match_error)?
            .map(|captures| Match::from_captures(&captures)))
    }
}

fn match_error(err: fancy_regex::Error) -> BuildError {
    BuildError::Match(err.to_string())
}

/// Position to resume searching after `found`, stepping over one character
/// when the match was empty.
fn step_past(text: &str, found: &Match) -> usize {
    let end = found.end();
    if !found.text.is_empty() {
        return end;
    }
    end + text[end..].chars().next().map_or(1, char::len_utf8)
}

/// Expand a replacement template for one match.
fn expand(template: &str, found: &Match, subject: &str) -> String {
    let chars: Vec<char> = template.chars().collect();
    let groups = found.groups.len();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '$' || i + 1 == chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match chars[i + 1] {
            '$' => out.push('$'),
            '&' => out.push_str(&found.text),
            '`' => out.push_str(&subject[..found.index]),
            '\'' => out.push_str(&subject[found.end()..]),
            d if d.is_ascii_digit() => {
                let first = d.to_digit(10).map_or(0, |n| n as usize);
                let second = chars.get(i + 2).and_then(|c| c.to_digit(10));
                if let Some(second) = second
                    && (1..=groups).contains(&(first * 10 + second as usize))
                {
                    out.push_str(found.group(first * 10 + second as usize).unwrap_or(""));
                    i += 3;
                    continue;
                }
                if (1..=groups).contains(&first) {
                    out.push_str(found.group(first).unwrap_or(""));
                } else {
                    out.push('$');
                    out.push(d);
                }
            }
            _ => {
                out.push('$');
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    out
}
