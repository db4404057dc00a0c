//! Pure string-level composition of pattern fragments.

/// Pending repetition bounds for the next fragment.
///
/// An unset `min` reads as zero and an unset `max` as unbounded. With both
/// unset no quantifier is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quantifier {
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub lazy: bool,
}

impl Quantifier {
    pub fn is_set(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Textual suffix for these bounds; empty when nothing applies.
    pub fn suffix(&self) -> String {
        if !self.is_set() {
            return String::new();
        }
        let min = self.min.unwrap_or(0);
        let mut suffix = match (min, self.max) {
            (1, Some(1)) => String::new(),
            (min, Some(max)) if min == max => format!("{{{min}}}"),
            (0, Some(1)) => "?".to_string(),
            (0, None) => "*".to_string(),
            // Lower bound omitted on purpose.
            (0, Some(max)) => format!("{{,{max}}}"),
            (1, None) => "+".to_string(),
            (min, Some(max)) => format!("{{{min},{max}}}"),
            (min, None) => format!("{{{min},}}"),
        };
        if self.lazy && !suffix.is_empty() {
            suffix.push('?');
        }
        suffix
    }
}

/// Append `fragment` to `existing`.
pub fn concat(existing: &str, fragment: &str) -> String {
    let mut source = String::with_capacity(existing.len() + fragment.len());
    source.push_str(existing);
    source.push_str(fragment);
    source
}

/// Insert `fragment` just before the last `]` of `existing`.
///
/// Appends when `existing` holds no set at all.
pub fn splice_into_set(existing: &str, fragment: &str) -> String {
    match existing.rfind(']') {
        Some(close) => {
            let mut source = String::with_capacity(existing.len() + fragment.len());
            source.push_str(&existing[..close]);
            source.push_str(fragment);
            source.push_str(&existing[close..]);
            source
        }
        None => concat(existing, fragment),
    }
}

/// Attach the quantifier to `fragment`, grouping it first when it is not a
/// single atom.
pub fn quantify(fragment: &str, quantifier: &Quantifier) -> String {
    let suffix = quantifier.suffix();
    if suffix.is_empty() {
        return fragment.to_string();
    }
    let mut source = if is_atom(fragment) {
        fragment.to_string()
    } else {
        format!("(?:{fragment})")
    };
    source.push_str(&suffix);
    source
}

/// True when a quantifier can follow `fragment` without grouping it.
pub fn is_atom(fragment: &str) -> bool {
    let chars: Vec<char> = fragment.chars().collect();
    match chars.as_slice() {
        [] | [_] => true,
        ['\\', _] => true,
        ['[', .., ']'] => closing_index(&chars, '[', ']') == Some(chars.len() - 1),
        ['(', .., ')'] => closing_index(&chars, '(', ')') == Some(chars.len() - 1),
        _ => false,
    }
}

/// Index of the delimiter closing the one at position 0.
///
/// Escaped delimiters are skipped. Parenthesis nesting is counted, and
/// brackets inside a character set do not count as parentheses.
fn closing_index(chars: &[char], open: char, close: char) -> Option<usize> {
    let mut depth = 1usize;
    let mut escaped = false;
    let mut in_set = false;
    for (idx, &ch) in chars.iter().enumerate().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            _ if open == '[' && ch == close => return Some(idx),
            '[' if !in_set => in_set = true,
            ']' if in_set => in_set = false,
            _ if in_set => {}
            _ if ch == open => depth += 1,
            _ if ch == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// True when `fragment` is one group that starts with `opener`.
fn is_enclosed_by(fragment: &str, opener: &str) -> bool {
    fragment.starts_with(opener) && fragment.ends_with(')') && is_atom(fragment)
}

/// Wrap as a lookahead, positive or negative.
pub fn lookahead(fragment: &str, negate: bool) -> String {
    let opener = if negate { "(?!" } else { "(?=" };
    if is_enclosed_by(fragment, opener) {
        return fragment.to_string();
    }
    format!("{opener}{fragment})")
}

/// Wrap in a non-capturing group unless already one.
pub fn group(fragment: &str) -> String {
    if is_enclosed_by(fragment, "(?:") {
        return fragment.to_string();
    }
    format!("(?:{fragment})")
}

/// Wrap in a capturing group, turning an enclosing non-capturing group into a
/// capturing one.
pub fn capture(fragment: &str) -> String {
    if is_enclosed_by(fragment, "(?:") {
        return format!("({}", &fragment[3..]);
    }
    if is_enclosed_by(fragment, "(") && !fragment.starts_with("(?") {
        return fragment.to_string();
    }
    format!("({fragment})")
}

/// Numbered back-reference.
pub fn reference(number: u32) -> String {
    format!("\\{number}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn q(min: Option<u32>, max: Option<u32>, lazy: bool) -> Quantifier {
        Quantifier { min, max, lazy }
    }

    #[test]
    fn suffix_table() {
        assert_eq!(q(Some(0), Some(1), false).suffix(), "?");
        assert_eq!(q(Some(0), None, false).suffix(), "*");
        assert_eq!(q(Some(1), None, false).suffix(), "+");
        assert_eq!(q(Some(1), Some(1), false).suffix(), "");
        assert_eq!(q(Some(1), Some(1), true).suffix(), "");
        assert_eq!(q(Some(2), Some(2), false).suffix(), "{2}");
        assert_eq!(q(Some(2), None, false).suffix(), "{2,}");
        assert_eq!(q(Some(0), Some(2), false).suffix(), "{,2}");
        assert_eq!(q(Some(1), Some(3), false).suffix(), "{1,3}");
        assert_eq!(q(Some(2), Some(4), false).suffix(), "{2,4}");
    }

    #[test]
    fn unset_bounds_default() {
        assert_eq!(q(None, Some(2), false).suffix(), "{,2}");
        assert_eq!(q(Some(3), None, false).suffix(), "{3,}");
        assert_eq!(q(None, None, true).suffix(), "");
        assert_eq!(quantify("abc", &q(None, None, false)), "abc");
    }

    proptest! {
        #[test]
        fn lazy_appends_question_mark(min in 0u32..6, extra in proptest::option::of(0u32..6)) {
            let max = extra.map(|e| min + e);
            let greedy = q(Some(min), max, false).suffix();
            let lazy = q(Some(min), max, true).suffix();
            if greedy.is_empty() {
                prop_assert_eq!(lazy, "");
            } else {
                prop_assert_eq!(lazy, format!("{greedy}?"));
            }
        }

        #[test]
        fn multi_char_literals_always_wrap(text in "[a-z]{2,8}", min in 0u32..4) {
            let quantified = quantify(&text, &q(Some(min), None, false));
            prop_assert!(quantified.starts_with("(?:"), "{}", quantified);
        }
    }

    #[test]
    fn atoms() {
        for atom in ["a", "", "\\d", "[abc]", "[a\\]b]", "(abc)", "(ab(cd))", "(?:x|y)", "(a\\)\\(b)", "([)])"] {
            assert!(is_atom(atom), "expected atom: {atom}");
        }
        for many in ["ab", "abc", "[a][b]", "(ab)(cd)", "a|b", "\\d\\d", "(a)|(b)", "[a]+"] {
            assert!(!is_atom(many), "expected many blocks: {many}");
        }
    }

    #[test]
    fn quantify_wraps_only_when_needed() {
        let plus = q(Some(1), None, false);
        assert_eq!(quantify("a", &plus), "a+");
        assert_eq!(quantify("abc", &plus), "(?:abc)+");
        assert_eq!(quantify("\\d", &plus), "\\d+");
        assert_eq!(quantify("(abc)", &plus), "(abc)+");
        assert_eq!(quantify("(ab)(cd)", &plus), "(?:(ab)(cd))+");
        assert_eq!(quantify("(?:abc)", &plus), "(?:abc)+");
        assert_eq!(quantify("abc", &q(Some(1), Some(1), false)), "abc");
    }

    #[test]
    fn splice_goes_before_last_bracket() {
        assert_eq!(splice_into_set("[]", "abc"), "[abc]");
        assert_eq!(splice_into_set("x[a]+?", "\\d"), "x[a\\d]+?");
        assert_eq!(splice_into_set("[^]{2}", "a-z"), "[^a-z]{2}");
    }

    #[test]
    fn splice_preserves_request_order() {
        let source = ["a-z", "\\d", "_", "\\s"]
            .iter()
            .fold("[]".to_string(), |acc, member| splice_into_set(&acc, member));
        assert_eq!(source, "[a-z\\d_\\s]");
    }

    #[test]
    fn lookahead_wrapping() {
        assert_eq!(lookahead("abc", false), "(?=abc)");
        assert_eq!(lookahead("abc", true), "(?!abc)");
        assert_eq!(lookahead("(?=abc)", false), "(?=abc)");
        assert_eq!(lookahead("(?=a)(?=b)", false), "(?=(?=a)(?=b))");
    }

    #[test]
    fn group_and_capture() {
        assert_eq!(group("abc"), "(?:abc)");
        assert_eq!(group("(?:abc)"), "(?:abc)");
        assert_eq!(group("(?:a)|(?:b)"), "(?:(?:a)|(?:b))");
        assert_eq!(capture("abc"), "(abc)");
        assert_eq!(capture("(?:abc)"), "(abc)");
        assert_eq!(capture("(abc)"), "(abc)");
        assert_eq!(capture("(?=abc)"), "((?=abc))");
        assert_eq!(capture("(a)(b)"), "((a)(b))");
    }

    #[test]
    fn back_reference() {
        assert_eq!(reference(1), "\\1");
        assert_eq!(reference(12), "\\12");
    }
}
