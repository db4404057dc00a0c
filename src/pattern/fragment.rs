//! Arguments accepted wherever a chain operation takes pattern content.

use super::descriptor::Pattern;
use super::lexical::{escape_set, escape_text};
use crate::chain::SetPattern;

/// One piece of caller-supplied content.
///
/// Text is escaped for the context it lands in. Raw source (a built pattern
/// or a compiled regex) is spliced verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Raw(String),
}

impl Fragment {
    /// Pattern source to be used without escaping.
    pub fn raw(source: impl Into<String>) -> Self {
        Fragment::Raw(source.into())
    }

    /// Source text for free (non-set) context.
    pub fn to_pattern_source(&self) -> String {
        match self {
            Fragment::Text(text) => escape_text(text),
            Fragment::Raw(source) => source.clone(),
        }
    }

    /// Source text for character-set context.
    pub fn to_set_source(&self) -> String {
        match self {
            Fragment::Text(text) => escape_set(text),
            Fragment::Raw(source) => source.clone(),
        }
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Fragment::Text(text.to_string())
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Fragment::Text(text)
    }
}

impl From<&String> for Fragment {
    fn from(text: &String) -> Self {
        Fragment::Text(text.clone())
    }
}

impl From<char> for Fragment {
    fn from(ch: char) -> Self {
        Fragment::Text(ch.to_string())
    }
}

impl From<&Pattern> for Fragment {
    fn from(pattern: &Pattern) -> Self {
        Fragment::Raw(pattern.source().to_string())
    }
}

impl From<Pattern> for Fragment {
    fn from(pattern: Pattern) -> Self {
        Fragment::from(&pattern)
    }
}

impl From<&SetPattern> for Fragment {
    fn from(pattern: &SetPattern) -> Self {
        Fragment::Raw(pattern.source().to_string())
    }
}

impl From<SetPattern> for Fragment {
    fn from(pattern: SetPattern) -> Self {
        Fragment::from(&pattern)
    }
}

impl From<&fancy_regex::Regex> for Fragment {
    fn from(regex: &fancy_regex::Regex) -> Self {
        Fragment::Raw(regex.as_str().to_string())
    }
}

/// One or more fragments, concatenated in order.
pub trait IntoFragments {
    fn into_fragments(self) -> Vec<Fragment>;
}

macro_rules! single_fragment {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoFragments for $ty {
                fn into_fragments(self) -> Vec<Fragment> {
                    vec![self.into()]
                }
            }
        )*
    };
}

single_fragment!(
    Fragment,
    &str,
    String,
    &String,
    char,
    &Pattern,
    Pattern,
    &SetPattern,
    SetPattern,
    &fancy_regex::Regex,
);

impl<T: Into<Fragment>, const N: usize> IntoFragments for [T; N] {
    fn into_fragments(self) -> Vec<Fragment> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Fragment>> IntoFragments for Vec<T> {
    fn into_fragments(self) -> Vec<Fragment> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<A: Into<Fragment>, B: Into<Fragment>> IntoFragments for (A, B) {
    fn into_fragments(self) -> Vec<Fragment> {
        vec![self.0.into(), self.1.into()]
    }
}

impl<A: Into<Fragment>, B: Into<Fragment>, C: Into<Fragment>> IntoFragments for (A, B, C) {
    fn into_fragments(self) -> Vec<Fragment> {
        vec![self.0.into(), self.1.into(), self.2.into()]
    }
}

/// Concatenated source for free context.
pub fn pattern_source(fragments: impl IntoFragments) -> String {
    fragments
        .into_fragments()
        .iter()
        .map(Fragment::to_pattern_source)
        .collect()
}

/// Concatenated source for set context.
pub fn set_source(fragments: impl IntoFragments) -> String {
    fragments
        .into_fragments()
        .iter()
        .map(Fragment::to_set_source)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_escaped_per_context() {
        assert_eq!(pattern_source("a-[z]"), "a-\\[z\\]");
        assert_eq!(set_source("a-[z]"), "a\\-\\[z\\]");
    }

    #[test]
    fn raw_is_verbatim() {
        assert_eq!(pattern_source(Fragment::raw("b+")), "b+");
        assert_eq!(set_source(Fragment::raw("\\d")), "\\d");
    }

    #[test]
    fn mixed_sequences_concatenate_in_order() {
        assert_eq!(pattern_source(("a", Fragment::raw("b"), 'c')), "abc");
        assert_eq!(pattern_source(["x.", "y"]), "x\\.y");
        assert_eq!(pattern_source(vec![String::from("("), String::from(")")]), "\\(\\)");
    }

    #[test]
    fn native_regex_contributes_its_source() {
        let regex = fancy_regex::Regex::new("b|c").unwrap();
        assert_eq!(pattern_source(&regex), "b|c");
    }
}
