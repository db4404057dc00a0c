use std::fmt;
use std::ops::Deref;

use super::builder::Builder;
use super::stage::Set;
use crate::pattern::Pattern;

/// A pattern whose last step was a set member.
///
/// Behaves as a [`Pattern`] through `Deref`, and can also reopen the set with
/// [`SetPattern::and`] to add more members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPattern {
    pattern: Pattern,
}

impl SetPattern {
    pub(crate) fn new(pattern: Pattern) -> Self {
        Self { pattern }
    }

    /// Continue adding members to the set just closed.
    pub fn and(&self) -> Builder<Set> {
        Builder::from_parts(self.pattern.source().to_string(), self.pattern.flags())
    }

    pub fn into_pattern(self) -> Pattern {
        self.pattern
    }
}

impl Deref for SetPattern {
    type Target = Pattern;

    fn deref(&self) -> &Pattern {
        &self.pattern
    }
}

impl From<SetPattern> for Pattern {
    fn from(set: SetPattern) -> Self {
        set.pattern
    }
}

impl fmt::Display for SetPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.pattern, f)
    }
}

#[cfg(test)]
mod tests {
    use crate::chain::matching;

    #[test]
    fn and_keeps_splicing_into_the_same_set() {
        let set = matching().one_of().chars("abc").and().chars("de");
        assert_eq!(set.source(), "[abcde]");
        assert_eq!(set.and().digit().and().white_space().source(), "[abcde\\d\\s]");
    }

    #[test]
    fn and_splices_into_the_last_set_only() {
        let set = matching().text("[x]").then().one_of().digit();
        assert_eq!(set.source(), "\\[x\\][\\d]");
        let twice = matching().one_of().chars("a").then().one_of().chars("b");
        assert_eq!(twice.and().chars("c").source(), "[a][bc]");
    }

    #[test]
    fn derefs_to_the_pattern() {
        let set = matching().one_of().chars("xy");
        assert_eq!(set.to_string(), "/[xy]/");
        assert!(set.test("y").unwrap());
        let pattern: crate::Pattern = set.into();
        assert_eq!(pattern.source(), "[xy]");
    }
}
