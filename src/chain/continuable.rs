//! Operations that extend a finished pattern.

use super::builder::Builder;
use super::stage::Open;
use crate::pattern::Pattern;
use crate::pattern::compose;
use crate::pattern::fragment::{IntoFragments, pattern_source};

impl Pattern {
    /// Continue with another fragment after this one.
    pub fn then(&self) -> Builder<Open> {
        Builder::from_parts(self.source().to_string(), self.flags())
    }

    /// Start an alternative to everything so far.
    pub fn or(&self) -> Builder<Open> {
        Builder::from_parts(compose::concat(self.source(), "|"), self.flags())
    }

    /// Append a positive lookahead on the fragments.
    pub fn followed_by(&self, fragments: impl IntoFragments) -> Pattern {
        let assertion = compose::lookahead(&pattern_source(fragments), false);
        Pattern::new(compose::concat(self.source(), &assertion), self.flags())
    }
}

#[cfg(test)]
mod tests {
    use crate::chain::matching;
    use pretty_assertions::assert_eq;

    #[test]
    fn then_concatenates() {
        assert_eq!(matching().text("abc").then().text("de").source(), "abcde");
        assert_eq!(matching().text("abc").then().digit().source(), "abc\\d");
        assert_eq!(matching().text("abc").then().not().digit().source(), "abc\\D");
        assert_eq!(matching().digit().then().digit().source(), "\\d\\d");
        assert_eq!(
            matching().text("ab").then().text("cd").then().text("ef").source(),
            "abcdef"
        );
    }

    #[test]
    fn or_appends_an_alternative() {
        let either = matching().text("cat").or().text("dog");
        assert_eq!(either.source(), "cat|dog");
        assert!(either.test("hotdog").unwrap());
    }

    #[test]
    fn followed_by_after_a_fragment() {
        let word = matching().one_or_more().alpha_numeric().followed_by(",");
        assert_eq!(word.source(), "\\w+(?=,)");
        assert_eq!(word.exec("abc, def").unwrap().unwrap().text, "abc");
    }
}
