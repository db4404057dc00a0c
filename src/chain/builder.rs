//! The staged builder behind every chain.

use std::marker::PhantomData;

use super::set::SetPattern;
use super::stage::{
    CanNegate, Fragments, Lazy, Negatable, Negated, Open, Quantifiable, Quantified, Set, Stage,
    Unquantified,
};
use crate::error::BuildError;
use crate::flags::Flags;
use crate::pattern::Pattern;
use crate::pattern::compose::{self, Quantifier};
use crate::pattern::fragment::{Fragment, IntoFragments, pattern_source, set_source};
use crate::pattern::lexical::{self, CodeInput, NamedClass};

/// An in-progress chain: accumulated source, flags, and the one-shot
/// modifiers waiting for the next fragment.
///
/// The stage parameter `S` decides which operations are offered. Every
/// operation borrows the builder, so any intermediate step can be reused as
/// the starting point of several chains.
#[derive(Debug, Clone)]
pub struct Builder<S> {
    source: String,
    flags: Flags,
    quantifier: Quantifier,
    negate: bool,
    stage: PhantomData<S>,
}

impl<S: Stage> Builder<S> {
    pub(crate) fn from_parts(source: String, flags: Flags) -> Self {
        Self {
            source,
            flags,
            quantifier: Quantifier::default(),
            negate: false,
            stage: PhantomData,
        }
    }

    /// Source accumulated before this step.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    fn advance<T: Stage>(&self, quantifier: Quantifier, negate: bool) -> Builder<T> {
        Builder {
            source: self.source.clone(),
            flags: self.flags,
            quantifier,
            negate,
            stage: PhantomData,
        }
    }

    /// Append `fragment`, consuming any pending quantifier.
    fn finish(&self, fragment: &str) -> Pattern {
        let quantified = compose::quantify(fragment, &self.quantifier);
        Pattern::new(compose::concat(&self.source, &quantified), self.flags)
    }

    /// Insert `fragment` into the open set.
    fn splice(&self, fragment: &str) -> SetPattern {
        let source = compose::splice_into_set(&self.source, fragment);
        SetPattern::new(Pattern::new(source, self.flags))
    }

    /// Named class in free context, negated when negation is pending.
    pub(crate) fn emit_class(&self, class: NamedClass) -> Pattern {
        self.finish(class.def().fragment(self.negate))
    }

    /// Named class as a set member, negated when negation is pending.
    pub(crate) fn splice_class(&self, class: NamedClass) -> SetPattern {
        self.splice(class.def().fragment(self.negate))
    }
}

impl<S: Fragments> Builder<S> {
    /// Literal text, built patterns and native regexes, in order.
    pub fn text(&self, fragments: impl IntoFragments) -> Pattern {
        self.finish(&pattern_source(fragments))
    }

    pub fn any_char(&self) -> Pattern {
        self.emit_class(NamedClass::AnyChar)
    }

    pub fn tab(&self) -> Pattern {
        self.emit_class(NamedClass::Tab)
    }

    pub fn v_tab(&self) -> Pattern {
        self.emit_class(NamedClass::VTab)
    }

    pub fn c_return(&self) -> Pattern {
        self.emit_class(NamedClass::CReturn)
    }

    pub fn new_line(&self) -> Pattern {
        self.emit_class(NamedClass::NewLine)
    }

    pub fn form_feed(&self) -> Pattern {
        self.emit_class(NamedClass::FormFeed)
    }

    pub fn null(&self) -> Pattern {
        self.emit_class(NamedClass::Null)
    }

    pub fn slash(&self) -> Pattern {
        self.emit_class(NamedClass::Slash)
    }

    pub fn backslash(&self) -> Pattern {
        self.emit_class(NamedClass::Backslash)
    }

    /// `\xhh` escape for a code 0–255, or one per character of a string.
    pub fn ascii(&self, code: impl Into<CodeInput>) -> Result<Pattern, BuildError> {
        Ok(self.finish(&lexical::ascii(code.into())?))
    }

    /// `\uhhhh` escape for a code point, or one per character of a string.
    pub fn code_point(&self, code: impl Into<CodeInput>) -> Result<Pattern, BuildError> {
        Ok(self.finish(&lexical::code_point(code.into(), self.flags.unicode)?))
    }

    pub fn control(&self, letter: char) -> Result<Pattern, BuildError> {
        Ok(self.finish(&lexical::control(letter)?))
    }

    /// Non-capturing group around the fragments.
    pub fn group(&self, fragments: impl IntoFragments) -> Pattern {
        self.finish(&compose::group(&pattern_source(fragments)))
    }

    pub fn capture(&self, fragments: impl IntoFragments) -> Pattern {
        self.finish(&compose::capture(&pattern_source(fragments)))
    }

    /// Back-reference to capture group `number`.
    pub fn reference(&self, number: u32) -> Pattern {
        self.finish(&compose::reference(number))
    }
}

impl<S: Negatable> Builder<S> {
    pub fn digit(&self) -> Pattern {
        self.emit_class(NamedClass::Digit)
    }

    pub fn alpha_numeric(&self) -> Pattern {
        self.emit_class(NamedClass::AlphaNumeric)
    }

    pub fn white_space(&self) -> Pattern {
        self.emit_class(NamedClass::WhiteSpace)
    }

    /// Open a character set. The pending quantifier lands after the set and
    /// a pending negation makes it a complemented set.
    pub fn one_of(&self) -> Builder<Set> {
        let opener = if self.negate { "[^]" } else { "[]" };
        let quantified = compose::quantify(opener, &self.quantifier);
        Builder::from_parts(compose::concat(&self.source, &quantified), self.flags)
    }
}

impl<S: CanNegate> Builder<S> {
    /// Complement the next class or set. Applies to that one step only.
    pub fn not(&self) -> Builder<S::Negated> {
        self.advance(self.quantifier, true)
    }
}

impl<S: Quantifiable> Builder<S> {
    fn quantified(&self, min: Option<u32>, max: Option<u32>) -> Builder<Quantified> {
        let lazy = self.quantifier.lazy;
        self.advance(Quantifier { min, max, lazy }, false)
    }

    /// Between `min` and `max` repetitions, inclusive.
    pub fn between(&self, min: u32, max: u32) -> Result<Builder<Quantified>, BuildError> {
        self.between_bounds(Some(min), Some(max))
    }

    /// Like [`Builder::between`] with either bound optional. An omitted
    /// lower bound reads as zero and an omitted upper bound as unbounded.
    pub fn between_bounds(
        &self,
        min: Option<u32>,
        max: Option<u32>,
    ) -> Result<Builder<Quantified>, BuildError> {
        match (min, max) {
            (None, None) => Err(BuildError::Bounds("at least one bound expected".into())),
            (Some(min), Some(max)) if min > max => {
                Err(BuildError::Bounds(format!("minimum {min} exceeds maximum {max}")))
            }
            _ => Ok(self.quantified(min, max)),
        }
    }

    pub fn exactly(&self, count: u32) -> Builder<Quantified> {
        self.quantified(Some(count), Some(count))
    }

    pub fn at_least(&self, count: u32) -> Builder<Quantified> {
        self.quantified(Some(count), None)
    }

    pub fn at_most(&self, count: u32) -> Builder<Quantified> {
        self.quantified(None, Some(count))
    }

    pub fn any_amount_of(&self) -> Builder<Quantified> {
        self.quantified(Some(0), None)
    }

    pub fn none_or_one(&self) -> Builder<Quantified> {
        self.quantified(Some(0), Some(1))
    }

    pub fn one_or_more(&self) -> Builder<Quantified> {
        self.quantified(Some(1), None)
    }
}

impl<S: Unquantified> Builder<S> {
    pub fn word_boundary(&self) -> Pattern {
        self.emit_class(NamedClass::WordBoundary)
    }

    /// Lookahead on the fragments: negative when negation is pending.
    pub fn followed_by(&self, fragments: impl IntoFragments) -> Pattern {
        let assertion = compose::lookahead(&pattern_source(fragments), self.negate);
        Pattern::new(compose::concat(&self.source, &assertion), self.flags)
    }
}

impl Builder<Open> {
    pub fn the_start(&self) -> Pattern {
        self.emit_class(NamedClass::TheStart)
    }

    pub fn the_end(&self) -> Pattern {
        self.emit_class(NamedClass::TheEnd)
    }

    /// Make the next quantifier prefer the shortest match.
    pub fn lazily(&self) -> Builder<Lazy> {
        let quantifier = Quantifier {
            lazy: true,
            ..self.quantifier
        };
        self.advance(quantifier, false)
    }
}

impl Builder<Set> {
    /// Literal characters (escaped for set context) or raw source.
    pub fn chars(&self, fragments: impl IntoFragments) -> SetPattern {
        self.splice(&set_source(fragments))
    }

    pub fn digit(&self) -> SetPattern {
        self.splice_class(NamedClass::Digit)
    }

    pub fn alpha_numeric(&self) -> SetPattern {
        self.splice_class(NamedClass::AlphaNumeric)
    }

    pub fn white_space(&self) -> SetPattern {
        self.splice_class(NamedClass::WhiteSpace)
    }

    pub fn tab(&self) -> SetPattern {
        self.splice_class(NamedClass::Tab)
    }

    pub fn v_tab(&self) -> SetPattern {
        self.splice_class(NamedClass::VTab)
    }

    pub fn c_return(&self) -> SetPattern {
        self.splice_class(NamedClass::CReturn)
    }

    pub fn new_line(&self) -> SetPattern {
        self.splice_class(NamedClass::NewLine)
    }

    pub fn form_feed(&self) -> SetPattern {
        self.splice_class(NamedClass::FormFeed)
    }

    pub fn null(&self) -> SetPattern {
        self.splice_class(NamedClass::Null)
    }

    pub fn slash(&self) -> SetPattern {
        self.splice_class(NamedClass::Slash)
    }

    pub fn backslash(&self) -> SetPattern {
        self.splice_class(NamedClass::Backslash)
    }

    /// The backspace character, only expressible inside a set.
    pub fn backspace(&self) -> SetPattern {
        self.splice_class(NamedClass::Backspace)
    }

    pub fn ascii(&self, code: impl Into<CodeInput>) -> Result<SetPattern, BuildError> {
        Ok(self.splice(&lexical::ascii(code.into())?))
    }

    pub fn code_point(&self, code: impl Into<CodeInput>) -> Result<SetPattern, BuildError> {
        Ok(self.splice(&lexical::code_point(code.into(), self.flags.unicode)?))
    }

    pub fn control(&self, letter: char) -> Result<SetPattern, BuildError> {
        Ok(self.splice(&lexical::control(letter)?))
    }

    /// Character range `start-end`. Each endpoint must be exactly one
    /// character: a one-character string, or a pattern made of one escape.
    pub fn range(
        &self,
        start: impl Into<Fragment>,
        end: impl Into<Fragment>,
    ) -> Result<SetPattern, BuildError> {
        let start = range_endpoint(start.into())?;
        let end = range_endpoint(end.into())?;
        Ok(self.splice(&format!("{start}-{end}")))
    }
}

fn range_endpoint(fragment: Fragment) -> Result<String, BuildError> {
    match fragment {
        Fragment::Text(text) if text.chars().count() == 1 => Ok(lexical::escape_set(&text)),
        Fragment::Raw(source) if lexical::is_single_char(&source) => Ok(source),
        Fragment::Text(other) | Fragment::Raw(other) => Err(BuildError::RangeEndpoint(other)),
    }
}

impl Builder<Negated<Set>> {
    pub fn digit(&self) -> SetPattern {
        self.splice_class(NamedClass::Digit)
    }

    pub fn alpha_numeric(&self) -> SetPattern {
        self.splice_class(NamedClass::AlphaNumeric)
    }

    pub fn white_space(&self) -> SetPattern {
        self.splice_class(NamedClass::WhiteSpace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::matching;
    use pretty_assertions::assert_eq;

    #[test]
    fn quantifier_is_pending_until_the_next_fragment() {
        let quantified = matching().one_or_more();
        assert_eq!(quantified.source(), "");
        assert_eq!(quantified.quantifier().suffix(), "+");
        assert_eq!(quantified.digit().source(), "\\d+");
    }

    #[test]
    fn laziness_survives_into_the_quantifier() {
        let lazy = matching().lazily();
        assert!(lazy.quantifier().lazy);
        assert!(!lazy.quantifier().is_set());
        assert_eq!(lazy.at_most(3).text("a").source(), "a{,3}?");
    }

    #[test]
    fn negation_is_a_pending_modifier() {
        let negated = matching().not();
        assert!(negated.is_negated());
        assert_eq!(negated.digit().source(), "\\D");
        assert_eq!(negated.word_boundary().source(), "\\B");
    }

    #[test]
    fn between_validates_bounds() {
        let open = matching();
        assert!(open.between(4, 2).unwrap_err().is_range_error());
        assert!(open.between_bounds(None, None).unwrap_err().is_range_error());
        assert_eq!(open.between_bounds(None, Some(2)).unwrap().text("a").source(), "a{,2}");
        assert_eq!(open.between_bounds(Some(3), None).unwrap().text("a").source(), "a{3,}");
    }

    #[test]
    fn range_endpoints_must_be_single_characters() {
        let set = matching().one_of();
        assert_eq!(set.range('-', '/').unwrap().source(), "[\\--\\/]");
        assert!(set.range("ab", "z").unwrap_err().is_range_error());
        assert!(set.range("a", "").unwrap_err().is_range_error());
        assert!(set.range(matching().digit(), "z").unwrap_err().is_range_error());
        assert!(matches!(
            set.range(Fragment::raw("xy"), "z"),
            Err(BuildError::RangeEndpoint(endpoint)) if endpoint == "xy"
        ));
    }

    #[test]
    fn builders_are_reusable() {
        let base = matching().text("a").then().one_or_more();
        assert_eq!(base.digit().source(), "a\\d+");
        assert_eq!(base.text("bc").source(), "a(?:bc)+");
        assert_eq!(base.source(), "a");
    }
}
