//! Chain entry point and flag selection.

use super::builder::Builder;
use super::stage::Open;
use crate::flags::{Flag, Flags};
use crate::pattern::Pattern;
use crate::pattern::fragment::IntoFragments;

/// Start of a chain: picks the flags every later step carries.
///
/// The named toggles accumulate; [`Start::with_flags`] and
/// [`Start::with_flag_list`] replace the whole set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Start {
    flags: Flags,
}

impl Start {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn globally(self) -> Self {
        self.toggle(Flag::Global)
    }

    pub fn any_case(self) -> Self {
        self.toggle(Flag::IgnoreCase)
    }

    pub fn full_text(self) -> Self {
        self.toggle(Flag::Multiline)
    }

    pub fn with_unicode(self) -> Self {
        self.toggle(Flag::Unicode)
    }

    pub fn stickily(self) -> Self {
        self.toggle(Flag::Sticky)
    }

    /// Flags from single-letter codes; unknown letters are ignored.
    pub fn with_flags(self, codes: &str) -> Self {
        Self {
            flags: Flags::parse(codes),
        }
    }

    pub fn with_flag_list(self, flags: &[Flag]) -> Self {
        Self {
            flags: Flags::from_list(flags),
        }
    }

    fn toggle(self, flag: Flag) -> Self {
        Self {
            flags: self.flags.with(flag),
        }
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Open the pattern.
    pub fn matching(&self) -> Builder<Open> {
        Builder::from_parts(String::new(), self.flags)
    }

    /// Pattern made of the fragments alone.
    pub fn text(&self, fragments: impl IntoFragments) -> Pattern {
        self.matching().text(fragments)
    }
}

/// A new chain with no flags set.
pub fn re() -> Start {
    Start::new()
}

/// Shorthand for `re().matching()`.
pub fn matching() -> Builder<Open> {
    Start::new().matching()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_accumulate() {
        assert_eq!(re().matching().text("abc").flags().to_string(), "");
        assert_eq!(re().globally().flags().to_string(), "g");
        assert_eq!(re().any_case().flags().to_string(), "i");
        assert_eq!(re().full_text().flags().to_string(), "m");
        assert_eq!(re().with_unicode().flags().to_string(), "u");
        assert_eq!(re().stickily().flags().to_string(), "y");
        assert_eq!(re().globally().any_case().full_text().flags().to_string(), "gim");
    }

    #[test]
    fn explicit_sets_replace() {
        assert_eq!(re().globally().with_flags("mi").flags().to_string(), "im");
        assert_eq!(
            re().with_flag_list(&[Flag::Sticky, Flag::Global]).flags().to_string(),
            "gy"
        );
        assert_eq!(re().with_flags("gqz!").flags().to_string(), "g");
    }

    #[test]
    fn text_is_a_complete_pattern() {
        let pattern = re().any_case().text("a.b");
        assert_eq!(pattern.to_string(), "/a\\.b/i");
    }
}
