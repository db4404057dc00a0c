//! Flag set carried by every pattern in a chain.

use std::fmt;

/// A single matcher flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Global,
    IgnoreCase,
    Multiline,
    Unicode,
    Sticky,
}

impl Flag {
    /// Canonical order used when rendering a flag string.
    pub const ALL: [Flag; 5] = [
        Flag::Global,
        Flag::IgnoreCase,
        Flag::Multiline,
        Flag::Unicode,
        Flag::Sticky,
    ];

    pub fn code(self) -> char {
        match self {
            Flag::Global => 'g',
            Flag::IgnoreCase => 'i',
            Flag::Multiline => 'm',
            Flag::Unicode => 'u',
            Flag::Sticky => 'y',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.code() == code)
    }
}

/// Independent boolean toggles fixed at the start of a chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags {
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
    pub unicode: bool,
    pub sticky: bool,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a flag set from a string of single-letter codes.
    ///
    /// Unrecognised codes are ignored.
    pub fn parse(codes: &str) -> Self {
        codes
            .chars()
            .filter_map(Flag::from_code)
            .fold(Self::default(), Self::with)
    }

    pub fn from_list(flags: &[Flag]) -> Self {
        flags.iter().copied().fold(Self::default(), Self::with)
    }

    /// Copy of `self` with `flag` switched on.
    pub fn with(mut self, flag: Flag) -> Self {
        *self.slot(flag) = true;
        self
    }

    pub fn contains(&self, flag: Flag) -> bool {
        match flag {
            Flag::Global => self.global,
            Flag::IgnoreCase => self.ignore_case,
            Flag::Multiline => self.multiline,
            Flag::Unicode => self.unicode,
            Flag::Sticky => self.sticky,
        }
    }

    fn slot(&mut self, flag: Flag) -> &mut bool {
        match flag {
            Flag::Global => &mut self.global,
            Flag::IgnoreCase => &mut self.ignore_case,
            Flag::Multiline => &mut self.multiline,
            Flag::Unicode => &mut self.unicode,
            Flag::Sticky => &mut self.sticky,
        }
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in Flag::ALL {
            if self.contains(flag) {
                write!(f, "{}", flag.code())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_by_default() {
        assert_eq!(Flags::new().to_string(), "");
    }

    #[test]
    fn parse_renders_in_canonical_order() {
        assert_eq!(Flags::parse("img").to_string(), "gim");
        assert_eq!(Flags::parse("yugmi").to_string(), "gimuy");
    }

    #[test]
    fn parse_ignores_unknown_codes() {
        assert_eq!(Flags::parse("gxzq").to_string(), "g");
        assert_eq!(Flags::parse("s"), Flags::new());
    }

    #[test]
    fn list_form_matches_string_form() {
        let listed = Flags::from_list(&[Flag::Multiline, Flag::Global]);
        assert_eq!(listed, Flags::parse("gm"));
    }

    #[test]
    fn with_is_cumulative() {
        let flags = Flags::new().with(Flag::Global).with(Flag::IgnoreCase);
        assert!(flags.global && flags.ignore_case);
        assert!(!flags.multiline);
    }
}
