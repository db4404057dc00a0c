//! The immutable value produced by every completed chain step.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::BuildError;
use crate::flags::Flags;
use crate::matcher::{Match, Matcher};

/// Composed pattern source plus the flags it was built with.
///
/// A `Pattern` is never modified after construction. The compiled matcher is
/// built on first use and cached for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    flags: Flags,
    matcher: OnceLock<Arc<Matcher>>,
}

impl Pattern {
    pub(crate) fn new(source: String, flags: Flags) -> Self {
        Self {
            source,
            flags,
            matcher: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Compiled matcher for this pattern, compiling it on first call.
    pub fn regex(&self) -> Result<Arc<Matcher>, BuildError> {
        if let Some(matcher) = self.matcher.get() {
            return Ok(Arc::clone(matcher));
        }
        let compiled = Arc::new(Matcher::compile(&self.source, self.flags)?);
        // Another thread may have stored an identical matcher first.
        Ok(Arc::clone(self.matcher.get_or_init(|| compiled)))
    }

    pub fn test(&self, text: &str) -> Result<bool, BuildError> {
        self.regex()?.test(text)
    }

    pub fn exec(&self, text: &str) -> Result<Option<Match>, BuildError> {
        self.regex()?.exec(text)
    }

    pub fn search(&self, text: &str) -> Result<Option<usize>, BuildError> {
        self.regex()?.search(text)
    }

    pub fn replace(&self, text: &str, template: &str) -> Result<String, BuildError> {
        self.regex()?.replace(text, template)
    }

    pub fn replace_with(
        &self,
        text: &str,
        replacement: impl FnMut(&Match) -> String,
    ) -> Result<String, BuildError> {
        self.regex()?.replace_with(text, replacement)
    }

    pub fn split(&self, text: &str) -> Result<Vec<String>, BuildError> {
        self.regex()?.split(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl Eq for Pattern {}

/// Renders as a pattern literal: `/source/flags`.
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}
