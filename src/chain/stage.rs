//! Stage markers for [`Builder`](super::Builder).
//!
//! Each marker stands for one set of legal next operations. The marker traits
//! below group the stages that share an operation, and the builder's inherent
//! impls are keyed on them.

use std::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// A chain stage. Sealed: the set of stages is fixed.
pub trait Stage: sealed::Sealed {
    /// Where an operation was attempted, for usage errors.
    const DESCRIPTION: &'static str;
}

/// Nothing pending: the next fragment is used as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Open;

/// A quantifier is pending and applies to the next fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantified;

/// Laziness requested; a quantifier must follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lazy;

/// Inside an open character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Set;

/// Negation pending on top of stage `S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negated<S>(PhantomData<S>);

impl sealed::Sealed for Open {}
impl sealed::Sealed for Quantified {}
impl sealed::Sealed for Lazy {}
impl sealed::Sealed for Set {}
impl sealed::Sealed for Negated<Open> {}
impl sealed::Sealed for Negated<Quantified> {}
impl sealed::Sealed for Negated<Set> {}

impl Stage for Open {
    const DESCRIPTION: &'static str = "at the start of a fragment";
}

impl Stage for Quantified {
    const DESCRIPTION: &'static str = "after a quantifier";
}

impl Stage for Lazy {
    const DESCRIPTION: &'static str = "after 'lazily'";
}

impl Stage for Set {
    const DESCRIPTION: &'static str = "inside a character set";
}

impl Stage for Negated<Open> {
    const DESCRIPTION: &'static str = "after 'not'";
}

impl Stage for Negated<Quantified> {
    const DESCRIPTION: &'static str = "after a quantifier and 'not'";
}

impl Stage for Negated<Set> {
    const DESCRIPTION: &'static str = "after 'not' inside a character set";
}

/// Stages that accept any free-context fragment.
pub trait Fragments: Stage {}
impl Fragments for Open {}
impl Fragments for Quantified {}

/// Stages that accept negatable classes and set openers.
pub trait Negatable: Stage {}
impl Negatable for Open {}
impl Negatable for Quantified {}
impl Negatable for Negated<Open> {}
impl Negatable for Negated<Quantified> {}

/// Stages where `not` may be requested.
pub trait CanNegate: Stage {
    type Negated: Stage;
}

impl CanNegate for Open {
    type Negated = Negated<Open>;
}

impl CanNegate for Quantified {
    type Negated = Negated<Quantified>;
}

impl CanNegate for Set {
    type Negated = Negated<Set>;
}

/// Stages where a quantifier may be requested.
pub trait Quantifiable: Stage {}
impl Quantifiable for Open {}
impl Quantifiable for Lazy {}

/// Stages with no quantifier pending: zero-width assertions are allowed.
pub trait Unquantified: Stage {}
impl Unquantified for Open {}
impl Unquantified for Negated<Open> {}
