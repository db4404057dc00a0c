//! Chains of composition steps.
//!
//! A chain starts at [`re`] (to pick flags) or [`matching`], and each step
//! returns either a [`Builder`] at some [stage](stage) or a finished
//! [`Pattern`]. Operations that make no sense at a stage are simply absent
//! from that stage's type:
//!
//! ```compile_fail
//! use rebuild::matching;
//! // Two quantifiers in a row.
//! let _ = matching().one_or_more().exactly(2);
//! ```
//!
//! ```compile_fail
//! use rebuild::matching;
//! // Set members only exist inside a set.
//! let _ = matching().backspace();
//! ```

mod builder;
mod continuable;
mod set;
pub mod stage;
mod start;

pub use builder::Builder;
pub use set::SetPattern;
pub use start::{Start, matching, re};

use stage::{Lazy, Negated, Open, Quantified, Set};

pub type OpenBuilder = Builder<Open>;
pub type QuantifiedBuilder = Builder<Quantified>;
pub type LazyBuilder = Builder<Lazy>;
pub type NegatedBuilder = Builder<Negated<Open>>;
pub type SetBuilder = Builder<Set>;
