//! Pattern text: escaping, composition and the finished descriptor.
//!
//! Everything here works on pattern *source* in the JavaScript dialect. The
//! [`compose`] functions never inspect more than the fragment they are given,
//! so the chain layer can splice their output together freely.
//!
//! | Module         | Role                                                |
//! |----------------|-----------------------------------------------------|
//! | [`lexical`]    | Named classes, escaping, character-code escapes      |
//! | [`compose`]    | Concatenation, quantifiers, groups, set splicing     |
//! | [`fragment`]   | Caller-supplied content: text or raw source          |
//! | [`descriptor`] | The finished [`Pattern`] and its lazy compilation    |

pub mod compose;
pub mod descriptor;
pub mod fragment;
pub mod lexical;

pub use descriptor::Pattern;
