//! Compose regular expressions from readable chains of operations.
//!
//! # Example
//!
//! ```rust
//! use rebuild::{matching, re};
//!
//! // Hours and minutes in 24-hour time.
//! let time = matching()
//!     .the_start()
//!     .then()
//!     .group(
//!         matching()
//!             .one_of()
//!             .chars("01")
//!             .then()
//!             .digit()
//!             .or()
//!             .text("2")
//!             .then()
//!             .one_of()
//!             .range("0", "3")?,
//!     )
//!     .then()
//!     .text(":")
//!     .then()
//!     .one_of()
//!     .range("0", "5")?
//!     .then()
//!     .digit()
//!     .then()
//!     .the_end();
//!
//! assert_eq!(time.source(), "^(?:[01]\\d|2[0-3]):[0-5]\\d$");
//! assert!(time.test("23:59")?);
//! assert!(!time.test("24:00")?);
//!
//! // Flags are picked before the pattern is opened.
//! let words = re().globally().matching().one_or_more().alpha_numeric();
//! assert_eq!(words.to_string(), "/\\w+/g");
//! assert_eq!(words.replace("hello big world", "<$&>")?, "<hello> <big> <world>");
//! # Ok::<(), rebuild::BuildError>(())
//! ```
//!
//! Chains can also be written as text and evaluated at run time, see
//! [`script`].

pub mod chain;
mod dialect;
mod error;
mod flags;
mod matcher;
pub mod pattern;
pub mod script;

pub use chain::{Builder, SetPattern, Start, matching, re};
pub use error::BuildError;
pub use flags::{Flag, Flags};
pub use matcher::{Match, Matcher};
pub use pattern::Pattern;
pub use pattern::fragment::{Fragment, IntoFragments};
pub use pattern::lexical::{CodeInput, NamedClass};
pub use script::{Script, compile, evaluate};
