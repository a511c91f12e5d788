//! An LR(0)/LR(1)/LALR(1) parser generator.
//!
//! A [`Grammar`] is turned into a [`ParseTable`] by [`table::build`], and the
//! table is executed against a token stream by a [`Driver`].
//!
//! ```
//! use lrkit::{action, table::{self, Config}, Driver, Grammar, Token};
//!
//! let grammar = Grammar::<i64>::define(|g| {
//!     g.add_terminal("n")?;
//!     g.add_terminal("+")?;
//!     g.augment("E")?;
//!     g.add_rule("E", ["E".into(), "+".into(), "n".into(),
//!         action(|args: Vec<i64>| Some(args[0] + args[1]))])?;
//!     g.add_rule("E", ["n"])
//! })?;
//! let table = table::build(&grammar, &Config::new())?;
//!
//! let tokens = [
//!     Token::new("n", 1),
//!     Token::bare("+"),
//!     Token::new("n", 2),
//!     Token::eof(),
//! ];
//! assert_eq!(Driver::new(table).parse(tokens)?, Some(3));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod collection;
pub mod grammar;
pub mod item;
pub mod lalr;
pub mod sets;
pub mod table;
pub mod types;
pub mod util;

pub use crate::{
    grammar::{action, named_action, Element, Grammar, GrammarError},
    table::{build, BuildError, Config, ConflictError},
};
pub use lrkit_runtime::{self as runtime, Driver, ParseError, ParseTable, Symbol, Token};
