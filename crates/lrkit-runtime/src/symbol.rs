//! Grammar symbols.

use std::{borrow::Cow, fmt};

/// An opaque grammar symbol identified by its name.
///
/// Whether a symbol is a terminal or a nonterminal is decided by the grammar
/// it is registered in, not by the symbol itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Symbol {
    name: Cow<'static, str>,
}

impl Symbol {
    /// Reserved symbol that denotes the empty derivation.
    pub const EMPTY: Self = Self::reserved("$empty");

    /// Reserved nonterminal of the augmented production `$start -> S`.
    pub const START: Self = Self::reserved("$start");

    /// Reserved terminal that marks the end of input.
    pub const EOF: Self = Self::reserved("$eof");

    /// Reserved pseudo-terminal used while computing LALR(1) lookaheads.
    /// It never collides with a user terminal.
    pub const PROBE: Self = Self::reserved("$probe");

    const fn reserved(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
        }
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Return whether this is one of `EMPTY`, `START`, `EOF` or `PROBE`.
    pub fn is_reserved(&self) -> bool {
        *self == Self::EMPTY || *self == Self::START || *self == Self::EOF || *self == Self::PROBE
    }
}

impl From<&'static str> for Symbol {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&Symbol> for Symbol {
    fn from(symbol: &Symbol) -> Self {
        symbol.clone()
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_symbols_compare_by_name() {
        assert_eq!(Symbol::new(String::from("$eof")), Symbol::EOF);
        assert!(Symbol::PROBE.is_reserved());
        assert!(!Symbol::from("id").is_reserved());
        assert_eq!(Symbol::from("id"), "id");
    }
}
