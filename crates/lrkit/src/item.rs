//! LR items.

use crate::{
    grammar::Grammar,
    sets::{Analysis, TerminalSet},
    util::display_fn,
};
use lrkit_runtime::{ProductionRef, Symbol};
use std::{cmp::Ordering, fmt, hash::Hash};

/// A production with a marker (the dot) at some position of its right-hand
/// side.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemCore {
    pub nonterminal: Symbol,
    pub alternative: usize,
    pub position: usize,
}

impl fmt::Debug for ItemCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}#{} @ {}]",
            self.nonterminal, self.alternative, self.position
        )
    }
}

impl ItemCore {
    pub fn new(nonterminal: impl Into<Symbol>, alternative: usize, position: usize) -> Self {
        Self {
            nonterminal: nonterminal.into(),
            alternative,
            position,
        }
    }

    /// `[$start -> . S]`
    pub fn start() -> Self {
        Self::new(Symbol::START, 0, 0)
    }

    pub fn production(&self) -> ProductionRef {
        ProductionRef {
            nonterminal: self.nonterminal.clone(),
            alternative: self.alternative,
        }
    }

    pub fn rhs<'g, V>(&self, grammar: &'g Grammar<V>) -> &'g [Symbol] {
        grammar
            .alternatives(&self.nonterminal)
            .get(self.alternative)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Return whether the marker has passed every symbol. Always true for an
    /// empty alternative.
    pub fn at_end<V>(&self, grammar: &Grammar<V>) -> bool {
        self.position >= self.rhs(grammar).len()
    }

    pub fn next_symbol<'g, V>(&self, grammar: &'g Grammar<V>) -> Option<&'g Symbol> {
        self.rhs(grammar).get(self.position)
    }

    /// The symbols after the one at the marker.
    pub fn rest<'g, V>(&self, grammar: &'g Grammar<V>) -> &'g [Symbol] {
        self.rhs(grammar).get(self.position + 1..).unwrap_or(&[])
    }

    pub fn shifted(&self) -> Self {
        Self {
            position: self.position + 1,
            ..self.clone()
        }
    }

    /// Return whether this is `[$start -> S .]`.
    pub fn is_accepting(&self) -> bool {
        self.nonterminal == Symbol::START && self.position == 1
    }

    /// The items `[B -> . γ]` for the nonterminal `B` at the marker.
    fn expansions<V>(&self, grammar: &Grammar<V>) -> Vec<ItemCore> {
        let symbol = match self.next_symbol(grammar) {
            Some(symbol) if grammar.is_nonterminal(symbol) => symbol,
            _ => return vec![],
        };
        let count = grammar.alternatives(symbol).len();
        (0..count)
            .map(|alternative| ItemCore::new(symbol, alternative, 0))
            .collect()
    }

    pub fn display<'g, V>(&'g self, grammar: &'g Grammar<V>) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{} ->", self.nonterminal)?;
            let rhs = self.rhs(grammar);
            for (i, symbol) in rhs.iter().enumerate() {
                if i == self.position {
                    f.write_str(" .")?;
                }
                write!(f, " {}", symbol)?;
            }
            if self.position >= rhs.len() {
                f.write_str(" .")?;
            }
            Ok(())
        })
    }
}

/// The operations the collection and table builders need from an item.
pub trait LRItem: Clone + Ord + Hash + fmt::Debug {
    fn core(&self) -> &ItemCore;

    /// The items that this item adds to a closure.
    fn next_items<V>(&self, cx: &Analysis<'_, V>) -> Vec<Self>;

    /// The item with the marker advanced by one symbol.
    fn shift(&self) -> Self;

    /// The terminals on which a completed item is reduced.
    fn followers<V>(&self, cx: &Analysis<'_, V>) -> TerminalSet;

    /// Fold `other` (equal to `self`) into `self` and report whether `self`
    /// changed.
    fn merge(&mut self, _other: &Self) -> bool {
        false
    }

    /// Render the item for diagnostics.
    fn display<'a, V>(&'a self, grammar: &'a Grammar<V>) -> Box<dyn fmt::Display + 'a> {
        Box::new(self.core().display(grammar))
    }
}

/// An LR(0) item.
///
/// A completed item is reduced on every terminal of `FOLLOW` of its
/// nonterminal, which makes the resulting tables SLR(1) in practice.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR0Item(pub ItemCore);

impl fmt::Debug for LR0Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl LRItem for LR0Item {
    fn core(&self) -> &ItemCore {
        &self.0
    }

    fn next_items<V>(&self, cx: &Analysis<'_, V>) -> Vec<Self> {
        self.0
            .expansions(cx.grammar())
            .into_iter()
            .map(LR0Item)
            .collect()
    }

    fn shift(&self) -> Self {
        LR0Item(self.0.shifted())
    }

    fn followers<V>(&self, cx: &Analysis<'_, V>) -> TerminalSet {
        (*cx.follow(&self.0.nonterminal)).clone()
    }
}

/// An LR(1) item: a core and a single lookahead terminal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR1Item {
    pub core: ItemCore,
    pub lookahead: Symbol,
}

impl fmt::Debug for LR1Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {{{}}}", self.core, self.lookahead)
    }
}

impl LR1Item {
    pub fn new(core: ItemCore, lookahead: impl Into<Symbol>) -> Self {
        Self {
            core,
            lookahead: lookahead.into(),
        }
    }
}

impl LRItem for LR1Item {
    fn core(&self) -> &ItemCore {
        &self.core
    }

    fn next_items<V>(&self, cx: &Analysis<'_, V>) -> Vec<Self> {
        let grammar = cx.grammar();
        let expansions = self.core.expansions(grammar);
        if expansions.is_empty() {
            return vec![];
        }
        let lookaheads = cx.first_with(self.core.rest(grammar), &self.lookahead);
        let mut items = Vec::with_capacity(expansions.len() * lookaheads.len());
        for lookahead in lookaheads.iter().filter(|s| **s != Symbol::EMPTY) {
            for core in &expansions {
                items.push(LR1Item::new(core.clone(), lookahead));
            }
        }
        items
    }

    fn shift(&self) -> Self {
        LR1Item::new(self.core.shifted(), &self.lookahead)
    }

    fn followers<V>(&self, _cx: &Analysis<'_, V>) -> TerminalSet {
        Some(self.lookahead.clone()).into_iter().collect()
    }

    fn display<'a, V>(&'a self, grammar: &'a Grammar<V>) -> Box<dyn fmt::Display + 'a> {
        Box::new(display_fn(move |f| {
            write!(f, "{}, {}", self.core.display(grammar), self.lookahead)
        }))
    }
}

/// An LALR(1) item: a core carrying the set of lookaheads merged from every
/// LR(1) item with that core.
///
/// Equality, ordering and hashing only look at the core.
#[derive(Clone)]
pub struct LALRItem {
    pub core: ItemCore,
    pub lookaheads: TerminalSet,
}

impl fmt::Debug for LALRItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.core, self.lookaheads)
    }
}

impl PartialEq for LALRItem {
    fn eq(&self, other: &Self) -> bool {
        self.core == other.core
    }
}

impl Eq for LALRItem {}

impl PartialOrd for LALRItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LALRItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.core.cmp(&other.core)
    }
}

impl Hash for LALRItem {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.core.hash(state);
    }
}

impl LALRItem {
    pub fn new(core: ItemCore, lookaheads: TerminalSet) -> Self {
        Self { core, lookaheads }
    }
}

impl LRItem for LALRItem {
    fn core(&self) -> &ItemCore {
        &self.core
    }

    fn next_items<V>(&self, cx: &Analysis<'_, V>) -> Vec<Self> {
        let grammar = cx.grammar();
        let expansions = self.core.expansions(grammar);
        if expansions.is_empty() {
            return vec![];
        }

        let rest = self.core.rest(grammar);
        let mut lookaheads = TerminalSet::new();
        if self.lookaheads.is_empty() {
            lookaheads.extend(cx.first(rest).iter().cloned());
        }
        for lookahead in &self.lookaheads {
            lookaheads.extend(cx.first_with(rest, lookahead).iter().cloned());
        }
        lookaheads.remove(&Symbol::EMPTY);

        expansions
            .into_iter()
            .map(|core| LALRItem::new(core, lookaheads.clone()))
            .collect()
    }

    fn shift(&self) -> Self {
        LALRItem::new(self.core.shifted(), self.lookaheads.clone())
    }

    fn followers<V>(&self, _cx: &Analysis<'_, V>) -> TerminalSet {
        self.lookaheads.clone()
    }

    fn merge(&mut self, other: &Self) -> bool {
        let before = self.lookaheads.len();
        self.lookaheads.extend(other.lookaheads.iter().cloned());
        self.lookaheads.len() > before
    }

    fn display<'a, V>(&'a self, grammar: &'a Grammar<V>) -> Box<dyn fmt::Display + 'a> {
        Box::new(display_fn(move |f| {
            write!(f, "{}, {{", self.core.display(grammar))?;
            crate::util::write_joined(f, &self.lookaheads, " ")?;
            f.write_str("}")
        }))
    }
}
