//! FIRST and FOLLOW sets.

use crate::{grammar::Grammar, types::Map, types::Set};
use lrkit_runtime::Symbol;
use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

/// A set of terminals, possibly including `$empty`.
pub type TerminalSet = BTreeSet<Symbol>;

/// Calculate `FIRST(sequence)`.
///
/// The result contains `$empty` iff the whole sequence derives the empty
/// string.
pub fn first<V>(grammar: &Grammar<V>, sequence: &[Symbol]) -> TerminalSet {
    let mut pass = FirstPass {
        grammar,
        derives_empty: Set::default(),
        seen: Set::default(),
        result: TerminalSet::new(),
    };

    // Learning that a symbol derives ε can expose terminals behind it that an
    // earlier pass skipped, so repeat until neither set grows.
    loop {
        let before = (pass.result.len(), pass.derives_empty.len());
        pass.seen.clear();
        pass.result.clear();
        if pass.sequence(sequence) {
            pass.result.insert(Symbol::EMPTY);
        }
        if (pass.result.len(), pass.derives_empty.len()) == before {
            return pass.result;
        }
    }
}

struct FirstPass<'g, V> {
    grammar: &'g Grammar<V>,
    derives_empty: Set<Symbol>,
    seen: Set<Symbol>,
    result: TerminalSet,
}

impl<V> FirstPass<'_, V> {
    /// Collect the leading terminals of `sequence` and return whether the
    /// whole sequence is nullable.
    fn sequence(&mut self, sequence: &[Symbol]) -> bool {
        for symbol in sequence {
            if *symbol == Symbol::EMPTY {
                continue;
            }
            if !self.grammar.is_nonterminal(symbol) {
                self.result.insert(symbol.clone());
                return false;
            }
            if !self.nonterminal(symbol) {
                return false;
            }
        }
        true
    }

    fn nonterminal(&mut self, symbol: &Symbol) -> bool {
        if !self.seen.insert(symbol.clone()) {
            // recursive occurrence: rely on what earlier passes found out.
            return self.derives_empty.contains(symbol);
        }

        let grammar = self.grammar;
        let mut nullable = false;
        for rhs in grammar.alternatives(symbol) {
            nullable |= self.sequence(rhs);
        }
        if nullable {
            self.derives_empty.insert(symbol.clone());
        }
        nullable
    }
}

/// Calculate `FOLLOW(nonterminal)` for an augmented grammar.
pub fn follow<V>(grammar: &Grammar<V>, nonterminal: &Symbol) -> TerminalSet {
    (*Analysis::new(grammar).follow(nonterminal)).clone()
}

/// FIRST/FOLLOW queries over one grammar, memoized.
pub struct Analysis<'g, V> {
    grammar: &'g Grammar<V>,
    firsts: RefCell<Map<Vec<Symbol>, Rc<TerminalSet>>>,
    follows: RefCell<Map<Symbol, Rc<TerminalSet>>>,
}

impl<'g, V> Analysis<'g, V> {
    pub fn new(grammar: &'g Grammar<V>) -> Self {
        Self {
            grammar,
            firsts: RefCell::default(),
            follows: RefCell::default(),
        }
    }

    pub fn grammar(&self) -> &'g Grammar<V> {
        self.grammar
    }

    pub fn first(&self, sequence: &[Symbol]) -> Rc<TerminalSet> {
        if let Some(cached) = self.firsts.borrow().get(sequence) {
            return cached.clone();
        }
        let computed = Rc::new(first(self.grammar, sequence));
        self.firsts
            .borrow_mut()
            .insert(sequence.to_vec(), computed.clone());
        computed
    }

    /// `FIRST(sequence lookahead)`.
    pub fn first_with(&self, sequence: &[Symbol], lookahead: &Symbol) -> Rc<TerminalSet> {
        let mut joined = Vec::with_capacity(sequence.len() + 1);
        joined.extend_from_slice(sequence);
        joined.push(lookahead.clone());
        self.first(&joined)
    }

    pub fn follow(&self, nonterminal: &Symbol) -> Rc<TerminalSet> {
        if let Some(cached) = self.follows.borrow().get(nonterminal) {
            return cached.clone();
        }
        // Only complete answers are memoized: nested calls see a partial
        // visited set and may omit what the caller already accounts for.
        let computed = Rc::new(self.follow_rec(nonterminal, &mut Set::default()));
        self.follows
            .borrow_mut()
            .insert(nonterminal.clone(), computed.clone());
        computed
    }

    fn follow_rec(&self, target: &Symbol, visited: &mut Set<Symbol>) -> TerminalSet {
        visited.insert(target.clone());

        let mut result = TerminalSet::new();
        if self.grammar.is_start_symbol(target) {
            result.insert(Symbol::EOF);
        }

        for (lhs, alternatives) in self.grammar.productions() {
            if *lhs == Symbol::START {
                continue;
            }
            for rhs in alternatives {
                for (i, _) in rhs.iter().enumerate().filter(|(_, s)| *s == target) {
                    let tail = &rhs[i + 1..];
                    let mut reaches_end = tail.is_empty();
                    if !tail.is_empty() {
                        let tail_first = self.first(tail);
                        reaches_end = tail_first.contains(&Symbol::EMPTY);
                        result.extend(
                            tail_first
                                .iter()
                                .filter(|s| **s != Symbol::EMPTY)
                                .cloned(),
                        );
                    }
                    if reaches_end && !visited.contains(lhs) {
                        let inherited = self.follow_rec(lhs, visited);
                        result.extend(inherited);
                    }
                }
            }
        }

        debug_assert!(!result.contains(&Symbol::EMPTY));
        result
    }
}
