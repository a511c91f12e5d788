//! Parse table definition.
//!
//! A [`ParseTable`] is the self-contained result of table construction: the
//! action rows, the goto rows, the start state and the semantic definitions
//! attached to productions. Everything except the semantic actions is plain
//! data, so a table can be taken apart with [`ParseTable::into_parts`] and
//! rebuilt with [`ParseTable::from_parts`] after the actions are rebound.

use crate::symbol::Symbol;
use std::{collections::BTreeMap, collections::HashMap, fmt, rc::Rc};

/// The number to identify a state of the LR automaton.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID {
    raw: u32,
}

impl StateID {
    pub const fn from_raw(raw: u32) -> Self {
        Self { raw }
    }

    pub const fn into_raw(self) -> u32 {
        self.raw
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.raw as usize
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.raw)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// Identifies one alternative of a nonterminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionRef {
    pub nonterminal: Symbol,
    pub alternative: usize,
}

impl fmt::Display for ProductionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.nonterminal, self.alternative)
    }
}

/// A semantic action: receives the synthesized values it reads from the
/// stack (placeholders without a value are skipped) and produces one value.
pub type SemanticAction<V> = Rc<dyn Fn(Vec<V>) -> Option<V>>;

/// How a reduction interacts with the stack of synthesized values.
pub struct SemanticDefinition<V> {
    /// The number of stack values the action reads.
    pub arity: usize,
    /// Whether the values read are removed from the stack.
    pub consume: bool,
    pub action: SemanticAction<V>,
}

impl<V> Clone for SemanticDefinition<V> {
    fn clone(&self) -> Self {
        Self {
            arity: self.arity,
            consume: self.consume,
            action: self.action.clone(),
        }
    }
}

impl<V> fmt::Debug for SemanticDefinition<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticDefinition")
            .field("arity", &self.arity)
            .field("consume", &self.consume)
            .finish_non_exhaustive()
    }
}

/// The reduction by a particular production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduce {
    pub production: ProductionRef,
    /// The number of symbols on the right-hand side.
    pub len: usize,
    /// Whether the production is the empty alternative.
    pub is_empty: bool,
}

impl Reduce {
    /// The number of states popped by this reduction.
    pub fn pops(&self) -> usize {
        if self.is_empty {
            0
        } else {
            self.len
        }
    }
}

/// The action that the LR automaton in a state performs on a particular
/// lookahead symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Action {
    /// Read a lookahead symbol and transition to the specified state.
    Shift {
        target: StateID,
        production: ProductionRef,
    },

    /// Reduce to the specified production rule.
    Reduce(Reduce),

    Accept,
}

impl Action {
    /// Return whether both actions denote the same parser move.
    ///
    /// Two shifts agree when they lead to the same state, whatever
    /// production label they carry.
    pub fn is_same_move(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Shift { target: a, .. }, Self::Shift { target: b, .. }) => a == b,
            (Self::Reduce(a), Self::Reduce(b)) => a.production == b.production,
            (Self::Accept, Self::Accept) => true,
            _ => false,
        }
    }

    pub fn is_reduce(&self) -> bool {
        matches!(self, Self::Reduce(..))
    }

    pub fn is_shift(&self) -> bool {
        matches!(self, Self::Shift { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift { target, .. } => write!(f, "shift({:?})", target),
            Self::Reduce(reduce) => {
                write!(f, "reduce({}, {} pops)", reduce.production, reduce.pops())
            }
            Self::Accept => f.write_str("accept"),
        }
    }
}

/// One row of the parse table.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct ParseTableRow {
    pub actions: BTreeMap<Symbol, Action>,
    pub gotos: BTreeMap<Symbol, StateID>,
}

/// The action/goto tables together with the start state.
pub struct ParseTable<V> {
    rows: Vec<ParseTableRow>,
    start: StateID,
    semantics: HashMap<ProductionRef, SemanticDefinition<V>>,
}

impl<V> Clone for ParseTable<V> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            start: self.start,
            semantics: self.semantics.clone(),
        }
    }
}

impl<V> fmt::Debug for ParseTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseTable")
            .field("rows", &self.rows)
            .field("start", &self.start)
            .field("semantics", &self.semantics)
            .finish()
    }
}

impl<V> ParseTable<V> {
    /// Assemble a table. `rows[i]` describes the state `StateID::from_raw(i)`.
    ///
    /// # Panics
    ///
    /// Panics if `start` does not name one of `rows`.
    pub fn from_parts(
        rows: Vec<ParseTableRow>,
        start: StateID,
        semantics: HashMap<ProductionRef, SemanticDefinition<V>>,
    ) -> Self {
        assert!(start.index() < rows.len(), "start state out of range");
        Self {
            rows,
            start,
            semantics,
        }
    }

    pub fn into_parts(
        self,
    ) -> (
        Vec<ParseTableRow>,
        StateID,
        HashMap<ProductionRef, SemanticDefinition<V>>,
    ) {
        (self.rows, self.start, self.semantics)
    }

    /// Return the initial state number.
    pub fn start(&self) -> StateID {
        self.start
    }

    /// Return the number of states.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateID, &ParseTableRow)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (StateID::from_raw(i as u32), row))
    }

    pub fn row(&self, state: StateID) -> Option<&ParseTableRow> {
        self.rows.get(state.index())
    }

    /// Return the action corresponding to the specified state number and
    /// lookahead terminal.
    pub fn action(&self, state: StateID, terminal: &Symbol) -> Option<&Action> {
        self.row(state)?.actions.get(terminal)
    }

    pub fn goto(&self, state: StateID, symbol: &Symbol) -> Option<StateID> {
        self.row(state)?.gotos.get(symbol).copied()
    }

    /// Return the terminals that have an action in the specified state.
    pub fn expected(&self, state: StateID) -> Vec<Symbol> {
        self.row(state)
            .map(|row| row.actions.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn semantic(&self, production: &ProductionRef) -> Option<&SemanticDefinition<V>> {
        self.semantics.get(production)
    }
}

impl<V> fmt::Display for ParseTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (id, row)) in self.states().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "#### State {:?}", id)?;
            if id == self.start {
                f.write_str(" (start)")?;
            }
            writeln!(f)?;
            writeln!(f, "## actions")?;
            for (terminal, action) in &row.actions {
                writeln!(f, "- {} => {}", terminal, action)?;
            }
            writeln!(f, "## gotos")?;
            for (symbol, goto) in &row.gotos {
                writeln!(f, "- {} => goto({:?})", symbol, goto)?;
            }
        }
        Ok(())
    }
}
