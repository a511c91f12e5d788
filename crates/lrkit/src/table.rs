//! Parse table construction.

use crate::{
    collection::{closure, kernel_collection, Collection},
    grammar::{Grammar, GrammarError},
    item::{ItemCore, LR0Item, LR1Item, LRItem},
    lalr::lalr_collection,
    sets::Analysis,
};
use lrkit_runtime::{Action, ParseTable, ParseTableRow, ProductionRef, Reduce, StateID, Symbol};
use std::collections::BTreeMap;

/// The item variant the automaton is built from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Method {
    /// LR(0) states; reductions are looked ahead with FOLLOW sets.
    LR0,
    /// Canonical LR(1).
    LR1,
    /// LR(0) states with LALR(1) lookaheads.
    LALR,
}

/// The configuration of parse table generation.
#[derive(Debug, Clone)]
pub struct Config {
    method: Method,
    handle_shift_reduce: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Create a new `Config` with the default settings: LALR(1), and
    /// shift/reduce conflicts resolved in favor of shifting.
    pub const fn new() -> Self {
        Self {
            method: Method::LALR,
            handle_shift_reduce: true,
        }
    }

    pub fn use_lr0(&mut self) -> &mut Self {
        self.method = Method::LR0;
        self
    }

    pub fn use_lr1(&mut self) -> &mut Self {
        self.method = Method::LR1;
        self
    }

    pub fn use_lalr(&mut self) -> &mut Self {
        self.method = Method::LALR;
        self
    }

    /// Specify whether shift/reduce conflicts are resolved by preferring
    /// the shift. When disabled they are reported as errors.
    pub fn handle_shift_reduce(&mut self, enabled: bool) -> &mut Self {
        self.handle_shift_reduce = enabled;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }
}

/// The seed item of the automaton, `[$start -> . S]` in one of the item
/// variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Seed {
    LR0,
    LR1,
    LALR,
}

impl From<Method> for Seed {
    fn from(method: Method) -> Self {
        match method {
            Method::LR0 => Self::LR0,
            Method::LR1 => Self::LR1,
            Method::LALR => Self::LALR,
        }
    }
}

/// Build the parse table of `grammar` as configured.
pub fn build<V>(grammar: &Grammar<V>, config: &Config) -> Result<ParseTable<V>, BuildError> {
    build_parsing_table(grammar, config.method.into(), config.handle_shift_reduce)
}

/// Build the parse table of `grammar`, starting the automaton from `seed`.
#[tracing::instrument(skip_all, fields(seed = ?seed))]
pub fn build_parsing_table<V>(
    grammar: &Grammar<V>,
    seed: Seed,
    handle_shift_reduce: bool,
) -> Result<ParseTable<V>, BuildError> {
    grammar.check()?;

    let cx = Analysis::new(grammar);
    let rows = match seed {
        Seed::LR0 => {
            let collection = kernel_collection(LR0Item(ItemCore::start()), &cx);
            populate(&cx, &collection, handle_shift_reduce)?
        }
        Seed::LR1 => {
            let collection = kernel_collection(LR1Item::new(ItemCore::start(), Symbol::EOF), &cx);
            populate(&cx, &collection, handle_shift_reduce)?
        }
        Seed::LALR => {
            let collection = lalr_collection(&cx);
            populate(&cx, &collection, handle_shift_reduce)?
        }
    };

    let semantics = grammar
        .semantics()
        .map(|(production, definition)| (production.clone(), definition.clone()))
        .collect();

    Ok(ParseTable::from_parts(
        rows,
        StateID::from_raw(0),
        semantics,
    ))
}

fn populate<I, V>(
    cx: &Analysis<'_, V>,
    collection: &Collection<I>,
    handle_shift_reduce: bool,
) -> Result<Vec<ParseTableRow>, ConflictError>
where
    I: LRItem,
{
    let grammar = cx.grammar();
    let mut rows = Vec::with_capacity(collection.len());

    for (id, kernel) in collection.kernels() {
        let mut row = ParseTableRow::default();

        for symbol in grammar.nonterminals() {
            if let Some(target) = collection.transition(id, symbol) {
                row.gotos.insert(symbol.clone(), target);
            }
        }

        let mut resolver = Resolver::new(grammar, handle_shift_reduce);
        for item in closure(kernel.iter().cloned(), cx) {
            let core = item.core();
            if core.is_accepting() {
                resolver.register(Symbol::EOF, Action::Accept);
                continue;
            }
            match core.next_symbol(grammar) {
                Some(symbol) if grammar.is_terminal(symbol) => {
                    let target = collection
                        .transition(id, symbol)
                        .expect("shift target missing from the collection");
                    resolver.register(
                        symbol.clone(),
                        Action::Shift {
                            target,
                            production: core.production(),
                        },
                    );
                }
                Some(_) => {}
                None => {
                    let rhs = core.rhs(grammar);
                    let reduce = Reduce {
                        production: core.production(),
                        len: rhs.len(),
                        is_empty: rhs.is_empty(),
                    };
                    for terminal in item.followers(cx) {
                        resolver.register(terminal, Action::Reduce(reduce.clone()));
                    }
                }
            }
        }
        row.actions = resolver.resolve()?;

        rows.push(row);
    }

    tracing::debug!("built {} rows", rows.len());
    Ok(rows)
}

/// Collects every distinct action proposed for the cells of one row.
struct Resolver<'g, V> {
    grammar: &'g Grammar<V>,
    candidates: BTreeMap<Symbol, Vec<Action>>,
    handle_shift_reduce: bool,
}

impl<'g, V> Resolver<'g, V> {
    fn new(grammar: &'g Grammar<V>, handle_shift_reduce: bool) -> Self {
        Self {
            grammar,
            candidates: BTreeMap::new(),
            handle_shift_reduce,
        }
    }

    fn register(&mut self, terminal: Symbol, action: Action) {
        let candidates = self.candidates.entry(terminal).or_default();
        if !candidates.iter().any(|known| known.is_same_move(&action)) {
            candidates.push(action);
        }
    }

    /// Settle every cell. The outcome does not depend on the order in which
    /// the actions were registered.
    fn resolve(self) -> Result<BTreeMap<Symbol, Action>, ConflictError> {
        let Self {
            grammar,
            candidates,
            handle_shift_reduce,
        } = self;

        let mut actions = BTreeMap::new();
        for (terminal, mut candidates) in candidates {
            // reductions meet each other before a shift can take the cell.
            candidates.sort_by_key(|action| !action.is_reduce());
            let mut candidates = candidates.into_iter();
            let mut resolved = match candidates.next() {
                Some(action) => action,
                None => continue,
            };
            for incoming in candidates {
                resolved =
                    handle_conflict(grammar, &terminal, &resolved, &incoming, handle_shift_reduce)?;
            }
            actions.insert(terminal, resolved);
        }
        Ok(actions)
    }
}

/// Decide between two different actions registered for the same terminal.
fn handle_conflict<V>(
    grammar: &Grammar<V>,
    terminal: &Symbol,
    existing: &Action,
    incoming: &Action,
    handle_shift_reduce: bool,
) -> Result<Action, ConflictError> {
    let render = |production: &ProductionRef| grammar.display_production(production).to_string();
    let terminal = terminal.clone();

    match (existing, incoming) {
        (Action::Accept, other) | (other, Action::Accept) => Err(ConflictError::Accept {
            production: production_of(other).map(render).unwrap_or_default(),
            terminal,
        }),

        (Action::Reduce(first), Action::Reduce(second)) => Err(ConflictError::ReduceReduce {
            terminal,
            first: render(&first.production),
            second: render(&second.production),
        }),

        (Action::Shift { .. }, Action::Shift { .. }) => Err(ConflictError::ShiftShift { terminal }),

        (Action::Shift { production: s, .. }, Action::Reduce(r))
        | (Action::Reduce(r), Action::Shift { production: s, .. }) => {
            if !handle_shift_reduce {
                let (first, second) = if existing.is_shift() {
                    (render(s), render(&r.production))
                } else {
                    (render(&r.production), render(s))
                };
                return Err(ConflictError::ShiftReduce {
                    terminal,
                    first,
                    second,
                });
            }
            tracing::debug!(
                "shift/reduce conflict on '{}' resolved as shift over `{}`",
                terminal,
                render(&r.production)
            );
            Ok(if existing.is_shift() {
                existing.clone()
            } else {
                incoming.clone()
            })
        }

        _ => Err(ConflictError::ShiftShift { terminal }),
    }
}

fn production_of(action: &Action) -> Option<&ProductionRef> {
    match action {
        Action::Shift { production, .. } => Some(production),
        Action::Reduce(reduce) => Some(&reduce.production),
        _ => None,
    }
}

/// A conflict that remains in the parse table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConflictError {
    #[error("reduce/reduce conflict on '{terminal}': `{first}` vs `{second}`")]
    ReduceReduce {
        terminal: Symbol,
        first: String,
        second: String,
    },

    #[error("shift/reduce conflict on '{terminal}': `{first}` vs `{second}`")]
    ShiftReduce {
        terminal: Symbol,
        first: String,
        second: String,
    },

    #[error("conflicting shifts on '{terminal}'")]
    ShiftShift { terminal: Symbol },

    #[error("accept conflicts with `{production}` on '{terminal}'")]
    Accept { terminal: Symbol, production: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}
