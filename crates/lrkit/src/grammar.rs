//! Context-free grammars with attached semantic actions.

use crate::{
    types::{Map, Set},
    util::{display_fn, write_joined},
};
use lrkit_runtime::{ProductionRef, SemanticAction, SemanticDefinition, Symbol};
use std::{borrow::Cow, fmt, rc::Rc};

/// An element of the right-hand side passed to [`Grammar::add_rule`].
pub enum Element<V> {
    Symbol(Symbol),
    /// A semantic action. In the last position it becomes the action of the
    /// production itself; anywhere else it is replaced by a synthetic empty
    /// nonterminal that fires when the parser reaches that position.
    Action {
        hint: Cow<'static, str>,
        action: SemanticAction<V>,
    },
}

impl<V> fmt::Debug for Element<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(symbol) => f.debug_tuple("Symbol").field(symbol).finish(),
            Self::Action { hint, .. } => f
                .debug_struct("Action")
                .field("hint", hint)
                .finish_non_exhaustive(),
        }
    }
}

impl<V> From<Symbol> for Element<V> {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl<V> From<&Symbol> for Element<V> {
    fn from(symbol: &Symbol) -> Self {
        Self::Symbol(symbol.clone())
    }
}

impl<V> From<&'static str> for Element<V> {
    fn from(name: &'static str) -> Self {
        Self::Symbol(name.into())
    }
}

impl<V> From<String> for Element<V> {
    fn from(name: String) -> Self {
        Self::Symbol(name.into())
    }
}

/// Wrap a closure as a semantic action element.
pub fn action<V, F>(f: F) -> Element<V>
where
    F: Fn(Vec<V>) -> Option<V> + 'static,
{
    named_action("action", f)
}

/// Like [`action`], but `hint` becomes part of the synthetic nonterminal's
/// name when the action is placed in the middle of a production.
pub fn named_action<V, F>(hint: impl Into<Cow<'static, str>>, f: F) -> Element<V>
where
    F: Fn(Vec<V>) -> Option<V> + 'static,
{
    Element::Action {
        hint: hint.into(),
        action: Rc::new(f),
    }
}

/// A context-free grammar: terminals, productions and the semantic
/// definitions attached to them.
pub struct Grammar<V> {
    terminals: Set<Symbol>,
    productions: Map<Symbol, Vec<Vec<Symbol>>>,
    semantics: Map<ProductionRef, SemanticDefinition<V>>,
    action_count: usize,
}

impl<V> Default for Grammar<V> {
    fn default() -> Self {
        Self {
            terminals: Set::default(),
            productions: Map::default(),
            semantics: Map::default(),
            action_count: 0,
        }
    }
}

impl<V> Clone for Grammar<V> {
    fn clone(&self) -> Self {
        Self {
            terminals: self.terminals.clone(),
            productions: self.productions.clone(),
            semantics: self.semantics.clone(),
            action_count: self.action_count,
        }
    }
}

impl<V> fmt::Debug for Grammar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("terminals", &self.terminals)
            .field("productions", &self.productions)
            .field("semantics", &self.semantics)
            .finish()
    }
}

impl<V> Grammar<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grammar with `f` and verify it with [`Grammar::check`].
    pub fn define<F>(f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut Self) -> Result<(), GrammarError>,
    {
        let mut grammar = Self::new();
        f(&mut grammar)?;
        grammar.check()?;
        Ok(grammar)
    }

    pub fn add_terminal(&mut self, terminal: impl Into<Symbol>) -> Result<(), GrammarError> {
        let terminal = terminal.into();
        if terminal.is_reserved() {
            return Err(GrammarError::ReservedSymbol(terminal));
        }
        self.terminals.insert(terminal);
        Ok(())
    }

    /// Add the production `nonterminal -> elements...` as a new alternative.
    pub fn add_rule<I, E>(
        &mut self,
        nonterminal: impl Into<Symbol>,
        elements: I,
    ) -> Result<(), GrammarError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Element<V>>,
    {
        let lhs = nonterminal.into();
        if lhs.is_reserved() {
            return Err(GrammarError::ReservedSymbol(lhs));
        }

        let mut elements: Vec<Element<V>> = elements.into_iter().map(Into::into).collect();
        match elements.first() {
            None => return Err(GrammarError::EmptyRule(lhs)),
            Some(Element::Action { .. }) => return Err(GrammarError::LeadingAction(lhs)),
            Some(Element::Symbol(..)) => (),
        }
        for element in &elements {
            if let Element::Symbol(symbol) = element {
                if *symbol == Symbol::EMPTY {
                    return Err(GrammarError::EmptySymbolInRule(lhs));
                }
                if symbol.is_reserved() {
                    return Err(GrammarError::ReservedSymbol(symbol.clone()));
                }
            }
        }

        let trailing = if matches!(elements.last(), Some(Element::Action { .. })) {
            elements.pop()
        } else {
            None
        };

        let mut rhs = Vec::with_capacity(elements.len());
        for (position, element) in elements.into_iter().enumerate() {
            match element {
                Element::Symbol(symbol) => rhs.push(symbol),
                Element::Action { hint, action } => {
                    let synthetic = self.mid_action_symbol(&hint);
                    self.productions.insert(synthetic.clone(), vec![vec![]]);
                    self.semantics.insert(
                        ProductionRef {
                            nonterminal: synthetic.clone(),
                            alternative: 0,
                        },
                        SemanticDefinition {
                            arity: position,
                            consume: false,
                            action,
                        },
                    );
                    rhs.push(synthetic);
                }
            }
        }

        let arity = rhs.len();
        let production = self.push_alternative(lhs, rhs);
        if let Some(Element::Action { action, .. }) = trailing {
            self.semantics.insert(
                production,
                SemanticDefinition {
                    arity,
                    consume: true,
                    action,
                },
            );
        }
        Ok(())
    }

    /// Add the empty alternative `nonterminal -> ε`.
    pub fn add_empty_rule(&mut self, nonterminal: impl Into<Symbol>) -> Result<(), GrammarError> {
        let lhs = nonterminal.into();
        if lhs.is_reserved() {
            return Err(GrammarError::ReservedSymbol(lhs));
        }
        self.push_alternative(lhs, vec![]);
        Ok(())
    }

    /// Add the empty alternative `nonterminal -> ε` whose reduction runs `f`
    /// with no arguments.
    pub fn add_empty_rule_with<F>(
        &mut self,
        nonterminal: impl Into<Symbol>,
        f: F,
    ) -> Result<(), GrammarError>
    where
        F: Fn(Vec<V>) -> Option<V> + 'static,
    {
        let lhs = nonterminal.into();
        if lhs.is_reserved() {
            return Err(GrammarError::ReservedSymbol(lhs));
        }
        let production = self.push_alternative(lhs, vec![]);
        self.semantics.insert(
            production,
            SemanticDefinition {
                arity: 0,
                consume: true,
                action: Rc::new(f),
            },
        );
        Ok(())
    }

    /// Add the production `$start -> start`.
    pub fn augment(&mut self, start: impl Into<Symbol>) -> Result<(), GrammarError> {
        let start = start.into();
        if self.is_augmented() {
            return Err(GrammarError::AlreadyAugmented);
        }
        if start.is_reserved() {
            return Err(GrammarError::ReservedSymbol(start));
        }
        if self.productions.contains_key(&start) {
            return Err(GrammarError::StartSymbolHasRules(start));
        }
        self.push_alternative(Symbol::START, vec![start]);
        Ok(())
    }

    fn push_alternative(&mut self, lhs: Symbol, rhs: Vec<Symbol>) -> ProductionRef {
        let alternatives = self.productions.entry(lhs.clone()).or_default();
        alternatives.push(rhs);
        ProductionRef {
            nonterminal: lhs,
            alternative: alternatives.len() - 1,
        }
    }

    fn mid_action_symbol(&mut self, hint: &str) -> Symbol {
        self.action_count += 1;
        Symbol::new(format!("@{}:{}", self.action_count, hint))
    }

    /// Return whether `symbol` is a registered terminal, `$eof` or `$probe`.
    pub fn is_terminal(&self, symbol: &Symbol) -> bool {
        self.terminals.contains(symbol) || *symbol == Symbol::EOF || *symbol == Symbol::PROBE
    }

    /// Return whether `symbol` has at least one production. `$start` counts
    /// once the grammar is augmented.
    pub fn is_nonterminal(&self, symbol: &Symbol) -> bool {
        self.productions.contains_key(symbol)
    }

    pub fn is_augmented(&self) -> bool {
        self.productions.contains_key(&Symbol::START)
    }

    /// Return the user start symbol chosen by [`Grammar::augment`].
    pub fn start_symbol(&self) -> Result<&Symbol, GrammarError> {
        self.productions
            .get(&Symbol::START)
            .and_then(|alternatives| alternatives.first())
            .and_then(|rhs| rhs.first())
            .ok_or(GrammarError::NotAugmented)
    }

    pub fn is_start_symbol(&self, symbol: &Symbol) -> bool {
        self.start_symbol().map_or(false, |start| start == symbol)
    }

    pub fn semantic_definition(
        &self,
        nonterminal: &Symbol,
        alternative: usize,
    ) -> Option<&SemanticDefinition<V>> {
        self.semantics.get(&ProductionRef {
            nonterminal: nonterminal.clone(),
            alternative,
        })
    }

    pub(crate) fn semantics(
        &self,
    ) -> impl Iterator<Item = (&ProductionRef, &SemanticDefinition<V>)> + '_ {
        self.semantics.iter()
    }

    /// All nonterminals followed by all terminals, in insertion order.
    /// `$empty`, `$eof` and `$probe` are never included.
    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.productions.keys().chain(self.terminals.iter())
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.productions.keys()
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.terminals.iter()
    }

    pub fn productions(&self) -> impl Iterator<Item = (&Symbol, &[Vec<Symbol>])> + '_ {
        self.productions
            .iter()
            .map(|(lhs, alternatives)| (lhs, &alternatives[..]))
    }

    /// Return the alternatives of `nonterminal`, or an empty slice when it
    /// has none.
    pub fn alternatives(&self, nonterminal: &Symbol) -> &[Vec<Symbol>] {
        self.productions
            .get(nonterminal)
            .map_or(&[][..], |alternatives| &alternatives[..])
    }

    pub fn production(&self, production: &ProductionRef) -> Option<&[Symbol]> {
        self.productions
            .get(&production.nonterminal)?
            .get(production.alternative)
            .map(|rhs| &rhs[..])
    }

    /// Render a production in `nonterminal -> symbol symbol ...` form.
    pub fn display_production<'g>(
        &'g self,
        production: &'g ProductionRef,
    ) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let rhs = self.production(production).unwrap_or(&[]);
            write_production(f, &production.nonterminal, rhs)
        })
    }

    /// Verify that the grammar is augmented, that no terminal has
    /// productions, and that every symbol used on a right-hand side is
    /// either a terminal or a nonterminal.
    pub fn check(&self) -> Result<(), GrammarError> {
        self.start_symbol()?;
        if let Some(symbol) = self
            .productions
            .keys()
            .find(|symbol| self.terminals.contains(*symbol))
        {
            return Err(GrammarError::TerminalWithRules(symbol.clone()));
        }
        for (lhs, alternatives) in &self.productions {
            for rhs in alternatives {
                if let Some(symbol) = rhs
                    .iter()
                    .find(|s| !self.is_terminal(s) && !self.is_nonterminal(s))
                {
                    return Err(GrammarError::UndefinedSymbol {
                        symbol: symbol.clone(),
                        production: display_fn(|f| write_production(f, lhs, rhs)).to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn write_production(
    f: &mut fmt::Formatter<'_>,
    lhs: &Symbol,
    rhs: &[Symbol],
) -> fmt::Result {
    write!(f, "{} -> ", lhs)?;
    if rhs.is_empty() {
        f.write_str("ε")
    } else {
        write_joined(f, rhs, " ")
    }
}

impl<V> fmt::Display for Grammar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#### terminals: ")?;
        write_joined(f, &self.terminals, ", ")?;
        f.write_str("\n#### nonterminals: ")?;
        write_joined(f, self.productions.keys(), ", ")?;
        writeln!(f, "\n#### productions:")?;
        for (lhs, alternatives) in &self.productions {
            for rhs in alternatives {
                writeln!(f, "- {}", display_fn(|f| write_production(f, lhs, rhs)))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GrammarError {
    #[error("the grammar is already augmented")]
    AlreadyAugmented,

    #[error("cannot augment with `{}`: it already has productions", _0)]
    StartSymbolHasRules(Symbol),

    #[error("the grammar is not augmented")]
    NotAugmented,

    #[error("a production of `{}` mixes the empty symbol with other symbols", _0)]
    EmptySymbolInRule(Symbol),

    #[error("a production of `{}` has no symbols", _0)]
    EmptyRule(Symbol),

    #[error("a production of `{}` starts with a semantic action", _0)]
    LeadingAction(Symbol),

    #[error("`{}` is a reserved symbol", _0)]
    ReservedSymbol(Symbol),

    #[error("`{}` is registered as a terminal but has productions", _0)]
    TerminalWithRules(Symbol),

    #[error("`{}` in `{}` is neither a terminal nor a nonterminal", symbol, production)]
    UndefinedSymbol { symbol: Symbol, production: String },
}
