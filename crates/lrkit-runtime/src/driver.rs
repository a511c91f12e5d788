//! The shift-reduce driver.

use crate::{
    definition::{Action, ParseTable, Reduce, StateID},
    symbol::Symbol,
};
use std::fmt;

/// A token produced by the lexer: the terminal it belongs to and an optional
/// attribute value.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<V> {
    pub terminal: Symbol,
    pub value: Option<V>,
}

impl<V> Token<V> {
    pub fn new(terminal: impl Into<Symbol>, value: V) -> Self {
        Self {
            terminal: terminal.into(),
            value: Some(value),
        }
    }

    /// Create a token that carries no attribute value.
    pub fn bare(terminal: impl Into<Symbol>) -> Self {
        Self {
            terminal: terminal.into(),
            value: None,
        }
    }

    /// The end-of-input token every token stream must finish with.
    pub fn eof() -> Self {
        Self::bare(Symbol::EOF)
    }
}

/// The parser driven by a generated parse table.
#[derive(Debug, Clone)]
pub struct Driver<V> {
    table: ParseTable<V>,
}

impl<V> Driver<V>
where
    V: Clone,
{
    /// Create an instance of `Driver` using the specified parse table.
    pub fn new(table: ParseTable<V>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ParseTable<V> {
        &self.table
    }

    /// Run the parser over `tokens` and return the synthesized value of the
    /// start symbol.
    pub fn parse<I>(&self, tokens: I) -> Result<Option<V>, ParseError>
    where
        I: IntoIterator<Item = Token<V>>,
    {
        self.parse_by_step(tokens).finish()
    }

    /// Return a lazy iterator yielding one record per executed action.
    ///
    /// Tokens are pulled from `tokens` only when the current one has been
    /// shifted. The iterator stops after `Accept` or after the first error.
    pub fn parse_by_step<I>(&self, tokens: I) -> Steps<'_, V, I::IntoIter>
    where
        I: IntoIterator<Item = Token<V>>,
    {
        Steps {
            table: &self.table,
            tokens: tokens.into_iter(),
            lookahead: None,
            states: vec![self.table.start()],
            values: vec![],
            status: Status::Running,
        }
    }
}

/// A record of one action performed by the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// The lookahead terminal when the action was taken.
    pub terminal: Symbol,
    pub action: Action,
    /// The state stack after the action, bottom first.
    pub states: Vec<StateID>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Status {
    Running,
    Accepted,
    Failed,
}

/// The iterator returned from [`Driver::parse_by_step`].
pub struct Steps<'t, V, I> {
    table: &'t ParseTable<V>,
    tokens: I,
    lookahead: Option<Token<V>>,
    states: Vec<StateID>,
    values: Vec<Option<V>>,
    status: Status,
}

impl<V, I> fmt::Debug for Steps<'_, V, I>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Steps")
            .field("lookahead", &self.lookahead)
            .field("states", &self.states)
            .field("values", &self.values)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<V, I> Steps<'_, V, I>
where
    V: Clone,
    I: Iterator<Item = Token<V>>,
{
    /// Drive the parser to completion and return the accepted value.
    pub fn finish(mut self) -> Result<Option<V>, ParseError> {
        for step in self.by_ref() {
            step?;
        }
        if self.status != Status::Accepted {
            return Err(ParseError::UnexpectedEndOfTokens);
        }
        if self.values.len() != 1 {
            return Err(ParseError::UnbalancedValueStack {
                len: self.values.len(),
            });
        }
        Ok(self.values.pop().flatten())
    }

    /// The synthesized values currently on the stack, bottom first.
    pub fn values(&self) -> &[Option<V>] {
        &self.values[..]
    }

    fn advance(&mut self) -> Result<Step, ParseError> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.tokens.next().ok_or(ParseError::UnexpectedEndOfTokens)?);
        }
        let terminal = match &self.lookahead {
            Some(token) => token.terminal.clone(),
            None => return Err(ParseError::UnexpectedEndOfTokens),
        };

        let current = *self.states.last().ok_or(ParseError::EmptyStateStack)?;
        let action = match self.table.action(current, &terminal) {
            Some(action) => action.clone(),
            None => {
                return Err(ParseError::UnexpectedToken {
                    token: terminal,
                    expected: self.table.expected(current),
                })
            }
        };

        match &action {
            Action::Shift { target, .. } => {
                self.states.push(*target);
                if let Some(token) = self.lookahead.take() {
                    self.values.push(token.value);
                }
            }
            Action::Reduce(reduce) => self.reduce(reduce)?,
            Action::Accept => self.status = Status::Accepted,
        }

        tracing::trace!(
            lookahead = %terminal,
            action = %action,
            states = ?self.states,
            "step"
        );

        Ok(Step {
            terminal,
            action,
            states: self.states.clone(),
        })
    }

    fn reduce(&mut self, reduce: &Reduce) -> Result<(), ParseError> {
        let pops = reduce.pops();
        if pops >= self.states.len() {
            return Err(ParseError::EmptyStateStack);
        }
        self.states.truncate(self.states.len() - pops);

        let top = *self.states.last().ok_or(ParseError::EmptyStateStack)?;
        let nonterminal = &reduce.production.nonterminal;
        let next = self
            .table
            .goto(top, nonterminal)
            .ok_or_else(|| ParseError::MissingGoto {
                state: top,
                nonterminal: nonterminal.clone(),
            })?;
        self.states.push(next);

        let table = self.table;
        let semantic = table.semantic(&reduce.production);
        let (arity, consume) = match semantic {
            Some(def) => (def.arity, def.consume),
            None => (reduce.len, true),
        };
        if arity > self.values.len() {
            return Err(ParseError::ValueStackUnderflow {
                arity,
                len: self.values.len(),
            });
        }

        let offset = self.values.len() - arity;
        let args: Vec<V> = if consume {
            self.values.drain(offset..).flatten().collect()
        } else {
            self.values[offset..].iter().flatten().cloned().collect()
        };
        let value = match semantic {
            Some(def) => (def.action)(args),
            None => args.into_iter().next(),
        };
        self.values.push(value);

        Ok(())
    }
}

impl<V, I> Iterator for Steps<'_, V, I>
where
    V: Clone,
    I: Iterator<Item = Token<V>>,
{
    type Item = Result<Step, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.status != Status::Running {
            return None;
        }
        let step = self.advance();
        if step.is_err() {
            self.status = Status::Failed;
        }
        Some(step)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("unexpected token '{token}': expected one of {{ {} }}", join(.expected))]
    UnexpectedToken { token: Symbol, expected: Vec<Symbol> },

    #[error("the token stream ended before the input was accepted")]
    UnexpectedEndOfTokens,

    #[error("no goto entry for {nonterminal} in state {state:?}")]
    MissingGoto { state: StateID, nonterminal: Symbol },

    #[error("empty state stack")]
    EmptyStateStack,

    #[error("semantic action reads {arity} values but only {len} are on the stack")]
    ValueStackUnderflow { arity: usize, len: usize },

    #[error("{len} values left on the stack after accept")]
    UnbalancedValueStack { len: usize },
}

fn join(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ParseTableRow, ProductionRef, SemanticDefinition};
    use std::{collections::HashMap, rc::Rc};

    // Hand-written table for `$start -> S; S -> n S | n`, the sum of the
    // numbers is synthesized for S.
    fn sum_table() -> ParseTable<i64> {
        let s = |i| StateID::from_raw(i);
        let production = |alternative| ProductionRef {
            nonterminal: "S".into(),
            alternative,
        };
        let shift = |target| Action::Shift {
            target: s(target),
            production: production(0),
        };
        let reduce = |alternative, len| {
            Action::Reduce(Reduce {
                production: production(alternative),
                len,
                is_empty: false,
            })
        };

        let mut rows = vec![ParseTableRow::default(); 4];
        rows[0].actions.insert("n".into(), shift(2));
        rows[0].gotos.insert("S".into(), s(1));
        rows[1].actions.insert(Symbol::EOF, Action::Accept);
        rows[2].actions.insert("n".into(), shift(2));
        rows[2].actions.insert(Symbol::EOF, reduce(1, 1));
        rows[2].gotos.insert("S".into(), s(3));
        rows[3].actions.insert(Symbol::EOF, reduce(0, 2));

        let mut semantics = HashMap::new();
        semantics.insert(
            production(0),
            SemanticDefinition {
                arity: 2,
                consume: true,
                action: Rc::new(|args: Vec<i64>| Some(args.iter().sum::<i64>())),
            },
        );
        ParseTable::from_parts(rows, s(0), semantics)
    }

    #[test]
    fn sums_numbers() {
        let driver = Driver::new(sum_table());
        let tokens = vec![Token::new("n", 1), Token::new("n", 2), Token::new("n", 3), Token::eof()];
        assert_eq!(driver.parse(tokens), Ok(Some(6)));
    }

    #[test]
    fn reports_expected_terminals() {
        let driver = Driver::new(sum_table());
        let err = driver.parse(vec![Token::eof()]).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                token: Symbol::EOF,
                expected: vec!["n".into()],
            }
        );
        assert_eq!(
            err.to_string(),
            "unexpected token '$eof': expected one of { 'n' }"
        );
    }

    #[test]
    fn missing_eof_is_an_error() {
        let driver = Driver::new(sum_table());
        let err = driver.parse(vec![Token::new("n", 1)]).unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEndOfTokens);
    }

    #[test]
    fn steps_record_state_stack() {
        let driver = Driver::new(sum_table());
        let steps: Vec<_> = driver
            .parse_by_step(vec![Token::new("n", 4), Token::eof()])
            .collect::<Result<_, _>>()
            .unwrap();
        let actions: Vec<_> = steps.iter().map(|step| step.action.to_string()).collect();
        assert_eq!(actions, ["shift(S#002)", "reduce(S#1, 1 pops)", "accept"]);
        assert_eq!(
            steps[1].states,
            vec![StateID::from_raw(0), StateID::from_raw(1)]
        );
    }

    #[test]
    fn iteration_stops_after_error() {
        let driver = Driver::new(sum_table());
        let mut steps = driver.parse_by_step(vec![Token::eof(), Token::eof()]);
        assert!(matches!(steps.next(), Some(Err(ParseError::UnexpectedToken { .. }))));
        assert!(steps.next().is_none());
    }
}
