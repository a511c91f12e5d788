//! Runtime implementation for `lrkit` parser generator.

pub mod definition;
pub mod driver;
pub mod symbol;

pub use crate::{
    definition::{
        Action, ParseTable, ParseTableRow, ProductionRef, Reduce, SemanticAction,
        SemanticDefinition, StateID,
    },
    driver::{Driver, ParseError, Step, Steps, Token},
    symbol::Symbol,
};
