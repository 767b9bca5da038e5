//! Error types produced while constructing or running a [`crate::graph::Graph`].
//!
//! The surface-syntax parser and CLI driver (out of scope for this crate) are
//! expected to turn [`Position`] plus a message into the
//! `filename:line:column: message` diagnostic format described by the
//! language. This crate only carries the position through.

use crate::node_type::{JunctionArity, ParamArity};
use std::fmt;
use thiserror::Error;

/// A position within a source file, for diagnostics.
///
/// Supplied by the parser when it builds a [`crate::graph::Graph`]; this
/// crate never constructs one itself beyond the placeholder used for
/// synthetic nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors raised while validating or constructing a [`crate::graph::Graph`].
///
/// These correspond to the "load-time diagnostic" error kinds in the
/// language's error handling design: every variant carries the [`Position`]
/// of the offending node so a driver can print the standard diagnostic line.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A junction node was given an in-edge count outside its declared range.
    #[error("{pos}: node {name:?} has {got} in-edges, expected {range}")]
    JunctionArity {
        pos: Position,
        name: String,
        got: usize,
        range: JunctionArity,
    },
    /// A parameterizable node was given a parameter count outside its
    /// declared range (including the zero-params-supplied case for a type
    /// whose minimum is greater than zero).
    #[error("{pos}: node {name:?} has {got} parameters, expected {range}")]
    ParamArity {
        pos: Position,
        name: String,
        got: usize,
        range: ParamArity,
    },
    /// Parameters were supplied to a type that isn't parameterizable.
    #[error("{pos}: node {name:?} is not parameterizable but was given parameters")]
    NotParameterizable { pos: Position, name: String },
    /// A `Use` node type was never parameterized with a selector index.
    #[error("{pos}: `Use` node has no selector index; it must be parameterized")]
    UnparameterizedUse { pos: Position },
    /// No type named `Main` exists in the compilation unit.
    #[error("no type named `Main` in this compilation unit")]
    MissingMain,
    /// `Main` was declared with parameters, or with more than one argument.
    #[error("{pos}: `Main` must take zero parameters and at most one argument")]
    MainSignature { pos: Position },
    /// A node refers to a type name that was never declared or imported.
    #[error("{pos}: undefined type {name:?}")]
    UndefinedType { pos: Position, name: String },
    /// The same type name was declared twice within one compilation unit.
    #[error("{pos}: type {name:?} redeclared")]
    RedeclaredType { pos: Position, name: String },
    /// An import chain revisited a unit it had already started loading.
    #[error("cyclic import involving {namespace:?}")]
    CyclicImport { namespace: String },
}

/// Errors raised while stepping a [`crate::instance::GraphInstance`].
///
/// Only one kind exists today: division and modulus are total over every
/// other input, so the sole fatal runtime error is a zero divisor.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{pos}: division by zero")]
    DivideByZero { pos: Position },
}
