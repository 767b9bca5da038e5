//! The core graph-execution engine for Directed, an esoteric dataflow
//! language whose programs are directed graphs: each node a typed operator,
//! each edge carrying an arbitrary-precision integer accumulator from one
//! operator to the next.
//!
//! This crate owns the hard part — the executor lifecycle, junction
//! synchronization, fork semantics, and the built-in node-type algebra — and
//! nothing else. The surface-syntax parser that produces a [`Graph`], the
//! command-line driver, and the Graphviz visualizer are all out of scope:
//! callers are expected to hand this crate an already-validated [`Graph`]
//! (or a [`Registry`] of several, for programs that import other units) and
//! an `Integer` argument, and to do whatever they like with the
//! [`instance::RunOutcome`] and the bytes an `Out` node writes through an
//! [`debug::Observer`].

pub mod debug;
pub mod error;
pub mod executor;
pub mod graph;
pub mod instance;
pub mod integer;
pub mod junction;
pub mod node_type;
pub mod registry;

pub use debug::{NullObserver, Observer, TracingObserver};
pub use error::{LoadError, Position, RuntimeError};
pub use graph::{Graph, GraphBuilder, Node, NodeId};
pub use instance::{GraphInstance, RunOutcome};
pub use integer::{Integer, ParseIntegerError};
pub use node_type::{Arity, ArithOp, NodeType, Outcome, RelOp, SubGraph, UseSelector};
pub use registry::{GraphId, ImportChain, Registry};
