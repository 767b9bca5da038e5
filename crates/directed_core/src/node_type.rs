//! The node-type algebra: the sum of operator kinds a [`crate::graph::Node`]
//! can carry, and the `execute` dispatch over that sum.
//!
//! This plays the role the source's `Node` trait + many concrete
//! implementations played, but as a single tagged enum: each variant carries
//! its own bound parameters rather than being a trait object, so
//! parameterization is just building a new enum value rather than invoking a
//! virtual factory method.

use crate::debug::Observer;
use crate::error::{Position, RuntimeError};
use crate::integer::Integer;
use crate::registry::{GraphId, Registry};
use std::fmt;

/// An inclusive-lower, optionally-unbounded arity range.
///
/// Used both for the number of in-edges a junction will accept and for the
/// number of parameters a parameterizable type will accept; the shape is
/// identical so one type serves both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn at_least(min: usize) -> Self {
        Arity { min, max: None }
    }

    pub const fn exactly(n: usize) -> Self {
        Arity { min: n, max: Some(n) }
    }

    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && self.max.is_none_or(|max| n <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {max}"),
            Some(max) => write!(f, "between {} and {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// A [`Arity`] used specifically for junction in-edge counts.
pub type JunctionArity = Arity;
/// A [`Arity`] used specifically for parameter counts.
pub type ParamArity = Arity;

/// The built-in fold operators (`+ - * / % & | ^`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
}

impl ArithOp {
    fn apply(self, acc: Integer, next: &Integer, pos: Position) -> Result<Integer, RuntimeError> {
        Ok(match self {
            ArithOp::Add => acc + next.clone(),
            ArithOp::Sub => acc - next.clone(),
            ArithOp::Mul => acc * next.clone(),
            ArithOp::Div => acc
                .checked_div(next)
                .ok_or(RuntimeError::DivideByZero { pos })?,
            ArithOp::Mod => acc
                .checked_rem(next)
                .ok_or(RuntimeError::DivideByZero { pos })?,
            ArithOp::And => acc & next.clone(),
            ArithOp::Or => acc | next.clone(),
            ArithOp::Xor => acc ^ next.clone(),
        })
    }
}

/// The built-in pairwise relational operators (`= != < <= > >=`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl RelOp {
    fn holds(self, a: &Integer, b: &Integer) -> bool {
        match self {
            RelOp::Eq => a == b,
            RelOp::Ne => a != b,
            RelOp::Lt => a < b,
            RelOp::Le => a <= b,
            RelOp::Gt => a > b,
            RelOp::Ge => a >= b,
        }
    }
}

/// The state of a `Use` node type: unresolved until parameterized with
/// exactly one selector index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UseSelector {
    /// The bare, unparameterized `Use` type. Illegal to place in a graph.
    Unresolved,
    /// `Use(i)`: selects `args[i]`.
    Index(usize),
}

/// The sum of all node-type kinds the engine knows how to execute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeType {
    /// `VALUE(args[0])`.
    Nop,
    /// `DIE_ALL`.
    Die,
    /// `RETURN(args[0])`.
    Return,
    /// Emits `args[0] mod 256` as a byte, then `VALUE(args[0])`.
    Out,
    /// A constant producer, ignoring its args.
    Literal(Integer),
    /// A left-fold arithmetic operator over `args ++ params`.
    Arith(ArithOp, Vec<Integer>),
    /// A pairwise relational filter over `args ++ params`.
    Relation(RelOp, Vec<Integer>),
    /// The positional selector node.
    Use(UseSelector),
    /// Invocation of a user-defined sub-graph.
    Sub(SubGraph),
}

/// The bound state of a `GraphNode(G)` node type.
///
/// `nparameters`/`nargs` are copied out of the target graph at resolution
/// time so that arity queries (`junction_range`, `param_range`) don't need to
/// round-trip through the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubGraph {
    pub graph_id: GraphId,
    pub graph_nparameters: usize,
    pub graph_nargs: usize,
    pub params: Vec<Integer>,
}

/// The tagged result of executing a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Produce this accumulator and continue.
    Value(Integer),
    /// End the enclosing [`crate::instance::GraphInstance`] with this value.
    Return(Integer),
    /// Remove this executor.
    Die,
    /// Remove every executor in the enclosing instance.
    DieAll,
}

impl NodeType {
    /// The in-edge arity this type requires if it is a junction, or `None` if
    /// it synchronizes nothing (a single in-edge, handled by plain `Move`).
    pub fn junction_range(&self) -> Option<JunctionArity> {
        match self {
            NodeType::Arith(..) | NodeType::Relation(..) => Some(Arity::at_least(1)),
            NodeType::Use(UseSelector::Index(i)) => Some(Arity::at_least(i + 1)),
            NodeType::Use(UseSelector::Unresolved) => Some(Arity::at_least(1)),
            NodeType::Sub(sub) if sub.graph_nargs > 1 => Some(Arity::exactly(sub.graph_nargs)),
            _ => None,
        }
    }

    /// The parameter-count arity this type declares if parameterizable.
    pub fn param_range(&self) -> Option<ParamArity> {
        match self {
            NodeType::Arith(..) | NodeType::Relation(..) => Some(Arity::at_least(0)),
            NodeType::Use(_) => Some(Arity::exactly(1)),
            NodeType::Sub(sub) => Some(Arity::exactly(sub.graph_nparameters)),
            _ => None,
        }
    }

    /// Whether this type, as currently constructed, satisfies its own
    /// declared parameter arity.
    ///
    /// `Use(Unresolved)` and a `Sub` whose bound parameter count doesn't
    /// match the target graph's `nparameters` both fail this check; a valid
    /// graph must never contain such a node.
    pub fn is_legally_parameterized(&self) -> bool {
        match self {
            NodeType::Use(UseSelector::Unresolved) => false,
            NodeType::Sub(sub) => Arity::exactly(sub.graph_nparameters).contains(sub.params.len()),
            _ => true,
        }
    }

    /// Rewrite a `Sub` node's target [`GraphId`] in place, used when
    /// splicing an imported registry's graphs into another's arena.
    pub(crate) fn remap_sub_graph_id(&mut self, f: impl Fn(GraphId) -> GraphId) {
        if let NodeType::Sub(sub) = self {
            sub.graph_id = f(sub.graph_id);
        }
    }

    /// Execute this node type against the given ordered arguments.
    ///
    /// `args` already has any bound parameters folded in by the caller
    /// according to each variant's rule (operators and relations prepend
    /// params to the runtime args; sub-graphs prepend params to their input
    /// list). `pos` is the source position of the node, used to diagnose a
    /// division by zero.
    pub fn execute(
        &self,
        args: &[Integer],
        registry: &Registry,
        observer: &mut dyn Observer,
        pos: Position,
    ) -> Result<Outcome, RuntimeError> {
        match self {
            NodeType::Nop => Ok(Outcome::Value(args[0].clone())),
            NodeType::Die => Ok(Outcome::DieAll),
            NodeType::Return => Ok(Outcome::Return(args[0].clone())),
            NodeType::Out => {
                let byte = mod_256(&args[0]);
                observer.on_output_byte(byte);
                Ok(Outcome::Value(args[0].clone()))
            }
            NodeType::Literal(v) => Ok(Outcome::Value(v.clone())),
            NodeType::Arith(op, params) => {
                let mut all = args.iter().chain(params.iter());
                let first = all
                    .next()
                    .expect("junction arity guarantees at least one value")
                    .clone();
                let mut acc = first;
                for next in all {
                    acc = op.apply(acc, next, pos)?;
                }
                Ok(Outcome::Value(acc))
            }
            NodeType::Relation(op, params) => {
                let all: Vec<&Integer> = args.iter().chain(params.iter()).collect();
                let first = all[0].clone();
                let holds = all.windows(2).all(|pair| op.holds(pair[0], pair[1]));
                if holds {
                    Ok(Outcome::Value(first))
                } else {
                    Ok(Outcome::Die)
                }
            }
            NodeType::Use(UseSelector::Index(i)) => Ok(Outcome::Value(args[*i].clone())),
            NodeType::Use(UseSelector::Unresolved) => {
                unreachable!("an unparameterized Use node cannot be placed in a valid graph")
            }
            NodeType::Sub(sub) => {
                let mut inputs = sub.params.clone();
                inputs.extend(args.iter().cloned());
                let graph = registry.graph(sub.graph_id);
                observer.on_enter_subgraph(&graph.name);
                let mut nested =
                    crate::instance::GraphInstance::new(graph, registry, inputs);
                let outcome = nested.run(observer)?;
                observer.on_leave_subgraph(&graph.name);
                Ok(match outcome {
                    crate::instance::RunOutcome::Returned(v) => Outcome::Value(v),
                    crate::instance::RunOutcome::Died => Outcome::Die,
                })
            }
        }
    }
}

/// `accumulator mod 256` interpreted as one byte, per the language's mandated
/// interpretation of `Out`'s low-byte truncation.
fn mod_256(v: &Integer) -> u8 {
    let m = v.clone() % Integer::from(256i64);
    let m = if let Some(n) = m.to_isize() {
        if n < 0 { n + 256 } else { n }
    } else {
        0
    };
    m as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mod_256_wraps_negative_values() {
        assert_eq!(mod_256(&Integer::from(-1)), 255);
        assert_eq!(mod_256(&Integer::from(65)), 65);
        assert_eq!(mod_256(&Integer::from(321)), 65);
    }

    #[test]
    fn arity_display_matches_shape() {
        assert_eq!(Arity::exactly(2).to_string(), "exactly 2");
        assert_eq!(Arity::at_least(1).to_string(), "at least 1");
    }
}
