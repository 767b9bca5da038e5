//! The scheduler: owns the live executor set for one run of a [`Graph`],
//! steps them in lockstep, and delivers the return value.
//!
//! This is the single-threaded cooperative loop described by the design: one
//! *step* advances every currently-alive executor exactly once, left to
//! right; forks created mid-step land in `pending_add` and are only visible
//! from the next step onward.

use crate::debug::Observer;
use crate::error::RuntimeError;
use crate::executor::Executor;
use crate::graph::{Graph, Node, NodeId};
use crate::integer::Integer;
use crate::junction::{Arrival, JunctionRegistry};
use crate::node_type::Outcome;
use crate::registry::Registry;

/// The overall result of running a [`GraphInstance`] to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Some executor executed a `Return` node.
    Returned(Integer),
    /// Every executor died without anyone returning.
    Died,
}

/// One live execution of a [`Graph`].
///
/// Borrows the graph and the registry for its whole lifetime rather than
/// owning them: many instances (nested sub-graph calls, repeated top-level
/// runs) can share the same immutable definitions.
pub struct GraphInstance<'g> {
    graph: &'g Graph,
    registry: &'g Registry,
    alive: Vec<Executor>,
    pending_add: Vec<Executor>,
    return_value: Option<Integer>,
    junctions: JunctionRegistry,
    next_executor_id: u64,
}

impl<'g> GraphInstance<'g> {
    /// Instantiate `graph` with `inputs` bound to its input nodes in order.
    ///
    /// Seeds one executor per input node (carrying the matching input
    /// value) and one per parentless non-input node (carrying zero); none of
    /// them have actually executed their node's type yet — that happens on
    /// the first [`step`](Self::step), via the same deferred-move mechanism
    /// a fork uses.
    pub fn new(graph: &'g Graph, registry: &'g Registry, inputs: Vec<Integer>) -> Self {
        assert_eq!(
            inputs.len(),
            graph.input_nodes.len(),
            "GraphInstance::new: graph {:?} declares {} input nodes but got {} inputs",
            graph.name,
            graph.input_nodes.len(),
            inputs.len()
        );

        let mut instance = GraphInstance {
            graph,
            registry,
            alive: Vec::new(),
            pending_add: Vec::new(),
            return_value: None,
            junctions: JunctionRegistry::new(),
            next_executor_id: 0,
        };

        for (&node, value) in graph.input_nodes.iter().zip(inputs) {
            instance.seed(node, value);
        }
        for &node in &graph.parentless_nodes {
            instance.seed(node, Integer::zero());
        }

        instance
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_executor_id;
        self.next_executor_id += 1;
        id
    }

    fn seed(&mut self, node: NodeId, accumulator: Integer) {
        let id = self.fresh_id();
        self.alive
            .push(Executor::pending(id, node, 0, accumulator, node));
    }

    /// Run the scheduler loop to completion: step while any executor is
    /// alive and nobody has returned yet.
    pub fn run(&mut self, observer: &mut dyn Observer) -> Result<RunOutcome, RuntimeError> {
        while !self.alive.is_empty() && self.return_value.is_none() {
            self.step(observer)?;
        }
        Ok(match self.return_value.take() {
            Some(v) => RunOutcome::Returned(v),
            None => RunOutcome::Died,
        })
    }

    /// Advance every currently-alive executor once, left to right.
    fn step(&mut self, observer: &mut dyn Observer) -> Result<(), RuntimeError> {
        let n = self.alive.len();
        for i in 0..n {
            self.step_one(i, observer)?;
            if self.return_value.is_some() {
                // Abort the step immediately; executors not yet reached
                // this round are abandoned, along with any side effects
                // they would have produced.
                break;
            }
        }
        self.alive.retain(|e| !e.dead);
        self.alive.append(&mut self.pending_add);
        observer.on_step_boundary();
        Ok(())
    }

    fn step_one(&mut self, i: usize, observer: &mut dyn Observer) -> Result<(), RuntimeError> {
        if self.alive[i].dead {
            return Ok(());
        }

        if self.alive[i].is_parked() {
            // Draining happens synchronously the instant a junction slot
            // fills (see `move_to`), so a still-alive, still-waiting
            // executor's slot is, by construction, never full here. This
            // branch mirrors the spec's two-step "check waiting, else
            // arrive" protocol; it has nothing left to do.
            return Ok(());
        }

        if let Some(target) = self.alive[i].pending_move.take() {
            return self.move_to(i, target, observer);
        }

        let current = self.alive[i].current;
        let node = self.graph.node(current);

        if node.children.is_empty() {
            self.alive[i].dead = true;
            return Ok(());
        }

        let last_edge_index = self.alive[i].last_edge_index;
        let accumulator = self.alive[i].accumulator.clone();
        for &child in &node.children[1..] {
            let id = self.fresh_id();
            self.pending_add.push(Executor::pending(
                id,
                current,
                last_edge_index,
                accumulator.clone(),
                child,
            ));
        }

        let first_child = node.children[0];
        self.move_to(i, first_child, observer)
    }

    /// Move executor `i` onto `target`: record the arrival edge, then either
    /// park it at a junction, drain a junction slot it just filled, or
    /// execute the node type directly for an ordinary single in-edge.
    fn move_to(
        &mut self,
        i: usize,
        target: NodeId,
        observer: &mut dyn Observer,
    ) -> Result<(), RuntimeError> {
        let executor_id = self.alive[i].id;
        let from = self.alive[i].current;
        let target_node = self.graph.node(target);
        let edge_index = target_node
            .parents
            .iter()
            .position(|&p| p == from)
            .unwrap_or(0);

        self.alive[i].current = target;
        self.alive[i].last_edge_index = edge_index;

        let is_junction_arrival =
            target_node.ty.junction_range().is_some() && target_node.parents.len() > 1;

        if is_junction_arrival {
            let accumulator = self.alive[i].accumulator.clone();
            match self
                .junctions
                .arrive(target, target_node.parents.len(), edge_index, executor_id, accumulator)
            {
                Arrival::Parked => {
                    self.alive[i].waiting = Some(target);
                    self.emit_step(i, observer, target_node);
                    return Ok(());
                }
                Arrival::Filled { args, losers } => {
                    let outcome =
                        target_node
                            .ty
                            .execute(&args, self.registry, observer, target_node.pos)?;
                    self.dispatch(i, outcome);
                    for loser in losers {
                        if let Some(e) = self.alive.iter_mut().find(|e| e.id == loser) {
                            e.dead = true;
                        }
                    }
                }
            }
        } else {
            let accumulator = self.alive[i].accumulator.clone();
            let outcome = target_node.ty.execute(
                &[accumulator],
                self.registry,
                observer,
                target_node.pos,
            )?;
            self.dispatch(i, outcome);
        }

        self.emit_step(i, observer, target_node);
        Ok(())
    }

    fn dispatch(&mut self, i: usize, outcome: Outcome) {
        match outcome {
            Outcome::Value(v) => self.alive[i].accumulator = v,
            Outcome::Return(v) => self.return_value = Some(v),
            Outcome::Die => self.alive[i].dead = true,
            Outcome::DieAll => {
                for e in self.alive.iter_mut() {
                    e.dead = true;
                }
            }
        }
    }

    fn emit_step(&self, i: usize, observer: &mut dyn Observer, node: &Node) {
        let label = node
            .name
            .clone()
            .unwrap_or_else(|| format!("{:?}", self.alive[i].current));
        observer.on_executor_step(self.alive[i].id, &label, &self.alive[i].accumulator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::NullObserver;
    use crate::error::Position;
    use crate::graph::GraphBuilder;
    use crate::node_type::{ArithOp, NodeType, RelOp};

    fn pos() -> Position {
        Position::new(1, 1)
    }

    /// Scenario 1 from the design: `in -> Return`.
    #[test]
    fn echo_returns_its_input() {
        let mut b = GraphBuilder::new("Main", 0, 1);
        let input = b.add_node(NodeType::Nop, Some("in".into()), pos());
        let ret = b.add_node(NodeType::Return, None, pos());
        b.push_input_node(input);
        b.add_edge(input, ret);
        let graph = b.build().unwrap();
        let registry = Registry::new();

        let mut instance = GraphInstance::new(&graph, &registry, vec![Integer::from(42)]);
        let outcome = instance.run(&mut NullObserver).unwrap();
        assert_eq!(outcome, RunOutcome::Returned(Integer::from(42)));
    }

    /// Scenario 3: two literals feed a `=` junction; unequal values die, no
    /// return, overall outcome is `Died`.
    #[test]
    fn unequal_literals_into_eq_junction_die() {
        let mut b = GraphBuilder::new("Main", 0, 0);
        let three = b.add_node(NodeType::Literal(Integer::from(3)), None, pos());
        let five = b.add_node(NodeType::Literal(Integer::from(5)), None, pos());
        let eq = b.add_node(NodeType::Relation(RelOp::Eq, vec![]), None, pos());
        let ret = b.add_node(NodeType::Return, None, pos());
        b.add_edge(three, eq);
        b.add_edge(five, eq);
        b.add_edge(eq, ret);
        let graph = b.build().unwrap();
        let registry = Registry::new();

        let mut instance = GraphInstance::new(&graph, &registry, vec![]);
        let outcome = instance.run(&mut NullObserver).unwrap();
        assert_eq!(outcome, RunOutcome::Died);
    }

    /// Scenario 4: an input forks to two branches that merge at a `+`
    /// junction, doubling the input.
    #[test]
    fn fork_and_merge_doubles_the_input() {
        let mut b = GraphBuilder::new("Main", 0, 1);
        let input = b.add_node(NodeType::Nop, Some("x".into()), pos());
        let a = b.add_node(NodeType::Nop, Some("a".into()), pos());
        let c = b.add_node(NodeType::Nop, Some("b".into()), pos());
        let plus = b.add_node(NodeType::Arith(ArithOp::Add, vec![]), None, pos());
        let ret = b.add_node(NodeType::Return, None, pos());
        b.push_input_node(input);
        b.add_edge(input, a);
        b.add_edge(input, c);
        b.add_edge(a, plus);
        b.add_edge(c, plus);
        b.add_edge(plus, ret);
        let graph = b.build().unwrap();
        let registry = Registry::new();

        let mut instance = GraphInstance::new(&graph, &registry, vec![Integer::from(7)]);
        let outcome = instance.run(&mut NullObserver).unwrap();
        assert_eq!(outcome, RunOutcome::Returned(Integer::from(14)));
    }

    /// Scenario 5: one branch dies outright via `Die`, which kills every
    /// executor in the instance, even one mid-compute on another branch.
    #[test]
    fn die_node_propagates_to_every_executor() {
        let mut b = GraphBuilder::new("Main", 0, 0);
        let die = b.add_node(NodeType::Die, None, pos());
        let lit = b.add_node(NodeType::Literal(Integer::from(1)), None, pos());
        let nop = b.add_node(NodeType::Nop, None, pos());
        b.add_edge(lit, nop);
        let _ = die;
        let graph = b.build().unwrap();
        let registry = Registry::new();

        let mut instance = GraphInstance::new(&graph, &registry, vec![]);
        let outcome = instance.run(&mut NullObserver).unwrap();
        assert_eq!(outcome, RunOutcome::Died);
    }

    #[test]
    fn division_by_zero_is_a_fatal_runtime_error() {
        let mut b = GraphBuilder::new("Main", 0, 0);
        let zero = b.add_node(NodeType::Literal(Integer::zero()), None, pos());
        let one = b.add_node(NodeType::Literal(Integer::from(1)), None, pos());
        let div = b.add_node(NodeType::Arith(ArithOp::Div, vec![]), None, pos());
        b.add_edge(one, div);
        b.add_edge(zero, div);
        let graph = b.build().unwrap();
        let registry = Registry::new();

        let mut instance = GraphInstance::new(&graph, &registry, vec![]);
        let err = instance.run(&mut NullObserver).unwrap_err();
        assert!(matches!(err, RuntimeError::DivideByZero { .. }));
    }
}
