//! The node arena: nodes, edges, and the structural validation that happens
//! once a graph is fully built.
//!
//! The graph is inherently cyclic (a node's parents point back at nodes whose
//! children point forward at it), so rather than juggling back-references we
//! store everything in a [`petgraph`] arena and address nodes by
//! [`NodeId`], exactly as the source crate's own `PetGraph` type alias does.
//! `parents`/`children` are cached alongside each node in true insertion
//! order (sorted by `EdgeIndex`, since `StableGraph`'s own edge iteration
//! order is unspecified) because that order is semantically load-bearing for
//! junction slot assignment and fork dispatch.

use crate::error::{LoadError, Position};
use crate::node_type::NodeType;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// The index type used to identify a node within a [`Graph`]'s arena.
pub type NodeId = petgraph::stable_graph::NodeIndex<u32>;

/// One vertex of a graph.
#[derive(Debug)]
pub struct Node {
    pub ty: NodeType,
    pub name: Option<String>,
    pub pos: Position,
    /// Nodes with an edge into this node, in the order those edges were
    /// added. Order is significant: it determines junction slot position.
    pub parents: Vec<NodeId>,
    /// Nodes this node has an edge into, in the order those edges were
    /// added. Order is significant: it determines fork dispatch order
    /// (`children[0]` is where this executor continues; the rest fork).
    pub children: Vec<NodeId>,
}

/// A directed graph of [`Node`]s, plus the input/parameter metadata the
/// scheduler needs to seed execution.
pub struct Graph {
    pub name: String,
    arena: StableDiGraph<Node, (), u32>,
    pub nparameters: usize,
    pub nargs: usize,
    /// Parameters first, then runtime arguments: length `nparameters + nargs`.
    pub input_nodes: Vec<NodeId>,
    /// Nodes with no parents that are *not* input nodes.
    pub parentless_nodes: Vec<NodeId>,
}

impl Graph {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id]
    }

    /// Iterate all node ids in the graph, in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arena.node_indices()
    }
}

/// Incrementally builds a [`Graph`], performing the same structural checks
/// the source's graph-construction step performs: junction arity, parameter
/// arity, and the presence of bound parameters on any type that requires
/// them.
///
/// The surface-syntax parser (out of scope here) is expected to drive this
/// builder; it is the thing that "delivers a validated set of graph
/// definitions" the rest of the engine assumes.
pub struct GraphBuilder {
    name: String,
    nparameters: usize,
    nargs: usize,
    arena: StableDiGraph<Node, (), u32>,
    input_nodes: Vec<NodeId>,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>, nparameters: usize, nargs: usize) -> Self {
        GraphBuilder {
            name: name.into(),
            nparameters,
            nargs,
            arena: StableDiGraph::default(),
            input_nodes: Vec::new(),
        }
    }

    /// Add a node to the graph, returning its id.
    pub fn add_node(&mut self, ty: NodeType, name: Option<String>, pos: Position) -> NodeId {
        self.arena.add_node(Node {
            ty,
            name,
            pos,
            parents: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Declare `id` as the next input node, in parameter-then-argument order.
    ///
    /// Must be called exactly `nparameters + nargs` times before [`build`](Self::build).
    pub fn push_input_node(&mut self, id: NodeId) {
        self.input_nodes.push(id);
    }

    /// Add a directed edge from `parent` to `child`.
    ///
    /// Edges must be added in the order the parser encountered them: this
    /// builder uses call order, not any later sort, to populate the ordered
    /// `parents`/`children` lists.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) {
        self.arena.add_edge(parent, child, ());
        self.arena[parent].children.push(child);
        self.arena[child].parents.push(parent);
    }

    /// Validate and finalize the graph.
    ///
    /// Returns every structural error found rather than stopping at the
    /// first, mirroring how a compiler reports as many diagnostics as it can
    /// in one pass.
    pub fn build(mut self) -> Result<Graph, Vec<LoadError>> {
        let mut errors = Vec::new();

        if self.input_nodes.len() != self.nparameters + self.nargs {
            // A parser-level invariant violation: the caller is responsible
            // for declaring exactly this many input nodes before building.
            panic!(
                "GraphBuilder::build called with {} input nodes, expected {}",
                self.input_nodes.len(),
                self.nparameters + self.nargs
            );
        }

        // Re-derive parent/child order from edge insertion index rather
        // than trusting StableGraph's (unspecified) adjacency iteration
        // order, which can differ from insertion order once edges are
        // removed and re-added.
        for id in self.arena.node_indices().collect::<Vec<_>>() {
            let mut incoming: Vec<_> = self
                .arena
                .edges_directed(id, Direction::Incoming)
                .map(|e| (e.id(), e.source()))
                .collect();
            incoming.sort_by_key(|(eid, _)| eid.index());
            self.arena[id].parents = incoming.into_iter().map(|(_, src)| src).collect();

            let mut outgoing: Vec<_> = self
                .arena
                .edges_directed(id, Direction::Outgoing)
                .map(|e| (e.id(), e.target()))
                .collect();
            outgoing.sort_by_key(|(eid, _)| eid.index());
            self.arena[id].children = outgoing.into_iter().map(|(_, dst)| dst).collect();
        }

        let input_set: std::collections::HashSet<NodeId> =
            self.input_nodes.iter().copied().collect();
        let parentless_nodes = self
            .arena
            .node_indices()
            .filter(|id| self.arena[*id].parents.is_empty() && !input_set.contains(id))
            .collect();

        for id in self.arena.node_indices() {
            let node = &self.arena[id];
            let name = node.name.clone().unwrap_or_else(|| format!("{id:?}"));

            if let Some(range) = node.ty.junction_range() {
                if !range.contains(node.parents.len()) {
                    errors.push(LoadError::JunctionArity {
                        pos: node.pos,
                        name: name.clone(),
                        got: node.parents.len(),
                        range,
                    });
                }
            }

            match &node.ty {
                crate::node_type::NodeType::Use(crate::node_type::UseSelector::Unresolved) => {
                    errors.push(LoadError::UnparameterizedUse { pos: node.pos });
                }
                _ => {
                    if !node.ty.is_legally_parameterized() {
                        if let Some(range) = node.ty.param_range() {
                            errors.push(LoadError::ParamArity {
                                pos: node.pos,
                                name,
                                got: 0,
                                range,
                            });
                        }
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Graph {
            name: self.name,
            arena: self.arena,
            nparameters: self.nparameters,
            nargs: self.nargs,
            input_nodes: self.input_nodes,
            parentless_nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_type::{ArithOp, UseSelector};

    fn pos() -> Position {
        Position::new(1, 1)
    }

    #[test]
    fn junction_below_min_fails_at_build() {
        let mut b = GraphBuilder::new("Bad", 0, 0);
        // A `+` node with zero in-edges: below its declared [1, inf) range.
        let plus = b.add_node(NodeType::Arith(ArithOp::Add, vec![]), None, pos());
        let _ = plus;
        let errs = b.build().unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0], LoadError::JunctionArity { .. }));
    }

    #[test]
    fn unparameterized_use_fails_at_build() {
        let mut b = GraphBuilder::new("Bad", 0, 1);
        let input = b.add_node(NodeType::Nop, None, pos());
        let use_node = b.add_node(NodeType::Use(UseSelector::Unresolved), None, pos());
        b.push_input_node(input);
        b.add_edge(input, use_node);
        let errs = b.build().unwrap_err();
        assert!(matches!(errs[0], LoadError::UnparameterizedUse { .. }));
    }

    #[test]
    fn parent_order_follows_edge_insertion() {
        let mut b = GraphBuilder::new("Order", 0, 0);
        let sum = b.add_node(NodeType::Arith(ArithOp::Add, vec![]), None, pos());
        let a = b.add_node(NodeType::Literal(crate::integer::Integer::from(3)), None, pos());
        let c = b.add_node(NodeType::Literal(crate::integer::Integer::from(5)), None, pos());
        b.add_edge(c, sum);
        b.add_edge(a, sum);
        let g = b.build().unwrap();
        assert_eq!(g.node(sum).parents, vec![c, a]);
    }
}
