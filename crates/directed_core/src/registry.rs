//! Maps graph names to their definitions, resolves sub-graph invocations,
//! and splices imported compilation units under a namespace.
//!
//! This is the "NodeType registry" of the design: built-in node types never
//! need a lookup (the builder constructs them directly as [`NodeType`]
//! values), so the only names this registry tracks are user-defined graphs.

use crate::error::{LoadError, Position};
use crate::graph::Graph;
use crate::integer::Integer;
use crate::node_type::{Arity, NodeType, SubGraph};
use std::collections::HashMap;

/// The index of a [`Graph`] within a [`Registry`]'s arena.
pub type GraphId = usize;

/// A mapping from name to graph definition for one linked program.
///
/// Analogous to a single compilation unit's symbol table after all of its
/// imports have been spliced in.
#[derive(Default)]
pub struct Registry {
    graphs: Vec<Graph>,
    names: HashMap<String, GraphId>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Fetch a graph by id. Panics if `id` is not a valid id previously
    /// returned from this registry, which would indicate an internal bug
    /// rather than a user-facing error.
    pub fn graph(&self, id: GraphId) -> &Graph {
        &self.graphs[id]
    }

    pub fn graph_id(&self, name: &str) -> Option<GraphId> {
        self.names.get(name).copied()
    }

    /// Register a newly built graph under its own name.
    pub fn register(&mut self, graph: Graph) -> Result<GraphId, LoadError> {
        if self.names.contains_key(&graph.name) {
            return Err(LoadError::RedeclaredType {
                pos: Position::default(),
                name: graph.name,
            });
        }
        let id = self.graphs.len();
        self.names.insert(graph.name.clone(), id);
        self.graphs.push(graph);
        Ok(id)
    }

    /// The id of the `Main` graph, if one was declared.
    ///
    /// Enforces the signature requirement: zero parameters, at most one
    /// argument.
    pub fn main(&self) -> Result<GraphId, LoadError> {
        let id = self.graph_id("Main").ok_or(LoadError::MissingMain)?;
        let main = self.graph(id);
        if main.nparameters != 0 || main.nargs > 1 {
            return Err(LoadError::MainSignature {
                pos: Position::default(),
            });
        }
        Ok(id)
    }

    /// Build the [`NodeType::Sub`] that invokes graph `name` with the given
    /// bound parameters, validating `name` exists and the parameter count
    /// matches exactly.
    pub fn resolve_sub_graph(
        &self,
        name: &str,
        params: Vec<Integer>,
        pos: Position,
    ) -> Result<NodeType, LoadError> {
        let id = self
            .graph_id(name)
            .ok_or_else(|| LoadError::UndefinedType {
                pos,
                name: name.to_owned(),
            })?;
        let graph = self.graph(id);
        let range = Arity::exactly(graph.nparameters);
        if !range.contains(params.len()) {
            return Err(LoadError::ParamArity {
                pos,
                name: name.to_owned(),
                got: params.len(),
                range,
            });
        }
        Ok(NodeType::Sub(SubGraph {
            graph_id: id,
            graph_nparameters: graph.nparameters,
            graph_nargs: graph.nargs,
            params,
        }))
    }

    /// Splice another unit's graphs in under `namespace`.
    ///
    /// Each imported graph `G` becomes visible as `<namespace>.<G.name>`,
    /// except `G.name == "Main"`, which becomes visible as `<namespace>`
    /// bare. Every `NodeType::Sub` inside the imported graphs is rewritten
    /// to point at its new [`GraphId`] in `self`.
    pub fn import(&mut self, namespace: &str, imported: Registry) -> Result<(), LoadError> {
        let offset = self.graphs.len();
        for mut graph in imported.graphs {
            remap_sub_graph_ids(&mut graph, |id| id + offset);
            let visible_name = if graph.name == "Main" {
                namespace.to_owned()
            } else {
                format!("{namespace}.{}", graph.name)
            };
            if self.names.contains_key(&visible_name) {
                return Err(LoadError::RedeclaredType {
                    pos: Position::default(),
                    name: visible_name,
                });
            }
            let id = self.graphs.len();
            self.names.insert(visible_name, id);
            self.graphs.push(graph);
        }
        Ok(())
    }
}

fn remap_sub_graph_ids(graph: &mut Graph, f: impl Fn(GraphId) -> GraphId) {
    for id in graph.node_ids().collect::<Vec<_>>() {
        graph.node_mut(id).ty.remap_sub_graph_id(&f);
    }
}

/// Tracks the chain of namespaces currently being loaded so an external
/// loader can detect a cyclic import before recursing into it.
///
/// This crate doesn't read files itself (that's the parser's job), so the
/// loader is expected to push each namespace onto this chain before loading
/// its source and pop it on return; [`check`](ImportChain::check) is the
/// fatal-error check the design calls for.
#[derive(Default)]
pub struct ImportChain(Vec<String>);

impl ImportChain {
    pub fn new() -> Self {
        ImportChain::default()
    }

    /// Returns an error if `namespace` is already on the chain (a cycle),
    /// otherwise pushes it.
    pub fn check(&mut self, namespace: &str) -> Result<(), LoadError> {
        if self.0.iter().any(|n| n == namespace) {
            return Err(LoadError::CyclicImport {
                namespace: namespace.to_owned(),
            });
        }
        self.0.push(namespace.to_owned());
        Ok(())
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }
}
