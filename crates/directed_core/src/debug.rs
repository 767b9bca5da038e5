//! The debug-mode observer hook (§6 of the design).
//!
//! An explicit trait object is threaded through the scheduler rather than
//! any process-wide mutable state, per the design notes: "treat as an
//! explicit observer passed through the `GraphInstance`".

use crate::integer::Integer;

/// Receives the events the debug-mode protocol defines: per-step executor
/// moves, step boundaries, and sub-graph entry/exit.
///
/// Implementations may filter to a subset of graph names, as the design
/// allows; [`NullObserver`] implements the filter-everything case used when
/// debug mode is off.
pub trait Observer {
    /// `executor <id> @ <node-label> : <accumulator>`, emitted each time an
    /// executor is advanced.
    fn on_executor_step(&mut self, _executor_id: u64, _node_label: &str, _accumulator: &Integer) {}

    /// `---`, emitted between steps.
    fn on_step_boundary(&mut self) {}

    /// `=== <graph-name> ===`, emitted on entering a sub-graph.
    fn on_enter_subgraph(&mut self, _graph_name: &str) {}

    /// Emitted on returning from a sub-graph. Not part of the literal debug
    /// grammar in the design, but useful for implementations that want to
    /// show nesting depth; default implementations may ignore it.
    fn on_leave_subgraph(&mut self, _graph_name: &str) {}

    /// A byte written by an `Out` node.
    fn on_output_byte(&mut self, _byte: u8) {}
}

/// The observer used when debug mode is off: discards every event.
#[derive(Default)]
pub struct NullObserver;

impl Observer for NullObserver {}

/// An observer that writes the debug-mode protocol to a [`tracing`] target,
/// filterable by graph name.
///
/// Downstream binaries that want the literal textual protocol described by
/// the design can install a `tracing` subscriber that prints `debug`-level
/// events from the `directed_core::debug` target verbatim.
pub struct TracingObserver {
    /// If non-empty, only these graph names are reported.
    pub graph_filter: Vec<String>,
    current_graph: Vec<String>,
}

impl TracingObserver {
    pub fn new(graph_filter: Vec<String>) -> Self {
        TracingObserver {
            graph_filter,
            current_graph: Vec::new(),
        }
    }

    fn visible(&self) -> bool {
        self.graph_filter.is_empty()
            || self
                .current_graph
                .last()
                .is_some_and(|g| self.graph_filter.iter().any(|f| f == g))
    }
}

impl Observer for TracingObserver {
    fn on_executor_step(&mut self, executor_id: u64, node_label: &str, accumulator: &Integer) {
        if self.visible() {
            tracing::debug!(
                target: "directed_core::debug",
                "executor {executor_id} @ {node_label} : {accumulator}"
            );
        }
    }

    fn on_step_boundary(&mut self) {
        if self.visible() {
            tracing::debug!(target: "directed_core::debug", "---");
        }
    }

    fn on_enter_subgraph(&mut self, graph_name: &str) {
        self.current_graph.push(graph_name.to_owned());
        if self.visible() {
            tracing::debug!(target: "directed_core::debug", "=== {graph_name} ===");
        }
    }

    fn on_leave_subgraph(&mut self, _graph_name: &str) {
        self.current_graph.pop();
    }

    fn on_output_byte(&mut self, byte: u8) {
        if self.visible() {
            tracing::trace!(target: "directed_core::debug", "out: {byte:#04x}");
        }
    }
}
