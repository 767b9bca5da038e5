//! Synchronizes executors arriving on different in-edges of a junction node.
//!
//! A junction node may have several concurrent in-flight [`Slot`]s: each
//! holds one executor per parent-edge position, first-fit by edge index, so
//! independent "tokens" can interleave at the same node without colliding.

use crate::graph::NodeId;
use crate::integer::Integer;
use std::collections::HashMap;

/// One in-flight synchronization at a junction node: a fixed-size vector of
/// reservations, one slot per parent-edge position.
#[derive(Debug)]
struct Slot {
    entries: Vec<Option<(u64, Integer)>>,
}

impl Slot {
    fn new(arity: usize) -> Self {
        Slot {
            entries: vec![None; arity],
        }
    }

    fn is_full(&self) -> bool {
        self.entries.iter().all(Option::is_some)
    }
}

/// The result of an executor arriving at a junction's in-edge.
pub enum Arrival {
    /// The node's slot isn't full yet; the arriving executor parks.
    Parked,
    /// The slot just filled. `args` is in parent-edge order, ready to pass
    /// to the node type's `execute`. `losers` are the ids of every other
    /// executor that had reserved a position in this slot; they must be
    /// marked dead by the caller (the arriving executor survives and
    /// carries the outcome).
    Filled { args: Vec<Integer>, losers: Vec<u64> },
}

/// Per-instance table of junction slots, keyed by node.
#[derive(Default)]
pub struct JunctionRegistry {
    slots: HashMap<NodeId, Vec<Slot>>,
}

impl JunctionRegistry {
    pub fn new() -> Self {
        JunctionRegistry::default()
    }

    /// Record an executor's arrival through parent-edge `edge_index` of
    /// `node`, whose declared in-edge count is `arity`.
    ///
    /// Scans the node's existing slots for the first one whose `edge_index`
    /// position is still empty; if none has room, opens a new slot. Draining
    /// happens here, synchronously, the instant a slot becomes full — there
    /// is no separate "resolve" pass.
    pub fn arrive(
        &mut self,
        node: NodeId,
        arity: usize,
        edge_index: usize,
        executor_id: u64,
        accumulator: Integer,
    ) -> Arrival {
        let slots = self.slots.entry(node).or_default();
        let idx = slots
            .iter()
            .position(|s| s.entries[edge_index].is_none())
            .unwrap_or_else(|| {
                slots.push(Slot::new(arity));
                slots.len() - 1
            });
        slots[idx].entries[edge_index] = Some((executor_id, accumulator));

        if !slots[idx].is_full() {
            return Arrival::Parked;
        }

        let slot = slots.remove(idx);
        let mut args = Vec::with_capacity(slot.entries.len());
        let mut losers = Vec::with_capacity(slot.entries.len().saturating_sub(1));
        for entry in slot.entries {
            let (id, value) = entry.expect("slot was checked full above");
            if id != executor_id {
                losers.push(id);
            }
            args.push(value);
        }
        Arrival::Filled { args, losers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::stable_graph::NodeIndex;

    fn node() -> NodeId {
        NodeIndex::new(0)
    }

    #[test]
    fn two_arrivals_on_distinct_edges_fill_the_slot() {
        let mut reg = JunctionRegistry::new();
        let n = node();
        let parked = reg.arrive(n, 2, 0, 1, Integer::from(3));
        assert!(matches!(parked, Arrival::Parked));
        let filled = reg.arrive(n, 2, 1, 2, Integer::from(5));
        match filled {
            Arrival::Filled { args, losers } => {
                assert_eq!(args, vec![Integer::from(3), Integer::from(5)]);
                assert_eq!(losers, vec![1]);
            }
            Arrival::Parked => panic!("expected the slot to fill"),
        }
    }

    #[test]
    fn same_edge_arrivals_open_separate_slots() {
        let mut reg = JunctionRegistry::new();
        let n = node();
        assert!(matches!(reg.arrive(n, 2, 0, 1, Integer::from(1)), Arrival::Parked));
        // A second arrival on the *same* edge must not overwrite the first;
        // it opens a new concurrent slot instead.
        assert!(matches!(reg.arrive(n, 2, 0, 2, Integer::from(2)), Arrival::Parked));
        assert!(matches!(
            reg.arrive(n, 2, 1, 3, Integer::from(3)),
            Arrival::Filled { .. }
        ));
    }
}
