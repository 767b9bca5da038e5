//! Whole-program scenarios driven directly against `GraphBuilder`, standing
//! in for the surface-syntax parser this crate doesn't own. Each test name
//! corresponds to one of the end-to-end scenarios (or a boundary case) from
//! the language's testable-properties section.

use directed_core::debug::{NullObserver, Observer};
use directed_core::error::{LoadError, Position};
use directed_core::graph::GraphBuilder;
use directed_core::instance::{GraphInstance, RunOutcome};
use directed_core::integer::Integer;
use directed_core::node_type::{ArithOp, NodeType, UseSelector};
use directed_core::registry::Registry;

fn pos() -> Position {
    Position::new(1, 1)
}

/// Records every byte an `Out` node writes, standing in for stdout.
#[derive(Default)]
struct ByteSink(Vec<u8>);

impl Observer for ByteSink {
    fn on_output_byte(&mut self, byte: u8) {
        self.0.push(byte);
    }
}

/// Scenario 2: `in -> Out -> Return`. Input 65 writes `'A'` and returns 65.
#[test]
fn hello_byte() {
    let mut b = GraphBuilder::new("Main", 0, 1);
    let input = b.add_node(NodeType::Nop, Some("in".into()), pos());
    let out = b.add_node(NodeType::Out, None, pos());
    let ret = b.add_node(NodeType::Return, None, pos());
    b.push_input_node(input);
    b.add_edge(input, out);
    b.add_edge(out, ret);
    let graph = b.build().unwrap();
    let registry = Registry::new();

    let mut sink = ByteSink::default();
    let mut instance = GraphInstance::new(&graph, &registry, vec![Integer::from(65)]);
    let outcome = instance.run(&mut sink).unwrap();

    assert_eq!(outcome, RunOutcome::Returned(Integer::from(65)));
    assert_eq!(sink.0, vec![0x41]);
}

/// Scenario 6: a user graph `Pair a b { a -> Return; b -> Nop }` invoked with
/// two in-edges behaves as a 2-input junction returning `a`.
#[test]
fn sub_graph_as_junction_returns_first_argument() {
    let mut registry = Registry::new();

    let mut pair = GraphBuilder::new("Pair", 0, 2);
    let a = pair.add_node(NodeType::Nop, Some("a".into()), pos());
    let bp = pair.add_node(NodeType::Nop, Some("b".into()), pos());
    let ret = pair.add_node(NodeType::Return, None, pos());
    let nop = pair.add_node(NodeType::Nop, None, pos());
    pair.push_input_node(a);
    pair.push_input_node(bp);
    pair.add_edge(a, ret);
    pair.add_edge(bp, nop);
    let pair_graph = pair.build().unwrap();
    registry.register(pair_graph).unwrap();

    let pair_ty = registry.resolve_sub_graph("Pair", vec![], pos()).unwrap();
    assert!(pair_ty.junction_range().is_some());

    let mut main = GraphBuilder::new("Main", 0, 0);
    let lit_a = main.add_node(NodeType::Literal(Integer::from(3)), None, pos());
    let lit_b = main.add_node(NodeType::Literal(Integer::from(9)), None, pos());
    let call = main.add_node(pair_ty, None, pos());
    let ret = main.add_node(NodeType::Return, None, pos());
    main.add_edge(lit_a, call);
    main.add_edge(lit_b, call);
    main.add_edge(call, ret);
    let main_graph = main.build().unwrap();
    registry.register(main_graph).unwrap();

    let main_id = registry.main().unwrap();
    let mut instance = GraphInstance::new(registry.graph(main_id), &registry, vec![]);
    let outcome = instance.run(&mut NullObserver).unwrap();
    assert_eq!(outcome, RunOutcome::Returned(Integer::from(3)));
}

/// Boundary: a junction with `min = i + 1` (here `Use(2)`, requiring at
/// least 3 in-edges) fails at graph construction when given fewer.
#[test]
fn use_selector_below_its_minimum_fails_at_build() {
    let mut b = GraphBuilder::new("Bad", 0, 0);
    let zero = b.add_node(NodeType::Literal(Integer::from(0)), None, pos());
    let one = b.add_node(NodeType::Literal(Integer::from(1)), None, pos());
    let select = b.add_node(NodeType::Use(UseSelector::Index(2)), None, pos());
    b.add_edge(zero, select);
    b.add_edge(one, select);
    let errs = b.build().unwrap_err();
    assert!(matches!(errs[0], LoadError::JunctionArity { .. }));
}

/// A graph parameterized arithmetic node: `OperatorNodeType(+)` bound with
/// parameter `k` applied to input `x` yields `x + k`.
#[test]
fn parameterized_add_folds_params_after_args() {
    let mut b = GraphBuilder::new("Main", 0, 1);
    let input = b.add_node(NodeType::Nop, Some("x".into()), pos());
    let plus_k = b.add_node(NodeType::Arith(ArithOp::Add, vec![Integer::from(10)]), None, pos());
    let ret = b.add_node(NodeType::Return, None, pos());
    b.push_input_node(input);
    b.add_edge(input, plus_k);
    b.add_edge(plus_k, ret);
    let graph = b.build().unwrap();
    let registry = Registry::new();

    let mut instance = GraphInstance::new(&graph, &registry, vec![Integer::from(5)]);
    let outcome = instance.run(&mut NullObserver).unwrap();
    assert_eq!(outcome, RunOutcome::Returned(Integer::from(15)));
}

/// A graph importing another registry's `Main` sees it bare under the
/// namespace, and can invoke it as a sub-graph node.
#[test]
fn import_splices_bare_main_under_namespace() {
    let mut lib = Registry::new();
    let mut double = GraphBuilder::new("Main", 0, 1);
    let input = double.add_node(NodeType::Nop, Some("x".into()), pos());
    let a = double.add_node(NodeType::Nop, Some("a".into()), pos());
    let b = double.add_node(NodeType::Nop, Some("b".into()), pos());
    let twice = double.add_node(NodeType::Arith(ArithOp::Add, vec![]), None, pos());
    let ret = double.add_node(NodeType::Return, None, pos());
    double.push_input_node(input);
    double.add_edge(input, a);
    double.add_edge(input, b);
    double.add_edge(a, twice);
    double.add_edge(b, twice);
    double.add_edge(twice, ret);
    lib.register(double.build().unwrap()).unwrap();

    let mut root = Registry::new();
    root.import("math", lib).unwrap();

    let call_ty = root.resolve_sub_graph("math", vec![], pos()).unwrap();

    let mut main = GraphBuilder::new("Main", 0, 1);
    let input = main.add_node(NodeType::Nop, Some("n".into()), pos());
    let call = main.add_node(call_ty, None, pos());
    let ret = main.add_node(NodeType::Return, None, pos());
    main.push_input_node(input);
    main.add_edge(input, call);
    main.add_edge(call, ret);
    root.register(main.build().unwrap()).unwrap();

    let main_id = root.main().unwrap();
    let mut instance = GraphInstance::new(root.graph(main_id), &root, vec![Integer::from(21)]);
    let outcome = instance.run(&mut NullObserver).unwrap();
    assert_eq!(outcome, RunOutcome::Returned(Integer::from(42)));
}
