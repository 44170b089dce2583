use std::collections::HashSet;

use graphwalk::graph::{
	Composite, CyclePolicy, Leaf, NodeId, OperationMode, Outcome, TraversalError, TraversalPolicy, Value, VisitCtx, Visitor, WalkResult, deep_clone,
	run, unflatten, walk,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Child {
	Scalar(i64),
	Node(usize),
}

#[derive(Debug, Clone)]
struct NodePlan {
	mapping: bool,
	children: Vec<Child>,
}

fn arb_child() -> impl Strategy<Value = Child> {
	prop_oneof![any::<i64>().prop_map(Child::Scalar), (0_usize..16).prop_map(Child::Node)]
}

fn arb_graph(max_nodes: usize) -> impl Strategy<Value = Vec<NodePlan>> {
	let node = (any::<bool>(), prop::collection::vec(arb_child(), 1..4)).prop_map(|(mapping, children)| NodePlan { mapping, children });
	prop::collection::vec(node, 1..max_nodes)
}

/// Build every node first, then wire children, so any node may point at any
/// other. With `acyclic`, edges may only point at later nodes.
fn build(plans: &[NodePlan], acyclic: bool) -> Vec<Value> {
	let nodes: Vec<Value> = plans
		.iter()
		.map(|plan| if plan.mapping { Value::mapping::<&str>([]) } else { Value::sequence([]) })
		.collect();

	for (idx, (plan, node)) in plans.iter().zip(&nodes).enumerate() {
		for (pos, child) in plan.children.iter().enumerate() {
			let value = match child {
				Child::Node(target) if !acyclic || (idx < *target && *target < nodes.len()) => nodes[target % nodes.len()].clone(),
				Child::Node(target) => Value::from(*target as i64),
				Child::Scalar(n) => Value::from(*n),
			};
			match node {
				Value::Mapping(map) => {
					map.insert(format!("k{pos}"), value);
				}
				Value::Sequence(seq) => seq.push(value),
				_ => unreachable!("nodes are composites"),
			}
		}
	}

	nodes
}

fn release(nodes: &[Value]) {
	for node in nodes {
		match node {
			Value::Mapping(map) => map.clear(),
			Value::Sequence(seq) => seq.clear(),
			_ => {}
		}
	}
}

#[derive(Default)]
struct Identities(HashSet<NodeId>);

impl Visitor for Identities {
	fn enter_composite(&mut self, _ctx: &VisitCtx<'_>, node: &Composite) -> WalkResult<()> {
		self.0.insert(node.id());
		Ok(())
	}

	fn leaf(&mut self, _ctx: &VisitCtx<'_>, _leaf: Leaf<'_>) -> WalkResult<()> {
		Ok(())
	}
}

fn bounded(on_cycle: CyclePolicy) -> TraversalPolicy {
	TraversalPolicy {
		on_cycle,
		..TraversalPolicy::default().with_max_steps(Some(5_000))
	}
}

proptest! {
	#[test]
	fn every_mode_terminates_on_aliased_graphs(plans in arb_graph(10)) {
		let nodes = build(&plans, false);
		let root = nodes[0].clone();

		for on_cycle in [CyclePolicy::Fail, CyclePolicy::TruncateWithMarker] {
			let policy = bounded(on_cycle);
			for mode in OperationMode::ALL {
				match run(mode, &root, &policy) {
					Ok(_) => {}
					Err(TraversalError::BudgetExceeded { .. }) => {}
					Err(TraversalError::CycleDetected { .. }) => prop_assert_eq!(on_cycle, CyclePolicy::Fail),
					Err(TraversalError::TypeMismatch { .. }) => prop_assert_eq!(mode, OperationMode::Stats),
					Err(other) => prop_assert!(false, "unexpected error {other}"),
				}
			}
		}

		release(&nodes);
	}

	#[test]
	fn deep_clone_is_independent(plans in arb_graph(8)) {
		let nodes = build(&plans, true);
		let root = nodes[0].clone();
		let policy = TraversalPolicy::default();

		let copy = deep_clone(&root, &policy).expect("acyclic graph clones");
		prop_assert!(copy.structural_eq(&root));

		let mut original = Identities::default();
		walk(&root, &policy, &mut original).expect("walk original");
		let mut cloned = Identities::default();
		walk(&copy, &policy, &mut cloned).expect("walk copy");
		prop_assert!(original.0.is_disjoint(&cloned.0));
	}

	#[test]
	fn flatten_then_unflatten_restores_value(plans in arb_graph(8)) {
		let nodes = build(&plans, true);
		let root = nodes[0].clone();

		let Ok(Outcome::Flattened(flat)) = run(OperationMode::Flatten, &root, &TraversalPolicy::default()) else {
			panic!("acyclic graph flattens");
		};
		let rebuilt = unflatten(flat.as_mapping()).expect("unflatten");
		prop_assert!(rebuilt.structural_eq(&root));
	}
}
