use std::time::Duration;

use crate::graph::{
	BudgetLimit, Composite, Leaf, Mapping, TraversalError, TraversalPolicy, Value, VisitCtx, Visitor, WalkResult, Walker, walk,
};

#[derive(Default)]
struct Recorder {
	events: Vec<String>,
}

impl Visitor for Recorder {
	fn enter_composite(&mut self, ctx: &VisitCtx<'_>, node: &Composite) -> WalkResult<()> {
		self.events.push(format!("enter {} {} @{}", node.kind(), ctx.path, ctx.depth));
		Ok(())
	}

	fn leaf(&mut self, ctx: &VisitCtx<'_>, leaf: Leaf<'_>) -> WalkResult<()> {
		let label = match leaf {
			Leaf::Scalar(value) => value.kind().as_str(),
			Leaf::CycleMarker { .. } => "marker",
		};
		self.events.push(format!("leaf {label} {} @{}", ctx.path, ctx.depth));
		Ok(())
	}

	fn exit_composite(&mut self, ctx: &VisitCtx<'_>) -> WalkResult<()> {
		self.events.push(format!("exit {}", ctx.path));
		Ok(())
	}
}

struct Silent;

impl Visitor for Silent {
	fn enter_composite(&mut self, _ctx: &VisitCtx<'_>, _node: &Composite) -> WalkResult<()> {
		Ok(())
	}

	fn leaf(&mut self, _ctx: &VisitCtx<'_>, _leaf: Leaf<'_>) -> WalkResult<()> {
		Ok(())
	}
}

fn mutual_cycle() -> (Mapping, Mapping) {
	let a = Mapping::new();
	let b = Mapping::new();
	a.insert("b", Value::Mapping(b.clone()));
	b.insert("a", Value::Mapping(a.clone()));
	(a, b)
}

fn chain(depth: usize) -> Value {
	let mut value = Value::sequence([]);
	for _ in 1..depth {
		value = Value::sequence([value]);
	}
	value
}

#[test]
fn scalar_root_is_a_single_leaf() {
	let mut recorder = Recorder::default();
	let stats = walk(&Value::from(3_i64), &TraversalPolicy::default(), &mut recorder).expect("walk");

	assert_eq!(recorder.events, ["leaf number  @1"]);
	assert_eq!(stats.steps, 1);
	assert_eq!(stats.deepest, 0);
}

#[test]
fn events_follow_input_order() {
	let root: Value = serde_json::from_str(r#"{"a":[1,"x"],"b":null}"#).expect("parse");
	let mut recorder = Recorder::default();
	let stats = walk(&root, &TraversalPolicy::default(), &mut recorder).expect("walk");

	assert_eq!(
		recorder.events,
		[
			"enter object  @1",
			"enter array a @2",
			"leaf number a.0 @3",
			"leaf string a.1 @3",
			"exit a",
			"leaf null b @2",
			"exit ",
		]
	);
	assert_eq!(stats.steps, 5);
	assert_eq!(stats.deepest, 2);
	assert_eq!(stats.open_ancestors, 0);
}

#[test]
fn mutual_cycle_fails_at_closing_edge() {
	let (a, b) = mutual_cycle();
	let mut recorder = Recorder::default();
	let err = walk(&Value::Mapping(a.clone()), &TraversalPolicy::default(), &mut recorder).expect_err("cycle");

	assert_eq!(err, TraversalError::CycleDetected { path: "b.a".to_owned() });
	a.clear();
	b.clear();
}

#[test]
fn mutual_cycle_truncates_with_marker() {
	let (a, b) = mutual_cycle();
	let mut recorder = Recorder::default();
	let stats = walk(&Value::Mapping(a.clone()), &TraversalPolicy::truncating(), &mut recorder).expect("walk");

	assert_eq!(recorder.events, ["enter object  @1", "enter object b @2", "leaf marker b.a @3", "exit b", "exit "]);
	assert_eq!(stats.truncated_cycles, 1);
	assert_eq!(stats.open_ancestors, 0);
	a.clear();
	b.clear();
}

#[test]
fn self_reference_at_depth_limit_reports_cycle_first() {
	let a = Mapping::new();
	a.insert("me", Value::Mapping(a.clone()));
	let policy = TraversalPolicy::default().with_max_depth(1);

	let err = walk(&Value::Mapping(a.clone()), &policy, &mut Recorder::default()).expect_err("cycle");
	assert!(matches!(err, TraversalError::CycleDetected { .. }));
	a.clear();
}

#[test]
fn diamond_is_not_a_cycle() {
	let shared = Value::mapping([("leaf", Value::from(1_i64))]);
	let root = Value::mapping([("left", shared.clone()), ("right", shared)]);

	let mut recorder = Recorder::default();
	let stats = walk(&root, &TraversalPolicy::default(), &mut recorder).expect("diamond walks");

	let leaves: Vec<&String> = recorder.events.iter().filter(|event| event.starts_with("leaf")).collect();
	assert_eq!(leaves, ["leaf number left.leaf @3", "leaf number right.leaf @3"]);
	assert_eq!(stats.truncated_cycles, 0);
}

#[test]
fn depth_limit_is_inclusive() {
	let root = chain(5);
	let exact = TraversalPolicy::default().with_max_depth(5);
	let stats = walk(&root, &exact, &mut Recorder::default()).expect("depth 5 allowed");
	assert_eq!(stats.deepest, 5);

	let tight = TraversalPolicy::default().with_max_depth(4);
	let err = walk(&root, &tight, &mut Recorder::default()).expect_err("depth 5 refused");
	assert_eq!(
		err,
		TraversalError::DepthExceeded {
			depth: 5,
			path: "0.0.0.0".to_owned(),
		}
	);
}

#[test]
fn scalars_below_the_depth_limit_are_fine() {
	let root = Value::sequence([Value::from(1_i64)]);
	let policy = TraversalPolicy::default().with_max_depth(1);
	walk(&root, &policy, &mut Recorder::default()).expect("scalar children are not depth-checked");
}

#[test]
fn deep_chain_walks_without_recursion() {
	let root = chain(100_000);
	let policy = TraversalPolicy::default().with_max_depth(100_000);
	let stats = walk(&root, &policy, &mut Silent).expect("deep chain");
	assert_eq!(stats.deepest, 100_000);
}

#[test]
fn step_budget_stops_the_walk() {
	let root = Value::sequence((0..10_i64).map(Value::from));
	let policy = TraversalPolicy::default().with_max_steps(Some(4));

	let err = walk(&root, &policy, &mut Recorder::default()).expect_err("budget");
	assert_eq!(
		err,
		TraversalError::BudgetExceeded {
			limit: BudgetLimit::Steps(4),
		}
	);
}

#[test]
fn time_budget_stops_a_slow_walk() {
	struct Sluggish;

	impl Visitor for Sluggish {
		fn enter_composite(&mut self, _ctx: &VisitCtx<'_>, _node: &Composite) -> WalkResult<()> {
			Ok(())
		}

		fn leaf(&mut self, _ctx: &VisitCtx<'_>, _leaf: Leaf<'_>) -> WalkResult<()> {
			std::thread::sleep(Duration::from_millis(5));
			Ok(())
		}
	}

	let root = Value::sequence((0..10_i64).map(Value::from));
	let policy = TraversalPolicy {
		max_millis: Some(1),
		max_steps: None,
		..TraversalPolicy::default()
	};

	let err = walk(&root, &policy, &mut Sluggish).expect_err("ten 5ms leaves exceed 1ms");
	assert_eq!(
		err,
		TraversalError::BudgetExceeded {
			limit: BudgetLimit::Millis(1),
		}
	);
}

#[test]
fn visitor_error_aborts_the_walk() {
	struct FailOnText;

	impl Visitor for FailOnText {
		fn enter_composite(&mut self, _ctx: &VisitCtx<'_>, _node: &Composite) -> WalkResult<()> {
			Ok(())
		}

		fn leaf(&mut self, ctx: &VisitCtx<'_>, leaf: Leaf<'_>) -> WalkResult<()> {
			match leaf {
				Leaf::Scalar(Value::Text(_)) => Err(TraversalError::UnsupportedValue { path: ctx.path.to_string() }),
				_ => Ok(()),
			}
		}
	}

	let root: Value = serde_json::from_str(r#"[1,{"k":"v"}]"#).expect("parse");
	let err = Walker::new(&TraversalPolicy::default()).walk(&root, &mut FailOnText).expect_err("text refused");
	assert_eq!(err, TraversalError::UnsupportedValue { path: "1.k".to_owned() });
}

#[test]
fn diamond_lattice_exhausts_step_budget() {
	let mut level = Value::from(0_i64);
	for _ in 0..40 {
		level = Value::sequence([level.clone(), level]);
	}
	let policy = TraversalPolicy::default().with_max_steps(Some(100_000));

	let err = walk(&level, &policy, &mut Silent).expect_err("2^40 paths");
	assert_eq!(
		err,
		TraversalError::BudgetExceeded {
			limit: BudgetLimit::Steps(100_000),
		}
	);
}
