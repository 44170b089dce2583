//! Cycle-safe, depth-bounded traversal of shared-reference value graphs.

/// Value graph model, traversal engine, operation modes, and payload intake.
pub mod graph;
