//! Workflow orchestration for the equity research pipeline
//!
//! This crate provides the directed-graph execution engine: stages are
//! registered as named nodes, wired with edges, validated and compiled once,
//! then run as a lazy stream that yields one `(node, state)` event per
//! completed node.

pub mod graph;

// Re-export for convenience
pub use graph::{CompiledGraph, END, GraphBuilder, GraphStream};
