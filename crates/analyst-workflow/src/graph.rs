//! Graph definition, validation, and streaming execution
//!
//! A workflow is declared as named nodes wired by directed edges, compiled
//! into a fixed execution order, and run as a pull-based stream that yields
//! one event per completed node.

use analyst_core::{Error, Result, Stage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Reserved terminal marker, usable as an edge target
///
/// An edge to [`END`] declares that the source node finishes the run. It is
/// accepted for parity with the declaration style of graph frameworks but
/// carries no scheduling weight: execution stops when every node has run.
pub const END: &str = "__end__";

struct GraphNode<S> {
    name: String,
    stage: Arc<dyn Stage<S>>,
}

/// Builder for a workflow graph
///
/// Register executors as named nodes, wire them with directed edges, pick an
/// entry point, then [`compile`](GraphBuilder::compile). All structural
/// validation happens at compile time; a malformed graph never executes a
/// single node.
///
/// # Example
///
/// ```ignore
/// let graph = GraphBuilder::new()
///     .add_node("fetch_financials", financials)
///     .add_node("fetch_db_news", news)
///     .add_node("generate_answer", synthesis)
///     .add_edge("fetch_financials", "fetch_db_news")
///     .add_edge("fetch_db_news", "generate_answer")
///     .add_edge("generate_answer", END)
///     .set_entry_point("fetch_financials")
///     .compile()?;
/// ```
pub struct GraphBuilder<S> {
    nodes: Vec<GraphNode<S>>,
    edges: Vec<(String, String)>,
    entry_point: Option<String>,
}

impl<S> Default for GraphBuilder<S> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            entry_point: None,
        }
    }
}

impl<S> GraphBuilder<S>
where
    S: Send + 'static,
{
    /// Create a new graph builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage executor as a named node
    ///
    /// Names must be unique; duplicates are rejected at compile time.
    pub fn add_node(mut self, name: impl Into<String>, stage: Arc<dyn Stage<S>>) -> Self {
        self.nodes.push(GraphNode {
            name: name.into(),
            stage,
        });
        self
    }

    /// Wire a directed edge between two registered nodes
    ///
    /// The target may be [`END`] to mark a terminal node.
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Declare the node the stream starts from
    ///
    /// The entry point must have no incoming edges.
    pub fn set_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = Some(name.into());
        self
    }

    /// Validate the graph and fix its execution order
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] on a duplicate node name, an edge
    /// referencing an unregistered node, a missing or unregistered entry
    /// point, an entry point with predecessors, or a cycle.
    pub fn compile(self) -> Result<CompiledGraph<S>> {
        let entry = self.entry_point.ok_or_else(|| {
            Error::Configuration("no entry point declared".to_string())
        })?;

        let mut index: HashMap<&str, usize> = HashMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(node.name.as_str(), i).is_some() {
                return Err(Error::Configuration(format!(
                    "duplicate node name '{}'",
                    node.name
                )));
            }
        }

        let entry_idx = *index.get(entry.as_str()).ok_or_else(|| {
            Error::Configuration(format!("entry point '{entry}' is not a registered node"))
        })?;

        // Adjacency and in-degrees; edges to END are declaration-only.
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        let mut in_degree: Vec<usize> = vec![0; self.nodes.len()];
        for (from, to) in &self.edges {
            let from_idx = *index.get(from.as_str()).ok_or_else(|| {
                Error::Configuration(format!("edge source '{from}' is not a registered node"))
            })?;
            if to == END {
                continue;
            }
            let to_idx = *index.get(to.as_str()).ok_or_else(|| {
                Error::Configuration(format!("edge target '{to}' is not a registered node"))
            })?;
            successors[from_idx].push(to_idx);
            in_degree[to_idx] += 1;
        }

        if in_degree[entry_idx] != 0 {
            return Err(Error::Configuration(format!(
                "entry point '{entry}' has incoming edges"
            )));
        }

        // Kahn's algorithm. The ready queue is seeded with the entry node
        // first, then remaining roots in registration order, so a simple
        // path executes exactly in declaration order and any acyclic graph
        // gets one deterministic topological order.
        let mut ready: Vec<usize> = vec![entry_idx];
        ready.extend(
            (0..self.nodes.len()).filter(|&i| i != entry_idx && in_degree[i] == 0),
        );
        let mut order: Vec<usize> = Vec::with_capacity(self.nodes.len());
        let mut cursor = 0;
        while cursor < ready.len() {
            let current = ready[cursor];
            cursor += 1;
            order.push(current);
            for &next in &successors[current] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(next);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let stuck: Vec<&str> = in_degree
                .iter()
                .enumerate()
                .filter(|&(_, d)| *d > 0)
                .map(|(i, _)| self.nodes[i].name.as_str())
                .collect();
            return Err(Error::Configuration(format!(
                "workflow graph contains a cycle through: {}",
                stuck.join(", ")
            )));
        }

        // Reorder nodes into execution order without cloning stages.
        let mut rank = vec![0usize; self.nodes.len()];
        for (pos, &i) in order.iter().enumerate() {
            rank[i] = pos;
        }
        let mut indexed: Vec<(usize, GraphNode<S>)> = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(i, node)| (rank[i], node))
            .collect();
        indexed.sort_by_key(|&(r, _)| r);
        let ordered: Vec<GraphNode<S>> = indexed.into_iter().map(|(_, node)| node).collect();

        debug!(
            nodes = %ordered.iter().map(|n| n.name.as_str()).collect::<Vec<_>>().join(" -> "),
            "workflow graph compiled"
        );

        Ok(CompiledGraph {
            order: Arc::new(ordered),
        })
    }
}

/// A validated workflow with a fixed execution order
///
/// The compiled graph is immutable and holds no per-run state, so the same
/// instance may be streamed concurrently by independent callers.
pub struct CompiledGraph<S> {
    order: Arc<Vec<GraphNode<S>>>,
}

impl<S> Clone for CompiledGraph<S> {
    fn clone(&self) -> Self {
        Self {
            order: Arc::clone(&self.order),
        }
    }
}

impl<S> std::fmt::Debug for CompiledGraph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field(
                "order",
                &self.order.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<S> CompiledGraph<S>
where
    S: Clone + Send + 'static,
{
    /// Node names in execution order
    pub fn node_names(&self) -> Vec<&str> {
        self.order.iter().map(|n| n.name.as_str()).collect()
    }

    /// Start a lazy streaming run over the graph
    ///
    /// Nothing executes until the first [`GraphStream::next`] call; if the
    /// consumer stops pulling (or drops the stream), no further nodes run.
    pub fn stream(&self, initial: S) -> GraphStream<S> {
        GraphStream {
            order: Arc::clone(&self.order),
            cursor: 0,
            state: Some(initial),
        }
    }

    /// Drive a full run to completion and return the final state
    pub async fn run(&self, initial: S) -> Result<S> {
        let mut stream = self.stream(initial);
        let mut last = None;
        while let Some(event) = stream.next().await {
            let (_, state) = event?;
            last = Some(state);
        }
        last.ok_or_else(|| Error::Configuration("workflow graph has no nodes".to_string()))
    }
}

/// Pull-based execution of one workflow run
///
/// Each [`next`](GraphStream::next) call executes exactly one node with the
/// current state and yields `(node_name, state_snapshot)`. A stage error is
/// yielded once, unmodified, and fuses the stream; events yielded before the
/// failure remain valid.
pub struct GraphStream<S> {
    order: Arc<Vec<GraphNode<S>>>,
    cursor: usize,
    state: Option<S>,
}

impl<S> GraphStream<S>
where
    S: Clone + Send + 'static,
{
    /// Execute the next node, if any
    pub async fn next(&mut self) -> Option<Result<(String, S)>> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let state = self.state.take()?;
        let node = &self.order[self.cursor];
        debug!(node = %node.name, "executing workflow node");

        match node.stage.apply(state).await {
            Ok(updated) => {
                self.cursor += 1;
                let snapshot = updated.clone();
                self.state = Some(updated);
                Some(Ok((node.name.clone(), snapshot)))
            }
            Err(e) => {
                self.cursor = self.order.len();
                Some(Err(e))
            }
        }
    }

    /// True once every node has run or a failure fused the stream
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.order.len() || self.state.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stage that appends its name to the state and counts invocations
    struct TraceStage {
        name: String,
        calls: Arc<AtomicUsize>,
    }

    impl TraceStage {
        fn new(name: &str, calls: &Arc<AtomicUsize>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                calls: Arc::clone(calls),
            })
        }
    }

    #[async_trait]
    impl Stage<Vec<String>> for TraceStage {
        async fn apply(&self, mut state: Vec<String>) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            state.push(self.name.clone());
            Ok(state)
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct FailingStage;

    #[async_trait]
    impl Stage<Vec<String>> for FailingStage {
        async fn apply(&self, _state: Vec<String>) -> Result<Vec<String>> {
            Err(Error::StageFailed("boom".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn path_graph(calls: &Arc<AtomicUsize>) -> CompiledGraph<Vec<String>> {
        GraphBuilder::new()
            .add_node("a", TraceStage::new("a", calls))
            .add_node("b", TraceStage::new("b", calls))
            .add_node("c", TraceStage::new("c", calls))
            .add_edge("a", "b")
            .add_edge("b", "c")
            .add_edge("c", END)
            .set_entry_point("a")
            .compile()
            .unwrap()
    }

    #[tokio::test]
    async fn test_path_streams_in_declaration_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = path_graph(&calls);

        let mut stream = graph.stream(Vec::new());
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event.unwrap());
        }

        let names: Vec<&str> = events.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(events.last().unwrap().1, vec!["a", "b", "c"]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_diamond_visits_every_node_once_in_topological_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = GraphBuilder::new()
            .add_node("a", TraceStage::new("a", &calls))
            .add_node("b", TraceStage::new("b", &calls))
            .add_node("c", TraceStage::new("c", &calls))
            .add_node("d", TraceStage::new("d", &calls))
            .add_edge("a", "b")
            .add_edge("a", "c")
            .add_edge("b", "d")
            .add_edge("c", "d")
            .add_edge("d", END)
            .set_entry_point("a")
            .compile()
            .unwrap();

        let result = graph.run(Vec::new()).await.unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let pos = |name: &str| result.iter().position(|n| n == name).unwrap();
        assert_eq!(pos("a"), 0);
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
    }

    #[tokio::test]
    async fn test_cycle_fails_at_compile_and_nothing_executes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = GraphBuilder::new()
            .add_node("a", TraceStage::new("a", &calls))
            .add_node("b", TraceStage::new("b", &calls))
            .add_edge("a", "b")
            .add_edge("b", "a")
            .set_entry_point("a")
            .compile();

        // "b -> a" makes the entry a target, which is itself rejected.
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cycle_below_entry_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = GraphBuilder::new()
            .add_node("a", TraceStage::new("a", &calls))
            .add_node("b", TraceStage::new("b", &calls))
            .add_node("c", TraceStage::new("c", &calls))
            .add_edge("a", "b")
            .add_edge("b", "c")
            .add_edge("c", "b")
            .set_entry_point("a")
            .compile();

        match result {
            Err(Error::Configuration(msg)) => assert!(msg.contains("cycle")),
            other => panic!("expected configuration error, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_edge_to_unregistered_node_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = GraphBuilder::new()
            .add_node("a", TraceStage::new("a", &calls))
            .add_edge("a", "ghost")
            .set_entry_point("a")
            .compile();

        match result {
            Err(Error::Configuration(msg)) => assert!(msg.contains("ghost")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_entry_point_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = GraphBuilder::new()
            .add_node("a", TraceStage::new("a", &calls))
            .compile();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_duplicate_node_name_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = GraphBuilder::new()
            .add_node("a", TraceStage::new("a", &calls))
            .add_node("a", TraceStage::new("a", &calls))
            .set_entry_point("a")
            .compile();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_stage_error_propagates_and_fuses_the_stream() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = GraphBuilder::new()
            .add_node("a", TraceStage::new("a", &calls))
            .add_node("b", Arc::new(FailingStage))
            .add_node("c", TraceStage::new("c", &calls))
            .add_edge("a", "b")
            .add_edge("b", "c")
            .set_entry_point("a")
            .compile()
            .unwrap();

        let mut stream = graph.stream(Vec::new());
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.0, "a");

        let second = stream.next().await.unwrap();
        assert!(matches!(second, Err(Error::StageFailed(_))));

        assert!(stream.next().await.is_none());
        assert!(stream.is_finished());
        // "c" never ran.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropping_the_stream_runs_no_further_nodes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = path_graph(&calls);

        let mut stream = graph.stream(Vec::new());
        stream.next().await.unwrap().unwrap();
        drop(stream);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_compiled_graph_streams_concurrently() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = path_graph(&calls);

        let (left, right) = tokio::join!(graph.run(Vec::new()), graph.run(Vec::new()));
        assert_eq!(left.unwrap(), vec!["a", "b", "c"]);
        assert_eq!(right.unwrap(), vec!["a", "b", "c"]);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }
}
