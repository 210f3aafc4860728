//! Helpers for tests: event traces of the searches and consistency checks of
//! graph storages.

use std::{cell::RefCell, rc::Rc};

use thiserror::Error;

use crate::{
    core::{Edge, EdgeSet, ImplicitGraph, VertexSet, VertexType},
    event::{Event, Subscription},
    search::{
        BfsEvents, DfsEvents, EdgeDfsEvents, EdgeEdgeArgs, UndirectedBfsEvents, UndirectedDfsEvents,
        UndirectedEdgeArgs,
    },
};

/// Collects values derived from raised events, in the order of raising.
///
/// The log stays subscribed until it is dropped.
pub struct EventLog<T> {
    entries: Rc<RefCell<Vec<T>>>,
    subscriptions: Vec<Subscription>,
}

impl<T: 'static> EventLog<T> {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
            subscriptions: Vec::new(),
        }
    }

    /// Appends `map(args)` to the log whenever the event is raised.
    pub fn record<A, F>(&mut self, event: &Event<A>, map: F)
    where
        A: 'static,
        F: Fn(&A) -> T + 'static,
    {
        let entries = Rc::clone(&self.entries);
        self.subscriptions
            .push(event.subscribe(move |args| entries.borrow_mut().push(map(args))));
    }

    /// Returns the collected entries and clears the log.
    pub fn take(&self) -> Vec<T> {
        self.entries.take()
    }
}

impl<T: 'static> Default for EventLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A search event reduced to the vertices it refers to. Edges are written as
/// their `(source, target)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trace<V> {
    Init(V),
    Start(V),
    Discover(V),
    ExamineVertex(V),
    Examine(V, V),
    Tree(V, V),
    Back(V, V),
    ForwardOrCross(V, V),
    NonTree(V, V),
    GrayTarget(V, V),
    BlackTarget(V, V),
    Finish(V),
    InitEdge(V, V),
    StartEdge(V, V),
    DiscoverTree((V, V), (V, V)),
    FinishEdge(V, V),
}

fn pair<V: VertexType, E: Edge<V>>(edge: &E) -> (V, V) {
    (edge.source().clone(), edge.target().clone())
}

macro_rules! record {
    ($log:ident, $events:ident.$event:ident => vertex $trace:ident) => {
        $log.record(&$events.$event, |vertex: &V| Trace::$trace(vertex.clone()))
    };
    ($log:ident, $events:ident.$event:ident => edge $trace:ident) => {
        $log.record(&$events.$event, |edge: &E| {
            let (source, target) = pair(edge);
            Trace::$trace(source, target)
        })
    };
    ($log:ident, $events:ident.$event:ident => undirected $trace:ident) => {
        $log.record(&$events.$event, |args: &UndirectedEdgeArgs<V, E>| {
            Trace::$trace(args.source.clone(), args.target.clone())
        })
    };
}

pub fn trace_dfs<V, E>(events: &DfsEvents<V, E>) -> EventLog<Trace<V>>
where
    V: VertexType,
    E: Edge<V>,
{
    let mut log = EventLog::new();
    record!(log, events.initialize_vertex => vertex Init);
    record!(log, events.start_vertex => vertex Start);
    record!(log, events.discover_vertex => vertex Discover);
    record!(log, events.examine_edge => edge Examine);
    record!(log, events.tree_edge => edge Tree);
    record!(log, events.back_edge => edge Back);
    record!(log, events.forward_or_cross_edge => edge ForwardOrCross);
    record!(log, events.finish_vertex => vertex Finish);
    log
}

pub fn trace_bfs<V, E>(events: &BfsEvents<V, E>) -> EventLog<Trace<V>>
where
    V: VertexType,
    E: Edge<V>,
{
    let mut log = EventLog::new();
    record!(log, events.initialize_vertex => vertex Init);
    record!(log, events.start_vertex => vertex Start);
    record!(log, events.examine_vertex => vertex ExamineVertex);
    record!(log, events.discover_vertex => vertex Discover);
    record!(log, events.examine_edge => edge Examine);
    record!(log, events.tree_edge => edge Tree);
    record!(log, events.non_tree_edge => edge NonTree);
    record!(log, events.gray_target => edge GrayTarget);
    record!(log, events.black_target => edge BlackTarget);
    record!(log, events.finish_vertex => vertex Finish);
    log
}

/// Edges are written in the direction of traversal.
pub fn trace_undirected_dfs<V, E>(events: &UndirectedDfsEvents<V, E>) -> EventLog<Trace<V>>
where
    V: VertexType,
    E: Edge<V>,
{
    let mut log = EventLog::new();
    record!(log, events.initialize_vertex => vertex Init);
    record!(log, events.start_vertex => vertex Start);
    record!(log, events.discover_vertex => vertex Discover);
    record!(log, events.examine_edge => undirected Examine);
    record!(log, events.tree_edge => undirected Tree);
    record!(log, events.back_edge => undirected Back);
    record!(log, events.forward_or_cross_edge => undirected ForwardOrCross);
    record!(log, events.finish_vertex => vertex Finish);
    log
}

/// Edges are written in the direction of traversal.
pub fn trace_undirected_bfs<V, E>(events: &UndirectedBfsEvents<V, E>) -> EventLog<Trace<V>>
where
    V: VertexType,
    E: Edge<V>,
{
    let mut log = EventLog::new();
    record!(log, events.initialize_vertex => vertex Init);
    record!(log, events.start_vertex => vertex Start);
    record!(log, events.examine_vertex => vertex ExamineVertex);
    record!(log, events.discover_vertex => vertex Discover);
    record!(log, events.examine_edge => undirected Examine);
    record!(log, events.tree_edge => undirected Tree);
    record!(log, events.non_tree_edge => undirected NonTree);
    record!(log, events.gray_target => undirected GrayTarget);
    record!(log, events.black_target => undirected BlackTarget);
    record!(log, events.finish_vertex => vertex Finish);
    log
}

pub fn trace_edge_dfs<V, E>(events: &EdgeDfsEvents<V, E>) -> EventLog<Trace<V>>
where
    V: VertexType,
    E: Edge<V>,
{
    let mut log = EventLog::new();
    record!(log, events.initialize_edge => edge InitEdge);
    record!(log, events.start_vertex => vertex Start);
    record!(log, events.start_edge => edge StartEdge);
    record!(log, events.tree_edge => edge Tree);
    record!(log, events.examine_edge => edge Examine);
    record!(log, events.back_edge => edge Back);
    record!(log, events.forward_or_cross_edge => edge ForwardOrCross);
    record!(log, events.finish_edge => edge FinishEdge);
    log.record(&events.discover_tree_edge, |args: &EdgeEdgeArgs<E>| {
        Trace::DiscoverTree(pair(&args.source_edge), pair(&args.edge))
    });
    log
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsistencyCheckError {
    #[error("vertices iterator count ({0}) is not equal to vertex count ({1})")]
    VerticesVertexCountMismatch(usize, usize),
    #[error("edges iterator count ({0}) is not equal to edge count ({1})")]
    EdgesEdgeCountMismatch(usize, usize),
    #[error("edge {0} has an endpoint outside of the vertex set")]
    DanglingEdge(String),
    #[error("edge {0} is not among the out-edges of its source")]
    EdgeNotOutEdge(String),
    #[error("sum of out-degrees ({0}) is not equal to edge count ({1})")]
    HandshakingLemmaDirected(usize, usize),
}

/// Cross-checks the counts, the edge enumeration and the out-edge lists of a
/// directed storage.
pub fn check_consistency<G>(graph: &G) -> Result<(), ConsistencyCheckError>
where
    G: VertexSet + EdgeSet + ImplicitGraph,
{
    let vertex_count = graph.vertex_count();
    let vertices = graph.vertices().count();
    if vertices != vertex_count {
        return Err(ConsistencyCheckError::VerticesVertexCountMismatch(
            vertices,
            vertex_count,
        ));
    }

    let edge_count = graph.edge_count();
    let edges = graph.edges().count();
    if edges != edge_count {
        return Err(ConsistencyCheckError::EdgesEdgeCountMismatch(
            edges, edge_count,
        ));
    }

    for edge in graph.edges() {
        if !graph.contains_vertex(edge.source()) || !graph.contains_vertex(edge.target()) {
            return Err(ConsistencyCheckError::DanglingEdge(format!("{:?}", *edge)));
        }

        let found = graph
            .try_out_edges(edge.source())
            .map(|mut out_edges| out_edges.any(|e| *e == *edge))
            .unwrap_or(false);
        if !found {
            return Err(ConsistencyCheckError::EdgeNotOutEdge(format!("{:?}", *edge)));
        }
    }

    let deg_sum = graph
        .vertices()
        .filter_map(|vertex| graph.out_degree(vertex).ok())
        .sum::<usize>();
    if deg_sum != edge_count {
        return Err(ConsistencyCheckError::HandshakingLemmaDirected(
            deg_sum, edge_count,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{algo::RootedAlgorithm, core::SEdge, search::Dfs, storage::AdjacencyGraph};

    use super::*;

    #[test]
    fn log_detaches_on_drop() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1)], true);
        let mut dfs = Dfs::new(&graph);

        let log = trace_dfs(dfs.events());
        assert!(dfs.events().discover_vertex.has_handlers());

        dfs.compute_from(0).unwrap();
        assert_eq!(log.take().len(), 9);
        assert!(log.take().is_empty());

        drop(log);
        assert!(!dfs.events().discover_vertex.has_handlers());
    }

    #[test]
    fn consistent_adjacency_graph() {
        let mut graph = AdjacencyGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(1, 1), SEdge::new(1, 2)],
            true,
        );
        graph.remove_vertex(&2);

        assert_eq!(check_consistency(&graph), Ok(()));
    }
}
