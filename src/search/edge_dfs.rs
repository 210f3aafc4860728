//! Depth-first search that colors edges instead of vertices.
//!
//! A vertex may be passed through many times, once for every edge leading to
//! it, but every edge is entered at most once. The edges that can follow an
//! edge are the out-edges of its target.

use rustc_hash::FxHashMap;

use crate::{
    algo::base::{run, AlgorithmBase, CancelManager, RootedAlgorithm},
    core::{
        Color, ColorMap, Edge, Error, GraphBase, ImplicitGraph, OwnableRef,
        VertexAndEdgeListGraph, VertexType,
    },
    event::{event_set, Event},
    observer::EdgeTreeEvents,
};

use super::EdgeEdgeArgs;

event_set! {
    pub struct EdgeDfsEvents<V, E> {
        /// Raised for every edge of the graph before the search starts.
        initialize_edge: E,
        start_vertex: V,
        /// Raised for the first edge of every search tree.
        start_edge: E,
        /// `edge` is entered right after `source_edge`.
        discover_tree_edge: EdgeEdgeArgs<E>,
        /// Raised when an edge is entered and turns gray.
        tree_edge: E,
        examine_edge: E,
        back_edge: E,
        forward_or_cross_edge: E,
        finish_edge: E,
    }
}

struct Frame<E, I> {
    edge: E,
    edges: Option<I>,
    depth: usize,
}

/// The traversal shared by the edge-colored depth-first searches.
pub(crate) struct EdgeWalk<'a, V, E, M> {
    pub(crate) base: &'a AlgorithmBase<V>,
    pub(crate) colors: &'a mut M,
    pub(crate) events: &'a EdgeDfsEvents<V, E>,
    pub(crate) max_depth: usize,
}

impl<V, E, M> EdgeWalk<'_, V, E, M>
where
    V: VertexType,
    E: Edge<V>,
    M: ColorMap<E>,
{
    /// Enters the start edge and everything reachable from it.
    ///
    /// `expand` returns the out-edges of a vertex.
    pub(crate) fn visit<'g, I, F>(&mut self, start: E, mut expand: F) -> Result<(), Error>
    where
        I: Iterator<Item = OwnableRef<'g, E>>,
        F: FnMut(&V) -> Result<I, Error>,
    {
        self.base.throw_if_cancellation_requested()?;
        self.events.start_edge.raise(&start);
        self.enter(start.clone());

        let mut stack = vec![Frame {
            edge: start,
            edges: None,
            depth: 0,
        }];

        while let Some(mut frame) = stack.pop() {
            self.base.throw_if_cancellation_requested()?;

            if frame.depth > self.max_depth {
                self.finish(frame.edge);
                continue;
            }

            let mut edges = match frame.edges.take() {
                Some(edges) => edges,
                None => expand(frame.edge.target())?,
            };

            let mut next = None;

            for edge in edges.by_ref() {
                self.base.throw_if_cancellation_requested()?;
                self.events.examine_edge.raise(&edge);

                match self.colors.color_or_white(&edge) {
                    Color::White => {
                        let edge = edge.into_owned();
                        self.events.discover_tree_edge.raise(&EdgeEdgeArgs {
                            source_edge: frame.edge.clone(),
                            edge: edge.clone(),
                        });
                        next = Some(edge);
                        break;
                    }
                    Color::Gray => self.events.back_edge.raise(&edge),
                    Color::Black => self.events.forward_or_cross_edge.raise(&edge),
                }
            }

            match next {
                Some(edge) => {
                    let depth = frame.depth + 1;
                    frame.edges = Some(edges);
                    stack.push(frame);

                    self.enter(edge.clone());
                    stack.push(Frame {
                        edge,
                        edges: None,
                        depth,
                    });
                }
                None => self.finish(frame.edge),
            }
        }

        Ok(())
    }

    fn enter(&mut self, edge: E) {
        self.events.tree_edge.raise(&edge);
        self.colors.set_color(edge, Color::Gray);
    }

    fn finish(&mut self, edge: E) {
        self.events.finish_edge.raise(&edge);
        self.colors.set_color(edge, Color::Black);
    }
}

/// Edge-colored depth-first search over a directed graph.
///
/// With a root, the search starts with every white out-edge of the root.
/// Without a root, or with
/// [`with_process_all_components`](EdgeDfs::with_process_all_components),
/// every edge left white is a start edge, in the enumeration order of the
/// graph.
///
/// Edges are told apart by value, so parallel edges that compare equal are
/// entered as one.
pub struct EdgeDfs<'g, G, M = FxHashMap<<G as GraphBase>::Edge, Color>>
where
    G: GraphBase,
{
    graph: &'g G,
    base: AlgorithmBase<G::Vertex>,
    colors: M,
    events: EdgeDfsEvents<G::Vertex, G::Edge>,
    max_depth: usize,
    process_all_components: bool,
}

impl<'g, G> EdgeDfs<'g, G>
where
    G: VertexAndEdgeListGraph,
{
    pub fn new(graph: &'g G) -> Self {
        Self::with_color_map(graph, FxHashMap::default())
    }
}

impl<'g, G, M> EdgeDfs<'g, G, M>
where
    G: VertexAndEdgeListGraph,
    M: ColorMap<G::Edge>,
{
    pub fn with_color_map(graph: &'g G, colors: M) -> Self {
        Self {
            graph,
            base: AlgorithmBase::new(),
            colors,
            events: EdgeDfsEvents::default(),
            max_depth: usize::MAX,
            process_all_components: false,
        }
    }

    pub fn with_cancel_manager(mut self, cancel: CancelManager) -> Self {
        self.base.set_cancel_manager(cancel);
        self
    }

    /// Edges more than `max_depth` steps away from the start edge of their
    /// search tree are entered and finished, but not expanded.
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    pub fn with_process_all_components(self, process_all_components: bool) -> Self {
        Self {
            process_all_components,
            ..self
        }
    }

    pub fn events(&self) -> &EdgeDfsEvents<G::Vertex, G::Edge> {
        &self.events
    }

    pub fn colors(&self) -> &M {
        &self.colors
    }

    pub fn edge_color(&self, edge: &G::Edge) -> Option<Color> {
        self.colors.color(edge)
    }

    fn initialize(&mut self) {
        self.colors.reset();

        for edge in self.graph.edges() {
            self.colors.set_color(edge.clone().into_owned(), Color::White);
            self.events.initialize_edge.raise(&edge);
        }
    }

    fn traverse(&mut self, root: Option<G::Vertex>) -> Result<(), Error> {
        let graph = self.graph;

        if let Some(root) = root {
            self.base.throw_if_cancellation_requested()?;
            self.events.start_vertex.raise(&root);

            for edge in graph.out_edges(&root)? {
                if self.colors.color_or_white(&edge) == Color::White {
                    self.start(edge.into_owned())?;
                }
            }

            if !self.process_all_components {
                return Ok(());
            }
        }

        for edge in graph.edges() {
            if self.colors.color_or_white(&edge) == Color::White {
                self.start(edge.into_owned())?;
            }
        }

        Ok(())
    }

    fn start(&mut self, edge: G::Edge) -> Result<(), Error> {
        let graph = self.graph;
        let mut walk = EdgeWalk {
            base: &self.base,
            colors: &mut self.colors,
            events: &self.events,
            max_depth: self.max_depth,
        };

        walk.visit(edge, |vertex| graph.out_edges(vertex))
    }
}

impl<G, M> RootedAlgorithm for EdgeDfs<'_, G, M>
where
    G: VertexAndEdgeListGraph,
    M: ColorMap<G::Edge>,
{
    type Vertex = G::Vertex;

    fn base(&self) -> &AlgorithmBase<G::Vertex> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase<G::Vertex> {
        &mut self.base
    }

    fn compute(&mut self) -> Result<(), Error> {
        let root = self.base.root_vertex().cloned();

        if let Some(root) = &root {
            if !self.graph.contains_vertex(root) {
                return Err(Error::VertexNotFound);
            }
        }

        run(self, |dfs| {
            dfs.initialize();
            dfs.traverse(root)
        })
    }
}

impl<G, M> EdgeTreeEvents for EdgeDfs<'_, G, M>
where
    G: VertexAndEdgeListGraph,
    M: ColorMap<G::Edge>,
{
    type Edge = G::Edge;

    fn start_edge_event(&self) -> &Event<G::Edge> {
        &self.events.start_edge
    }

    fn tree_edge_event(&self) -> &Event<G::Edge> {
        &self.events.tree_edge
    }

    fn discover_tree_edge_event(&self) -> &Event<EdgeEdgeArgs<G::Edge>> {
        &self.events.discover_tree_edge
    }

    fn finish_edge_event(&self) -> &Event<G::Edge> {
        &self.events.finish_edge
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use crate::{
        algo::base::ComputationState,
        core::{EdgeSet, SEdge},
        infra::{
            proptest::graph_directed,
            testing::{trace_edge_dfs, Trace},
        },
        storage::AdjacencyGraph,
    };

    use super::*;

    #[test]
    fn diamond_events() {
        //     1
        //   ↙   ↘
        //  2     3
        //   ↘   ↙
        //     4
        let graph = AdjacencyGraph::from_edges(
            [
                SEdge::new(1, 2),
                SEdge::new(1, 3),
                SEdge::new(2, 4),
                SEdge::new(3, 4),
            ],
            true,
        );
        let mut dfs = EdgeDfs::new(&graph);
        let log = trace_edge_dfs(dfs.events());

        dfs.compute_from(1).unwrap();

        assert_eq!(
            log.take(),
            vec![
                Trace::InitEdge(1, 2),
                Trace::InitEdge(1, 3),
                Trace::InitEdge(2, 4),
                Trace::InitEdge(3, 4),
                Trace::Start(1),
                Trace::StartEdge(1, 2),
                Trace::Tree(1, 2),
                Trace::Examine(2, 4),
                Trace::DiscoverTree((1, 2), (2, 4)),
                Trace::Tree(2, 4),
                Trace::FinishEdge(2, 4),
                Trace::FinishEdge(1, 2),
                Trace::StartEdge(1, 3),
                Trace::Tree(1, 3),
                Trace::Examine(3, 4),
                Trace::DiscoverTree((1, 3), (3, 4)),
                Trace::Tree(3, 4),
                Trace::FinishEdge(3, 4),
                Trace::FinishEdge(1, 3),
            ]
        );
    }

    #[test]
    fn cycle_has_back_edge() {
        let graph = AdjacencyGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(1, 2), SEdge::new(2, 0)],
            true,
        );
        let mut dfs = EdgeDfs::new(&graph);
        let log = trace_edge_dfs(dfs.events());

        dfs.compute_from(0).unwrap();

        let back = log
            .take()
            .into_iter()
            .filter(|trace| matches!(trace, Trace::Back(..)))
            .collect::<Vec<_>>();
        assert_eq!(back, vec![Trace::Back(0, 1)]);
    }

    #[test]
    fn self_edge_is_back_edge() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 0)], true);
        let mut dfs = EdgeDfs::new(&graph);
        let log = trace_edge_dfs(dfs.events());

        dfs.compute().unwrap();

        let traces = log.take();
        assert!(traces.contains(&Trace::Back(0, 0)));
        assert_eq!(dfs.edge_color(&SEdge::new(0, 0)), Some(Color::Black));
    }

    #[test]
    fn root_limits_start_edges() {
        let graph = AdjacencyGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(2, 1), SEdge::new(1, 3)],
            true,
        );

        let mut dfs = EdgeDfs::new(&graph);
        dfs.compute_from(0).unwrap();
        assert_eq!(dfs.edge_color(&SEdge::new(1, 3)), Some(Color::Black));
        assert_eq!(dfs.edge_color(&SEdge::new(2, 1)), Some(Color::White));

        let mut dfs = EdgeDfs::new(&graph).with_process_all_components(true);
        dfs.compute_from(0).unwrap();
        assert_eq!(dfs.edge_color(&SEdge::new(2, 1)), Some(Color::Black));
    }

    #[test]
    fn max_depth() {
        let graph = AdjacencyGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(1, 2), SEdge::new(2, 3)],
            true,
        );
        let mut dfs = EdgeDfs::new(&graph).with_max_depth(0);

        dfs.compute_from(0).unwrap();

        assert_eq!(dfs.edge_color(&SEdge::new(0, 1)), Some(Color::Black));
        assert_eq!(dfs.edge_color(&SEdge::new(1, 2)), Some(Color::White));
    }

    #[test]
    fn absent_root() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1)], true);
        let mut dfs = EdgeDfs::new(&graph);

        assert_matches!(dfs.compute_from(9), Err(Error::VertexNotFound));
        assert_eq!(dfs.state(), ComputationState::NotRunning);
    }

    #[test]
    fn cancelled_before_start() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1)], true);
        let mut dfs = EdgeDfs::new(&graph);
        let log = trace_edge_dfs(dfs.events());

        dfs.cancel_manager().cancel();

        assert_matches!(dfs.compute(), Err(Error::Aborted));
        assert!(!log
            .take()
            .iter()
            .any(|trace| matches!(trace, Trace::Tree(..) | Trace::FinishEdge(..))));
    }

    proptest! {
        #[test]
        #[ignore = "run property-based tests with `cargo test proptest_ -- --ignored`"]
        fn proptest_edge_dfs_enters_every_edge_once(graph in graph_directed().allow_loops()) {
            let mut dfs = EdgeDfs::new(&graph);
            let log = trace_edge_dfs(dfs.events());

            dfs.compute().unwrap();

            let traces = log.take();
            let entered = traces.iter().filter(|t| matches!(t, Trace::Tree(..))).count();
            let finished = traces.iter().filter(|t| matches!(t, Trace::FinishEdge(..))).count();

            prop_assert_eq!(entered, graph.edge_count());
            prop_assert_eq!(finished, graph.edge_count());
        }
    }
}
