//! Breadth-first search over undirected graphs.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::{
    algo::base::{run, AlgorithmBase, CancelManager, RootedAlgorithm},
    core::{Color, ColorMap, Error, GraphBase, ImplicitUndirectedGraph, OwnableRef, VertexSet},
    event::{event_set, Event},
    observer::{TimeStampEvents, UndirectedTreeEvents},
};

use super::UndirectedEdgeArgs;

event_set! {
    pub struct UndirectedBfsEvents<V, E> {
        initialize_vertex: V,
        start_vertex: V,
        examine_vertex: V,
        discover_vertex: V,
        examine_edge: UndirectedEdgeArgs<V, E>,
        tree_edge: UndirectedEdgeArgs<V, E>,
        non_tree_edge: UndirectedEdgeArgs<V, E>,
        gray_target: UndirectedEdgeArgs<V, E>,
        black_target: UndirectedEdgeArgs<V, E>,
        finish_vertex: V,
    }
}

/// Breadth-first search over an [undirected graph](ImplicitUndirectedGraph).
///
/// An edge is examined from both of its endpoints, a self-edge once. The
/// [`UndirectedEdgeArgs`] of an event tell from which endpoint.
pub struct UndirectedBfs<'g, G, M = FxHashMap<<G as GraphBase>::Vertex, Color>>
where
    G: GraphBase,
{
    graph: &'g G,
    base: AlgorithmBase<G::Vertex>,
    colors: M,
    events: UndirectedBfsEvents<G::Vertex, G::Edge>,
    process_all_components: bool,
}

impl<'g, G> UndirectedBfs<'g, G>
where
    G: ImplicitUndirectedGraph + VertexSet,
{
    pub fn new(graph: &'g G) -> Self {
        Self::with_color_map(graph, FxHashMap::default())
    }
}

impl<'g, G, M> UndirectedBfs<'g, G, M>
where
    G: ImplicitUndirectedGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    pub fn with_color_map(graph: &'g G, colors: M) -> Self {
        Self {
            graph,
            base: AlgorithmBase::new(),
            colors,
            events: UndirectedBfsEvents::default(),
            process_all_components: false,
        }
    }

    pub fn with_cancel_manager(mut self, cancel: CancelManager) -> Self {
        self.base.set_cancel_manager(cancel);
        self
    }

    pub fn with_process_all_components(self, process_all_components: bool) -> Self {
        Self {
            process_all_components,
            ..self
        }
    }

    pub fn events(&self) -> &UndirectedBfsEvents<G::Vertex, G::Edge> {
        &self.events
    }

    pub fn colors(&self) -> &M {
        &self.colors
    }

    pub fn vertex_color(&self, vertex: &G::Vertex) -> Option<Color> {
        self.colors.color(vertex)
    }

    fn initialize(&mut self) {
        self.colors.reset();

        for vertex in self.graph.vertices() {
            self.colors.set_color(vertex.clone(), Color::White);
            self.events.initialize_vertex.raise(vertex);
        }
    }

    fn traverse(&mut self, root: Option<G::Vertex>) -> Result<(), Error> {
        let mut queue = VecDeque::new();

        if let Some(root) = root {
            self.start(root, &mut queue)?;

            if !self.process_all_components {
                return Ok(());
            }
        }

        let graph = self.graph;
        for vertex in graph.vertices() {
            if self.colors.color_or_white(vertex) == Color::White {
                self.start(vertex.clone(), &mut queue)?;
            }
        }

        Ok(())
    }

    fn start(&mut self, root: G::Vertex, queue: &mut VecDeque<G::Vertex>) -> Result<(), Error> {
        self.base.throw_if_cancellation_requested()?;
        self.events.start_vertex.raise(&root);
        self.discover(root, queue);

        let graph = self.graph;

        while let Some(vertex) = queue.pop_front() {
            self.base.throw_if_cancellation_requested()?;
            self.events.examine_vertex.raise(&vertex);

            for edge in graph.adjacent_edges(&vertex)? {
                self.base.throw_if_cancellation_requested()?;

                let args = UndirectedEdgeArgs::new(OwnableRef::into_owned(edge), &vertex);
                self.events.examine_edge.raise(&args);

                match self.colors.color_or_white(&args.target) {
                    Color::White => {
                        self.events.tree_edge.raise(&args);
                        self.discover(args.target.clone(), queue);
                    }
                    Color::Gray => {
                        self.events.non_tree_edge.raise(&args);
                        self.events.gray_target.raise(&args);
                    }
                    Color::Black => {
                        self.events.non_tree_edge.raise(&args);
                        self.events.black_target.raise(&args);
                    }
                }
            }

            self.colors.set_color(vertex.clone(), Color::Black);
            self.events.finish_vertex.raise(&vertex);
        }

        Ok(())
    }

    fn discover(&mut self, vertex: G::Vertex, queue: &mut VecDeque<G::Vertex>) {
        self.colors.set_color(vertex.clone(), Color::Gray);
        self.events.discover_vertex.raise(&vertex);
        queue.push_back(vertex);
    }
}

impl<G, M> RootedAlgorithm for UndirectedBfs<'_, G, M>
where
    G: ImplicitUndirectedGraph + VertexSet,
    M: ColorMap<G::Vertex>,
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

        run(self, |bfs| {
            bfs.initialize();
            bfs.traverse(root)
        })
    }
}

impl<G, M> TimeStampEvents for UndirectedBfs<'_, G, M>
where
    G: ImplicitUndirectedGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    fn discover_vertex_event(&self) -> &Event<G::Vertex> {
        &self.events.discover_vertex
    }

    fn finish_vertex_event(&self) -> &Event<G::Vertex> {
        &self.events.finish_vertex
    }
}

impl<G, M> UndirectedTreeEvents for UndirectedBfs<'_, G, M>
where
    G: ImplicitUndirectedGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    type Edge = G::Edge;

    fn start_vertex_event(&self) -> &Event<G::Vertex> {
        &self.events.start_vertex
    }

    fn tree_edge_event(&self) -> &Event<UndirectedEdgeArgs<G::Vertex, G::Edge>> {
        &self.events.tree_edge
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::{
        core::SEdge,
        infra::testing::{trace_undirected_bfs, Trace},
        observer::{Observer, UndirectedVertexPredecessorRecorder},
        storage::UndirectedGraph,
    };

    use super::*;

    #[test]
    fn edge_seen_from_both_ends() {
        let graph = UndirectedGraph::from_edges([SEdge::new(1, 0)], true);
        let mut bfs = UndirectedBfs::new(&graph);
        let log = trace_undirected_bfs(bfs.events());

        bfs.compute_from(0).unwrap();

        assert_eq!(
            log.take(),
            vec![
                Trace::Init(1),
                Trace::Init(0),
                Trace::Start(0),
                Trace::Discover(0),
                Trace::ExamineVertex(0),
                Trace::Examine(0, 1),
                Trace::Tree(0, 1),
                Trace::Discover(1),
                Trace::Finish(0),
                Trace::ExamineVertex(1),
                Trace::Examine(1, 0),
                Trace::NonTree(1, 0),
                Trace::BlackTarget(1, 0),
                Trace::Finish(1),
            ]
        );
    }

    #[test]
    fn shortest_hops() {
        //   0 - 1 - 2
        //   |       |
        //   3 ----- 4 - 5
        let graph = UndirectedGraph::from_edges(
            [
                SEdge::new(0, 1),
                SEdge::new(1, 2),
                SEdge::new(0, 3),
                SEdge::new(3, 4),
                SEdge::new(2, 4),
                SEdge::new(4, 5),
            ],
            true,
        );
        let mut bfs = UndirectedBfs::new(&graph);
        let recorder = UndirectedVertexPredecessorRecorder::new();
        let _guard = recorder.attach(&bfs);

        bfs.compute_from(0).unwrap();

        let hops = |v: i32| recorder.try_get_path(&v).map(|path| path.len());
        assert_eq!(hops(2), Some(2));
        assert_eq!(hops(4), Some(2));
        assert_eq!(hops(5), Some(3));
        assert_eq!(hops(0), Some(0));
    }

    #[test]
    fn all_components() {
        let graph = UndirectedGraph::from_edges([SEdge::new(0, 1), SEdge::new(2, 3)], true);

        let mut bfs = UndirectedBfs::new(&graph);
        bfs.compute_from(3).unwrap();
        assert_eq!(bfs.vertex_color(&0), Some(Color::White));

        let mut bfs = UndirectedBfs::new(&graph).with_process_all_components(true);
        bfs.compute_from(3).unwrap();
        assert_eq!(bfs.vertex_color(&0), Some(Color::Black));
    }

    #[test]
    fn absent_root() {
        let graph = UndirectedGraph::from_edges([SEdge::new(0, 1)], true);
        let mut bfs = UndirectedBfs::new(&graph);

        assert_matches!(bfs.compute_from(2), Err(Error::VertexNotFound));
    }
}
