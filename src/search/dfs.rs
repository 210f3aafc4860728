//! Depth-first search over directed graphs.
//!
//! The recursion of the textbook algorithm is simulated by an explicit stack
//! of frames `{vertex, edge cursor, depth}`, so the depth of the search is not
//! limited by the native call stack.

use rustc_hash::FxHashMap;

use crate::{
    algo::base::{run, AlgorithmBase, CancelManager, RootedAlgorithm},
    core::{
        Color, ColorMap, Direction, Edge, Error, GraphBase, IncidenceGraph, OwnableRef,
        VertexSet, VertexType,
    },
    event::{event_set, Event},
    observer::{BackEdgeEvents, TimeStampEvents, VertexTreeEvents},
};

use super::{EdgeCursor, OutEdgesFilter};

event_set! {
    pub struct DfsEvents<V, E> {
        /// Raised for every vertex of the graph before the search starts.
        initialize_vertex: V,
        /// Raised for the root of every search tree.
        start_vertex: V,
        discover_vertex: V,
        examine_edge: E,
        tree_edge: E,
        back_edge: E,
        forward_or_cross_edge: E,
        finish_vertex: V,
    }
}

struct Frame<V, I> {
    vertex: V,
    // Created when the frame is popped for the first time.
    edges: Option<I>,
    depth: usize,
}

/// The traversal shared by the vertex-colored depth-first searches.
pub(crate) struct Walk<'a, V, E, M> {
    pub(crate) base: &'a AlgorithmBase<V>,
    pub(crate) colors: &'a mut M,
    pub(crate) events: &'a DfsEvents<V, E>,
    pub(crate) max_depth: usize,
}

impl<V, E, M> Walk<'_, V, E, M>
where
    V: VertexType,
    E: Edge<V>,
    M: ColorMap<V>,
{
    /// Visits everything reachable from the root.
    ///
    /// `expand` returns the edges to examine from a vertex, each paired with
    /// the direction in which the edge is traversed. It is called at most
    /// once per vertex.
    pub(crate) fn visit<'g, I, F>(&mut self, root: V, mut expand: F) -> Result<(), Error>
    where
        I: Iterator<Item = (OwnableRef<'g, E>, Direction)>,
        F: FnMut(&V) -> Result<I, Error>,
    {
        self.base.throw_if_cancellation_requested()?;
        self.discover(root.clone());

        let mut stack = vec![Frame {
            vertex: root,
            edges: None,
            depth: 0,
        }];

        while let Some(mut frame) = stack.pop() {
            self.base.throw_if_cancellation_requested()?;

            if frame.depth > self.max_depth {
                self.finish(frame.vertex);
                continue;
            }

            let mut edges = match frame.edges.take() {
                Some(edges) => edges,
                None => expand(&frame.vertex)?,
            };

            let mut next = None;

            for (edge, dir) in edges.by_ref() {
                self.base.throw_if_cancellation_requested()?;
                self.events.examine_edge.raise(&edge);

                let neighbor = match dir {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };

                match self.colors.color_or_white(neighbor) {
                    Color::White => {
                        self.events.tree_edge.raise(&edge);
                        next = Some(neighbor.clone());
                        break;
                    }
                    Color::Gray => self.events.back_edge.raise(&edge),
                    Color::Black => self.events.forward_or_cross_edge.raise(&edge),
                }
            }

            match next {
                Some(vertex) => {
                    let depth = frame.depth + 1;

                    // Suspend the current vertex, it continues with its next
                    // edge once the subtree is finished.
                    frame.edges = Some(edges);
                    stack.push(frame);

                    self.discover(vertex.clone());
                    stack.push(Frame {
                        vertex,
                        edges: None,
                        depth,
                    });
                }
                None => self.finish(frame.vertex),
            }
        }

        Ok(())
    }

    fn discover(&mut self, vertex: V) {
        self.events.discover_vertex.raise(&vertex);
        self.colors.set_color(vertex, Color::Gray);
    }

    fn finish(&mut self, vertex: V) {
        self.events.finish_vertex.raise(&vertex);
        self.colors.set_color(vertex, Color::Black);
    }
}

/// Depth-first search over a directed graph.
///
/// Without a root, all vertices are visited in the enumeration order of the
/// graph. With a root, only the vertices reachable from it are visited,
/// unless [`with_process_all_components`](Dfs::with_process_all_components)
/// is enabled.
pub struct Dfs<'g, G, M = FxHashMap<<G as GraphBase>::Vertex, Color>>
where
    G: GraphBase,
{
    graph: &'g G,
    base: AlgorithmBase<G::Vertex>,
    colors: M,
    events: DfsEvents<G::Vertex, G::Edge>,
    max_depth: usize,
    process_all_components: bool,
    out_edges_filter: Option<OutEdgesFilter<'g, G::Vertex, G::Edge>>,
}

impl<'g, G> Dfs<'g, G>
where
    G: IncidenceGraph + VertexSet,
{
    pub fn new(graph: &'g G) -> Self {
        Self::with_color_map(graph, FxHashMap::default())
    }
}

impl<'g, G, M> Dfs<'g, G, M>
where
    G: IncidenceGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    /// Uses the given map to keep the vertex colors.
    pub fn with_color_map(graph: &'g G, colors: M) -> Self {
        Self {
            graph,
            base: AlgorithmBase::new(),
            colors,
            events: DfsEvents::default(),
            max_depth: usize::MAX,
            process_all_components: false,
            out_edges_filter: None,
        }
    }

    pub fn with_cancel_manager(mut self, cancel: CancelManager) -> Self {
        self.base.set_cancel_manager(cancel);
        self
    }

    /// Vertices deeper than `max_depth` edges from the root of their search
    /// tree are discovered and finished, but not expanded.
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    /// When set, a run started from a root continues with the remaining white
    /// vertices in the enumeration order of the graph.
    pub fn with_process_all_components(self, process_all_components: bool) -> Self {
        Self {
            process_all_components,
            ..self
        }
    }

    /// Sets a function that restricts or reorders the out-edges of a vertex.
    /// It is called once per visited vertex.
    pub fn with_out_edges_filter<F>(self, filter: F) -> Self
    where
        F: Fn(&G::Vertex, Vec<G::Edge>) -> Vec<G::Edge> + 'g,
    {
        Self {
            out_edges_filter: Some(Box::new(filter)),
            ..self
        }
    }

    pub fn events(&self) -> &DfsEvents<G::Vertex, G::Edge> {
        &self.events
    }

    /// The colors after the last run.
    pub fn colors(&self) -> &M {
        &self.colors
    }

    pub fn vertex_color(&self, vertex: &G::Vertex) -> Option<Color> {
        self.colors.color(vertex)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn initialize(&mut self) {
        self.colors.reset();

        for vertex in self.graph.vertices() {
            self.colors.set_color(vertex.clone(), Color::White);
            self.events.initialize_vertex.raise(vertex);
        }
    }

    fn traverse(&mut self, root: Option<G::Vertex>) -> Result<(), Error> {
        if let Some(root) = root {
            self.start(root)?;

            if !self.process_all_components {
                return Ok(());
            }
        }

        let graph = self.graph;
        for vertex in graph.vertices() {
            if self.colors.color_or_white(vertex) == Color::White {
                self.start(vertex.clone())?;
            }
        }

        Ok(())
    }

    fn start(&mut self, root: G::Vertex) -> Result<(), Error> {
        self.base.throw_if_cancellation_requested()?;
        self.events.start_vertex.raise(&root);

        let graph = self.graph;
        let filter = self.out_edges_filter.as_ref();

        let mut walk = Walk {
            base: &self.base,
            colors: &mut self.colors,
            events: &self.events,
            max_depth: self.max_depth,
        };

        walk.visit(root, |vertex| {
            let edges = EdgeCursor::new(graph, vertex, filter)?;
            Ok(edges.map(|edge| (edge, Direction::Outgoing)))
        })
    }
}

impl<G, M> RootedAlgorithm for Dfs<'_, G, M>
where
    G: IncidenceGraph + VertexSet,
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

        run(self, |dfs| {
            dfs.initialize();
            dfs.traverse(root)
        })
    }
}

impl<G, M> TimeStampEvents for Dfs<'_, G, M>
where
    G: IncidenceGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    fn discover_vertex_event(&self) -> &Event<G::Vertex> {
        &self.events.discover_vertex
    }

    fn finish_vertex_event(&self) -> &Event<G::Vertex> {
        &self.events.finish_vertex
    }
}

impl<G, M> VertexTreeEvents for Dfs<'_, G, M>
where
    G: IncidenceGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    type Edge = G::Edge;

    fn start_vertex_event(&self) -> &Event<G::Vertex> {
        &self.events.start_vertex
    }

    fn tree_edge_event(&self) -> &Event<G::Edge> {
        &self.events.tree_edge
    }
}

impl<G, M> BackEdgeEvents for Dfs<'_, G, M>
where
    G: IncidenceGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    fn back_edge_event(&self) -> &Event<G::Edge> {
        &self.events.back_edge
    }
}
