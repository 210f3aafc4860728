//! Breadth-first search over directed graphs.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::{
    algo::base::{run, AlgorithmBase, CancelManager, RootedAlgorithm},
    core::{
        Color, ColorMap, Edge, Error, GraphBase, ImplicitGraph, IncidenceGraph, VertexSet,
    },
    event::{event_set, Event},
    observer::{TimeStampEvents, VertexTreeEvents},
};

event_set! {
    pub struct BfsEvents<V, E> {
        initialize_vertex: V,
        start_vertex: V,
        /// Raised when a vertex is taken from the queue.
        examine_vertex: V,
        /// Raised when a vertex is put to the queue.
        discover_vertex: V,
        examine_edge: E,
        tree_edge: E,
        non_tree_edge: E,
        /// The target of a non-tree edge is waiting in the queue.
        gray_target: E,
        /// The target of a non-tree edge was already examined.
        black_target: E,
        finish_vertex: V,
    }
}

type EdgeFilter<'g, E> = Box<dyn Fn(&E) -> bool + 'g>;

/// Breadth-first search over a directed graph.
///
/// Vertices are discovered in nondecreasing distance (in edges) from the
/// roots. Without a root, all vertices are visited in the enumeration order of
/// the graph.
pub struct Bfs<'g, G, M = FxHashMap<<G as GraphBase>::Vertex, Color>>
where
    G: GraphBase,
{
    graph: &'g G,
    base: AlgorithmBase<G::Vertex>,
    colors: M,
    events: BfsEvents<G::Vertex, G::Edge>,
    process_all_components: bool,
    edge_filter: Option<EdgeFilter<'g, G::Edge>>,
}

impl<'g, G> Bfs<'g, G>
where
    G: IncidenceGraph + VertexSet,
{
    pub fn new(graph: &'g G) -> Self {
        Self::with_color_map(graph, FxHashMap::default())
    }
}

impl<'g, G, M> Bfs<'g, G, M>
where
    G: IncidenceGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    pub fn with_color_map(graph: &'g G, colors: M) -> Self {
        Self {
            graph,
            base: AlgorithmBase::new(),
            colors,
            events: BfsEvents::default(),
            process_all_components: false,
            edge_filter: None,
        }
    }

    pub fn with_cancel_manager(mut self, cancel: CancelManager) -> Self {
        self.base.set_cancel_manager(cancel);
        self
    }

    /// When set, a run started from roots continues with the remaining white
    /// vertices in the enumeration order of the graph.
    pub fn with_process_all_components(self, process_all_components: bool) -> Self {
        Self {
            process_all_components,
            ..self
        }
    }

    /// Edges rejected by the filter are ignored as if they were not in the
    /// graph. No event is raised for them.
    pub fn with_edge_filter<F>(self, filter: F) -> Self
    where
        F: Fn(&G::Edge) -> bool + 'g,
    {
        Self {
            edge_filter: Some(Box::new(filter)),
            ..self
        }
    }

    pub fn events(&self) -> &BfsEvents<G::Vertex, G::Edge> {
        &self.events
    }

    pub fn colors(&self) -> &M {
        &self.colors
    }

    pub fn vertex_color(&self, vertex: &G::Vertex) -> Option<Color> {
        self.colors.color(vertex)
    }

    /// Runs the search from several roots at once. All of them are at
    /// distance zero.
    ///
    /// Every root must be in the graph, otherwise the search does not start
    /// and [`Error::VertexNotFound`] is returned. The root vertex of the
    /// algorithm is left unchanged.
    pub fn compute_from_many<I>(&mut self, roots: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = G::Vertex>,
    {
        let roots = roots.into_iter().collect::<Vec<_>>();
        self.compute_with_roots(roots)
    }

    fn compute_with_roots(&mut self, roots: Vec<G::Vertex>) -> Result<(), Error> {
        if roots.iter().any(|root| !self.graph.contains_vertex(root)) {
            return Err(Error::VertexNotFound);
        }

        run(self, |bfs| {
            bfs.initialize();
            bfs.traverse(roots)
        })
    }

    fn initialize(&mut self) {
        self.colors.reset();

        for vertex in self.graph.vertices() {
            self.colors.set_color(vertex.clone(), Color::White);
            self.events.initialize_vertex.raise(vertex);
        }
    }

    fn traverse(&mut self, roots: Vec<G::Vertex>) -> Result<(), Error> {
        let mut queue = VecDeque::new();

        if !roots.is_empty() {
            for root in roots {
                if self.colors.color_or_white(&root) == Color::White {
                    self.base.throw_if_cancellation_requested()?;
                    self.events.start_vertex.raise(&root);
                    self.discover(root, &mut queue);
                }
            }

            self.drain(&mut queue)?;

            if !self.process_all_components {
                return Ok(());
            }
        }

        let graph = self.graph;
        for vertex in graph.vertices() {
            if self.colors.color_or_white(vertex) == Color::White {
                self.base.throw_if_cancellation_requested()?;
                self.events.start_vertex.raise(vertex);
                self.discover(vertex.clone(), &mut queue);
                self.drain(&mut queue)?;
            }
        }

        Ok(())
    }

    fn discover(&mut self, vertex: G::Vertex, queue: &mut VecDeque<G::Vertex>) {
        self.colors.set_color(vertex.clone(), Color::Gray);
        self.events.discover_vertex.raise(&vertex);
        queue.push_back(vertex);
    }

    fn drain(&mut self, queue: &mut VecDeque<G::Vertex>) -> Result<(), Error> {
        let graph = self.graph;

        while let Some(vertex) = queue.pop_front() {
            self.base.throw_if_cancellation_requested()?;
            self.events.examine_vertex.raise(&vertex);

            for edge in graph.out_edges(&vertex)? {
                if let Some(filter) = &self.edge_filter {
                    if !filter(&edge) {
                        continue;
                    }
                }

                self.base.throw_if_cancellation_requested()?;
                self.events.examine_edge.raise(&edge);

                let target = edge.target();
                match self.colors.color_or_white(target) {
                    Color::White => {
                        self.events.tree_edge.raise(&edge);
                        self.discover(target.clone(), queue);
                    }
                    Color::Gray => {
                        self.events.non_tree_edge.raise(&edge);
                        self.events.gray_target.raise(&edge);
                    }
                    Color::Black => {
                        self.events.non_tree_edge.raise(&edge);
                        self.events.black_target.raise(&edge);
                    }
                }
            }

            self.colors.set_color(vertex.clone(), Color::Black);
            self.events.finish_vertex.raise(&vertex);
        }

        Ok(())
    }
}

impl<G, M> RootedAlgorithm for Bfs<'_, G, M>
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
        let roots = self.base.root_vertex().cloned().into_iter().collect();
        self.compute_with_roots(roots)
    }
}

impl<G, M> TimeStampEvents for Bfs<'_, G, M>
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

impl<G, M> VertexTreeEvents for Bfs<'_, G, M>
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
