//! Depth-first search over undirected graphs.
//!
//! Every edge is traversed at most once, from whichever endpoint the search
//! reaches first. Traversing it again from the other endpoint would report
//! each tree edge as a back edge too.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    algo::base::{run, AlgorithmBase, CancelManager, RootedAlgorithm},
    core::{
        Color, ColorMap, Error, GraphBase, ImplicitUndirectedGraph, OwnableRef, VertexSet,
    },
    event::{event_set, Event},
    observer::{TimeStampEvents, UndirectedTreeEvents},
};

use super::UndirectedEdgeArgs;

event_set! {
    pub struct UndirectedDfsEvents<V, E> {
        initialize_vertex: V,
        start_vertex: V,
        discover_vertex: V,
        examine_edge: UndirectedEdgeArgs<V, E>,
        tree_edge: UndirectedEdgeArgs<V, E>,
        /// The edge leads to a gray vertex. Self-edges are back edges too.
        back_edge: UndirectedEdgeArgs<V, E>,
        /// The edge leads to a black vertex. This happens only when
        /// `max_depth` finished the target before its edges were traversed.
        forward_or_cross_edge: UndirectedEdgeArgs<V, E>,
        finish_vertex: V,
    }
}

struct Frame<V, I> {
    vertex: V,
    edges: Option<I>,
    depth: usize,
}

/// Depth-first search over an [undirected graph](ImplicitUndirectedGraph).
///
/// Without a depth limit every edge is either a tree edge or a back edge. A
/// vertex cut off by `max_depth` is finished with untraversed edges, and such
/// an edge reached later from a gray vertex is a forward or cross edge.
///
/// Edges are told apart by value, so parallel edges that compare equal are
/// traversed as one.
pub struct UndirectedDfs<'g, G, M = FxHashMap<<G as GraphBase>::Vertex, Color>>
where
    G: GraphBase,
{
    graph: &'g G,
    base: AlgorithmBase<G::Vertex>,
    colors: M,
    visited_edges: FxHashSet<G::Edge>,
    events: UndirectedDfsEvents<G::Vertex, G::Edge>,
    max_depth: usize,
    process_all_components: bool,
}

impl<'g, G> UndirectedDfs<'g, G>
where
    G: ImplicitUndirectedGraph + VertexSet,
{
    pub fn new(graph: &'g G) -> Self {
        Self::with_color_map(graph, FxHashMap::default())
    }
}

impl<'g, G, M> UndirectedDfs<'g, G, M>
where
    G: ImplicitUndirectedGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    pub fn with_color_map(graph: &'g G, colors: M) -> Self {
        Self {
            graph,
            base: AlgorithmBase::new(),
            colors,
            visited_edges: FxHashSet::default(),
            events: UndirectedDfsEvents::default(),
            max_depth: usize::MAX,
            process_all_components: false,
        }
    }

    pub fn with_cancel_manager(mut self, cancel: CancelManager) -> Self {
        self.base.set_cancel_manager(cancel);
        self
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    pub fn with_process_all_components(self, process_all_components: bool) -> Self {
        Self {
            process_all_components,
            ..self
        }
    }

    pub fn events(&self) -> &UndirectedDfsEvents<G::Vertex, G::Edge> {
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
        self.visited_edges.clear();

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
        self.discover(root.clone());

        let graph = self.graph;
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
                None => graph.adjacent_edges(&frame.vertex)?,
            };

            let mut next = None;

            for edge in edges.by_ref() {
                if self.visited_edges.contains(&*edge) {
                    continue;
                }

                self.base.throw_if_cancellation_requested()?;

                let edge = OwnableRef::into_owned(edge);
                self.visited_edges.insert(edge.clone());

                let args = UndirectedEdgeArgs::new(edge, &frame.vertex);
                self.events.examine_edge.raise(&args);

                match self.colors.color_or_white(&args.target) {
                    Color::White => {
                        self.events.tree_edge.raise(&args);
                        next = Some(args.target);
                        break;
                    }
                    Color::Gray => self.events.back_edge.raise(&args),
                    Color::Black => self.events.forward_or_cross_edge.raise(&args),
                }
            }

            match next {
                Some(vertex) => {
                    let depth = frame.depth + 1;
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

    fn discover(&mut self, vertex: G::Vertex) {
        self.events.discover_vertex.raise(&vertex);
        self.colors.set_color(vertex, Color::Gray);
    }

    fn finish(&mut self, vertex: G::Vertex) {
        self.events.finish_vertex.raise(&vertex);
        self.colors.set_color(vertex, Color::Black);
    }
}

impl<G, M> RootedAlgorithm for UndirectedDfs<'_, G, M>
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

        run(self, |dfs| {
            dfs.initialize();
            dfs.traverse(root)
        })
    }
}

impl<G, M> TimeStampEvents for UndirectedDfs<'_, G, M>
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

impl<G, M> UndirectedTreeEvents for UndirectedDfs<'_, G, M>
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
