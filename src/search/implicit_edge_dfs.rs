//! Edge-colored depth-first search over graphs whose vertices are not known
//! upfront.

use rustc_hash::FxHashMap;

use crate::{
    algo::base::{run, AlgorithmBase, CancelManager, RootedAlgorithm},
    core::{Color, ColorMap, Error, GraphBase, ImplicitGraph, ImplicitVertexSet},
    event::Event,
    observer::EdgeTreeEvents,
};

use super::{
    edge_dfs::{EdgeDfsEvents, EdgeWalk},
    EdgeEdgeArgs,
};

/// Edge-colored depth-first search over an [implicit graph](ImplicitGraph).
///
/// Starts with the out-edges of the root, which is required. Only the edges
/// the search enters get a color.
/// [`initialize_edge`](EdgeDfsEvents::initialize_edge) is never raised.
pub struct ImplicitEdgeDfs<'g, G, M = FxHashMap<<G as GraphBase>::Edge, Color>>
where
    G: GraphBase,
{
    graph: &'g G,
    base: AlgorithmBase<G::Vertex>,
    colors: M,
    events: EdgeDfsEvents<G::Vertex, G::Edge>,
    max_depth: usize,
}

impl<'g, G> ImplicitEdgeDfs<'g, G>
where
    G: ImplicitGraph + ImplicitVertexSet,
{
    pub fn new(graph: &'g G) -> Self {
        Self::with_color_map(graph, FxHashMap::default())
    }
}

impl<'g, G, M> ImplicitEdgeDfs<'g, G, M>
where
    G: ImplicitGraph + ImplicitVertexSet,
    M: ColorMap<G::Edge>,
{
    pub fn with_color_map(graph: &'g G, colors: M) -> Self {
        Self {
            graph,
            base: AlgorithmBase::new(),
            colors,
            events: EdgeDfsEvents::default(),
            max_depth: usize::MAX,
        }
    }

    pub fn with_cancel_manager(mut self, cancel: CancelManager) -> Self {
        self.base.set_cancel_manager(cancel);
        self
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
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

    fn traverse(&mut self, root: G::Vertex) -> Result<(), Error> {
        self.colors.reset();

        self.base.throw_if_cancellation_requested()?;
        self.events.start_vertex.raise(&root);

        let graph = self.graph;
        for edge in graph.out_edges(&root)? {
            if self.colors.color_or_white(&edge) != Color::White {
                continue;
            }

            let mut walk = EdgeWalk {
                base: &self.base,
                colors: &mut self.colors,
                events: &self.events,
                max_depth: self.max_depth,
            };
            walk.visit(edge.into_owned(), |vertex| graph.out_edges(vertex))?;
        }

        Ok(())
    }
}

impl<G, M> RootedAlgorithm for ImplicitEdgeDfs<'_, G, M>
where
    G: ImplicitGraph + ImplicitVertexSet,
    M: ColorMap<G::Edge>,
{
    type Vertex = G::Vertex;

    fn base(&self) -> &AlgorithmBase<G::Vertex> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase<G::Vertex> {
        &mut self.base
    }

    /// Fails with [`Error::MissingRootVertex`] if no root is set.
    fn compute(&mut self) -> Result<(), Error> {
        let root = self
            .base
            .root_vertex()
            .cloned()
            .ok_or(Error::MissingRootVertex)?;

        if !self.graph.contains_vertex(&root) {
            return Err(Error::VertexNotFound);
        }

        run(self, |dfs| dfs.traverse(root))
    }
}

impl<G, M> EdgeTreeEvents for ImplicitEdgeDfs<'_, G, M>
where
    G: ImplicitGraph + ImplicitVertexSet,
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

    use crate::{
        core::{Edge, SEdge},
        infra::testing::{trace_edge_dfs, Trace},
        observer::{EdgePredecessorRecorder, Observer},
        storage::DelegateImplicitGraph,
    };

    use super::*;

    fn grid(v: &(u8, u8)) -> Option<Vec<SEdge<(u8, u8)>>> {
        let (x, y) = *v;
        if x > 2 || y > 2 {
            return None;
        }

        let mut edges = Vec::new();
        if x < 2 {
            edges.push(SEdge::new(*v, (x + 1, y)));
        }
        if y < 2 {
            edges.push(SEdge::new(*v, (x, y + 1)));
        }
        Some(edges)
    }

    #[test]
    fn enters_reachable_edges_once() {
        let graph = DelegateImplicitGraph::new(grid, true);
        let mut dfs = ImplicitEdgeDfs::new(&graph);
        let log = trace_edge_dfs(dfs.events());

        dfs.compute_from((0, 0)).unwrap();

        let traces = log.take();
        let entered = traces
            .iter()
            .filter(|trace| matches!(trace, Trace::Tree(..)))
            .count();

        // A 3x3 grid has 12 right or down edges.
        assert_eq!(entered, 12);
        assert_eq!(dfs.colors().len(), 12);
        assert!(!traces
            .iter()
            .any(|trace| matches!(trace, Trace::InitEdge(..))));
    }

    #[test]
    fn all_paths_to_corner() {
        let graph = DelegateImplicitGraph::new(grid, true);
        let mut dfs = ImplicitEdgeDfs::new(&graph);
        let recorder = EdgePredecessorRecorder::new();
        let _guard = recorder.attach(&dfs);

        dfs.compute_from((1, 1)).unwrap();

        let paths = recorder.all_paths();
        assert!(!paths.is_empty());
        for path in paths {
            assert_eq!(path.first().map(|e| *e.source()), Some((1, 1)));
            assert_eq!(path.last().map(|e| *e.target()), Some((2, 2)));
        }
    }

    #[test]
    fn root_required() {
        let graph = DelegateImplicitGraph::new(grid, true);
        let mut dfs = ImplicitEdgeDfs::new(&graph);

        assert_matches!(dfs.compute(), Err(Error::MissingRootVertex));
        assert_matches!(dfs.compute_from((5, 5)), Err(Error::VertexNotFound));
    }
}
