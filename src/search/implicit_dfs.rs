//! Depth-first search over graphs whose vertices are not known upfront.

use rustc_hash::FxHashMap;

use crate::{
    algo::base::{run, AlgorithmBase, CancelManager, RootedAlgorithm},
    core::{Color, ColorMap, Direction, Error, GraphBase, ImplicitGraph, ImplicitVertexSet},
    event::Event,
    observer::{BackEdgeEvents, TimeStampEvents, VertexTreeEvents},
};

use super::{
    dfs::{DfsEvents, Walk},
    EdgeCursor, OutEdgesFilter,
};

/// Depth-first search over an [implicit graph](ImplicitGraph).
///
/// The vertex set may be unknown or even infinite, so the search needs a
/// root and colors only the vertices it reaches. A vertex without a color is
/// white. [`initialize_vertex`](DfsEvents::initialize_vertex) is never raised.
///
/// On an infinite graph, bound the search with
/// [`with_max_depth`](ImplicitDfs::with_max_depth) or cancel it from an event
/// handler.
pub struct ImplicitDfs<'g, G, M = FxHashMap<<G as GraphBase>::Vertex, Color>>
where
    G: GraphBase,
{
    graph: &'g G,
    base: AlgorithmBase<G::Vertex>,
    colors: M,
    events: DfsEvents<G::Vertex, G::Edge>,
    max_depth: usize,
    out_edges_filter: Option<OutEdgesFilter<'g, G::Vertex, G::Edge>>,
}

impl<'g, G> ImplicitDfs<'g, G>
where
    G: ImplicitGraph + ImplicitVertexSet,
{
    pub fn new(graph: &'g G) -> Self {
        Self::with_color_map(graph, FxHashMap::default())
    }
}

impl<'g, G, M> ImplicitDfs<'g, G, M>
where
    G: ImplicitGraph + ImplicitVertexSet,
    M: ColorMap<G::Vertex>,
{
    pub fn with_color_map(graph: &'g G, colors: M) -> Self {
        Self {
            graph,
            base: AlgorithmBase::new(),
            colors,
            events: DfsEvents::default(),
            max_depth: usize::MAX,
            out_edges_filter: None,
        }
    }

    pub fn with_cancel_manager(mut self, cancel: CancelManager) -> Self {
        self.base.set_cancel_manager(cancel);
        self
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

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

    /// Colors of the vertices reached by the last run.
    pub fn colors(&self) -> &M {
        &self.colors
    }

    pub fn vertex_color(&self, vertex: &G::Vertex) -> Option<Color> {
        self.colors.color(vertex)
    }

    fn traverse(&mut self, root: G::Vertex) -> Result<(), Error> {
        self.colors.reset();

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

impl<G, M> RootedAlgorithm for ImplicitDfs<'_, G, M>
where
    G: ImplicitGraph + ImplicitVertexSet,
    M: ColorMap<G::Vertex>,
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

impl<G, M> TimeStampEvents for ImplicitDfs<'_, G, M>
where
    G: ImplicitGraph + ImplicitVertexSet,
    M: ColorMap<G::Vertex>,
{
    fn discover_vertex_event(&self) -> &Event<G::Vertex> {
        &self.events.discover_vertex
    }

    fn finish_vertex_event(&self) -> &Event<G::Vertex> {
        &self.events.finish_vertex
    }
}

impl<G, M> VertexTreeEvents for ImplicitDfs<'_, G, M>
where
    G: ImplicitGraph + ImplicitVertexSet,
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

impl<G, M> BackEdgeEvents for ImplicitDfs<'_, G, M>
where
    G: ImplicitGraph + ImplicitVertexSet,
    M: ColorMap<G::Vertex>,
{
    fn back_edge_event(&self) -> &Event<G::Edge> {
        &self.events.back_edge
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::{
        algo::base::ComputationState,
        core::SEdge,
        infra::testing::{trace_dfs, Trace},
        storage::DelegateImplicitGraph,
    };

    use super::*;

    /// Collatz-like successor graph over the naturals, infinite in general.
    fn successors(v: &u64) -> Option<Vec<SEdge<u64>>> {
        if *v == 0 {
            return None;
        }

        let next = if v % 2 == 0 { v / 2 } else { 3 * v + 1 };
        Some(vec![SEdge::new(*v, next), SEdge::new(*v, v + 1)])
    }

    #[test]
    fn colors_only_reached() {
        let graph = DelegateImplicitGraph::new(|v: &u32| {
            (*v < 4).then(|| {
                if *v < 3 {
                    vec![SEdge::new(*v, v + 1)]
                } else {
                    Vec::new()
                }
            })
        }, true);
        let mut dfs = ImplicitDfs::new(&graph);

        dfs.compute_from(1).unwrap();

        assert_eq!(dfs.vertex_color(&3), Some(Color::Black));
        assert_eq!(dfs.vertex_color(&0), None);
        assert_eq!(dfs.colors().len(), 3);
    }

    #[test]
    fn no_initialize_events() {
        let graph = DelegateImplicitGraph::new(|v: &u32| (*v < 2).then(Vec::<SEdge<u32>>::new), true);
        let mut dfs = ImplicitDfs::new(&graph);
        let log = trace_dfs(dfs.events());

        dfs.compute_from(1).unwrap();

        assert_eq!(
            log.take(),
            vec![Trace::Start(1), Trace::Discover(1), Trace::Finish(1)]
        );
    }

    #[test]
    fn bounded_on_infinite_graph() {
        let graph = DelegateImplicitGraph::new(successors, true);
        let mut dfs = ImplicitDfs::new(&graph).with_max_depth(3);
        let log = trace_dfs(dfs.events());

        dfs.compute_from(1).unwrap();

        let traces = log.take();
        let discovered = traces
            .iter()
            .filter(|trace| matches!(trace, Trace::Discover(_)))
            .count();
        let finished = traces
            .iter()
            .filter(|trace| matches!(trace, Trace::Finish(_)))
            .count();
        assert_eq!(discovered, finished);
        assert_eq!(dfs.state(), ComputationState::Finished);
    }

    #[test]
    fn cancelled_from_handler_on_infinite_graph() {
        let graph = DelegateImplicitGraph::new(successors, true);
        let mut dfs = ImplicitDfs::new(&graph);
        let cancel = dfs.cancel_manager().clone();
        let _sub = dfs.events().discover_vertex.subscribe(move |v| {
            if *v > 1000 {
                cancel.cancel();
            }
        });

        assert_matches!(dfs.compute_from(7), Err(Error::Aborted));
        assert_eq!(dfs.state(), ComputationState::Aborted);
    }

    #[test]
    fn root_required() {
        let graph = DelegateImplicitGraph::new(successors, true);
        let mut dfs = ImplicitDfs::new(&graph);

        assert_matches!(dfs.compute(), Err(Error::MissingRootVertex));
        assert_matches!(dfs.compute_from(0), Err(Error::VertexNotFound));
        assert_eq!(dfs.state(), ComputationState::NotRunning);
    }
}
