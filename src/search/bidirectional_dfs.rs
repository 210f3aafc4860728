//! Depth-first search that follows edges in both directions.
//!
//! Out-edges are followed from source to target and in-edges from target to
//! source, so the search explores the weakly connected component of the root
//! while the edges keep their orientation in the events.

use rustc_hash::FxHashMap;

use crate::{
    algo::base::{run, AlgorithmBase, CancelManager, RootedAlgorithm},
    core::{
        BidirectionalIncidenceGraph, Color, ColorMap, Direction, Error, GraphBase, VertexSet,
    },
    event::Event,
    observer::TimeStampEvents,
};

use super::dfs::{DfsEvents, Walk};

/// Depth-first search over the out-edges and in-edges of a
/// [bidirectional graph](BidirectionalIncidenceGraph).
///
/// The events are those of [`Dfs`](super::Dfs). An edge is examined once
/// from each of its endpoints, its classification depends on the color of
/// the endpoint opposite to the current vertex. A tree edge may thus point
/// at the vertex the search came from, so only the vertex events are offered
/// to [observers](crate::observer).
pub struct BidirectionalDfs<'g, G, M = FxHashMap<<G as GraphBase>::Vertex, Color>>
where
    G: GraphBase,
{
    graph: &'g G,
    base: AlgorithmBase<G::Vertex>,
    colors: M,
    events: DfsEvents<G::Vertex, G::Edge>,
    max_depth: usize,
    process_all_components: bool,
}

impl<'g, G> BidirectionalDfs<'g, G>
where
    G: BidirectionalIncidenceGraph + VertexSet,
{
    pub fn new(graph: &'g G) -> Self {
        Self::with_color_map(graph, FxHashMap::default())
    }
}

impl<'g, G, M> BidirectionalDfs<'g, G, M>
where
    G: BidirectionalIncidenceGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    pub fn with_color_map(graph: &'g G, colors: M) -> Self {
        Self {
            graph,
            base: AlgorithmBase::new(),
            colors,
            events: DfsEvents::default(),
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

    pub fn events(&self) -> &DfsEvents<G::Vertex, G::Edge> {
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
        let mut walk = Walk {
            base: &self.base,
            colors: &mut self.colors,
            events: &self.events,
            max_depth: self.max_depth,
        };

        walk.visit(root, |vertex| {
            let out_edges = graph
                .out_edges(vertex)?
                .map(|edge| (edge, Direction::Outgoing));
            let in_edges = graph
                .in_edges(vertex)?
                .map(|edge| (edge, Direction::Incoming));
            Ok(out_edges.chain(in_edges))
        })
    }
}

impl<G, M> RootedAlgorithm for BidirectionalDfs<'_, G, M>
where
    G: BidirectionalIncidenceGraph + VertexSet,
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

impl<G, M> TimeStampEvents for BidirectionalDfs<'_, G, M>
where
    G: BidirectionalIncidenceGraph + VertexSet,
    M: ColorMap<G::Vertex>,
{
    fn discover_vertex_event(&self) -> &Event<G::Vertex> {
        &self.events.discover_vertex
    }

    fn finish_vertex_event(&self) -> &Event<G::Vertex> {
        &self.events.finish_vertex
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::{
        core::SEdge,
        infra::testing::{trace_dfs, Trace},
        storage::BidirectionalGraph,
    };

    use super::*;

    #[test]
    fn follows_in_edges() {
        //   0 → 1 ← 2
        //           ↑
        //           3
        let graph = BidirectionalGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(2, 1), SEdge::new(3, 2)],
            true,
        );
        let mut dfs = BidirectionalDfs::new(&graph);
        let log = trace_dfs(dfs.events());

        dfs.compute_from(0).unwrap();

        let traces = log.take();
        let discovered = traces
            .iter()
            .filter_map(|trace| match trace {
                Trace::Discover(v) => Some(*v),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(discovered, vec![0, 1, 2, 3]);

        // Edges keep their orientation, even when followed backwards.
        assert!(traces.contains(&Trace::Tree(2, 1)));
        assert!(traces.contains(&Trace::Tree(3, 2)));
    }

    #[test]
    fn each_edge_examined_from_both_ends() {
        let graph = BidirectionalGraph::from_edges([SEdge::new(0, 1)], true);
        let mut dfs = BidirectionalDfs::new(&graph);
        let log = trace_dfs(dfs.events());

        dfs.compute_from(0).unwrap();

        assert_eq!(
            log.take(),
            vec![
                Trace::Init(0),
                Trace::Init(1),
                Trace::Start(0),
                Trace::Discover(0),
                Trace::Examine(0, 1),
                Trace::Tree(0, 1),
                Trace::Discover(1),
                Trace::Examine(0, 1),
                Trace::Back(0, 1),
                Trace::Finish(1),
                Trace::Finish(0),
            ]
        );
    }

    #[test]
    fn weak_component_only() {
        let graph = BidirectionalGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(2, 1), SEdge::new(4, 5)],
            true,
        );

        let mut dfs = BidirectionalDfs::new(&graph);
        dfs.compute_from(1).unwrap();

        assert_eq!(dfs.vertex_color(&2), Some(Color::Black));
        assert_eq!(dfs.vertex_color(&4), Some(Color::White));

        let mut dfs = BidirectionalDfs::new(&graph).with_process_all_components(true);
        dfs.compute_from(1).unwrap();
        assert_eq!(dfs.vertex_color(&5), Some(Color::Black));
    }

    #[test]
    fn absent_root() {
        let graph = BidirectionalGraph::from_edges([SEdge::new(0, 1)], true);
        let mut dfs = BidirectionalDfs::new(&graph);

        assert_matches!(dfs.compute_from(2), Err(Error::VertexNotFound));
    }
}
