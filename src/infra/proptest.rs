//! Random graph generation for property-based tests.
//!
//! Graphs have `usize` vertices numbered from zero and [`SEdge`] edges. The
//! value tree shrinks the structure by removing vertices and edges.

use std::{collections::BTreeMap, fmt, marker::PhantomData};

use proptest::{
    bool::weighted,
    strategy::{NewTree, Strategy, ValueTree},
    test_runner::{Reason, TestRunner},
};
use rustc_hash::FxHashSet;

use crate::{
    core::SEdge,
    storage::{AdjacencyGraph, BidirectionalGraph, UndirectedGraph},
};

/// Graph types that can be produced by [`GraphStrategy`].
pub trait GeneratedGraph: fmt::Debug {
    const IS_DIRECTED: bool;

    fn generate(
        vertices: impl Iterator<Item = usize>,
        edges: impl Iterator<Item = SEdge<usize>>,
        allow_parallel_edges: bool,
    ) -> Self;
}

impl GeneratedGraph for AdjacencyGraph<usize, SEdge<usize>> {
    const IS_DIRECTED: bool = true;

    fn generate(
        vertices: impl Iterator<Item = usize>,
        edges: impl Iterator<Item = SEdge<usize>>,
        allow_parallel_edges: bool,
    ) -> Self {
        let mut graph = Self::new(allow_parallel_edges);
        graph.add_vertex_range(vertices);
        for edge in edges {
            graph.add_verts_and_edge(edge);
        }
        graph
    }
}

impl GeneratedGraph for BidirectionalGraph<usize, SEdge<usize>> {
    const IS_DIRECTED: bool = true;

    fn generate(
        vertices: impl Iterator<Item = usize>,
        edges: impl Iterator<Item = SEdge<usize>>,
        allow_parallel_edges: bool,
    ) -> Self {
        let mut graph = Self::new(allow_parallel_edges);
        graph.add_vertex_range(vertices);
        for edge in edges {
            graph.add_verts_and_edge(edge);
        }
        graph
    }
}

impl GeneratedGraph for UndirectedGraph<usize, SEdge<usize>> {
    const IS_DIRECTED: bool = false;

    fn generate(
        vertices: impl Iterator<Item = usize>,
        edges: impl Iterator<Item = SEdge<usize>>,
        allow_parallel_edges: bool,
    ) -> Self {
        let mut graph = Self::new(allow_parallel_edges);
        graph.add_vertex_range(vertices);
        for edge in edges {
            graph.add_verts_and_edge(edge);
        }
        graph
    }
}

pub fn graph_directed() -> GraphStrategy<AdjacencyGraph<usize, SEdge<usize>>> {
    GraphStrategy::new()
}

pub fn graph_bidirectional() -> GraphStrategy<BidirectionalGraph<usize, SEdge<usize>>> {
    GraphStrategy::new()
}

pub fn graph_undirected() -> GraphStrategy<UndirectedGraph<usize, SEdge<usize>>> {
    GraphStrategy::new()
}

pub struct GraphStrategy<G> {
    params: StrategyParams,
    graph: PhantomData<G>,
}

// G is phantom data, we should not require Debug bound on it.
impl<G> fmt::Debug for GraphStrategy<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphStrategy")
            .field("params", &self.params)
            .finish()
    }
}

macro_rules! delegate_builder_fn {
    ($name:ident$(, $param:ident: $param_type:ty)*) => {
        #[doc = concat!("See [StrategyParams::", stringify!($name), "](StrategyParams::", stringify!($name), ") for details.")]
        pub fn $name(self, $($param: $param_type),*) -> Self {
            Self {
                params: self.params.$name($($param,)*),
                ..self
            }
        }
    }
}

impl<G: GeneratedGraph> GraphStrategy<G> {
    pub fn new() -> Self {
        Self::with_params(StrategyParams::default())
    }

    pub fn with_params(params: StrategyParams) -> Self {
        Self {
            params,
            graph: PhantomData,
        }
    }

    // Builder pattern on the strategy itself to allow usage as in
    // `graph_directed().max_size(100).acyclic()`.
    delegate_builder_fn!(max_size, max_size: usize);
    delegate_builder_fn!(acyclic);
    delegate_builder_fn!(allow_loops);
    delegate_builder_fn!(multi_edge_prob, multi_edge_prob: f32);
    delegate_builder_fn!(density, density: f32);
    delegate_builder_fn!(sparse);
}

impl<G: GeneratedGraph> Default for GraphStrategy<G> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct StrategyParams {
    max_size: usize,
    acyclic: bool,
    allow_loops: bool,
    multi_edge_prob: f32,
    // (0, 1] - 1 means no limitation in choosing p, lower values artificially decrease chosen p
    density: f32,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            max_size: 16,
            acyclic: false,
            allow_loops: false,
            multi_edge_prob: 0.0,
            density: 1.0,
        }
    }
}

impl StrategyParams {
    pub fn max_size(self, max_size: usize) -> Self {
        Self { max_size, ..self }
    }

    /// Only edges from a higher to a lower vertex are generated. Applies to
    /// directed graphs only.
    pub fn acyclic(self) -> Self {
        Self {
            acyclic: true,
            ..self
        }
    }

    pub fn allow_loops(self) -> Self {
        Self {
            allow_loops: true,
            ..self
        }
    }

    /// Probability of repeating a generated edge. A nonzero value makes the
    /// generated graph allow parallel edges.
    pub fn multi_edge_prob(self, multi_edge_prob: f32) -> Self {
        assert!(
            (0.0..=0.1).contains(&multi_edge_prob),
            "multi edge probability must be in [0, 0.1] range"
        );
        Self {
            multi_edge_prob,
            ..self
        }
    }

    pub fn density(self, density: f32) -> Self {
        assert!(
            density > 0.0 && density <= 1.0,
            "density must be in (0, 1] range"
        );
        Self { density, ..self }
    }

    pub fn sparse(self) -> Self {
        self.density(0.05)
    }
}

impl<G: GeneratedGraph> Strategy for GraphStrategy<G> {
    type Tree = GraphValueTree<G>;
    type Value = G;

    fn new_tree(&self, runner: &mut TestRunner) -> NewTree<Self> {
        assert!(
            G::IS_DIRECTED || !self.params.acyclic,
            "acyclic undirected graphs are not supported"
        );

        let n = sample(0..=self.params.max_size, runner)?;
        let p = sample(0.0f32..1.0, runner)? * self.params.density;

        // Efficient generation of large random networks
        // http://vlado.fmf.uni-lj.si/pub/networks/doc/ms/rndgen.pdf

        let m_guess = if n > 0 {
            ((n * (n - 1) / 2) as f32 * p).round() as usize
        } else {
            0
        };
        let mut edges = Vec::with_capacity(m_guess);

        let mut v = 1;
        let mut w = usize::MAX; // -1

        while v < n {
            let r = sample(0.0f32..1.0, runner)?;
            w = w.wrapping_add(1) + ((1.0 - r).log10() / (1.0 - p).log10()).floor() as usize;

            if self.params.allow_loops {
                // Using `w > v` instead of `w >= v` to allow loops.
                while w > v && v < n {
                    w -= v;
                    v += 1;
                }
            } else {
                while w >= v && v < n {
                    w -= v;
                    v += 1;
                }
            }

            if v < n {
                // For directed acyclic graph or in half of the cases, keep
                // the edge going to the lower vertex. Otherwise swap the
                // vertices so that a directed cycle is possible.
                let keep = G::IS_DIRECTED && self.params.acyclic || sample(weighted(0.5), runner)?;
                let (s, t) = if keep { (w, v) } else { (v, w) };

                edges.push((s, t));

                while sample(weighted(self.params.multi_edge_prob as f64), runner)? {
                    edges.push((s, t));
                }
            }
        }

        Ok(GraphValueTree {
            vertex_count: n,
            edges,
            allow_parallel_edges: self.params.multi_edge_prob > 0.0,
            state: None,
            graph: PhantomData,
        })
    }
}

// Random values come from proptest strategies, never from the rand API behind
// `TestRunner::rng`.
fn sample<S: Strategy>(strategy: S, runner: &mut TestRunner) -> Result<S::Value, Reason> {
    Ok(strategy.new_tree(runner)?.current())
}

pub struct GraphValueTree<G> {
    vertex_count: usize,
    edges: Vec<(usize, usize)>,
    allow_parallel_edges: bool,
    state: Option<ShrinkState>,
    graph: PhantomData<G>,
}

// G is phantom data here too.
impl<G> Clone for GraphValueTree<G> {
    fn clone(&self) -> Self {
        Self {
            vertex_count: self.vertex_count,
            edges: self.edges.clone(),
            allow_parallel_edges: self.allow_parallel_edges,
            state: self.state.clone(),
            graph: PhantomData,
        }
    }
}

impl<G> fmt::Debug for GraphValueTree<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphValueTree")
            .field("vertex_count", &self.vertex_count)
            .field("edges", &self.edges)
            .field("state", &self.state)
            .finish()
    }
}

impl<G: GeneratedGraph> ValueTree for GraphValueTree<G> {
    type Value = G;

    fn current(&self) -> G {
        let empty = Removed::default();
        let removed = self
            .state
            .as_ref()
            .map(|state| &state.current)
            .unwrap_or(&empty);

        let vertices = (0..self.vertex_count).filter(|v| !removed.vertices.contains(v));
        let edges = self
            .edges
            .iter()
            .enumerate()
            .filter(|&(e, &edge)| removed.edge_exists(e, edge))
            .map(|(_, &(s, t))| SEdge::new(s, t));

        G::generate(vertices, edges, self.allow_parallel_edges)
    }

    fn simplify(&mut self) -> bool {
        // We start with removing all vertices with the lowest degree, which
        // gets rid of uninteresting parts of the graph quickly. Then we
        // remove vertices one by one and finally edges one by one.
        //
        // Removing vertices first is more effective, because each removal
        // takes the incident edges with it.
        let state = self
            .state
            .get_or_insert_with(|| ShrinkState::new(&self.edges));

        state.simplify(self.vertex_count, &self.edges)
    }

    fn complicate(&mut self) -> bool {
        match self.state.as_mut() {
            Some(state) => state.complicate(self.vertex_count, &self.edges),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shrink {
    LowestDegree,
    Vertex(usize),
    Edge(usize),
}

#[derive(Debug, Clone, Default)]
struct Removed {
    vertices: FxHashSet<usize>,
    edges: FxHashSet<usize>,
}

impl Removed {
    fn vertex_exists(&self, v: usize) -> bool {
        !self.vertices.contains(&v)
    }

    fn edge_exists(&self, e: usize, (src, dst): (usize, usize)) -> bool {
        !(self.vertices.contains(&src) || self.vertices.contains(&dst) || self.edges.contains(&e))
    }
}

#[derive(Debug, Clone)]
struct ShrinkState {
    current: Removed,
    high: Option<Removed>,
    command: Option<Shrink>,
    // Number of edges between an ordered pair, keyed by both orientations.
    neighbors: BTreeMap<(usize, usize), usize>,
}

impl ShrinkState {
    fn new(edges: &[(usize, usize)]) -> Self {
        let mut neighbors = BTreeMap::new();

        for &(src, dst) in edges {
            *neighbors.entry((src, dst)).or_default() += 1;
            if src != dst {
                *neighbors.entry((dst, src)).or_default() += 1;
            }
        }

        Self {
            current: Removed::default(),
            high: None,
            command: Some(Shrink::LowestDegree),
            neighbors,
        }
    }

    fn simplify(&mut self, vertex_count: usize, edges: &[(usize, usize)]) -> bool {
        let Some(command) = self.command else {
            return false;
        };

        if self.current.vertices.len() == vertex_count {
            // Empty graph.
            return false;
        }

        self.high = Some(self.current.clone());

        let (remove_vertices, remove_edges, command) = match command {
            Shrink::LowestDegree => {
                let min_degree = (0..vertex_count)
                    .filter(|&v| self.current.vertex_exists(v))
                    .map(|v| self.degree(v))
                    .min()
                    .unwrap_or_default();

                let remove = (0..vertex_count)
                    .filter(|&v| self.current.vertex_exists(v))
                    .filter(|&v| self.degree(v) == min_degree)
                    .collect::<Vec<_>>();

                (remove, Vec::new(), Some(Shrink::LowestDegree))
            }
            Shrink::Vertex(v) => (vec![v], Vec::new(), self.next_command(vertex_count, edges)),
            Shrink::Edge(e) => (Vec::new(), vec![e], self.next_command(vertex_count, edges)),
        };

        for v in remove_vertices {
            self.current.vertices.insert(v);
            self.neighbors
                .retain(|&(src, dst), _| !(src == v || dst == v));
        }

        for e in remove_edges {
            let (src, dst) = edges[e];
            self.current.edges.insert(e);

            for key in [(src, dst), (dst, src)] {
                if let Some(count) = self.neighbors.get_mut(&key) {
                    *count = count.saturating_sub(1);
                }
            }
        }

        self.command = command;
        true
    }

    fn complicate(&mut self, vertex_count: usize, edges: &[(usize, usize)]) -> bool {
        self.current = match self.high.take() {
            Some(high) => high,
            None => return false,
        };

        if self.command == Some(Shrink::LowestDegree) {
            self.command = self.next_command(vertex_count, edges);
        }

        true
    }

    fn degree(&self, v: usize) -> usize {
        self.neighbors
            .range((v, 0)..=(v, usize::MAX))
            .map(|(_, d)| d)
            .sum()
    }

    fn next_command(&self, vertex_count: usize, edges: &[(usize, usize)]) -> Option<Shrink> {
        let first_edge = |from: usize| {
            (from..edges.len())
                .find(|&e| self.current.edge_exists(e, edges[e]))
                .map(Shrink::Edge)
        };

        match self.command? {
            Shrink::LowestDegree => (0..vertex_count)
                .find(|&v| self.current.vertex_exists(v))
                .map(Shrink::Vertex),
            Shrink::Vertex(v) => ((v + 1)..vertex_count)
                .find(|&w| self.current.vertex_exists(w))
                .map(Shrink::Vertex)
                .or_else(|| first_edge(0)),
            Shrink::Edge(e) => first_edge(e + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::{strategy::check_strategy_sanity, test_runner::TestRunner};

    use crate::core::{Edge, EdgeSet, ImplicitGraph, VertexSet};

    use super::*;

    #[test]
    #[ignore = "takes too long, run it only when the strategy is changed"]
    fn graph_strategy_sanity() {
        // Graphs are compared by their vertices and edges in enumeration
        // order.
        let strategy = graph_undirected().max_size(16).prop_map(|graph| {
            let vertices = graph.vertices().copied().collect::<Vec<_>>();
            let edges = graph
                .edges()
                .map(|edge| (*edge.source(), *edge.target()))
                .collect::<Vec<_>>();
            (vertices, edges)
        });

        check_strategy_sanity(strategy, None);
    }

    #[test]
    fn simplifies_structure() {
        let strategy = graph_undirected().max_size(64);
        let mut runner = TestRunner::deterministic();
        let mut tree = loop {
            let tree = strategy.new_tree(&mut runner).unwrap();
            if tree.current().edge_count() > 0 {
                break tree;
            }
        };

        loop {
            let graph = tree.current();

            if graph.vertex_count() < 1 || graph.edge_count() < 1 {
                if !tree.complicate() {
                    break;
                }
            } else if !tree.simplify() {
                break;
            }
        }

        let graph = tree.current();

        // No loops and multi edges => two vertices connected with one edge.
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn acyclic_edges_go_down() {
        let strategy = graph_directed().max_size(32).acyclic();
        let mut runner = TestRunner::deterministic();

        for _ in 0..16 {
            let graph = strategy.new_tree(&mut runner).unwrap().current();
            for vertex in graph.vertices() {
                for edge in graph.out_edges(vertex).unwrap() {
                    assert!(edge.target() < edge.source());
                }
            }
        }
    }
}
