//! Arbitrary sequences of graph mutations for fuzzing the mutable storages.

use std::fmt;

use arbitrary::{Arbitrary, Unstructured};

use crate::{
    core::{EdgeSet, GraphBase, OwnableRef, SEdge, VertexSet, VertexType},
    storage::{AdjacencyGraph, BidirectionalGraph, UndirectedGraph},
};

/// Position into the current vertex or edge enumeration, taken modulo its
/// length.
#[derive(Debug, Arbitrary, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Index(pub usize);

impl Index {
    pub fn get(&self, m: usize) -> Option<usize> {
        if m > 0 {
            Some(self.0 % m)
        } else {
            None
        }
    }
}

#[derive(Debug, Arbitrary, Clone)]
pub enum MutOp<V> {
    AddVertex(V),
    RemoveVertex(Index),
    AddEdge(Index, Index),
    RemoveEdge(Index),
    Clear,
}

/// Mutable storages that [`MutOp`] can be applied to.
pub trait MutableGraph<V: VertexType>:
    GraphBase<Vertex = V, Edge = SEdge<V>> + VertexSet + EdgeSet
{
    fn add_vertex(&mut self, vertex: V) -> bool;
    fn remove_vertex(&mut self, vertex: &V) -> bool;
    fn add_edge(&mut self, edge: SEdge<V>) -> bool;
    fn remove_edge(&mut self, edge: &SEdge<V>) -> bool;
    fn clear(&mut self);
}

macro_rules! impl_mutable_graph {
    ($storage:ident) => {
        impl<V: VertexType> MutableGraph<V> for $storage<V, SEdge<V>> {
            fn add_vertex(&mut self, vertex: V) -> bool {
                $storage::add_vertex(self, vertex)
            }

            fn remove_vertex(&mut self, vertex: &V) -> bool {
                $storage::remove_vertex(self, vertex)
            }

            fn add_edge(&mut self, edge: SEdge<V>) -> bool {
                $storage::add_edge(self, edge).unwrap_or(false)
            }

            fn remove_edge(&mut self, edge: &SEdge<V>) -> bool {
                $storage::remove_edge(self, edge)
            }

            fn clear(&mut self) {
                $storage::clear(self)
            }
        }
    };
}

impl_mutable_graph!(AdjacencyGraph);
impl_mutable_graph!(BidirectionalGraph);
impl_mutable_graph!(UndirectedGraph);

impl<V: VertexType> MutOp<V> {
    /// Applies the operation. Returns `false` if it did not change the graph.
    pub fn apply<G: MutableGraph<V>>(self, graph: &mut G) -> bool {
        let n = graph.vertex_count();

        let nth_vertex = |graph: &G, index: Index| {
            index
                .get(n)
                .and_then(|i| graph.vertices().nth(i))
                .cloned()
        };

        match self {
            MutOp::AddVertex(vertex) => graph.add_vertex(vertex),
            MutOp::RemoveVertex(index) => match nth_vertex(&*graph, index) {
                Some(vertex) => graph.remove_vertex(&vertex),
                None => false,
            },
            MutOp::AddEdge(src, dst) => {
                match (nth_vertex(&*graph, src), nth_vertex(&*graph, dst)) {
                    (Some(src), Some(dst)) => graph.add_edge(SEdge::new(src, dst)),
                    _ => false,
                }
            }
            MutOp::RemoveEdge(index) => {
                let edge = index
                    .get(graph.edge_count())
                    .and_then(|i| graph.edges().nth(i))
                    .map(OwnableRef::into_owned);

                match edge {
                    Some(edge) => graph.remove_edge(&edge),
                    None => false,
                }
            }
            MutOp::Clear => {
                let changed = n > 0;
                graph.clear();
                changed
            }
        }
    }
}

pub struct MutOpsSeq<V>(pub Vec<MutOp<V>>);

impl<V> IntoIterator for MutOpsSeq<V> {
    type Item = MutOp<V>;
    type IntoIter = std::vec::IntoIter<MutOp<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<V: VertexType> MutOpsSeq<V> {
    pub fn apply<G: MutableGraph<V>>(self, graph: &mut G) {
        for op in self {
            op.apply(graph);
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for MutOpsSeq<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MutOpsSeq(vec![")?;

        for op in self.0.iter() {
            writeln!(f, "    MutOp::{:?},", op)?;
        }

        writeln!(f, "])")?;
        writeln!(f, ".apply(&mut graph);")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum OpKind {
    AddVertex,
    AddEdge,
    RemoveVertex,
    RemoveEdge,
    Clear,
}

impl<'a, V> Arbitrary<'a> for MutOpsSeq<V>
where
    V: Arbitrary<'a>,
{
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let n_target = u.int_in_range(10..=1000)?;
        let r = u.nice_f64()?;

        let m_target = ((n_target * (n_target - 1) / 2) as f64 * r).round() as usize;

        let total = u.len();

        let mut n = 0usize;
        let mut m = 0usize;
        let mut seq = Vec::with_capacity(n_target);

        while !u.is_empty() {
            let rv = (n as f64 / n_target as f64).min(1.0);
            let re = (m as f64 / m_target.max(1) as f64).min(1.0);
            let r = (total - u.len()) as f64 / total as f64;

            let op = match arbitrary_op(u, rv, re, r) {
                Ok(op) => op,
                Err(_) => break,
            };

            match op {
                MutOp::AddVertex(_) => n += 1,
                MutOp::RemoveVertex(_) => n = n.saturating_sub(1),
                MutOp::AddEdge(_, _) => m += 1,
                MutOp::RemoveEdge(_) => m = m.saturating_sub(1),
                MutOp::Clear => {
                    n = 0;
                    m = 0
                }
            }

            seq.push(op);
        }

        Ok(MutOpsSeq(seq))
    }
}

fn arbitrary_op<'a, V>(
    u: &mut Unstructured<'a>,
    rv: f64,
    re: f64,
    r: f64,
) -> arbitrary::Result<MutOp<V>>
where
    V: Arbitrary<'a>,
{
    // The more vertices/edges are in the graph, the less is needed to add them.
    // The ratio is biased towards adding by averaging with the progress ratio,
    // less so for edges so that we keep adding them during the whole process.
    let wv = non_linear_decrease(0.4 * rv + 0.6 * r);
    let we = non_linear_decrease(0.6 * re + 0.4 * r);

    u.choose_weighted(
        &[
            OpKind::AddVertex,
            OpKind::AddEdge,
            OpKind::RemoveVertex,
            OpKind::RemoveEdge,
            OpKind::Clear,
        ],
        // Removal weights are opposite to the adding weights, scaled down to
        // prefer adding. Clearing should be rare.
        &[wv, we, (1.0 - wv) * 0.25, (1.0 - we) * 0.5, 0.01],
    )
    .and_then(|kind| match kind {
        OpKind::AddVertex => Ok(MutOp::AddVertex(u.arbitrary()?)),
        OpKind::AddEdge => Ok(MutOp::AddEdge(u.arbitrary()?, u.arbitrary()?)),
        OpKind::RemoveVertex => Ok(MutOp::RemoveVertex(u.arbitrary()?)),
        OpKind::RemoveEdge => Ok(MutOp::RemoveEdge(u.arbitrary()?)),
        OpKind::Clear => Ok(MutOp::Clear),
    })
}

trait UnstructuredExt {
    fn nice_f64(&mut self) -> arbitrary::Result<f64>;
    fn choose_weighted<'b, T>(
        &mut self,
        choices: &'b [T],
        weights: &'b [f64],
    ) -> arbitrary::Result<&'b T>;
}

impl<'a> UnstructuredExt for Unstructured<'a> {
    fn nice_f64(&mut self) -> arbitrary::Result<f64> {
        const RESOLUTION: u8 = 100;
        let int = self.int_in_range(0..=RESOLUTION)?;
        Ok(int as f64 / RESOLUTION as f64)
    }

    fn choose_weighted<'b, T>(
        &mut self,
        choices: &'b [T],
        weights: &'b [f64],
    ) -> arbitrary::Result<&'b T> {
        if choices.is_empty() || choices.len() != weights.len() {
            return Err(arbitrary::Error::EmptyChoose);
        }

        let weight_sum = weights.iter().copied().sum::<f64>();

        let random = self.nice_f64()?;
        let bound = random * weight_sum;

        let mut acc = 0.0;
        for (choice, weight) in choices.iter().zip(weights.iter().copied()) {
            acc += weight;

            if acc >= bound {
                return Ok(choice);
            }
        }

        // Rounding may leave the accumulated sum just below the bound.
        Ok(&choices[choices.len() - 1])
    }
}

// f(0) = 1, f(1) ~= 0.152
fn non_linear_decrease(x: f64) -> f64 {
    1.0 / (x + 1.0).powf(std::f64::consts::E)
}

#[cfg(test)]
mod tests {
    use crate::{infra::testing::check_consistency, storage::CompressedSparseRowGraph};

    use super::*;

    fn pseudo_random_bytes(len: usize, seed: u32) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (state >> 16) as u8
            })
            .collect()
    }

    #[test]
    fn mut_ops_seq_keeps_storages_consistent() {
        for seed in 0..32 {
            let bytes = pseudo_random_bytes(4096, seed);
            let ops = MutOpsSeq::<u8>::arbitrary(&mut Unstructured::new(&bytes)).unwrap();
            let ops = ops.0;

            let mut adjacency = AdjacencyGraph::<u8, SEdge<u8>>::new(true);
            let mut bidirectional = BidirectionalGraph::<u8, SEdge<u8>>::new(true);
            let mut undirected = UndirectedGraph::<u8, SEdge<u8>>::new(false);

            for op in ops {
                op.clone().apply(&mut adjacency);
                op.clone().apply(&mut bidirectional);
                op.apply(&mut undirected);
            }

            check_consistency(&adjacency).unwrap();
            check_consistency(&bidirectional).unwrap();
            check_consistency(&CompressedSparseRowGraph::from_graph(&adjacency)).unwrap();

            assert_eq!(adjacency.vertex_count(), bidirectional.vertex_count());
            assert_eq!(adjacency.edge_count(), bidirectional.edge_count());
            assert_eq!(adjacency.vertex_count(), undirected.vertex_count());
        }
    }

    #[test]
    fn remove_vertex_drops_incident_edges() {
        let mut graph = AdjacencyGraph::<u8, SEdge<u8>>::new(false);
        MutOpsSeq(vec![
            MutOp::AddVertex(1),
            MutOp::AddVertex(2),
            MutOp::AddEdge(Index(0), Index(1)),
            MutOp::AddEdge(Index(1), Index(0)),
            MutOp::RemoveVertex(Index(0)),
        ])
        .apply(&mut graph);

        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}
