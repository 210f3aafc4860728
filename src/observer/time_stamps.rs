use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;

use crate::core::VertexType;

use super::{Observer, ObserverGuard, TimeStampEvents};

struct TimeStamps<V> {
    discover_times: FxHashMap<V, usize>,
    finish_times: FxHashMap<V, usize>,
    time: usize,
}

/// Records discover and finish times of vertices.
///
/// A single counter is incremented on every discovery and every finish. For a
/// depth-first search, the intervals `discover..finish` of any two vertices
/// are either nested or disjoint.
pub struct VertexTimeStamper<V> {
    state: Rc<RefCell<TimeStamps<V>>>,
}

impl<V: VertexType> VertexTimeStamper<V> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(TimeStamps {
                discover_times: FxHashMap::default(),
                finish_times: FxHashMap::default(),
                time: 0,
            })),
        }
    }

    pub fn discover_time(&self, vertex: &V) -> Option<usize> {
        self.state.borrow().discover_times.get(vertex).copied()
    }

    pub fn finish_time(&self, vertex: &V) -> Option<usize> {
        self.state.borrow().finish_times.get(vertex).copied()
    }

    pub fn discover_times(&self) -> FxHashMap<V, usize> {
        self.state.borrow().discover_times.clone()
    }

    pub fn finish_times(&self) -> FxHashMap<V, usize> {
        self.state.borrow().finish_times.clone()
    }

    /// Vertices sorted by decreasing finish time.
    ///
    /// After a depth-first search of an acyclic graph, this is a topological
    /// order.
    pub fn by_decreasing_finish_time(&self) -> Vec<V> {
        let state = self.state.borrow();
        let mut vertices = state
            .finish_times
            .iter()
            .map(|(vertex, time)| (*time, vertex.clone()))
            .collect::<Vec<_>>();
        vertices.sort_unstable_by(|(a, _), (b, _)| b.cmp(a));
        vertices.into_iter().map(|(_, vertex)| vertex).collect()
    }
}

impl<V: VertexType> Default for VertexTimeStamper<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for VertexTimeStamper<V> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<A> Observer<A> for VertexTimeStamper<A::Vertex>
where
    A: TimeStampEvents,
{
    fn attach(&self, algorithm: &A) -> ObserverGuard {
        let started = algorithm.state_events().started.subscribe({
            let state = Rc::clone(&self.state);
            move |_| {
                let mut state = state.borrow_mut();
                state.discover_times.clear();
                state.finish_times.clear();
                state.time = 0;
            }
        });

        let discover = algorithm.discover_vertex_event().subscribe({
            let state = Rc::clone(&self.state);
            move |vertex| {
                let mut state = state.borrow_mut();
                let time = state.time;
                state.discover_times.insert(vertex.clone(), time);
                state.time += 1;
            }
        });

        let finish = algorithm.finish_vertex_event().subscribe({
            let state = Rc::clone(&self.state);
            move |vertex| {
                let mut state = state.borrow_mut();
                let time = state.time;
                state.finish_times.insert(vertex.clone(), time);
                state.time += 1;
            }
        });

        ObserverGuard::new(vec![started, discover, finish])
    }
}
