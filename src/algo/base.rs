//! Shared lifecycle of the rooted algorithms.
//!
//! A computation goes through `NotRunning -> Running -> Finished` or, when
//! cancelled or failed, `Running -> PendingAbortion -> Aborted`. The state
//! transitions are announced through [`StateEvents`].

use std::{
    cell::Cell,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{
    core::{Error, VertexType},
    event::event_set,
};

/// Cooperative cancellation signal.
///
/// The handle is cheap to clone and can be passed to another thread or
/// captured by an event handler. The algorithm polls it at its checkpoints
/// and stops with [`Error::Aborted`] at the next one after
/// [`cancel`](CancelManager::cancel) was called.
#[derive(Debug, Clone, Default)]
pub struct CancelManager {
    flag: Arc<AtomicBool>,
}

impl CancelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelling(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputationState {
    NotRunning,
    Running,
    PendingAbortion,
    Finished,
    Aborted,
}

event_set! {
    /// Notifications about the lifecycle of a computation.
    pub struct StateEvents<V> {
        state_changed: ComputationState,
        started: (),
        finished: (),
        aborted: (),
        /// Raised when the root vertex is set to a different value or cleared.
        root_vertex_changed: Option<V>,
    }
}

/// State common to all rooted algorithms: the optional root vertex, the
/// computation state and the cancel manager.
pub struct AlgorithmBase<V> {
    root: Option<V>,
    state: Cell<ComputationState>,
    cancel: CancelManager,
    events: StateEvents<V>,
}

impl<V: VertexType> AlgorithmBase<V> {
    pub fn new() -> Self {
        Self::with_cancel_manager(CancelManager::new())
    }

    /// Uses the cancel manager of a host, so that the host can cancel this
    /// algorithm together with others sharing the same manager.
    pub fn with_cancel_manager(cancel: CancelManager) -> Self {
        Self {
            root: None,
            state: Cell::new(ComputationState::NotRunning),
            cancel,
            events: StateEvents::default(),
        }
    }

    pub fn state(&self) -> ComputationState {
        self.state.get()
    }

    pub fn cancel_manager(&self) -> &CancelManager {
        &self.cancel
    }

    /// Replaces the cancel manager, e.g. with the one of a host.
    pub fn set_cancel_manager(&mut self, cancel: CancelManager) {
        self.cancel = cancel;
    }

    pub fn events(&self) -> &StateEvents<V> {
        &self.events
    }

    pub fn root_vertex(&self) -> Option<&V> {
        self.root.as_ref()
    }

    pub fn set_root_vertex(&mut self, root: V) {
        let changed = self.root.as_ref() != Some(&root);
        self.root = Some(root);

        if changed {
            self.events.root_vertex_changed.raise(&self.root);
        }
    }

    pub fn clear_root_vertex(&mut self) {
        if self.root.take().is_some() {
            self.events.root_vertex_changed.raise(&None);
        }
    }

    /// Requests cancellation of the running computation.
    pub fn abort(&self) {
        self.cancel.cancel();

        if self.state.get() == ComputationState::Running {
            self.set_state(ComputationState::PendingAbortion);
        }
    }

    /// The cancellation checkpoint.
    pub fn throw_if_cancellation_requested(&self) -> Result<(), Error> {
        if self.cancel.is_cancelling() {
            Err(Error::Aborted)
        } else {
            Ok(())
        }
    }

    pub(crate) fn begin(&self) {
        self.set_state(ComputationState::Running);
        self.events.started.raise(&());
    }

    pub(crate) fn end(&self, result: Result<(), Error>) -> Result<(), Error> {
        // The next run must not observe a stale request.
        self.cancel.reset();

        match result {
            Ok(()) => {
                self.set_state(ComputationState::Finished);
                self.events.finished.raise(&());
            }
            Err(_) => {
                if self.state.get() != ComputationState::PendingAbortion {
                    self.set_state(ComputationState::PendingAbortion);
                }
                self.set_state(ComputationState::Aborted);
                self.events.aborted.raise(&());
            }
        }

        result
    }

    fn set_state(&self, state: ComputationState) {
        self.state.set(state);
        self.events.state_changed.raise(&state);
    }
}

impl<V: VertexType> Default for AlgorithmBase<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for AlgorithmBase<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmBase")
            .field("root", &self.root)
            .field("state", &self.state.get())
            .field("cancel", &self.cancel)
            .finish()
    }
}

/// An algorithm that may start at a given root vertex.
///
/// Implementors provide access to their [`AlgorithmBase`] and the
/// [`compute`](RootedAlgorithm::compute) entry point, everything else comes
/// for free.
pub trait RootedAlgorithm {
    type Vertex: VertexType;

    fn base(&self) -> &AlgorithmBase<Self::Vertex>;

    fn base_mut(&mut self) -> &mut AlgorithmBase<Self::Vertex>;

    /// Runs the algorithm. Starts at the root vertex if one is set.
    ///
    /// A root that is not in the graph fails with [`Error::VertexNotFound`]
    /// before any state is touched. A cancellation request stops the run
    /// with [`Error::Aborted`].
    fn compute(&mut self) -> Result<(), Error>;

    /// Sets the root vertex and runs the algorithm.
    fn compute_from(&mut self, root: Self::Vertex) -> Result<(), Error> {
        self.set_root_vertex(root);
        self.compute()
    }

    fn set_root_vertex(&mut self, root: Self::Vertex) {
        self.base_mut().set_root_vertex(root);
    }

    fn try_get_root_vertex(&self) -> Option<&Self::Vertex> {
        self.base().root_vertex()
    }

    fn clear_root_vertex(&mut self) {
        self.base_mut().clear_root_vertex();
    }

    fn state(&self) -> ComputationState {
        self.base().state()
    }

    fn abort(&self) {
        self.base().abort();
    }

    fn cancel_manager(&self) -> &CancelManager {
        self.base().cancel_manager()
    }

    fn state_events(&self) -> &StateEvents<Self::Vertex> {
        self.base().events()
    }
}

/// Drives one computation: announces the start, runs the steps and settles
/// the final state.
pub(crate) fn run<A, F>(algorithm: &mut A, steps: F) -> Result<(), Error>
where
    A: RootedAlgorithm,
    F: FnOnce(&mut A) -> Result<(), Error>,
{
    algorithm.base().begin();
    let result = steps(algorithm);
    algorithm.base().end(result)
}
