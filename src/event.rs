//! Listener registries for algorithm and graph notifications.
//!
//! An [`Event`] is a list of handler closures. Subscribing returns a
//! [`Subscription`] guard and dropping the guard removes the handler again,
//! so an observer cannot outlive its registration by accident, not even when
//! the computation it observes unwinds.
//!
//! ```
//! use walkgraph::event::Event;
//! use std::{cell::Cell, rc::Rc};
//!
//! let event = Event::<i32>::new();
//! let sum = Rc::new(Cell::new(0));
//!
//! let subscription = event.subscribe({
//!     let sum = Rc::clone(&sum);
//!     move |value| sum.set(sum.get() + value)
//! });
//!
//! event.raise(&1);
//! event.raise(&2);
//! drop(subscription);
//! event.raise(&100);
//!
//! assert_eq!(sum.get(), 3);
//! ```

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

type Handler<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Registry<T> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

/// A named notification point with any number of handlers.
///
/// Handlers run synchronously, in subscription order, on the thread that
/// raises the event.
pub struct Event<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Event<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Registers the handler. It stays registered until the returned guard is
    /// dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            let handler: Handler<T> = Rc::new(RefCell::new(handler));
            registry.handlers.push((id, handler));
            id
        };

        let registry: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            // The event may be gone already, then there is nothing to detach
            // from.
            if let Some(registry) = registry.upgrade() {
                registry
                    .borrow_mut()
                    .handlers
                    .retain(|(handler_id, _)| *handler_id != id);
            }
        })
    }

    /// Calls all handlers with the arguments.
    pub fn raise(&self, args: &T) {
        // Work on a snapshot so that handlers are free to subscribe or detach
        // while the event is being raised.
        let handlers = {
            let registry = self.registry.borrow();
            if registry.handlers.is_empty() {
                return;
            }

            registry
                .handlers
                .iter()
                .map(|(_, handler)| Rc::clone(handler))
                .collect::<Vec<_>>()
        };

        for handler in handlers {
            (handler.borrow_mut())(args);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    pub fn has_handlers(&self) -> bool {
        self.handler_count() > 0
    }
}

impl<T: 'static> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("handlers", &self.registry.borrow().handlers.len())
            .finish()
    }
}

/// Guard of a registered handler. Dropping it detaches the handler.
#[must_use = "dropping the subscription detaches the handler immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new<F>(detach: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detaches the handler now. Same as dropping the guard.
    pub fn detach(self) {}

    /// Keeps the handler registered for the whole lifetime of the event.
    pub fn leak(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// Declares a struct of named [`Event`] registries together with its
/// `Default` and `Debug` implementations.
///
/// Every field `name: Args` becomes `pub name: Event<Args>`.
macro_rules! event_set {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident<$($param:ident),*> {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $args:ty,
            )*
        }
    ) => {
        $(#[$meta])*
        $vis struct $name<$($param),*> {
            $(
                $(#[$field_meta])*
                pub $field: $crate::event::Event<$args>,
            )*
        }

        impl<$($param: 'static),*> Default for $name<$($param),*> {
            fn default() -> Self {
                Self {
                    $($field: $crate::event::Event::new(),)*
                }
            }
        }

        impl<$($param),*> ::std::fmt::Debug for $name<$($param),*> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($name))
                    $(.field(stringify!($field), &self.$field))*
                    .finish()
            }
        }
    };
}

pub(crate) use event_set;
