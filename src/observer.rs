//! Synchronous change notification.
//!
//! Every component that can change (dimensions, value providers, draw stages,
//! selections, panels) owns a [`Notifier`]. Subscribers register closures that
//! hold `Weak` back-references, so a subscription never keeps its subscriber
//! alive.
//!
//! Delivery is synchronous and re-entrant: the listener list is snapshotted
//! before any callback runs, so a callback may subscribe, unsubscribe, mutate
//! state or raise further notifications.
//!
//! Listeners registered through [`subscribe_weak`] carry their owner's `Weak`.
//! Once the owner is gone the entry is pruned on the next `notify` or `len`.
//! An owner still inside `Rc::new_cyclic` reads as gone, so a constructor must
//! not raise notifications on a source it subscribes to.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle returned by [`Notifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Rc<dyn Fn(&E)>;

struct Entry<E> {
    id: ListenerId,
    owner: Option<Weak<dyn Any>>,
    f: Listener<E>,
}

impl<E> Entry<E> {
    fn is_live(&self) -> bool {
        !matches!(&self.owner, Some(w) if w.strong_count() == 0)
    }
}

/// Registry of listeners for events of type `E`.
pub struct Notifier<E> {
    listeners: RefCell<Vec<Entry<E>>>,
    next_id: Cell<u64>,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.len())
            .finish()
    }
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a listener.
    pub fn subscribe(&self, f: impl Fn(&E) + 'static) -> ListenerId {
        self.push(None, Rc::new(f))
    }

    fn push(&self, owner: Option<Weak<dyn Any>>, f: Listener<E>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push(Entry { id, owner, f });
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id);
        listeners.len() != before
    }

    /// Drop listeners whose owner has been dropped.
    fn prune(&self) {
        self.listeners.borrow_mut().retain(Entry::is_live);
    }

    /// Deliver `event` to every live listener registered at the time of the call.
    pub fn notify(&self, event: &E) {
        self.prune();
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.f))
            .collect();
        for f in snapshot {
            f(event);
        }
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.prune();
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Subscribe a method-like callback on `target` without keeping it alive.
///
/// Events arriving after `target` is dropped are ignored, and the
/// registration itself is released on the source's next `notify` or `len`.
pub fn subscribe_weak<E: 'static, T: 'static>(
    source: &Notifier<E>,
    target: &Weak<T>,
    f: impl Fn(&T, &E) + 'static,
) -> ListenerId {
    let weak = Weak::clone(target);
    let owner: Weak<dyn Any> = weak.clone();
    source.push(
        Some(owner),
        Rc::new(move |e: &E| {
            if let Some(t) = weak.upgrade() {
                f(&t, e);
            }
        }),
    )
}
