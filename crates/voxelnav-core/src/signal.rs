//! Payload-free broadcast change notification.
//!
//! A [`Signal`] holds an ordered list of listeners. [`Signal::subscribe`]
//! returns a [`Subscription`] guard; the listener stays registered until the
//! guard is dropped. Composites keep the guards for their children's signals
//! as fields, so dropping the composite unsubscribes it.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use voxelnav_core::Signal;
//!
//! let signal = Signal::new();
//! let hits = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&hits);
//! let subscription = signal.subscribe(move || counter.set(counter.get() + 1));
//!
//! signal.dispatch();
//! drop(subscription);
//! signal.dispatch();
//! assert_eq!(hits.get(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener = Rc<dyn Fn()>;
type ListenerList = RefCell<Vec<Listener>>;

/// Broadcast signal without payload.
///
/// Cloning a signal yields another handle to the same listener list.
#[derive(Clone, Default)]
pub struct Signal {
    listeners: Rc<ListenerList>,
}

impl Signal {
    /// Create a signal with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It is removed when the returned guard is dropped.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let listener: Listener = Rc::new(listener);
        self.listeners.borrow_mut().push(Rc::clone(&listener));
        Subscription {
            listener,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Invoke every listener in subscription order.
    ///
    /// The list is snapshotted first, so listeners may subscribe, unsubscribe
    /// or dispatch again while running.
    pub fn dispatch(&self) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Registration guard returned by [`Signal::subscribe`].
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    listener: Listener,
    listeners: Weak<ListenerList>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .borrow_mut()
                .retain(|item| !Rc::ptr_eq(item, &self.listener));
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &(self.listeners.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let hits = Rc::new(Cell::new(0));
        let inner = Rc::clone(&hits);
        (hits, move || inner.set(inner.get() + 1))
    }

    #[test]
    fn dispatch_reaches_all_listeners() {
        let signal = Signal::new();
        let (a, fa) = counter();
        let (b, fb) = counter();
        let _sa = signal.subscribe(fa);
        let _sb = signal.subscribe(fb);

        signal.dispatch();
        signal.dispatch();
        assert_eq!(a.get(), 2);
        assert_eq!(b.get(), 2);
        assert_eq!(signal.listener_count(), 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let signal = Signal::new();
        let (hits, f) = counter();
        let subscription = signal.subscribe(f);
        signal.dispatch();
        subscription.unsubscribe();
        signal.dispatch();
        assert_eq!(hits.get(), 1);
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let signal = Signal::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&order);
        let second = Rc::clone(&order);
        let _s1 = signal.subscribe(move || first.borrow_mut().push(1));
        let _s2 = signal.subscribe(move || second.borrow_mut().push(2));
        signal.dispatch();
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn listener_may_subscribe_during_dispatch() {
        let signal = Signal::new();
        let late = Rc::new(RefCell::new(Vec::new()));
        let handle = signal.clone();
        let sink = Rc::clone(&late);
        let _s = signal.subscribe(move || {
            sink.borrow_mut().push(handle.subscribe(|| {}));
        });
        signal.dispatch();
        assert_eq!(signal.listener_count(), 2);
    }

    #[test]
    fn subscription_outliving_signal_is_harmless() {
        let signal = Signal::new();
        let subscription = signal.subscribe(|| {});
        drop(signal);
        drop(subscription);
    }
}
