//=========================================================================
// Observable
//=========================================================================
//
// Single-threaded listener registry used for every publish/subscribe
// seam in the client (inputs available, screen ready, animation end,
// menu selections, device callbacks).
//
// Architecture:
//   add(handler) → ObserverToken
//   remove(token)
//   notify(&payload) → handlers in registration order
//
// Notification iterates a snapshot of the registry, so handlers may add
// or remove observers (including themselves) while being notified.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

//=== ObserverToken =======================================================

/// Handle returned by [`Observable::add`], used to unregister a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u64);

//=== Observable ==========================================================

type Handler<T> = Rc<dyn Fn(&T)>;

struct Entry<T> {
    token: ObserverToken,
    handler: Handler<T>,
    once: bool,
}

/// Listener registry notifying handlers synchronously in registration order.
///
/// Registration and notification only need `&self`, so an observable can
/// be shared through an `Rc` or embedded in a shared scene handle.
pub struct Observable<T> {
    entries: RefCell<Vec<Entry<T>>>,
    next_token: Cell<u64>,
}

impl<T> Observable<T> {
    /// Creates an observable with no handlers.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_token: Cell::new(0),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a handler invoked on every notification.
    pub fn add(&self, handler: impl Fn(&T) + 'static) -> ObserverToken {
        self.insert(Rc::new(handler), false)
    }

    /// Registers a handler removed after its first notification.
    pub fn add_once(&self, handler: impl Fn(&T) + 'static) -> ObserverToken {
        self.insert(Rc::new(handler), true)
    }

    /// Unregisters a handler. Returns `false` if the token was unknown.
    pub fn remove(&self, token: ObserverToken) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.token != token);
        entries.len() != before
    }

    /// Unregisters every handler.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    //--- Notification -----------------------------------------------------

    /// Invokes every registered handler with `payload`.
    pub fn notify(&self, payload: &T) {
        let snapshot: Vec<Handler<T>> = {
            let mut entries = self.entries.borrow_mut();
            let handlers = entries.iter().map(|e| Rc::clone(&e.handler)).collect();
            entries.retain(|e| !e.once);
            handlers
        };

        for handler in snapshot {
            handler(payload);
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Returns the number of registered handlers.
    pub fn observer_count(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if at least one handler is registered.
    pub fn has_observers(&self) -> bool {
        !self.entries.borrow().is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn insert(&self, handler: Handler<T>, once: bool) -> ObserverToken {
        let token = ObserverToken(self.next_token.get());
        self.next_token.set(token.0 + 1);
        self.entries.borrow_mut().push(Entry { token, handler, once });
        token
    }
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("observers", &self.observer_count())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_reaches_handlers_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let observable = Observable::<i32>::new();

        let first = Rc::clone(&seen);
        observable.add(move |v| first.borrow_mut().push(("first", *v)));
        let second = Rc::clone(&seen);
        observable.add(move |v| second.borrow_mut().push(("second", *v)));

        observable.notify(&7);

        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn removed_handler_is_not_called() {
        let count = Rc::new(Cell::new(0));
        let observable = Observable::<()>::new();

        let c = Rc::clone(&count);
        let token = observable.add(move |_| c.set(c.get() + 1));

        assert!(observable.remove(token));
        observable.notify(&());

        assert_eq!(count.get(), 0);
        assert!(!observable.has_observers());
    }

    #[test]
    fn removing_unknown_token_returns_false() {
        let observable = Observable::<()>::new();
        let token = observable.add(|_| {});
        observable.remove(token);
        assert!(!observable.remove(token));
    }

    #[test]
    fn once_handler_fires_a_single_time() {
        let count = Rc::new(Cell::new(0));
        let observable = Observable::<()>::new();

        let c = Rc::clone(&count);
        observable.add_once(move |_| c.set(c.get() + 1));

        observable.notify(&());
        observable.notify(&());

        assert_eq!(count.get(), 1);
        assert_eq!(observable.observer_count(), 0);
    }

    #[test]
    fn handler_may_register_during_notify() {
        let observable = Rc::new(Observable::<()>::new());
        let inner = Rc::clone(&observable);
        observable.add(move |_| {
            inner.add(|_| {});
        });

        observable.notify(&());

        assert_eq!(observable.observer_count(), 2);
    }

    #[test]
    fn tokens_are_unique() {
        let observable = Observable::<()>::new();
        let a = observable.add(|_| {});
        let b = observable.add(|_| {});
        assert_ne!(a, b);
    }
}
