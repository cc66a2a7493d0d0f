//! Listener registry
//!
//! Fans a notification out to every registered listener. Listeners are
//! removed with the id returned at subscription.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle returned by [`Emitter::subscribe`]
    pub struct ListenerId;
}

/// Listener function type
pub type Listener<T> = Box<dyn FnMut(&T) + Send>;

/// Dispatches notifications to registered listeners
pub struct Emitter<T> {
    listeners: SlotMap<ListenerId, Listener<T>>,
}

impl<T> Emitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
        }
    }

    /// Register a listener
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.listeners.insert(Box::new(listener))
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    /// Deliver a notification to every listener
    pub fn emit(&mut self, event: &T) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Drop every listener
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_reaches_all_listeners() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut emitter = Emitter::new();

        let first = seen.clone();
        emitter.subscribe(move |v: &u32| first.lock().unwrap().push(("first", *v)));
        let second = seen.clone();
        emitter.subscribe(move |v: &u32| second.lock().unwrap().push(("second", *v)));

        emitter.emit(&7);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&("first", 7)));
        assert!(seen.contains(&("second", 7)));
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut emitter = Emitter::new();

        let counter = count.clone();
        let id = emitter.subscribe(move |_: &()| *counter.lock().unwrap() += 1);

        emitter.emit(&());
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit(&());

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(emitter.is_empty());
    }
}
