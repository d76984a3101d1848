use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use log::trace;

pub type Callback<T> = Rc<dyn Fn(&T)>;
pub type SubscriptionId = u64;

struct Listeners<T> {
    entries: RefCell<Vec<(SubscriptionId, Callback<T>)>>,
    next_id: Cell<SubscriptionId>,
}

impl<T> Listeners<T> {
    fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }
}

/// A single-threaded broadcast channel. Both halves share the listener list.
pub struct Channel;

impl Channel {
    #[allow(clippy::new_ret_no_self)]
    pub fn new<T: Debug>() -> (EventEmitter<T>, EventObserver<T>) {
        let listeners = Rc::new(Listeners {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        });
        (
            EventEmitter {
                listeners: Rc::clone(&listeners),
            },
            EventObserver { listeners },
        )
    }
}

pub struct EventEmitter<T: Debug> {
    listeners: Rc<Listeners<T>>,
}

impl<T: Debug> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<T: Debug> EventEmitter<T> {
    /// Delivers `data` to every listener subscribed when the call starts. Listeners may
    /// subscribe, unsubscribe or emit on this channel from inside their callback.
    pub fn emit(&self, data: &T) {
        let callbacks: Vec<Callback<T>> = self
            .listeners
            .entries
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        trace!(target: "events", "Emitting event to {} listeners: {:?}", callbacks.len(), data);
        for callback in callbacks {
            callback(data);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.entries.borrow().len()
    }
}

pub struct EventObserver<T: Debug> {
    listeners: Rc<Listeners<T>>,
}

impl<T: Debug> Clone for EventObserver<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<T: Debug> EventObserver<T> {
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber<T>
    where
        F: Fn(&T) + 'static,
    {
        let id = self.listeners.next_id.get();
        self.listeners.next_id.set(id + 1);
        self.listeners
            .entries
            .borrow_mut()
            .push((id, Rc::new(callback)));
        Unsubscriber {
            listeners: Rc::downgrade(&self.listeners),
            id,
        }
    }
}

/// Handle returned by [`EventObserver::subscribe`]; dropping it keeps the subscription alive.
pub struct Unsubscriber<T> {
    listeners: Weak<Listeners<T>>,
    id: SubscriptionId,
}

impl<T> Unsubscriber<T> {
    /// Returns false when the listener was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.listeners.upgrade() {
            Some(listeners) => listeners.remove(self.id),
            None => false,
        }
    }
}

impl<T> Debug for Unsubscriber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unsubscriber({})", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listener_receives_event() {
        let (emitter, observer) = Channel::new::<u32>();
        let sum = Rc::new(Cell::new(0));
        let first = sum.clone();
        let second = sum.clone();

        observer.subscribe(move |data: &u32| first.set(first.get() + data));
        observer.subscribe(move |data: &u32| second.set(second.get() + data));

        emitter.emit(&5);
        assert_eq!(sum.get(), 10);
        assert_eq!(emitter.listener_count(), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let (emitter, observer) = Channel::new::<u32>();
        let counter = Rc::new(Cell::new(0));
        let counter_clone = counter.clone();

        let unsubscriber = observer.subscribe(move |_| counter_clone.set(counter_clone.get() + 1));
        emitter.emit(&1);
        assert!(unsubscriber.unsubscribe());
        emitter.emit(&1);

        assert_eq!(counter.get(), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_listener_may_subscribe_while_emitting() {
        let (emitter, observer) = Channel::new::<u32>();
        let late_calls = Rc::new(Cell::new(0));
        let observer_clone = observer.clone();
        let late_calls_clone = late_calls.clone();

        observer.subscribe(move |_| {
            let late_calls = late_calls_clone.clone();
            observer_clone.subscribe(move |_| late_calls.set(late_calls.get() + 1));
        });

        emitter.emit(&1);
        // the listener added during the first emit only sees the second one
        assert_eq!(late_calls.get(), 0);
        emitter.emit(&2);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_unsubscribe_after_channel_dropped() {
        let unsubscriber = {
            let (_emitter, observer) = Channel::new::<u32>();
            observer.subscribe(|_| ())
        };
        assert!(!unsubscriber.unsubscribe());
    }
}
