//! Synchronous publish-to-many primitive.
//!
//! A [`Subject`] keeps an ordered list of observer slots. [`Subject::next`] calls every slot, in
//! subscription order, on the caller's stack. Each [`Subject::subscribe`] call creates a new
//! slot, even for the same observer, and returns a [`Subscription`] that removes exactly that
//! slot.
//!
//! # Re-entrancy
//!
//! The slot list is locked only to copy or mutate it, never while an observer runs. `next`
//! iterates over a snapshot, so observers may subscribe, unsubscribe or publish again from
//! inside a notification. Slots removed during a notification still see the value being
//! delivered; slots added during a notification first see the next one.
//!
//! ```rust
//! use teleport::Subject;
//!
//! let subject = Subject::<u32>::new();
//! let sub = subject.subscribe(|v: &u32| println!("got {v}"));
//! subject.next(&1);
//! sub.unsubscribe();
//! subject.next(&2); // nobody listening
//! assert!(subject.is_empty());
//! ```

use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

/// Anything that can be notified with a `&T`.
///
/// Implemented for every `Fn(&T) + Send + Sync` closure; implement it directly for stateful
/// observer objects.
pub trait Observer<T>: Send + Sync {
    /// Receive one value.
    fn next(&self, value: &T);
}

impl<T, F> Observer<T> for F
where
    F: Fn(&T) + Send + Sync,
{
    #[inline]
    fn next(&self, value: &T) {
        self(value)
    }
}

/// One subscribed observer.
struct Slot<T> {
    id: u64,
    observer: Arc<dyn Observer<T>>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            observer: self.observer.clone(),
        }
    }
}

/// The shared slot list.
struct Slots<T> {
    slots: Mutex<Vec<Slot<T>>>,
    next_id: AtomicU64,
}

impl<T> Slots<T> {
    fn lock(&self) -> MutexGuard<'_, Vec<Slot<T>>> {
        // Observers never run under this lock, so a poisoned guard still holds a consistent list.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) -> bool {
        let mut slots = self.lock();
        match slots.iter().position(|slot| slot.id == id) {
            Some(index) => {
                slots.remove(index);
                true
            }
            None => false,
        }
    }
}

/// An ordered set of observers notified synchronously.
pub struct Subject<T> {
    inner: Arc<Slots<T>>,
}

impl<T: 'static> Subject<T> {
    /// Create a subject with no observers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Slots {
                slots: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Add an observer at the end of the notification order.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T> + 'static,
    {
        self.subscribe_arc(Arc::new(observer))
    }

    /// Add an already shared observer at the end of the notification order.
    pub fn subscribe_arc(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().push(Slot { id, observer });

        let weak: Weak<Slots<T>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(slots) = weak.upgrade() {
                slots.remove(id);
            }
        })
    }

    /// Notify every current observer, in subscription order.
    ///
    /// With no observers this does nothing.
    pub fn next(&self, value: &T) {
        let snapshot: Vec<Slot<T>> = self.inner.lock().clone();
        for slot in snapshot {
            slot.observer.next(value);
        }
    }

    /// Drop every observer.
    pub fn unsubscribe_all(&self) {
        self.inner.lock().clear();
    }

    /// Number of subscribed slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nobody is subscribed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl<T: 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.inner.lock().len())
            .finish()
    }
}

/// Handle removing one observer slot.
///
/// Unsubscribing is idempotent. Dropping the handle leaves the observer subscribed.
pub struct Subscription {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Remove the observer this handle was created for.
    pub fn unsubscribe(&self) {
        let cancel = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Returns `true` once [`unsubscribe`](Self::unsubscribe) has been called.
    pub fn is_closed(&self) -> bool {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&u32) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |tag: &str| -> Box<dyn Fn(&u32) + Send + Sync> {
            let sink = sink.clone();
            let tag = tag.to_string();
            Box::new(move |v: &u32| sink.lock().unwrap().push(format!("{tag}:{v}")))
        };
        (log, make)
    }

    // ==================== Notification ====================

    #[test]
    fn next_without_observers_is_noop() {
        let subject = Subject::<u32>::new();

        subject.next(&1);

        assert!(subject.is_empty());
    }

    #[test]
    fn next_notifies_in_subscription_order() {
        // Given
        let subject = Subject::<u32>::new();
        let (log, make) = recorder();
        subject.subscribe(make("a"));
        subject.subscribe(make("b"));
        subject.subscribe(make("c"));

        // When
        subject.next(&5);

        // Then
        assert_eq!(*log.lock().unwrap(), vec!["a:5", "b:5", "c:5"]);
    }

    #[test]
    fn same_observer_subscribed_twice_gets_two_slots() {
        let subject = Subject::<u32>::new();
        let hits = Arc::new(AtomicU64::new(0));
        let counter = hits.clone();
        let observer: Arc<dyn Observer<u32>> = Arc::new(move |_: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let first = subject.subscribe_arc(observer.clone());
        let _second = subject.subscribe_arc(observer);
        subject.next(&0);
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        first.unsubscribe();
        subject.next(&0);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(subject.len(), 1);
    }

    #[test]
    fn observer_objects_are_supported() {
        struct Total(Mutex<u32>);
        impl Observer<u32> for Total {
            fn next(&self, value: &u32) {
                *self.0.lock().unwrap() += value;
            }
        }

        let subject = Subject::<u32>::new();
        let total = Arc::new(Total(Mutex::new(0)));
        subject.subscribe_arc(total.clone());

        subject.next(&2);
        subject.next(&3);

        assert_eq!(*total.0.lock().unwrap(), 5);
    }

    // ==================== Unsubscribe ====================

    #[test]
    fn unsubscribe_removes_only_its_slot() {
        // Given
        let subject = Subject::<u32>::new();
        let (log, make) = recorder();
        let _a = subject.subscribe(make("a"));
        let b = subject.subscribe(make("b"));
        let _c = subject.subscribe(make("c"));

        // When
        b.unsubscribe();
        subject.next(&1);

        // Then
        assert_eq!(*log.lock().unwrap(), vec!["a:1", "c:1"]);
        assert!(b.is_closed());
    }

    #[test]
    fn unsubscribe_twice_is_safe() {
        let subject = Subject::<u32>::new();
        let sub = subject.subscribe(|_: &u32| {});

        sub.unsubscribe();
        sub.unsubscribe();

        assert!(subject.is_empty());
    }

    #[test]
    fn unsubscribe_after_subject_dropped_is_safe() {
        let subject = Subject::<u32>::new();
        let sub = subject.subscribe(|_: &u32| {});
        drop(subject);

        sub.unsubscribe();

        assert!(sub.is_closed());
    }

    #[test]
    fn unsubscribe_all_drops_every_slot() {
        let subject = Subject::<u32>::new();
        let (log, make) = recorder();
        subject.subscribe(make("a"));
        subject.subscribe(make("b"));

        subject.unsubscribe_all();
        subject.next(&1);

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(subject.len(), 0);
    }

    // ==================== Re-entrancy ====================

    #[test]
    fn observer_may_unsubscribe_itself_during_next() {
        let subject = Arc::new(Subject::<u32>::new());
        let hits = Arc::new(AtomicU64::new(0));
        let own: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let counter = hits.clone();
        let handle = own.clone();
        let sub = subject.subscribe(move |_: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = handle.lock().unwrap().as_ref() {
                sub.unsubscribe();
            }
        });
        *own.lock().unwrap() = Some(sub);

        subject.next(&1);
        subject.next(&2);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn slot_removed_mid_notification_still_sees_current_value() {
        let subject = Arc::new(Subject::<u32>::new());
        let (log, make) = recorder();
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let target = victim.clone();
        subject.subscribe(move |_: &u32| {
            if let Some(sub) = target.lock().unwrap().as_ref() {
                sub.unsubscribe();
            }
        });
        *victim.lock().unwrap() = Some(subject.subscribe(make("late")));

        subject.next(&1);
        subject.next(&2);

        assert_eq!(*log.lock().unwrap(), vec!["late:1"]);
    }

    #[test]
    fn observer_may_publish_again_during_next() {
        let subject = Arc::new(Subject::<u32>::new());
        let (log, make) = recorder();
        let again = subject.clone_handle();
        subject.subscribe(move |v: &u32| {
            if *v == 1 {
                again.next(&2);
            }
        });
        subject.subscribe(make("x"));

        subject.next(&1);

        assert_eq!(*log.lock().unwrap(), vec!["x:2", "x:1"]);
    }

    impl<T: 'static> Subject<T> {
        fn clone_handle(&self) -> Subject<T> {
            Subject {
                inner: self.inner.clone(),
            }
        }
    }
}
