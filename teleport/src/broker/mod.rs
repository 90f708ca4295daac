//! Central registry of event channels.
//!
//! This module provides [`Broker`], which owns one [`Subject`] per event name, the queue of
//! emissions waiting for their first receiver, and the join groups built by
//! [`Broker::multi_receive`].
//!
//! # Overview
//!
//! - **Emit**: [`emit`](Broker::emit) wraps the value in an [`Envelope`] and notifies every
//!   receiver of the name, synchronously, in subscription order.
//! - **Replay**: the first emission of a name that nobody has subscribed to yet is parked. The
//!   first [`receive`](Broker::receive) for that name delivers it, once.
//! - **Join**: [`multi_receive`](Broker::multi_receive) fires a handler with the values of
//!   several events, in declared order, once all of them have been emitted.
//! - **Removal**: [`remove_handle`](Broker::remove_handle) drops every receiver of a name;
//!   [`Handle::clear`] drops only the receivers of one call.
//!
//! # Process-wide broker
//!
//! [`Broker::global`] returns the lazily created process-wide broker. It lives for the rest of
//! the process; [`clear`](Broker::clear) resets its state but not its identity. Brokers built
//! with [`Broker::new`] are independent of it and of each other.
//!
//! # Thread Safety
//!
//! `Broker` is a cheap clonable handle and is `Send + Sync`. Channel and group maps are sharded
//! concurrent maps; no lock is held while handlers, completion callbacks or replay tasks run,
//! so handlers may emit, receive and remove from inside a delivery.
//!
//! # Example
//!
//! ```rust
//! use teleport::Broker;
//!
//! let broker = Broker::new();
//!
//! // Emitted before anyone listens: parked.
//! broker.emit("config", String::from("loaded"));
//! assert_eq!(broker.pending("config"), 1);
//!
//! // The first receiver gets the parked value immediately.
//! let handle = broker.receive("config", |value: &String| println!("{value}"));
//! assert_eq!(broker.pending_len(), 0);
//!
//! handle.clear();
//! ```

mod config;
mod handle;

pub use config::BrokerConfig;
pub use handle::Handle;

use std::{
    any::Any,
    fmt,
    sync::{
        Arc, OnceLock, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use crossbeam::channel::{Receiver, unbounded};
use dashmap::{DashMap, Entry};
use log::{debug, trace, warn};

use crate::{
    error::{Error, validate_group},
    group::{GroupCoordinator, Joined},
    name::{EventName, GroupToken},
    payload::{Callback, Envelope, Payload},
    queue::PendingCallQueue,
    subject::{Observer, Subject},
};

/// The process-wide broker.
static GLOBAL: OnceLock<Broker> = OnceLock::new();

/// Per-name bookkeeping updated on every emit.
#[derive(Clone, Default)]
struct EventStats {
    emitted: u64,
    last: Option<Payload>,
}

struct Inner {
    config: BrokerConfig,
    /// One subject per event name. A present entry means the name has been emitted or received.
    events: DashMap<EventName, Arc<Subject<Envelope>>>,
    /// Emissions waiting for the first receiver of their name.
    queue: PendingCallQueue,
    /// Join groups by token. Cleared groups stay registered until reused.
    groups: DashMap<GroupToken, Arc<GroupCoordinator>>,
    stats: DashMap<EventName, EventStats>,
    /// Last emission number handed out.
    emissions: AtomicU64,
}

/// In-process event broker.
///
/// See the [module documentation](self) for the delivery model.
#[derive(Clone)]
pub struct Broker {
    inner: Arc<Inner>,
}

impl Broker {
    /// Creates a broker with the default configuration.
    pub fn new() -> Self {
        Self::with_config(BrokerConfig::default())
    }

    /// Creates a broker with `config`.
    pub fn with_config(config: BrokerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                events: DashMap::new(),
                queue: PendingCallQueue::new(config.queue),
                groups: DashMap::new(),
                stats: DashMap::new(),
                emissions: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the process-wide broker, creating it on first use.
    ///
    /// Every call returns a handle to the same instance.
    pub fn global() -> Broker {
        GLOBAL
            .get_or_init(|| {
                debug!("creating process-wide broker");
                Broker::new()
            })
            .clone()
    }

    /// Returns `true` if both handles point at the same broker.
    #[inline]
    pub fn ptr_eq(&self, other: &Broker) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    #[inline]
    pub fn config(&self) -> BrokerConfig {
        self.inner.config
    }

    // ==================== Emit ====================

    /// Emit `data` on `name`.
    ///
    /// Receivers of `name` run before this returns. If `name` has never been emitted or
    /// received, the emission is parked and delivered to the first receiver instead.
    pub fn emit<T>(&self, name: impl Into<EventName>, data: T) -> &Self
    where
        T: Any + Send + Sync,
    {
        self.emit_envelope(name.into(), Envelope::new(Payload::new(data), None))
    }

    /// Emit `data` on `name` and run `callback` after each receiver handled it.
    pub fn emit_with<T, C>(&self, name: impl Into<EventName>, data: T, callback: C) -> &Self
    where
        T: Any + Send + Sync,
        C: Fn() + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        self.emit_envelope(name.into(), Envelope::new(Payload::new(data), Some(callback)))
    }

    /// Emit an already wrapped payload.
    pub fn emit_payload(&self, name: impl Into<EventName>, data: Payload) -> &Self {
        self.emit_envelope(name.into(), Envelope::new(data, None))
    }

    fn emit_envelope(&self, name: EventName, envelope: Envelope) -> &Self {
        let emission = self.inner.emissions.fetch_add(1, Ordering::Relaxed) + 1;
        let envelope = envelope.with_emission(emission);
        self.record(&name, envelope.data());

        // Fast path: the channel exists, deliver now.
        if let Some(subject) = self.subject(&name) {
            self.deliver(&name, &subject, &envelope);
            return self;
        }

        // Slow path: hold the entry while parking, so a concurrent first receive either finds
        // no channel or finds the parked task.
        match self.inner.events.entry(name.clone()) {
            Entry::Occupied(occupied) => {
                let subject = occupied.get().clone();
                drop(occupied);
                self.deliver(&name, &subject, &envelope);
            }
            Entry::Vacant(vacant) => {
                let _slot = vacant.insert(Arc::new(Subject::new()));
                debug!("no receiver for {name} yet, parking emission");
                let broker: Weak<Inner> = Arc::downgrade(&self.inner);
                self.inner.queue.add(name, move |name: &EventName| {
                    if let Some(inner) = broker.upgrade() {
                        let broker = Broker { inner };
                        debug!("replaying parked emission for {name}");
                        if let Some(subject) = broker.subject(name) {
                            broker.deliver(name, &subject, &envelope);
                        }
                    }
                });
            }
        }
        self
    }

    fn deliver(&self, name: &EventName, subject: &Subject<Envelope>, envelope: &Envelope) {
        trace!(
            "deliver {} to {} receiver(s) of {name}",
            envelope.data().type_name(),
            subject.len()
        );
        subject.next(envelope);
    }

    fn record(&self, name: &EventName, data: &Payload) {
        let mut stats = self.inner.stats.entry(name.clone()).or_default();
        stats.emitted = stats.emitted.saturating_add(1);
        stats.last = Some(data.clone());
    }

    fn subject(&self, name: &EventName) -> Option<Arc<Subject<Envelope>>> {
        self.inner
            .events
            .get(name)
            .map(|entry| entry.value().clone())
    }

    // ==================== Receive ====================

    /// Call `handler` with every `T` emitted on `name`.
    ///
    /// If an emission for `name` was parked before any receiver existed, `handler` gets it
    /// before this returns. Emissions of another type are skipped (logged at `warn`), and their
    /// completion callback is not run for this receiver.
    pub fn receive<T, F>(&self, name: impl Into<EventName>, handler: F) -> Handle
    where
        T: Any,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let name = name.into();
        let channel = name.clone();
        self.subscribe(name, move |envelope: &Envelope| {
            match envelope.data().downcast_ref::<T>() {
                Some(data) => {
                    handler(data);
                    envelope.complete();
                }
                None => warn!(
                    "receiver of {channel} expects {}, skipping {}",
                    std::any::type_name::<T>(),
                    envelope.data().type_name()
                ),
            }
        })
    }

    /// Call `handler` with every payload emitted on `name`, whatever its type.
    pub fn receive_payload<F>(&self, name: impl Into<EventName>, handler: F) -> Handle
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        self.subscribe(name.into(), move |envelope: &Envelope| {
            handler(envelope.data());
            envelope.complete();
        })
    }

    /// Forward every `T` emitted on `name` into a channel.
    ///
    /// Values sent after the receiver is dropped are discarded. Clear the returned handle to stop
    /// forwarding.
    pub fn receive_channel<T>(&self, name: impl Into<EventName>) -> (Receiver<T>, Handle)
    where
        T: Any + Clone + Send,
    {
        let (sender, receiver) = unbounded();
        let handle = self.receive(name, move |value: &T| {
            let _ = sender.send(value.clone());
        });
        (receiver, handle)
    }

    fn subscribe<O>(&self, name: EventName, observer: O) -> Handle
    where
        O: Observer<Envelope> + 'static,
    {
        let subject = self
            .inner
            .events
            .entry(name.clone())
            .or_insert_with(|| Arc::new(Subject::new()))
            .value()
            .clone();
        let subscription = subject.subscribe(observer);
        trace!("subscribed to {name} ({} receiver(s))", subject.len());

        self.inner.queue.schedule(&name);
        Handle::new(vec![subscription])
    }

    /// Call `handler` with the values of every event in `names`, in that order, once all of them
    /// have been emitted.
    ///
    /// Joins over the same ordered list share one barrier. Emissions parked before the join are
    /// replayed into it. See [`Cadence`](crate::Cadence) for how often the handler fires after
    /// the first complete round.
    ///
    /// Clearing the returned handle removes this handler and its member receivers but keeps the
    /// shared barrier, so other joins over the same list keep working.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyGroup`] for an empty list, [`Error::DuplicateMember`] if a name repeats.
    pub fn multi_receive<I, N, F>(&self, names: I, handler: F) -> Result<Handle, Error>
    where
        I: IntoIterator<Item = N>,
        N: Into<EventName>,
        F: Fn(&Joined) + Send + Sync + 'static,
    {
        let names: Vec<EventName> = names.into_iter().map(Into::into).collect();
        validate_group(&names)?;

        let token = GroupToken::from_names(&names);
        let cadence = self.inner.config.cadence;
        let group = self
            .inner
            .groups
            .entry(token.clone())
            .or_insert_with(|| Arc::new(GroupCoordinator::new(token, cadence)))
            .value()
            .clone();
        group.set_events_order(&names);

        let mut subscriptions = vec![group.subscribe(handler)];
        for name in names {
            let group = group.clone();
            let member = name.clone();
            let funnel = self.subscribe(name, move |envelope: &Envelope| {
                group.set_state_from(&member, envelope.data().clone(), envelope.emission());
                envelope.complete();
            });
            subscriptions.extend(funnel.into_subscriptions());
        }
        Ok(Handle::new(subscriptions))
    }

    // ==================== Removal ====================

    /// Drop every receiver of `name` and forget the channel.
    ///
    /// Unknown names are ignored.
    pub fn remove_handle(&self, name: impl Into<EventName>) {
        let name = name.into();
        if let Some((_, subject)) = self.inner.events.remove(&name) {
            subject.unsubscribe_all();
            debug!("removed channel {name}");
        }
    }

    /// Remove every member channel of the join over `names` and reset its barrier.
    pub fn remove_multi_handle<I, N>(&self, names: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<EventName>,
    {
        let names: Vec<EventName> = names.into_iter().map(Into::into).collect();
        for name in &names {
            self.remove_handle(name);
        }
        let token = GroupToken::from_names(&names);
        let group = self.inner.groups.get(&token).map(|entry| entry.value().clone());
        if let Some(group) = group {
            group.clear();
        }
    }

    /// Remove every channel and reset every join barrier.
    pub fn remove_all_handlers(&self) {
        let names: Vec<EventName> = self
            .inner
            .events
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        for name in names {
            self.remove_handle(name);
        }

        let groups: Vec<Arc<GroupCoordinator>> = self
            .inner
            .groups
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for group in groups {
            group.clear();
        }
        self.inner.events.clear();
    }

    /// Drop parked emissions, every channel and barrier, and the per-name statistics.
    pub fn clear(&self) {
        self.inner.queue.clear();
        self.remove_all_handlers();
        self.inner.stats.clear();
        debug!("broker cleared");
    }

    // ==================== Introspection ====================

    /// Returns `true` if `name` currently has a channel.
    pub fn is_registered(&self, name: impl Into<EventName>) -> bool {
        self.inner.events.contains_key(&name.into())
    }

    /// Number of receivers currently subscribed to `name`.
    pub fn subscriber_count(&self, name: impl Into<EventName>) -> usize {
        self.subject(&name.into()).map_or(0, |subject| subject.len())
    }

    /// Number of parked emissions across all names.
    pub fn pending_len(&self) -> usize {
        self.inner.queue.len()
    }

    /// Number of parked emissions for `name`.
    pub fn pending(&self, name: impl Into<EventName>) -> usize {
        self.inner.queue.pending(&name.into())
    }

    /// Number of join barriers created so far (cleared ones included).
    pub fn group_count(&self) -> usize {
        self.inner.groups.len()
    }

    /// The join barrier for `names`, if one exists.
    pub fn group<I, N>(&self, names: I) -> Option<Arc<GroupCoordinator>>
    where
        I: IntoIterator<Item = N>,
        N: Into<EventName>,
    {
        let names: Vec<EventName> = names.into_iter().map(Into::into).collect();
        self.inner
            .groups
            .get(&GroupToken::from_names(&names))
            .map(|entry| entry.value().clone())
    }

    /// How many times `name` has been emitted since creation or the last [`clear`](Self::clear).
    pub fn emit_count(&self, name: impl Into<EventName>) -> u64 {
        self.inner
            .stats
            .get(&name.into())
            .map_or(0, |stats| stats.emitted)
    }

    /// The most recent payload emitted on `name`.
    pub fn last_payload(&self, name: impl Into<EventName>) -> Option<Payload> {
        self.inner
            .stats
            .get(&name.into())
            .and_then(|stats| stats.last.clone())
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("config", &self.inner.config)
            .field("channels", &self.inner.events.len())
            .field("pending", &self.inner.queue.len())
            .field("groups", &self.inner.groups.len())
            .finish()
    }
}
