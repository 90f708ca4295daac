//! Join barrier over a fixed list of events.
//!
//! A [`GroupCoordinator`] collects the latest value of each member event and publishes them
//! together, in declared member order, once enough member updates have arrived.
//!
//! # Lifecycle
//!
//! ```text
//!   Idle ──set_events_order(names)──► Armed ──set_state × N──► Fire ─┐
//!    ▲   (threshold = N, values reset)   ▲                           │
//!    │                                   └───────────────────────────┘
//!    └────────────────────── clear() ────────────────────────────────
//! ```
//!
//! When a round completes depends on the [`Cadence`]:
//!
//! - [`Cadence::EveryUpdate`]: the update count is never reset, so once `N` updates have been
//!   seen every further update fires again with the latest values.
//! - [`Cadence::FreshRound`]: every member must report again after each fire.
//!
//! [`GroupCoordinator::clear`] swaps in a new internal subject. Existing group subscriptions
//! become permanently silent; nobody is told.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use fixedbitset::FixedBitSet;
use log::{debug, trace};

use crate::{
    name::{EventName, GroupToken},
    payload::Payload,
    registry::OrderedRegistry,
    subject::{Subject, Subscription},
};

/// When a join group fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cadence {
    /// Fire whenever the total number of member updates since arming reaches the member count.
    ///
    /// The count is monotonic: after the first complete round every update fires.
    #[default]
    EveryUpdate,
    /// Fire when every member has reported since the previous fire, then start a new round.
    FreshRound,
}

/// Ordered member values delivered to a join handler.
#[derive(Clone, Debug)]
pub struct Joined {
    entries: Vec<(EventName, Option<Payload>)>,
}

impl Joined {
    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Member names in declared order.
    pub fn names(&self) -> Vec<EventName> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    /// The payload of the member at `index`, if it has reported.
    pub fn payload(&self, index: usize) -> Option<&Payload> {
        self.entries.get(index).and_then(|(_, value)| value.as_ref())
    }

    /// The value of the member at `index`, if it has reported a `T`.
    pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
        self.payload(index)?.downcast_ref::<T>()
    }

    /// The value of member `name`, if it has reported a `T`.
    pub fn get_by_name<T: 'static>(&self, name: &EventName) -> Option<&T> {
        self.entries
            .iter()
            .find(|(member, _)| member == name)
            .and_then(|(_, value)| value.as_ref())
            .and_then(|payload| payload.downcast_ref::<T>())
    }

    /// Returns `true` if every member carries a value.
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|(_, value)| value.is_some())
    }

    /// Iterate `(name, value)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&EventName, Option<&Payload>)> {
        self.entries.iter().map(|(name, value)| (name, value.as_ref()))
    }
}

/// Mutable barrier state, guarded by the coordinator's lock.
struct State {
    members: OrderedRegistry<EventName, Option<Payload>>,
    triggered: usize,
    threshold: usize,
    /// Members that reported since the last fire, by member position.
    reported: FixedBitSet,
    /// Last broker emission recorded per member.
    emissions: HashMap<EventName, u64>,
}

impl State {
    fn new() -> Self {
        Self {
            members: OrderedRegistry::new(),
            triggered: 0,
            threshold: 0,
            reported: FixedBitSet::new(),
            emissions: HashMap::new(),
        }
    }

    fn snapshot(&self) -> Joined {
        Joined {
            entries: self.members.entries(),
        }
    }

    fn round_complete(&self, cadence: Cadence) -> bool {
        if self.threshold == 0 {
            return false;
        }
        match cadence {
            Cadence::EveryUpdate => self.triggered >= self.threshold,
            Cadence::FreshRound => (0..self.threshold).all(|i| self.reported.contains(i)),
        }
    }
}

/// Join barrier for one group of events.
///
/// Shared between the broker and every funnel subscription feeding it, so all methods take
/// `&self`.
pub struct GroupCoordinator {
    token: GroupToken,
    cadence: Cadence,
    state: Mutex<State>,
    subject: Mutex<Arc<Subject<Joined>>>,
}

impl GroupCoordinator {
    /// Create an idle coordinator.
    pub fn new(token: GroupToken, cadence: Cadence) -> Self {
        Self {
            token,
            cadence,
            state: Mutex::new(State::new()),
            subject: Mutex::new(Arc::new(Subject::new())),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subject(&self) -> Arc<Subject<Joined>> {
        self.subject
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// (Re)arm the barrier for `names`.
    ///
    /// Every listed member is reset to "no value" and the threshold becomes `names.len()`. The
    /// update count is left as is. Repeating the call with the same list does not duplicate
    /// members.
    pub fn set_events_order(&self, names: &[EventName]) {
        let mut state = self.state();
        for name in names {
            state.members.set(name.clone(), None);
        }
        state.threshold = names.len();
        let len = state.members.len();
        state.reported.grow(len);
        state.reported.clear();
        debug!(
            "group {} armed with {} members (cadence {:?})",
            self.token, state.threshold, self.cadence
        );
    }

    /// Record `value` for member `name` and fire if the round is complete.
    ///
    /// Names outside the member list are appended as extra entries.
    pub fn set_state(&self, name: &EventName, value: Payload) {
        self.set_state_from(name, value, 0);
    }

    /// Record `value` for member `name`, delivered by broker emission `emission`.
    ///
    /// Under [`Cadence::FreshRound`] a member counts at most once per emission: when several
    /// joins share this barrier, each of them funnels the same emission here, and only the first
    /// report is recorded. Emission 0 is never deduplicated.
    pub fn set_state_from(&self, name: &EventName, value: Payload, emission: u64) {
        let joined = {
            let mut state = self.state();
            if self.cadence == Cadence::FreshRound && emission != 0 {
                if state.emissions.get(name) == Some(&emission) {
                    trace!("group {} already saw emission {emission} of {name}", self.token);
                    return;
                }
                state.emissions.insert(name.clone(), emission);
            }
            state.members.set(name.clone(), Some(value));
            state.triggered = state.triggered.saturating_add(1);
            if let Some(index) = state.members.position(name) {
                state.reported.grow(index + 1);
                state.reported.insert(index);
            }
            trace!(
                "group {} update from {name}: {}/{}",
                self.token, state.triggered, state.threshold
            );

            if !state.round_complete(self.cadence) {
                return;
            }
            let joined = state.snapshot();
            if self.cadence == Cadence::FreshRound {
                state.triggered = 0;
                state.reported.clear();
            }
            joined
        };

        debug!("group {} fired", self.token);
        self.subject().next(&joined);
    }

    /// Latest value recorded for `name`.
    pub fn get_state(&self, name: &EventName) -> Option<Payload> {
        self.state().members.get(name).cloned().flatten()
    }

    /// Latest member values, in member order.
    pub fn values(&self) -> Vec<Option<Payload>> {
        self.state().members.values()
    }

    /// Member names, in member order.
    pub fn keys(&self) -> Vec<EventName> {
        self.state().members.keys()
    }

    /// Number of tracked members.
    pub fn len(&self) -> usize {
        self.state().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().members.is_empty()
    }

    /// Updates counted toward the current threshold.
    pub fn triggered(&self) -> usize {
        self.state().triggered
    }

    pub fn threshold(&self) -> usize {
        self.state().threshold
    }

    /// Returns `true` while armed (threshold above zero).
    pub fn is_armed(&self) -> bool {
        self.state().threshold > 0
    }

    /// Returns `true` if the current counters would fire on inspection.
    pub fn is_threshold_reached(&self) -> bool {
        self.state().round_complete(self.cadence)
    }

    #[inline]
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    #[inline]
    pub fn token(&self) -> &GroupToken {
        &self.token
    }

    /// Number of group handlers on the current subject.
    pub fn subscriber_count(&self) -> usize {
        self.subject().len()
    }

    /// Subscribe a handler to group fires.
    ///
    /// The returned subscription removes only this handler; the barrier state is untouched.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Joined) + Send + Sync + 'static,
    {
        self.subject().subscribe(handler)
    }

    /// Return to idle.
    ///
    /// Drops all members and counters and replaces the subject, orphaning current subscribers.
    pub fn clear(&self) {
        {
            let mut state = self.state();
            *state = State::new();
        }
        *self.subject.lock().unwrap_or_else(PoisonError::into_inner) = Arc::new(Subject::new());
        debug!("group {} cleared", self.token);
    }
}

impl fmt::Debug for GroupCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("GroupCoordinator")
            .field("token", &self.token)
            .field("cadence", &self.cadence)
            .field("members", &state.members.keys())
            .field("triggered", &state.triggered)
            .field("threshold", &state.threshold)
            .finish()
    }
}
