//! Broker configuration.
//!
//! [`BrokerConfig`] is fixed when a broker is built with
//! [`Broker::with_config`](super::Broker::with_config). The process-wide broker always uses
//! [`BrokerConfig::default`].

use crate::{group::Cadence, queue::QueueMode};

/// Settings for one broker instance.
///
/// ## Field semantics
/// - `queue`: how early emissions parked for a name are replayed when the first receiver
///   arrives.
/// - `cadence`: when join groups fire after their first complete round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Replay mode of the pending-call queue.
    ///
    /// Only the first emission of a name can be parked, so several parked tasks under one name
    /// appear only after [`remove_handle`](super::Broker::remove_handle) forgot the name before
    /// a receiver arrived.
    pub queue: QueueMode,

    /// Firing cadence of join groups.
    pub cadence: Cadence,
}

impl BrokerConfig {
    /// Returns the config with `queue` replaced.
    #[inline]
    pub fn with_queue(mut self, queue: QueueMode) -> Self {
        self.queue = queue;
        self
    }

    /// Returns the config with `cadence` replaced.
    #[inline]
    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }
}
