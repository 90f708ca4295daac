//! Shared inputs for the benchmarks.

use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;
use teleport::EventName;

/// Payload shaped like a small application message.
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub id: u64,
    pub body: String,
}

impl Message {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            body: format!("message-{id}"),
        }
    }
}

/// `count` distinct event names sharing `prefix`.
pub fn names(prefix: &str, count: usize) -> Vec<EventName> {
    (0..count)
        .map(|index| EventName::from(format!("{prefix}.{index}")))
        .collect()
}

/// The same names in a reproducible random order.
pub fn shuffled(names: &[EventName], seed: u64) -> Vec<EventName> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut order = names.to_vec();
    order.shuffle(&mut rng);
    order
}
