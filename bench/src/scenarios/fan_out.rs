//! Fan-out scenario: every emission reaches many receivers.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use teleport::{Broker, EventName, Handle};

use crate::fixtures::{Message, names};
use crate::scenarios::Scenario;

#[derive(Debug, Clone)]
pub struct FanOutConfig {
    pub channels: usize,
    pub receivers_per_channel: usize,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            channels: 8,
            receivers_per_channel: 64,
        }
    }
}

pub struct FanOutScenario {
    config: FanOutConfig,
    broker: Broker,
    channels: Vec<EventName>,
    handles: Vec<Handle>,
    delivered: Arc<AtomicU64>,
    next_id: u64,
}

impl FanOutScenario {
    pub fn with_config(config: FanOutConfig) -> Self {
        let channels = names("fan", config.channels);
        Self {
            config,
            broker: Broker::new(),
            channels,
            handles: Vec::new(),
            delivered: Arc::new(AtomicU64::new(0)),
            next_id: 0,
        }
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl Scenario for FanOutScenario {
    fn name(&self) -> &'static str {
        "fan_out"
    }

    fn deliveries_per_update(&self) -> usize {
        self.config.channels * self.config.receivers_per_channel
    }

    fn setup(&mut self) {
        for channel in &self.channels {
            for _ in 0..self.config.receivers_per_channel {
                let delivered = self.delivered.clone();
                self.handles
                    .push(self.broker.receive(channel, move |message: &Message| {
                        delivered.fetch_add(message.id & 1, Ordering::Relaxed);
                    }));
            }
        }
    }

    fn update(&mut self) {
        for channel in &self.channels {
            self.next_id += 1;
            self.broker.emit(channel, Message::new(self.next_id));
        }
    }

    fn teardown(&mut self) {
        for handle in self.handles.drain(..) {
            handle.clear();
        }
        self.broker.clear();
    }
}
