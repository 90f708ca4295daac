//! Join scenario: many barriers fed by member emissions in a random order.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use teleport::{Broker, BrokerConfig, Cadence, EventName, Handle, Joined};

use crate::fixtures::{names, shuffled};
use crate::scenarios::Scenario;

#[derive(Debug, Clone)]
pub struct JoinConfig {
    pub groups: usize,
    pub members_per_group: usize,
    pub cadence: Cadence,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            groups: 32,
            members_per_group: 4,
            cadence: Cadence::FreshRound,
            seed: 12345,
        }
    }
}

pub struct JoinScenario {
    config: JoinConfig,
    broker: Broker,
    groups: Vec<Vec<EventName>>,
    emission_order: Vec<EventName>,
    handles: Vec<Handle>,
    fired: Arc<AtomicU64>,
}

impl JoinScenario {
    pub fn with_config(config: JoinConfig) -> Self {
        let groups: Vec<Vec<EventName>> = (0..config.groups)
            .map(|group| names(&format!("join{group}"), config.members_per_group))
            .collect();
        let all: Vec<EventName> = groups.iter().flatten().cloned().collect();
        let emission_order = shuffled(&all, config.seed);
        Self {
            broker: Broker::with_config(BrokerConfig::default().with_cadence(config.cadence)),
            config,
            groups,
            emission_order,
            handles: Vec::new(),
            fired: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }
}

impl Scenario for JoinScenario {
    fn name(&self) -> &'static str {
        "joins"
    }

    fn deliveries_per_update(&self) -> usize {
        self.config.groups * self.config.members_per_group
    }

    fn setup(&mut self) {
        for members in &self.groups {
            let fired = self.fired.clone();
            // Generated names are distinct, so the join is always well formed.
            if let Ok(handle) = self.broker.multi_receive(members, move |joined: &Joined| {
                if joined.is_complete() {
                    fired.fetch_add(1, Ordering::Relaxed);
                }
            }) {
                self.handles.push(handle);
            }
        }
    }

    fn update(&mut self) {
        for (index, name) in self.emission_order.iter().enumerate() {
            self.broker.emit(name, index as u64);
        }
    }

    fn teardown(&mut self) {
        for handle in self.handles.drain(..) {
            handle.clear();
        }
        self.broker.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_round_fires_each_group_once_per_update() {
        let mut scenario = JoinScenario::with_config(JoinConfig {
            groups: 5,
            members_per_group: 3,
            ..Default::default()
        });
        scenario.setup();

        scenario.update();
        scenario.update();

        assert_eq!(scenario.fired(), 10);
        scenario.teardown();
    }
}
