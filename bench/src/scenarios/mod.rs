//! Broker workloads with representative channel and receiver counts.
//!
//! # Scenarios
//!
//! - **Fan-out**: a few channels, many receivers each
//! - **Joins**: many join groups whose members are emitted in a shuffled order

pub mod fan_out;
pub mod joins;

pub use fan_out::{FanOutConfig, FanOutScenario};
pub use joins::{JoinConfig, JoinScenario};

/// Common trait for benchmark scenarios.
pub trait Scenario {
    /// Human-readable name of the scenario.
    fn name(&self) -> &'static str;

    /// Number of handler invocations one update is expected to cause.
    fn deliveries_per_update(&self) -> usize;

    /// Register receivers.
    fn setup(&mut self);

    /// Run one round of emissions.
    fn update(&mut self);

    /// Drop every receiver and parked emission.
    fn teardown(&mut self);
}
