//! Broker diagnostics observed through the channel logger.
//!
//! Installing a global logger can only happen once per process, so this binary has one test.

use log::{Level, LevelFilter};
use teleport::{Broker, log::ChannelLogger};

#[test]
fn broker_reports_parking_replay_and_type_mismatch() {
    // Given
    let receiver = ChannelLogger::install(LevelFilter::Debug).unwrap();
    let broker = Broker::new();

    // When
    broker.emit("boot", 7_u32);
    let typed = broker.receive("boot", |_: &u32| {});
    let mismatched = broker.receive("boot", |_: &String| {});
    broker.emit("boot", 8_u32);

    // Then
    let messages: Vec<_> = receiver
        .try_iter()
        .filter(|message| message.target.starts_with("teleport"))
        .collect();
    let has = |level: Level, text: &str| {
        messages
            .iter()
            .any(|message| message.level == level && message.message.contains(text))
    };
    assert!(has(Level::Debug, "no receiver for boot yet, parking emission"));
    assert!(has(Level::Debug, "replaying parked emission for boot"));
    assert!(has(Level::Warn, "receiver of boot expects"));
    assert!(messages.iter().all(|message| message.level != Level::Trace));

    typed.clear();
    mismatched.clear();
}
