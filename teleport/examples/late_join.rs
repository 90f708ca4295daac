//! Emissions made before anyone listens are replayed into a join subscribed later.
//!
//! Three events are emitted on the process-wide broker. A second later another thread joins
//! over all three and immediately receives their values, in declared order.

use std::{thread, time::Duration};

use teleport::{Joined, Teleport};

fn main() {
    let teleport = Teleport::new();
    let names = ["event1", "event2", "event3"];
    let expected = ["Data 1", "Data 2", "Data 3"];

    let late = {
        let teleport = teleport.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(1));
            teleport.receive_all(names, |joined: &Joined| {
                let values: Vec<&str> = joined
                    .iter()
                    .filter_map(|(_, value)| value.and_then(|value| value.downcast_ref::<&str>()))
                    .copied()
                    .collect();
                println!("joined: {values:?}");
            })
        })
    };

    for (name, data) in names.iter().zip(expected) {
        teleport.emit(*name, data);
    }
    println!("emitted: {expected:?}");

    match late.join() {
        Ok(Ok(handle)) => handle.clear(),
        Ok(Err(error)) => eprintln!("join rejected: {error}"),
        Err(_) => eprintln!("join thread panicked"),
    }
}
