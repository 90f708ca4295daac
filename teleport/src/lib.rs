//! # teleport
//!
//! In-process event broker: named channels that decouple producers from consumers inside one
//! process. Delivery is synchronous; there is no network, persistence or back-pressure.
//!
//! ## Architecture
//! ```text
//!  emit(name, data)                         receive(name, handler)
//!        │                                          │
//!        ▼                                          ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Broker                                                       │
//! │  events: EventName ──► Subject<Envelope>   (one per name)    │
//! │  queue:  PendingCallQueue   (first emission, no receiver)    │
//! │  groups: GroupToken ──► GroupCoordinator   (join barriers)   │
//! └──────┬─────────────────────────────┬─────────────────────────┘
//!        │ channel exists: next()      │ channel new: park, replay
//!        ▼                             ▼ from the first receive()
//!   handler(data); callback()     handler(data); callback()
//! ```
//!
//! ## Features
//! | Area          | Description                                                  | Key types                         |
//! |---------------|--------------------------------------------------------------|-----------------------------------|
//! | **Channels**  | String or symbol keyed, typed or untyped receivers.          | [`Broker`], [`EventName`]         |
//! | **Replay**    | A first emission before any receiver is kept for the first.  | [`PendingCallQueue`]              |
//! | **Joins**     | Fire once every event of a list has been emitted.            | [`GroupCoordinator`], [`Joined`]  |
//! | **Facade**    | Forwards to the process-wide broker.                         | [`Teleport`]                      |
//! | **Errors**    | Malformed joins are rejected at subscribe time.              | [`Error`]                         |
//! | **Logging**   | `log` facade, optional channel logger.                       | [`log::ChannelLogger`]            |
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use teleport::{Broker, Joined};
//!
//! let broker = Broker::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! // Emitted before anyone listens; replayed into the join below.
//! broker.emit("user", "ada").emit("settings", 42_u32);
//!
//! let sink = seen.clone();
//! let handle = broker
//!     .multi_receive(["user", "settings"], move |joined: &Joined| {
//!         let user = joined.get::<&str>(0).copied();
//!         let settings = joined.get::<u32>(1).copied();
//!         sink.lock().unwrap().push((user, settings));
//!     })
//!     .unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), vec![(Some("ada"), Some(42))]);
//! handle.clear();
//! ```

pub mod broker;
pub mod error;
pub mod facade;
pub mod group;
pub mod log;
pub mod name;
pub mod payload;
pub mod queue;
pub mod registry;
pub mod subject;

pub use broker::{Broker, BrokerConfig, Handle};
pub use error::Error;
pub use facade::{Route, Teleport};
pub use group::{Cadence, GroupCoordinator, Joined};
pub use name::{EventName, GroupToken, Symbol};
pub use payload::{Callback, Envelope, Payload};
pub use queue::{PendingCallQueue, QueueMode, Task};
pub use registry::OrderedRegistry;
pub use subject::{Observer, Subject, Subscription};
