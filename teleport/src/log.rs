//! Channel-backed logger.
//!
//! The broker reports through the [`log`] facade and never installs a logger. Applications that
//! want broker diagnostics somewhere other than a terminal (an in-app console, a test assertion)
//! can install [`ChannelLogger`], which forwards each record to a `crossbeam` channel.
//!
//! ```rust
//! use log::LevelFilter;
//! use teleport::{Broker, log::ChannelLogger};
//!
//! let receiver = ChannelLogger::install(LevelFilter::Debug).unwrap();
//! Broker::new().emit("boot", ());
//! for message in receiver.try_iter() {
//!     println!("{:?} {}", message.level, message.message);
//! }
//! ```

use crossbeam::channel::{Receiver, Sender, unbounded};
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

/// One forwarded log record.
#[derive(Debug, Clone)]
pub struct LogMessage {
    pub level: Level,
    /// Module path the record came from, e.g. `teleport::broker`.
    pub target: String,
    pub message: String,
}

pub struct ChannelLogger {
    sender: Sender<LogMessage>,
    max_level: LevelFilter,
}

impl log::Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = self.sender.try_send(LogMessage {
                level: record.metadata().level(),
                target: record.target().to_string(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {}
}

impl ChannelLogger {
    pub fn new(sender: Sender<LogMessage>, max_level: LevelFilter) -> Self {
        Self { sender, max_level }
    }

    /// Create a logger together with the receiving end of its channel.
    pub fn with_receiver(max_level: LevelFilter) -> (Self, Receiver<LogMessage>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender, max_level), receiver)
    }

    /// Install a channel logger as the global logger and return its receiver.
    ///
    /// # Errors
    ///
    /// Fails if a global logger is already installed.
    pub fn install(max_level: LevelFilter) -> Result<Receiver<LogMessage>, SetLoggerError> {
        let (logger, receiver) = Self::with_receiver(max_level);
        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(max_level);
        Ok(receiver)
    }
}
