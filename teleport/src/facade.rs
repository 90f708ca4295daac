//! Thin front door over a [`Broker`].
//!
//! [`Teleport`] forwards every call to its broker, by default the process-wide one. It adds one
//! convenience: [`Teleport::remove_handle`] accepts either a single name or a name list through
//! [`Route`].

use std::any::Any;

use crate::{
    broker::{Broker, Handle},
    error::Error,
    group::Joined,
    name::{EventName, Symbol},
};

/// What a removal targets: one channel, or every member of a join.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Single(EventName),
    Group(Vec<EventName>),
}

impl From<EventName> for Route {
    fn from(name: EventName) -> Self {
        Route::Single(name)
    }
}

impl From<&str> for Route {
    fn from(name: &str) -> Self {
        Route::Single(name.into())
    }
}

impl From<String> for Route {
    fn from(name: String) -> Self {
        Route::Single(name.into())
    }
}

impl From<Symbol> for Route {
    fn from(symbol: Symbol) -> Self {
        Route::Single(symbol.into())
    }
}

impl From<&Symbol> for Route {
    fn from(symbol: &Symbol) -> Self {
        Route::Single(symbol.into())
    }
}

impl From<Vec<EventName>> for Route {
    fn from(names: Vec<EventName>) -> Self {
        Route::Group(names)
    }
}

impl From<&[&str]> for Route {
    fn from(names: &[&str]) -> Self {
        Route::Group(names.iter().map(|name| EventName::from(*name)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Route {
    fn from(names: [&str; N]) -> Self {
        Route::Group(names.into_iter().map(EventName::from).collect())
    }
}

/// Forwarding facade over a broker.
#[derive(Clone, Debug)]
pub struct Teleport {
    broker: Broker,
}

impl Teleport {
    /// A facade over the process-wide broker.
    pub fn new() -> Self {
        Self {
            broker: Broker::global(),
        }
    }

    /// A facade over `broker`.
    pub fn with_broker(broker: Broker) -> Self {
        Self { broker }
    }

    #[inline]
    pub fn broker(&self) -> &Broker {
        &self.broker
    }

    /// See [`Broker::emit`].
    pub fn emit<T>(&self, name: impl Into<EventName>, data: T) -> &Broker
    where
        T: Any + Send + Sync,
    {
        self.broker.emit(name, data)
    }

    /// See [`Broker::emit_with`].
    pub fn emit_with<T, C>(&self, name: impl Into<EventName>, data: T, callback: C) -> &Broker
    where
        T: Any + Send + Sync,
        C: Fn() + Send + Sync + 'static,
    {
        self.broker.emit_with(name, data, callback)
    }

    /// See [`Broker::receive`].
    pub fn receive<T, F>(&self, name: impl Into<EventName>, handler: F) -> Handle
    where
        T: Any,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.broker.receive(name, handler)
    }

    /// Join over `names`; see [`Broker::multi_receive`].
    ///
    /// # Errors
    ///
    /// Same as [`Broker::multi_receive`].
    pub fn receive_all<I, N, F>(&self, names: I, handler: F) -> Result<Handle, Error>
    where
        I: IntoIterator<Item = N>,
        N: Into<EventName>,
        F: Fn(&Joined) + Send + Sync + 'static,
    {
        self.broker.multi_receive(names, handler)
    }

    /// Remove one channel, or every member channel of a join and its barrier.
    pub fn remove_handle(&self, route: impl Into<Route>) {
        match route.into() {
            Route::Single(name) => self.broker.remove_handle(name),
            Route::Group(names) => self.broker.remove_multi_handle(names),
        }
    }

    pub fn remove_all_handlers(&self) {
        self.broker.remove_all_handlers();
    }

    pub fn clear(&self) {
        self.broker.clear();
    }
}

impl Default for Teleport {
    fn default() -> Self {
        Self::new()
    }
}
