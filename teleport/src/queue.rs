//! Deferred tasks keyed by event name.
//!
//! The broker parks the first emission of a name here when nobody has subscribed yet, and
//! drains it from inside the first `receive` for that name.
//!
//! # Modes
//!
//! - [`QueueMode::Fifo`]: [`PendingCallQueue::schedule`] runs every task queued under the name,
//!   oldest first.
//! - [`QueueMode::Lazy`]: only the newest task under the name runs; older ones are discarded.
//!
//! Draining is a loop: tasks queued under the same name while a drain is running are picked up
//! by that drain. Tasks always run with the queue unlocked, so a task may add or schedule more
//! tasks.

use std::{
    collections::VecDeque,
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::trace;

use crate::{name::EventName, registry::OrderedRegistry};

/// How [`PendingCallQueue::schedule`] treats several tasks under one name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueueMode {
    /// Run every task, oldest first.
    #[default]
    Fifo,
    /// Run only the most recently queued task.
    Lazy,
}

/// A deferred call bound to an event name.
pub struct Task {
    name: EventName,
    callback: Box<dyn FnOnce(&EventName) + Send>,
}

impl Task {
    pub fn new<F>(name: EventName, callback: F) -> Self
    where
        F: FnOnce(&EventName) + Send + 'static,
    {
        Self {
            name,
            callback: Box::new(callback),
        }
    }

    #[inline]
    pub fn name(&self) -> &EventName {
        &self.name
    }

    /// Run the callback with the task's name.
    pub fn run(self) {
        (self.callback)(&self.name);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish()
    }
}

/// Tasks waiting for their event name to be scheduled.
pub struct PendingCallQueue {
    mode: QueueMode,
    tasks: Mutex<OrderedRegistry<EventName, VecDeque<Task>>>,
}

impl PendingCallQueue {
    pub fn new(mode: QueueMode) -> Self {
        Self {
            mode,
            tasks: Mutex::new(OrderedRegistry::new()),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, OrderedRegistry<EventName, VecDeque<Task>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn mode(&self) -> QueueMode {
        self.mode
    }

    /// Queue `callback` under `name`.
    pub fn add<F>(&self, name: EventName, callback: F)
    where
        F: FnOnce(&EventName) + Send + 'static,
    {
        let mut tasks = self.tasks();
        trace!("queue task for {name}");
        let task = Task::new(name.clone(), callback);
        match tasks.get_mut(&name) {
            Some(queued) => queued.push_back(task),
            None => {
                tasks.set(name, VecDeque::from([task]));
            }
        }
    }

    /// Run the tasks queued under `name` according to the queue mode.
    ///
    /// Returns the number of tasks run. A name without tasks is a no-op.
    pub fn schedule(&self, name: &EventName) -> usize {
        let mut ran = 0;
        while let Some(batch) = self.take(name) {
            let runnable: Vec<Task> = match self.mode {
                QueueMode::Fifo => batch.into(),
                QueueMode::Lazy => batch.into_iter().last().into_iter().collect(),
            };
            for task in runnable {
                task.run();
                ran += 1;
            }
        }
        if ran > 0 {
            trace!("ran {ran} queued task(s) for {name}");
        }
        ran
    }

    fn take(&self, name: &EventName) -> Option<VecDeque<Task>> {
        self.tasks().remove(name).filter(|batch| !batch.is_empty())
    }

    /// Drop every queued task without running it.
    pub fn clear(&self) {
        self.tasks().clear();
    }

    /// Number of tasks queued under `name`.
    pub fn pending(&self, name: &EventName) -> usize {
        self.tasks().get(name).map_or(0, VecDeque::len)
    }

    /// Total number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks().iter().map(|(_, batch)| batch.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PendingCallQueue {
    fn default() -> Self {
        Self::new(QueueMode::default())
    }
}

impl fmt::Debug for PendingCallQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCallQueue")
            .field("mode", &self.mode)
            .field("len", &self.len())
            .finish()
    }
}
