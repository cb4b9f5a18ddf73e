//! Progress events published while a task is in flight.
//!
//! The bridge emits via [`EventBus::emit`]; front-ends that want live
//! feedback (the REPL spinner) subscribe via [`EventBus::subscribe`]. Built
//! on [`tokio::sync::broadcast`], so nobody listening is fine.

use tokio::sync::broadcast;

use crate::a2a::TaskState;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The agent accepted the message and created a task.
    TaskSubmitted { task_id: String, state: TaskState },
    /// A status poll returned.
    TaskPolled {
        task_id: String,
        state: TaskState,
        poll: usize,
    },
    /// The task reached a terminal state.
    TaskFinished { task_id: String, state: TaskState },
}

impl Event {
    /// One-line progress text, e.g. `task t1: working (poll 3)`.
    pub fn label(&self) -> String {
        match self {
            Event::TaskSubmitted { task_id, state } => format!("task {task_id}: {state}"),
            Event::TaskPolled {
                task_id,
                state,
                poll,
            } => format!("task {task_id}: {state} (poll {poll})"),
            Event::TaskFinished { task_id, state } => format!("task {task_id}: {state}"),
        }
    }
}

#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns the number of receivers that will see the event.
    pub fn emit(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Receives future events only.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
