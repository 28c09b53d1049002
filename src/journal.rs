//! The engine journal: an append-only, timestamped record of what the machine did.
//!
//! Front-ends display it; the engine never reads it back.

use chrono::{DateTime, Local};
use std::fmt;

use crate::types::{Direction, TransitionKey};

/// Something worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Initialized {
        input: String,
        initial_state: String,
        final_states: Vec<String>,
    },
    Transition {
        from: TransitionKey,
        next_state: String,
        write: char,
        direction: Direction,
    },
    NoTransition(TransitionKey),
    Accepted {
        state: String,
    },
    AlreadyHalted,
    Reset,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Initialized {
                input,
                initial_state,
                final_states,
            } => write!(
                f,
                "Machine initialized with input \"{}\" | initial state: {} | final states: {}",
                input,
                initial_state,
                final_states.join(", ")
            ),
            Event::Transition {
                from,
                next_state,
                write,
                direction,
            } => write!(f, "{} → ({}, {}, {})", from, next_state, write, direction),
            Event::NoTransition(key) => write!(f, "No transition for {}", key),
            Event::Accepted { state } => {
                write!(f, "Machine accepted the input in final state {}", state)
            }
            Event::AlreadyHalted => write!(f, "Machine has already halted"),
            Event::Reset => write!(f, "Machine reset"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub timestamp: DateTime<Local>,
    pub event: Event,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.event)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<Entry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event stamped with the current local time.
    pub fn record(&mut self, event: Event) {
        self.entries.push(Entry {
            timestamp: Local::now(),
            event,
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterates over the recorded events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter().map(|entry| &entry.event)
    }

    pub fn last(&self) -> Option<&Event> {
        self.entries.last().map(|entry| &entry.event)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
