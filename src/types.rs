//! This module defines the core data structures and types used throughout the Turing Machine
//! engine, including transitions, the transition table, execution outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The default blank symbol used on the Turing Machine tape.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// The maximum allowed size for a machine definition in bytes.
pub const MAX_DEFINITION_SIZE: usize = 65536; // 64KB
/// The maximum number of steps `TuringEngine::run` executes by default.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// Represents the possible directions the head can move.
///
/// Every transition moves the head; there is no stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// Offset applied to the head index when moving in this direction.
    pub fn offset(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

/// The left-hand side of a rule: the current state and the symbol under the head.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionKey {
    pub state: String,
    pub symbol: char,
}

impl TransitionKey {
    pub fn new(state: impl Into<String>, symbol: char) -> Self {
        Self {
            state: state.into(),
            symbol,
        }
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.state, self.symbol)
    }
}

/// The right-hand side of a rule: what the machine does once a key matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The next state the machine transitions to.
    pub next_state: String,
    /// The symbol written at the head before it moves.
    pub write: char,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.next_state, self.write, self.direction)
    }
}

/// The full rule set of a machine, keyed by `(state, symbol)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    rules: HashMap<TransitionKey, Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rule, returning the rule it replaced if the key was already present.
    pub fn insert(&mut self, key: TransitionKey, transition: Transition) -> Option<Transition> {
        self.rules.insert(key, transition)
    }

    /// Looks up the rule for the given state and symbol.
    pub fn get(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.rules.get(&TransitionKey::new(state, symbol))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TransitionKey, &Transition)> {
        self.rules.iter()
    }

    /// Returns every state mentioned on either side of a rule, sorted.
    pub fn states(&self) -> Vec<String> {
        let mut states: Vec<String> = self
            .rules
            .iter()
            .flat_map(|(key, t)| [key.state.clone(), t.next_state.clone()])
            .collect();
        states.sort();
        states.dedup();
        states
    }
}

/// Represents the outcome of a call to `TuringEngine::step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition was applied and the machine keeps running.
    Continue,
    /// The machine is halted after this call.
    Halt(Halt),
}

impl Step {
    /// Whether this call applied a transition.
    ///
    /// True for `Continue` and for the step that reached a final state, false for a
    /// rejection and for stepping an already halted machine.
    pub fn applied(&self) -> bool {
        matches!(self, Step::Continue | Step::Halt(Halt::Accepted))
    }
}

/// Why the machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The step moved the machine into a final state.
    Accepted,
    /// No rule matched the current state and symbol.
    Rejected,
    /// The machine had already halted; nothing happened.
    AlreadyHalted,
}

/// Externally visible status of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Not seeded by `initialize` since construction or the last `reset`.
    Idle,
    Running,
    Accepted,
    Rejected,
}

impl Status {
    pub fn is_halted(self) -> bool {
        matches!(self, Status::Accepted | Status::Rejected)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Idle => "Idle",
            Status::Running => "Running",
            Status::Accepted => "Accepted",
            Status::Rejected => "Rejected",
        };
        f.write_str(label)
    }
}

/// Represents various errors that can occur while building or loading a machine.
///
/// Running a machine never fails: a missing rule is the `Rejected` outcome, not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates a malformed rule line.
    #[error("Rule parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a definition that is syntactically fine but unusable.
    #[error("Definition validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to reading definition files.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let right_json = serde_json::to_string(&Direction::Right).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(right_json, "\"Right\"");

        let left: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, Direction::Left);
    }

    #[test]
    fn test_direction_offset() {
        assert_eq!(Direction::Left.offset(), -1);
        assert_eq!(Direction::Right.offset(), 1);
    }

    #[test]
    fn test_table_insert_replaces_existing_key() {
        let mut table = TransitionTable::new();
        let first = Transition {
            next_state: "q1".into(),
            write: '1',
            direction: Direction::Right,
        };
        let second = Transition {
            next_state: "q2".into(),
            write: '0',
            direction: Direction::Left,
        };

        assert!(table.insert(TransitionKey::new("q0", '1'), first.clone()).is_none());
        assert_eq!(
            table.insert(TransitionKey::new("q0", '1'), second.clone()),
            Some(first)
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("q0", '1'), Some(&second));
        assert_eq!(table.get("q0", '0'), None);
    }

    #[test]
    fn test_table_states() {
        let mut table = TransitionTable::new();
        table.insert(
            TransitionKey::new("q0", '1'),
            Transition {
                next_state: "qf".into(),
                write: '1',
                direction: Direction::Right,
            },
        );

        assert_eq!(table.states(), vec!["q0".to_string(), "qf".to_string()]);
    }

    #[test]
    fn test_step_applied() {
        assert!(Step::Continue.applied());
        assert!(Step::Halt(Halt::Accepted).applied());
        assert!(!Step::Halt(Halt::Rejected).applied());
        assert!(!Step::Halt(Halt::AlreadyHalted).applied());
    }

    #[test]
    fn test_error_display() {
        let error = TuringMachineError::ValidationError("missing initial state".into());

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Definition validation error"));
        assert!(error_msg.contains("missing initial state"));
    }
}
