//! This module defines the `TuringEngine` struct, which simulates a single-tape deterministic
//! Turing Machine. It owns the tape, the transition table and the run state, and executes
//! transitions one step at a time.

use std::collections::BTreeSet;

use crate::form::Definition;
use crate::journal::{Event, Journal};
use crate::parser::parse_rules;
use crate::snapshot::Snapshot;
use crate::tape::Tape;
use crate::types::{
    Halt, Status, Step, TransitionKey, TransitionTable, TuringMachineError, DEFAULT_BLANK_SYMBOL,
};

/// Represents a single-tape Turing Machine.
///
/// A fresh engine is `Idle`: it has no tape and no rules. `initialize` seeds it and is the
/// only way to change the rule set, the final states or the blank symbol. `reset` clears the
/// run (tape, head, state, counters) but keeps whatever `initialize` loaded.
#[derive(Debug, Default)]
pub struct TuringEngine {
    tape: Tape,
    state: String,
    initial_state: String,
    final_states: BTreeSet<String>,
    rules: TransitionTable,
    step_count: usize,
    outcome: Option<Halt>,
    initialized: bool,
    journal: Journal,
}

impl TuringEngine {
    /// Creates an idle engine with an empty tape and no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the engine, replacing every part of its configuration.
    ///
    /// # Arguments
    ///
    /// * `input` - Initial tape content, one cell per character. May be empty.
    /// * `initial_state` - The state the machine starts in. Not checked for emptiness.
    /// * `final_states` - Accepting states; duplicates collapse.
    /// * `blank` - The blank symbol, `_` when `None`.
    /// * `rules` - Rule lines, see `parser::parse_rule`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the engine is `Running`.
    /// * `Err(TuringMachineError::ParseError)` if any rule is malformed. The engine is left
    ///   exactly as it was.
    pub fn initialize<F, R>(
        &mut self,
        input: &str,
        initial_state: &str,
        final_states: F,
        blank: Option<char>,
        rules: R,
    ) -> Result<(), TuringMachineError>
    where
        F: IntoIterator,
        F::Item: Into<String>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let rules = parse_rules(rules)?;
        let blank = blank.unwrap_or(DEFAULT_BLANK_SYMBOL);

        self.tape = Tape::new(input, blank);
        self.state = initial_state.to_string();
        self.initial_state = initial_state.to_string();
        self.final_states = final_states.into_iter().map(Into::into).collect();
        self.rules = rules;
        self.step_count = 0;
        self.outcome = None;
        self.initialized = true;

        tracing::info!(
            input,
            initial_state,
            final_states = ?self.final_states,
            rules = self.rules.len(),
            %blank,
            "Machine initialized"
        );
        self.journal.record(Event::Initialized {
            input: input.to_string(),
            initial_state: initial_state.to_string(),
            final_states: self.final_states.iter().cloned().collect(),
        });

        Ok(())
    }

    /// Seeds the engine from a parsed `Definition`.
    pub fn load(&mut self, definition: &Definition) -> Result<(), TuringMachineError> {
        self.initialize(
            &definition.input,
            &definition.initial_state,
            definition.final_states.iter().cloned(),
            definition.blank,
            &definition.rules,
        )
    }

    /// Executes a single step of the machine.
    ///
    /// Reads the symbol under the head, looks up the rule for `(state, symbol)`, writes,
    /// changes state, moves the head and then checks for acceptance.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition was applied and the machine keeps running.
    /// * `Step::Halt(Halt::Accepted)` if the applied transition entered a final state.
    /// * `Step::Halt(Halt::Rejected)` if no rule matched; nothing but the status changes.
    /// * `Step::Halt(Halt::AlreadyHalted)` if the machine had already halted; nothing changes.
    pub fn step(&mut self) -> Step {
        if self.is_halted() {
            tracing::info!("Machine has already halted");
            self.journal.record(Event::AlreadyHalted);
            return Step::Halt(Halt::AlreadyHalted);
        }

        let symbol = self.tape.read();
        let Some(transition) = self.rules.get(&self.state, symbol).cloned() else {
            let key = TransitionKey::new(self.state.clone(), symbol);
            tracing::info!(steps = self.step_count, "No transition for {}; rejected", key);
            self.journal.record(Event::NoTransition(key));
            self.outcome = Some(Halt::Rejected);
            return Step::Halt(Halt::Rejected);
        };

        let from = TransitionKey::new(std::mem::take(&mut self.state), symbol);
        tracing::debug!("{} → {}", from, transition);

        self.tape.write(transition.write);
        self.state = transition.next_state.clone();
        self.tape.shift(transition.direction);
        self.step_count += 1;

        self.journal.record(Event::Transition {
            from,
            next_state: transition.next_state,
            write: transition.write,
            direction: transition.direction,
        });

        if self.final_states.contains(&self.state) {
            tracing::info!(
                steps = self.step_count,
                "Machine accepted in final state {}",
                self.state
            );
            self.journal.record(Event::Accepted {
                state: self.state.clone(),
            });
            self.outcome = Some(Halt::Accepted);
            return Step::Halt(Halt::Accepted);
        }

        Step::Continue
    }

    /// Steps until the machine halts or `max_steps` steps have been attempted.
    ///
    /// Returns the last `Step`, which is `Step::Continue` when the limit was reached first.
    pub fn run(&mut self, max_steps: usize) -> Step {
        for _ in 0..max_steps {
            match self.step() {
                Step::Continue => continue,
                halt => return halt,
            }
        }

        Step::Continue
    }

    /// Clears the run back to an idle, empty configuration.
    ///
    /// Tape, head, current state, step count and halt status are cleared. The rules, the
    /// final states, the initial state and the blank symbol are kept; call `initialize` to
    /// change them. The journal is cleared before the reset is recorded.
    pub fn reset(&mut self) {
        self.tape = Tape::empty(self.tape.blank());
        self.state.clear();
        self.step_count = 0;
        self.outcome = None;
        self.initialized = false;

        tracing::info!("Machine reset");
        self.journal.clear();
        self.journal.record(Event::Reset);
    }

    /// Returns an owned view of the current configuration.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tape: self.tape.cells().to_vec(),
            head: self.tape.head(),
            state: self.state.clone(),
            step_count: self.step_count,
            status: self.status(),
            blank: self.tape.blank(),
        }
    }

    pub fn status(&self) -> Status {
        match self.outcome {
            Some(Halt::Accepted) => Status::Accepted,
            Some(_) => Status::Rejected,
            None if self.initialized => Status::Running,
            None => Status::Idle,
        }
    }

    /// Checks if the machine has accepted or rejected.
    pub fn is_halted(&self) -> bool {
        self.outcome.is_some()
    }

    /// Returns the symbol under the head, blank outside the materialized tape.
    pub fn current_symbol(&self) -> char {
        self.tape.read()
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the state passed to the last `initialize`.
    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn final_states(&self) -> &BTreeSet<String> {
        &self.final_states
    }

    pub fn rules(&self) -> &TransitionTable {
        &self.rules
    }

    pub fn blank(&self) -> char {
        self.tape.blank()
    }

    pub fn head(&self) -> isize {
        self.tape.head()
    }

    /// Returns the number of transitions applied since the last `initialize` or `reset`.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}
