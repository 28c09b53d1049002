//! This crate provides the core logic for a single-tape deterministic Turing Machine.
//! It includes modules for parsing transition rules, executing a machine step by step,
//! driving automatic runs, loading machine definitions, and a set of built-in machines.

pub mod form;
pub mod journal;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod runner;
pub mod snapshot;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `Definition` struct produced by the form parser and loader.
pub use form::Definition;
/// Re-exports the journal types describing what the engine did.
pub use journal::{Entry, Event, Journal};
/// Re-exports the `DefinitionLoader` struct from the loader module.
pub use loader::DefinitionLoader;
/// Re-exports the `TuringEngine` struct from the machine module.
pub use machine::TuringEngine;
/// Re-exports the rule parsing functions from the parser module.
pub use parser::{parse_rule, parse_rules};
/// Re-exports `Preset`, `PresetInfo`, `PresetManager`, and `PRESETS` from the programs module.
pub use programs::{Preset, PresetInfo, PresetManager, PRESETS};
/// Re-exports the auto-run driver types from the runner module.
pub use runner::{AutoRun, RunState, DEFAULT_RUN_INTERVAL};
/// Re-exports the token used to stop an `AutoRun` from elsewhere.
pub use tokio_util::sync::CancellationToken;
/// Re-exports the snapshot types handed to front-ends.
pub use snapshot::{Cell, Snapshot};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Direction, Halt, Status, Step, Transition, TransitionKey, TransitionTable,
    TuringMachineError, DEFAULT_BLANK_SYMBOL, MAX_EXECUTION_STEPS,
};
