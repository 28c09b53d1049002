//! Built-in machine definitions, embedded at compile time and parsed on first use.

use crate::form::Definition;
use crate::loader::DefinitionLoader;
use crate::parser::parse_rules;
use crate::types::TuringMachineError;

// Default embedded definitions
const PRESET_TEXTS: [&str; 5] = [
    include_str!("../machines/one-zero.tm"),
    include_str!("../machines/binary-increment.tm"),
    include_str!("../machines/even-ones.tm"),
    include_str!("../machines/palindrome.tm"),
    include_str!("../machines/busy-beaver-2.tm"),
];

/// A built-in definition together with its source text.
#[derive(Debug, Clone)]
pub struct Preset {
    pub definition: Definition,
    pub source: &'static str,
}

lazy_static::lazy_static! {
    pub static ref PRESETS: Vec<Preset> = PRESET_TEXTS
        .into_iter()
        .filter_map(|source| match DefinitionLoader::load_definition_from_string(source) {
            Ok(definition) => Some(Preset { definition, source }),
            Err(e) => {
                tracing::error!("Failed to parse built-in definition: {}", e);
                None
            }
        })
        .collect();
}

/// Summary of a preset for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetInfo {
    pub index: usize,
    pub name: String,
    pub input: String,
    pub initial_state: String,
    pub final_states: Vec<String>,
    /// Every state named by the rules, sorted.
    pub states: Vec<String>,
    pub rule_count: usize,
}

pub struct PresetManager;

impl PresetManager {
    /// Get the number of available presets
    pub fn count() -> usize {
        PRESETS.len()
    }

    /// Get a preset by its index
    pub fn get_by_index(index: usize) -> Result<&'static Preset, TuringMachineError> {
        PRESETS.get(index).ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Preset index {} out of range", index))
        })
    }

    /// Get a preset by its name, ignoring case
    pub fn get_by_name(name: &str) -> Result<&'static Preset, TuringMachineError> {
        PRESETS
            .iter()
            .find(|preset| preset.definition.display_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!(
                    "Preset '{}' not found (available: {})",
                    name,
                    Self::list_names().join(", ")
                ))
            })
    }

    /// List all preset names
    pub fn list_names() -> Vec<String> {
        PRESETS
            .iter()
            .map(|preset| preset.definition.display_name().to_string())
            .collect()
    }

    /// Get information about a preset by its index
    pub fn get_info(index: usize) -> Result<PresetInfo, TuringMachineError> {
        let definition = &Self::get_by_index(index)?.definition;
        let table = parse_rules(&definition.rules)?;

        Ok(PresetInfo {
            index,
            name: definition.display_name().to_string(),
            input: definition.input.clone(),
            initial_state: definition.initial_state.clone(),
            final_states: definition.final_states.clone(),
            states: table.states(),
            rule_count: table.len(),
        })
    }
}
