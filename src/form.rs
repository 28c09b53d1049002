//! Turns raw user text into the arguments `TuringEngine::initialize` expects.
//!
//! This is where user input is validated: the engine itself accepts an empty initial state
//! and an empty rule set, a `Definition` does not.

use serde::{Deserialize, Serialize};

use crate::parser::parse_rule;
use crate::types::TuringMachineError;

/// Everything needed to seed a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// A display name; not used by the engine.
    pub name: Option<String>,
    pub input: String,
    pub initial_state: String,
    pub final_states: Vec<String>,
    /// `None` means the default blank symbol.
    pub blank: Option<char>,
    /// Rule lines, trimmed, in textual order.
    pub rules: Vec<String>,
}

impl Definition {
    /// Builds a definition from the raw text of each field.
    ///
    /// * `input` is used as-is.
    /// * `initial_state` is trimmed and must not be empty.
    /// * `final_states` is a comma-separated list; entries are trimmed and empty ones dropped.
    /// * `blank` is trimmed; empty means the default, otherwise it must be one character.
    /// * `rules` holds one rule per line; lines are trimmed and blank lines and `#` comments
    ///   dropped. At least one rule must remain. The rules themselves are parsed later by
    ///   the engine.
    pub fn from_fields(
        input: &str,
        initial_state: &str,
        final_states: &str,
        blank: &str,
        rules: &str,
    ) -> Result<Self, TuringMachineError> {
        let initial_state = initial_state.trim();
        if initial_state.is_empty() {
            return Err(TuringMachineError::ValidationError(
                "An initial state is required".to_string(),
            ));
        }

        let rules = split_rules(rules);
        if rules.is_empty() {
            return Err(TuringMachineError::ValidationError(
                "At least one transition rule is required".to_string(),
            ));
        }

        Ok(Self {
            name: None,
            input: input.to_string(),
            initial_state: initial_state.to_string(),
            final_states: split_states(final_states),
            blank: parse_blank(blank)?,
            rules,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The name to show for this definition.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Custom")
    }
}

/// Splits a comma-separated state list, dropping empty entries.
pub fn split_states(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits rule text into trimmed, non-empty, non-comment lines.
///
/// A line starting with `#` is a comment unless it parses as a rule, which keeps `#` usable
/// as a state name.
pub fn split_rules(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_comment(line))
        .map(str::to_string)
        .collect()
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') && parse_rule(line).is_err()
}

/// Parses the blank field: empty means default, otherwise exactly one character.
pub fn parse_blank(text: &str) -> Result<Option<char>, TuringMachineError> {
    let text = text.trim();
    let mut chars = text.chars();

    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(blank), None) => Ok(Some(blank)),
        _ => Err(TuringMachineError::ValidationError(format!(
            "Blank symbol must be a single character, got \"{text}\""
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fields() {
        let definition = Definition::from_fields(
            "101",
            "  q0 ",
            "qf, qa ,,",
            "",
            "q0,1 → q0,1,R\n\n  # skip me\n  q0,0 → qf,0,R  \n",
        )
        .unwrap();

        assert_eq!(definition.input, "101");
        assert_eq!(definition.initial_state, "q0");
        assert_eq!(definition.final_states, vec!["qf", "qa"]);
        assert_eq!(definition.blank, None);
        assert_eq!(definition.rules, vec!["q0,1 → q0,1,R", "q0,0 → qf,0,R"]);
        assert_eq!(definition.display_name(), "Custom");
    }

    #[test]
    fn test_missing_initial_state() {
        let error = Definition::from_fields("1", "   ", "qf", "_", "q0,1 → qf,1,R").unwrap_err();

        assert_eq!(
            error,
            TuringMachineError::ValidationError("An initial state is required".to_string())
        );
    }

    #[test]
    fn test_missing_rules() {
        let error = Definition::from_fields("1", "q0", "qf", "_", "\n  \n# only a comment").unwrap_err();

        assert!(error
            .to_string()
            .contains("At least one transition rule is required"));
    }

    #[test]
    fn test_malformed_rule_lines_are_kept() {
        let definition = Definition::from_fields("1", "q0", "", "", "not a rule").unwrap();

        assert_eq!(definition.rules, vec!["not a rule"]);
        assert!(definition.final_states.is_empty());
    }

    #[test]
    fn test_hash_state_rule_is_not_a_comment() {
        let definition =
            Definition::from_fields("", "#", "", "", "#,_ → #,1,R\n# note\nq,_ → q,_,R").unwrap();

        assert_eq!(definition.rules, vec!["#,_ → #,1,R", "q,_ → q,_,R"]);
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(parse_blank("").unwrap(), None);
        assert_eq!(parse_blank(" B ").unwrap(), Some('B'));
        assert!(matches!(
            parse_blank("BB"),
            Err(TuringMachineError::ValidationError(_))
        ));
    }

    #[test]
    fn test_with_name() {
        let definition = Definition::from_fields("", "q0", "", "", "q0,_ → q0,_,R")
            .unwrap()
            .with_name("Loop");

        assert_eq!(definition.display_name(), "Loop");
    }
}
