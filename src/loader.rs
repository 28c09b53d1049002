//! This module provides the `DefinitionLoader` struct, responsible for loading machine
//! definitions from files, readers and strings.
//!
//! A definition file is a handful of `key: value` headers followed by a `rules:` section
//! with one rule per line:
//!
//! ```text
//! # Accepts binary strings with exactly one zero
//! name: One zero
//! input: 101
//! initial: q0
//! final: qf
//! blank: _
//! rules:
//!   q0,1 → q0,1,R
//!   q0,0 → q1,0,R
//!   q1,1 → q1,1,R
//!   q1,_ → qf,_,R
//! ```
//!
//! Only `initial` and `rules` are required. The grammar lives in `grammar.pest`.

use crate::form::Definition;
use crate::parser::{parse_error, Rule, RuleParser};
use crate::types::{TuringMachineError, MAX_DEFINITION_SIZE};
use pest::{iterators::Pair, Parser as PestParser};
use std::fs;
use std::io::Read;
use std::path::Path;

/// `DefinitionLoader` is a utility struct for loading machine definitions.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Loads a definition from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the file is successfully read and parsed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or is too large.
    /// * `Err(TuringMachineError::ParseError)` if the content does not follow the grammar.
    /// * `Err(TuringMachineError::ValidationError)` if a required field is missing or invalid.
    pub fn load_definition(path: &Path) -> Result<Definition, TuringMachineError> {
        let size = fs::metadata(path)
            .map_err(|e| {
                TuringMachineError::FileError(format!(
                    "Failed to read file {}: {}",
                    path.display(),
                    e
                ))
            })?
            .len();

        if size > MAX_DEFINITION_SIZE as u64 {
            return Err(TuringMachineError::FileError(format!(
                "File {} exceeds the maximum definition size of {} bytes",
                path.display(),
                MAX_DEFINITION_SIZE
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let definition = Self::load_definition_from_string(&content)?;

        // Fall back to the file stem when the definition has no name.
        if definition.name.is_none() {
            if let Some(stem) = path.file_stem() {
                return Ok(definition.with_name(stem.to_string_lossy()));
            }
        }

        Ok(definition)
    }

    /// Reads definition text from `reader`, refusing anything over `MAX_DEFINITION_SIZE`.
    ///
    /// At most one byte past the limit is read, so an endless stream fails quickly.
    pub fn read_source<R: Read>(reader: R) -> Result<String, TuringMachineError> {
        let mut content = String::new();
        reader
            .take(MAX_DEFINITION_SIZE as u64 + 1)
            .read_to_string(&mut content)
            .map_err(|e| TuringMachineError::FileError(format!("Failed to read input: {}", e)))?;

        if content.len() > MAX_DEFINITION_SIZE {
            return Err(TuringMachineError::FileError(format!(
                "Input exceeds the maximum definition size of {} bytes",
                MAX_DEFINITION_SIZE
            )));
        }

        Ok(content)
    }

    /// Loads a definition from the provided string content.
    ///
    /// Header values keep their text as written after the `:` separator, so an input with
    /// leading blanks or trailing spaces reaches the tape unchanged.
    pub fn load_definition_from_string(content: &str) -> Result<Definition, TuringMachineError> {
        let root = RuleParser::parse(Rule::definition, content)
            .map_err(|e| TuringMachineError::ParseError(Box::new(e.renamed_rules(rule_name))))?
            .next()
            .ok_or_else(|| {
                TuringMachineError::ValidationError("Empty definition".to_string())
            })?;

        let mut headers = Headers::default();
        let mut rules = Vec::new();

        // Rule: definition > [header | rules_keyword | rule]
        for pair in root.into_inner() {
            match pair.as_rule() {
                Rule::header => headers.set(pair)?,
                Rule::rule => rules.push(pair.as_str().trim()),
                _ => {} // rules_keyword and EOI
            }
        }

        let definition = Definition::from_fields(
            headers.input.unwrap_or_default(),
            headers.initial.unwrap_or_default(),
            headers.finals.unwrap_or_default(),
            headers.blank.unwrap_or_default(),
            &rules.join("\n"),
        )?;

        Ok(match headers.name.map(str::trim) {
            Some(name) if !name.is_empty() => definition.with_name(name),
            _ => definition,
        })
    }
}

/// Names grammar rules the way they are written in a file, for parse error messages.
fn rule_name(grammar_rule: &Rule) -> String {
    match grammar_rule {
        Rule::rules_keyword => "\"rules:\"".to_string(),
        Rule::header => "a \"key: value\" header".to_string(),
        Rule::rule => "a transition rule".to_string(),
        other => format!("{other:?}"),
    }
}

#[derive(Default)]
struct Headers<'a> {
    name: Option<&'a str>,
    input: Option<&'a str>,
    initial: Option<&'a str>,
    finals: Option<&'a str>,
    blank: Option<&'a str>,
}

impl<'a> Headers<'a> {
    /// Stores the value of a `Pair<Rule::header>`, rejecting unknown and repeated keys.
    fn set(&mut self, pair: Pair<'a, Rule>) -> Result<(), TuringMachineError> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let key = inner.next().map(|p| p.as_str()).unwrap_or_default();
        let value = inner.next().map(|p| p.as_str()).unwrap_or_default();

        let slot = match key {
            "name" => &mut self.name,
            "input" | "tape" => &mut self.input,
            "initial" => &mut self.initial,
            "final" | "finals" => &mut self.finals,
            "blank" => &mut self.blank,
            other => return Err(parse_error(&format!("Unknown header \"{other}\""), span)),
        };

        if slot.is_some() {
            return Err(parse_error(
                &format!("Duplicate \"{key}:\" declaration"),
                span,
            ));
        }

        *slot = Some(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{Cursor, Write};
    use tempfile::tempdir;

    const ONE_ZERO: &str = "# exactly one zero
name: One zero
input: 101
initial: q0
final: qf
blank: _
rules:
  q0,1 → q0,1,R
  q0,0 → q1,0,R

  # the second half
  q1,1 → q1,1,R
  q1,_ → qf,_,R
";

    #[test]
    fn test_load_from_string() {
        let definition = DefinitionLoader::load_definition_from_string(ONE_ZERO).unwrap();

        assert_eq!(definition.display_name(), "One zero");
        assert_eq!(definition.input, "101");
        assert_eq!(definition.initial_state, "q0");
        assert_eq!(definition.final_states, vec!["qf"]);
        assert_eq!(definition.blank, Some('_'));
        assert_eq!(definition.rules.len(), 4);
        assert_eq!(definition.rules[3], "q1,_ → qf,_,R");
    }

    #[test]
    fn test_load_minimal_definition() {
        let definition =
            DefinitionLoader::load_definition_from_string("initial: s\nrules:\ns,_ -> s,_,R")
                .unwrap();

        assert_eq!(definition.input, "");
        assert!(definition.final_states.is_empty());
        assert_eq!(definition.blank, None);
        assert_eq!(definition.name, None);
    }

    #[test]
    fn test_rule_on_rules_line() {
        let definition =
            DefinitionLoader::load_definition_from_string("initial: q0\nrules: q0,_ → qf,_,R\n")
                .unwrap();

        assert_eq!(definition.rules, vec!["q0,_ → qf,_,R"]);
    }

    #[test]
    fn test_input_keeps_cells_as_written() {
        let definition = DefinitionLoader::load_definition_from_string(
            "input:  _1 \ninitial: q0\nrules:\nq0,_ → q0,_,R",
        )
        .unwrap();

        assert_eq!(definition.input, "_1 ");
    }

    #[test]
    fn test_hash_state_is_a_rule_not_a_comment() {
        let definition = DefinitionLoader::load_definition_from_string(
            "initial: #\nrules:\n#,_ → #,1,R\n# a comment\nq,_ → q,_,R",
        )
        .unwrap();

        assert_eq!(definition.rules, vec!["#,_ → #,1,R", "q,_ → q,_,R"]);
    }

    #[test]
    fn test_missing_rules_section() {
        let error =
            DefinitionLoader::load_definition_from_string("initial: q0\ninput: 1").unwrap_err();

        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error.to_string().contains("\"rules:\""));
    }

    #[test]
    fn test_unknown_and_duplicate_keys() {
        let unknown =
            DefinitionLoader::load_definition_from_string("speed: 3\nrules:\n").unwrap_err();
        assert!(matches!(unknown, TuringMachineError::ParseError(_)));
        assert!(unknown.to_string().contains("Unknown header \"speed\""));

        let duplicate = DefinitionLoader::load_definition_from_string(
            "initial: a\ninitial: b\nrules:\na,_ → a,_,R",
        )
        .unwrap_err();
        assert!(duplicate
            .to_string()
            .contains("Duplicate \"initial:\" declaration"));
        assert!(duplicate.to_string().contains("2:1"));
    }

    #[test]
    fn test_header_without_colon() {
        let error =
            DefinitionLoader::load_definition_from_string("initial q0\nrules:\n").unwrap_err();

        assert!(matches!(error, TuringMachineError::ParseError(_)));
    }

    #[test]
    fn test_malformed_rule_line_points_at_line() {
        let error = DefinitionLoader::load_definition_from_string(
            "initial: q0\nrules:\nq0,1 → q0,1,R\nq0,0 q1,0,R\n",
        )
        .unwrap_err();

        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error.to_string().contains("4:"));
    }

    #[test]
    fn test_load_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("one-zero.tm");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(ONE_ZERO.as_bytes()).unwrap();

        let definition = DefinitionLoader::load_definition(&file_path).unwrap();
        assert_eq!(definition.display_name(), "One zero");
        assert_eq!(definition.rules.len(), 4);
    }

    #[test]
    fn test_file_stem_used_as_name() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("looper.tm");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"initial: q0\nrules:\nq0,_ -> q0,_,R\n")
            .unwrap();

        let definition = DefinitionLoader::load_definition(&file_path).unwrap();
        assert_eq!(definition.display_name(), "looper");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = DefinitionLoader::load_definition(&dir.path().join("missing.tm"));

        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_load_oversized_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("huge.tm");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(&vec![b'#'; MAX_DEFINITION_SIZE + 1]).unwrap();

        let error = DefinitionLoader::load_definition(&file_path).unwrap_err();
        assert!(matches!(error, TuringMachineError::FileError(_)));
        assert!(error.to_string().contains("maximum definition size"));
    }

    #[test]
    fn test_read_source_limit() {
        let source = DefinitionLoader::read_source(Cursor::new(ONE_ZERO)).unwrap();
        assert_eq!(source, ONE_ZERO);

        let oversized = "#".repeat(MAX_DEFINITION_SIZE + 1);
        let result = DefinitionLoader::read_source(Cursor::new(oversized));
        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }
}
