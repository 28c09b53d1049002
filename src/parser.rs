//! This module provides the parser for transition rules, utilizing the `pest` crate.
//! Each rule is a single line of the form `STATE,SYMBOL → NEXT_STATE,WRITE_SYMBOL,DIRECTION`
//! and is turned into a structured `(TransitionKey, Transition)` pair.

use crate::types::{Direction, Transition, TransitionKey, TransitionTable, TuringMachineError};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Position, Span,
};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the rule grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct RuleParser;

/// Parses a single rule line.
///
/// # Returns
///
/// * `Ok((TransitionKey, Transition))` if the line is a well-formed rule.
/// * `Err(TuringMachineError::ParseError)` if the arrow or a field is missing, a symbol is
///   not exactly one character, or the direction is not `L`/`R` (case-insensitive).
pub fn parse_rule(line: &str) -> Result<(TransitionKey, Transition), TuringMachineError> {
    let line = line.trim();
    let root = RuleParser::parse(Rule::transition, line)
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| parse_error_at("Empty rule", line))?;

    let span = root.as_span();
    let mut pairs = root.into_inner();
    let lhs = next_pair(&mut pairs, span)?;
    let rhs = next_pair(&mut pairs, span)?;

    Ok((parse_lhs(lhs)?, parse_rhs(rhs)?))
}

/// Parses an ordered list of rule lines into a transition table.
///
/// Every line must be a rule; blank lines and comments are the caller's business (see
/// `Definition::from_fields`). When two rules share a `(state, symbol)` key the later one
/// wins and a warning is logged.
pub fn parse_rules<I>(rules: I) -> Result<TransitionTable, TuringMachineError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut table = TransitionTable::new();

    for (index, line) in rules.into_iter().enumerate() {
        let (key, transition) = parse_rule(line.as_ref()).map_err(|e| match e {
            TuringMachineError::ParseError(err) => TuringMachineError::ParseError(Box::new(
                (*err).with_path(&format!("rule #{}", index + 1)),
            )),
            other => other,
        })?;

        if let Some(previous) = table.insert(key.clone(), transition) {
            tracing::warn!(
                "Rule #{} redefines {} (was {}); keeping the last definition",
                index + 1,
                key,
                previous
            );
        }
    }

    Ok(table)
}

/// Parses `STATE,SYMBOL` from a `Pair<Rule::lhs>`.
fn parse_lhs(pair: Pair<Rule>) -> Result<TransitionKey, TuringMachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();
    let state = next_pair(&mut pairs, span)?.as_str().to_string();
    let symbol = parse_symbol(next_pair(&mut pairs, span)?)?;

    Ok(TransitionKey { state, symbol })
}

/// Parses `NEXT_STATE,WRITE_SYMBOL,DIRECTION` from a `Pair<Rule::rhs>`.
fn parse_rhs(pair: Pair<Rule>) -> Result<Transition, TuringMachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();
    let next_state = next_pair(&mut pairs, span)?.as_str().to_string();
    let write = parse_symbol(next_pair(&mut pairs, span)?)?;
    let direction = parse_direction(next_pair(&mut pairs, span)?)?;

    Ok(Transition {
        next_state,
        write,
        direction,
    })
}

/// Parses a tape symbol, which must be exactly one character.
fn parse_symbol(pair: Pair<Rule>) -> Result<char, TuringMachineError> {
    let mut chars = pair.as_str().chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(parse_error(
            &format!("Symbol must be a single character: {}", pair.as_str()),
            pair.as_span(),
        )),
    }
}

/// Parses a direction, accepting `L`/`l` for Left and `R`/`r` for Right.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, TuringMachineError> {
    match pair.as_str() {
        "L" | "l" => Ok(Direction::Left),
        "R" | "r" => Ok(Direction::Right),
        other => Err(parse_error(
            &format!("Unsupported direction: {other} (expected L or R)"),
            pair.as_span(),
        )),
    }
}

/// Takes the next inner pair, reporting a parse error over `span` if the grammar produced none.
fn next_pair<'i>(
    pairs: &mut Pairs<'i, Rule>,
    span: Span<'i>,
) -> Result<Pair<'i, Rule>, TuringMachineError> {
    pairs
        .next()
        .ok_or_else(|| parse_error("Incomplete rule", span))
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
pub(crate) fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Creates a `TuringMachineError::ParseError` pointing at the start of `input`.
fn parse_error_at(msg: &str, input: &str) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_pos(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        Position::from_start(input),
    )))
}
