//! This module defines the core data structures and types used throughout the
//! compiler: the raw machine description as read from disk, the validated
//! machine model, transitions, head directions, and error types.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Characters that may never appear in state names or symbols.
///
/// `#`, `[`, `]`, `:` and `,` carry meaning in Tracery template text; `{`,
/// `}` and `"` would have to be escaped in the JSON carrier; whitespace would
/// make the emitted programs ambiguous to read back; `*` is reserved for
/// generated rule names, which is what makes the naming scheme collision-free.
pub const RESERVED_CHARACTERS: &str = "[],{}#\":* \t\n";

/// The `delta` token for a left move.
pub const TOKEN_LEFT: &str = "<";
/// The `delta` token for a right move.
pub const TOKEN_RIGHT: &str = ">";
/// The `delta` token for keeping the head in place.
pub const TOKEN_STAY: &str = "_";

/// Represents the possible directions a machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Move the head one cell to the left.
    Left,
    /// Move the head one cell to the right.
    Right,
    /// Keep the head on the current cell.
    Stay,
}

impl Direction {
    /// Parses a `delta` direction token (`"<"`, `">"` or `"_"`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            TOKEN_LEFT => Some(Direction::Left),
            TOKEN_RIGHT => Some(Direction::Right),
            TOKEN_STAY => Some(Direction::Stay),
            _ => None,
        }
    }
}

/// The `(state, symbol under head)` pair a transition fires on.
///
/// The next action of a single-tape machine depends only on this pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateSymbol {
    /// The state the machine is in.
    pub state: String,
    /// The symbol under the tape head.
    pub symbol: char,
}

impl StateSymbol {
    pub fn new(state: impl Into<String>, symbol: char) -> Self {
        Self {
            state: state.into(),
            symbol,
        }
    }
}

/// What a transition does: successor state, written symbol, head movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The state the machine transitions to.
    pub state: String,
    /// The symbol written over the head cell.
    pub write: char,
    /// How the head moves after writing.
    pub direction: Direction,
}

/// One `delta` entry as it appears in the JSON description:
/// `[[state, symbol], [next_state, write_symbol, direction]]`.
pub type DeltaEntry = ((String, String), (String, String, String));

/// A machine description as read from disk, before validation.
///
/// Field shapes mirror the on-disk format exactly; unrecognized additional
/// fields are ignored. Use [`crate::analyzer::analyze`] to turn a
/// `MachineDef` into a validated [`Machine`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MachineDef {
    /// Optional display name for the machine.
    #[serde(default)]
    pub name: String,
    /// State identifiers; must be unique and non-empty.
    pub states: Vec<String>,
    /// Tape symbols; must be unique single characters.
    pub symbols: Vec<String>,
    /// The blank symbol; must be a member of `symbols`.
    pub blank_symbol: String,
    /// The state the machine starts in.
    pub start_state: String,
    /// The accepting halt state.
    pub accept_state: String,
    /// The rejecting halt state.
    pub reject_state: String,
    /// The transition table.
    pub delta: Vec<DeltaEntry>,
}

/// A validated machine model.
///
/// States and symbols keep the order they had in the description; that order
/// fixes the emission order of the compiled grammar, which is what makes
/// compilation deterministic down to the byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    /// Display name, possibly empty.
    pub name: String,
    /// All state identifiers, in description order.
    pub states: Vec<String>,
    /// The tape alphabet, in description order.
    pub symbols: Vec<char>,
    /// The blank symbol, a member of `symbols`.
    pub blank: char,
    /// The start state; may coincide with the accept state.
    pub start_state: String,
    /// The accepting halt state.
    pub accept_state: String,
    /// The rejecting halt state; always distinct from `accept_state`.
    pub reject_state: String,
    /// The transition table, total over non-halting states and all symbols.
    pub delta: HashMap<StateSymbol, Action>,
}

impl Machine {
    /// Returns true if `state` is the accept or reject state.
    pub fn is_halting(&self, state: &str) -> bool {
        state == self.accept_state || state == self.reject_state
    }

    /// The states the transition table is total over, in description order.
    pub fn non_halting_states(&self) -> impl Iterator<Item = &str> {
        self.states
            .iter()
            .filter(|s| !self.is_halting(s))
            .map(String::as_str)
    }

    /// Looks up the action for `(state, symbol)`.
    pub fn action(&self, state: &str, symbol: char) -> Option<&Action> {
        self.delta.get(&StateSymbol::new(state, symbol))
    }

    /// Checks that every character of an initial tape is a tape symbol.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the tape is well-formed.
    /// * `Err(ValidationError::UnknownTapeSymbol)` on the first offending character.
    pub fn check_tape(&self, tape: &str) -> Result<(), ValidationError> {
        match tape.chars().find(|c| !self.symbols.contains(c)) {
            Some(c) => Err(ValidationError::UnknownTapeSymbol(c)),
            None => Ok(()),
        }
    }
}

/// A violated invariant of the machine description itself.
///
/// Every variant names the field and value at fault. These are input errors:
/// the description that was handed in is not a well-formed machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("machine has no states")]
    EmptyStates,
    #[error("machine has no symbols")]
    EmptySymbols,
    #[error("state name \"{0}\" is duplicated")]
    DuplicateState(String),
    #[error("symbol \"{0}\" is duplicated")]
    DuplicateSymbol(String),
    #[error("state name \"{0}\" is empty or contains a reserved character")]
    InvalidStateName(String),
    #[error("symbol \"{0}\" must be a single non-reserved character")]
    InvalidSymbol(String),
    #[error("blank symbol \"{0}\" is not in the symbol set")]
    UnknownBlankSymbol(String),
    #[error("start state \"{0}\" is not in the state set")]
    UnknownStartState(String),
    #[error("accept state \"{0}\" is not in the state set")]
    UnknownAcceptState(String),
    #[error("reject state \"{0}\" is not in the state set")]
    UnknownRejectState(String),
    #[error("accept and reject state are both \"{0}\"")]
    AcceptEqualsReject(String),
    #[error("transition starts in unknown state \"{0}\"")]
    TransitionFromUnknownState(String),
    #[error("transition starts in halting state \"{0}\"")]
    TransitionFromHaltingState(String),
    #[error("transition reads unknown symbol \"{0}\"")]
    TransitionReadsUnknownSymbol(String),
    #[error("transition goes to unknown state \"{0}\"")]
    TransitionToUnknownState(String),
    #[error("transition writes unknown symbol \"{0}\"")]
    TransitionWritesUnknownSymbol(String),
    #[error("unsupported direction token \"{0}\"")]
    UnsupportedDirection(String),
    #[error("duplicate transition for state \"{state}\" and symbol \"{symbol}\"")]
    DuplicateTransition { state: String, symbol: char },
    #[error("missing transition for state \"{state}\" and symbol \"{symbol}\"")]
    MissingTransition { state: String, symbol: char },
    #[error("initial tape contains \"{0}\", which is not in the symbol set")]
    UnknownTapeSymbol(char),
}

/// An internal consistency failure during rule emission.
///
/// Unreachable for descriptions that pass validation; hitting one of these
/// signals a bug in the compiler, not bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("no transition compiled for state \"{state}\" and symbol \"{symbol}\"")]
    UndefinedTransition { state: String, symbol: char },
    #[error("rule \"{0}\" was emitted twice")]
    DuplicateRule(String),
    #[error("rule \"{rule}\" references \"{target}\", which is not in the rule set")]
    UnresolvedReference { rule: String, target: String },
}

/// Top-level error type for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The machine description or initial tape violates an invariant.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Rule emission went inconsistent; a compiler bug.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
    /// A file could not be read or written.
    #[error("file error: {0}")]
    File(String),
    /// The machine description is not well-formed JSON.
    #[error("json error: {0}")]
    Json(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_tokens() {
        assert_eq!(Direction::from_token("<"), Some(Direction::Left));
        assert_eq!(Direction::from_token(">"), Some(Direction::Right));
        assert_eq!(Direction::from_token("_"), Some(Direction::Stay));
        assert_eq!(Direction::from_token("L"), None);
        assert_eq!(Direction::from_token(""), None);
    }

    #[test]
    fn test_machine_def_deserialization() {
        let json = r#"{
            "states": ["A", "halt-yes", "halt-no"],
            "symbols": ["0", "1"],
            "blank_symbol": "0",
            "start_state": "A",
            "accept_state": "halt-yes",
            "reject_state": "halt-no",
            "delta": [[["A", "0"], ["halt-yes", "0", "_"]], [["A", "1"], ["halt-no", "1", "_"]]],
            "comment": "extra fields are ignored"
        }"#;

        let def: MachineDef = serde_json::from_str(json).unwrap();
        assert_eq!(def.name, "");
        assert_eq!(def.states.len(), 3);
        assert_eq!(def.delta.len(), 2);
        assert_eq!(def.delta[0].0, ("A".to_string(), "0".to_string()));
        assert_eq!(
            def.delta[0].1,
            ("halt-yes".to_string(), "0".to_string(), "_".to_string())
        );
    }

    #[test]
    fn test_error_display() {
        let error = ValidationError::UnknownBlankSymbol("x".to_string());
        let msg = format!("{}", error);
        assert!(msg.contains("blank symbol"));
        assert!(msg.contains('x'));

        let error = Error::from(CompileError::DuplicateRule("*A*0".to_string()));
        let msg = format!("{}", error);
        assert!(msg.contains("compile error"));
        assert!(msg.contains("*A*0"));
    }

    #[test]
    fn test_reserved_characters_cover_template_syntax() {
        for c in ['#', '[', ']', ':', '*', ','] {
            assert!(RESERVED_CHARACTERS.contains(c), "{c} must be reserved");
        }
    }
}
