//! This module validates machine descriptions before compilation. It checks
//! identifier hygiene, membership of the named states and symbols, and that
//! the transition table is deterministic and total over the non-halting
//! states, then produces the validated machine model.

use crate::types::{
    Action, Direction, Machine, MachineDef, StateSymbol, ValidationError, RESERVED_CHARACTERS,
};
use std::collections::{HashMap, HashSet};

/// Validates a machine description and builds the [`Machine`] model from it.
///
/// Checks run in a fixed order and the first violated invariant is reported,
/// naming the offending field and value. A description that passes here is
/// guaranteed to compile without internal errors.
///
/// # Arguments
///
/// * `def` - The raw description, as deserialized from disk.
///
/// # Returns
///
/// * `Ok(Machine)` if every invariant holds.
/// * `Err(ValidationError)` identifying the first violated invariant.
pub fn analyze(def: &MachineDef) -> Result<Machine, ValidationError> {
    let states = check_states(def)?;
    let symbols = check_symbols(def)?;
    let blank = check_blank(def, &symbols)?;
    check_named_states(def, &states)?;
    let delta = check_delta(def, &states, &symbols)?;

    Ok(Machine {
        name: def.name.clone(),
        states: def.states.clone(),
        symbols: def.symbols.iter().map(|s| first_char(s)).collect(),
        blank,
        start_state: def.start_state.clone(),
        accept_state: def.accept_state.clone(),
        reject_state: def.reject_state.clone(),
        delta,
    })
}

/// Returns true if `name` is a usable identifier: non-empty and free of
/// reserved characters.
fn identifier_is_valid(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| RESERVED_CHARACTERS.contains(c))
}

/// A symbol is a single character that is itself a valid identifier.
fn symbol_is_valid(symbol: &str) -> bool {
    symbol.chars().count() == 1 && identifier_is_valid(symbol)
}

// The symbol strings are checked to be single characters before this is used.
fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or_default()
}

/// Checks that states are non-empty, unique, and reserved-character free.
fn check_states(def: &MachineDef) -> Result<HashSet<String>, ValidationError> {
    if def.states.is_empty() {
        return Err(ValidationError::EmptyStates);
    }

    let mut states = HashSet::new();
    for state in &def.states {
        if !identifier_is_valid(state) {
            return Err(ValidationError::InvalidStateName(state.clone()));
        }
        if !states.insert(state.clone()) {
            return Err(ValidationError::DuplicateState(state.clone()));
        }
    }

    Ok(states)
}

/// Checks that symbols are non-empty, unique, and single valid characters.
fn check_symbols(def: &MachineDef) -> Result<HashSet<char>, ValidationError> {
    if def.symbols.is_empty() {
        return Err(ValidationError::EmptySymbols);
    }

    let mut symbols = HashSet::new();
    for symbol in &def.symbols {
        if !symbol_is_valid(symbol) {
            return Err(ValidationError::InvalidSymbol(symbol.clone()));
        }
        if !symbols.insert(first_char(symbol)) {
            return Err(ValidationError::DuplicateSymbol(symbol.clone()));
        }
    }

    Ok(symbols)
}

/// Checks that the blank symbol is a member of the symbol set.
fn check_blank(def: &MachineDef, symbols: &HashSet<char>) -> Result<char, ValidationError> {
    if !symbol_is_valid(&def.blank_symbol) || !symbols.contains(&first_char(&def.blank_symbol)) {
        return Err(ValidationError::UnknownBlankSymbol(def.blank_symbol.clone()));
    }

    Ok(first_char(&def.blank_symbol))
}

/// Checks the start, accept and reject states: all must be members of the
/// state set, and accept must differ from reject. Start may equal accept.
fn check_named_states(def: &MachineDef, states: &HashSet<String>) -> Result<(), ValidationError> {
    if !states.contains(&def.start_state) {
        return Err(ValidationError::UnknownStartState(def.start_state.clone()));
    }
    if !states.contains(&def.accept_state) {
        return Err(ValidationError::UnknownAcceptState(def.accept_state.clone()));
    }
    if !states.contains(&def.reject_state) {
        return Err(ValidationError::UnknownRejectState(def.reject_state.clone()));
    }
    if def.accept_state == def.reject_state {
        return Err(ValidationError::AcceptEqualsReject(def.accept_state.clone()));
    }

    Ok(())
}

/// Checks every `delta` entry and the totality of the table.
///
/// Entries must start in a known non-halting state, read and write known
/// symbols, go to a known state, and use a supported direction token. Each
/// `(state, symbol)` pair must appear exactly once, and every pair over the
/// non-halting states must be covered.
fn check_delta(
    def: &MachineDef,
    states: &HashSet<String>,
    symbols: &HashSet<char>,
) -> Result<HashMap<StateSymbol, Action>, ValidationError> {
    let mut delta = HashMap::new();

    for ((state, read), (next_state, write, direction)) in &def.delta {
        if !states.contains(state) {
            return Err(ValidationError::TransitionFromUnknownState(state.clone()));
        }
        if state == &def.accept_state || state == &def.reject_state {
            return Err(ValidationError::TransitionFromHaltingState(state.clone()));
        }
        if !symbol_is_valid(read) || !symbols.contains(&first_char(read)) {
            return Err(ValidationError::TransitionReadsUnknownSymbol(read.clone()));
        }
        if !states.contains(next_state) {
            return Err(ValidationError::TransitionToUnknownState(next_state.clone()));
        }
        if !symbol_is_valid(write) || !symbols.contains(&first_char(write)) {
            return Err(ValidationError::TransitionWritesUnknownSymbol(write.clone()));
        }
        let direction = Direction::from_token(direction)
            .ok_or_else(|| ValidationError::UnsupportedDirection(direction.clone()))?;

        let key = StateSymbol::new(state.clone(), first_char(read));
        let action = Action {
            state: next_state.clone(),
            write: first_char(write),
            direction,
        };

        if delta.insert(key, action).is_some() {
            return Err(ValidationError::DuplicateTransition {
                state: state.clone(),
                symbol: first_char(read),
            });
        }
    }

    // Totality: every non-halting (state, symbol) pair needs an entry.
    for state in &def.states {
        if state == &def.accept_state || state == &def.reject_state {
            continue;
        }
        for symbol in &def.symbols {
            let key = StateSymbol::new(state.clone(), first_char(symbol));
            if !delta.contains_key(&key) {
                return Err(ValidationError::MissingTransition {
                    state: state.clone(),
                    symbol: first_char(symbol),
                });
            }
        }
    }

    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_state_def() -> MachineDef {
        MachineDef {
            name: String::new(),
            states: vec!["go".into(), "yes".into(), "no".into()],
            symbols: vec!["a".into(), "_".into()],
            blank_symbol: "_".into(),
            start_state: "go".into(),
            accept_state: "yes".into(),
            reject_state: "no".into(),
            delta: vec![
                (
                    ("go".into(), "a".into()),
                    ("go".into(), "a".into(), ">".into()),
                ),
                (
                    ("go".into(), "_".into()),
                    ("yes".into(), "_".into(), "_".into()),
                ),
            ],
        }
    }

    #[test]
    fn test_valid_machine() {
        let machine = analyze(&two_state_def()).unwrap();

        assert_eq!(machine.states.len(), 3);
        assert_eq!(machine.symbols, vec!['a', '_']);
        assert_eq!(machine.blank, '_');
        assert_eq!(machine.delta.len(), 2);
        assert_eq!(
            machine.action("go", 'a').unwrap().direction,
            Direction::Right
        );
        assert!(machine.is_halting("yes"));
        assert!(!machine.is_halting("go"));
        assert_eq!(machine.non_halting_states().collect::<Vec<_>>(), ["go"]);
    }

    #[test]
    fn test_duplicate_state() {
        let mut def = two_state_def();
        def.states.push("go".into());

        assert_eq!(
            analyze(&def),
            Err(ValidationError::DuplicateState("go".into()))
        );
    }

    #[test]
    fn test_reserved_character_in_state() {
        let mut def = two_state_def();
        def.states[0] = "go#1".into();
        def.start_state = "go#1".into();
        def.delta = Vec::new();

        assert_eq!(
            analyze(&def),
            Err(ValidationError::InvalidStateName("go#1".into()))
        );
    }

    #[test]
    fn test_empty_state_name() {
        let mut def = two_state_def();
        def.states[0] = String::new();

        assert_eq!(
            analyze(&def),
            Err(ValidationError::InvalidStateName(String::new()))
        );
    }

    #[test]
    fn test_multi_character_symbol() {
        let mut def = two_state_def();
        def.symbols[0] = "ab".into();

        assert_eq!(
            analyze(&def),
            Err(ValidationError::InvalidSymbol("ab".into()))
        );
    }

    #[test]
    fn test_duplicate_symbol() {
        let mut def = two_state_def();
        def.symbols.push("a".into());

        assert_eq!(
            analyze(&def),
            Err(ValidationError::DuplicateSymbol("a".into()))
        );
    }

    #[test]
    fn test_blank_not_in_symbols() {
        let mut def = two_state_def();
        def.blank_symbol = "b".into();

        assert_eq!(
            analyze(&def),
            Err(ValidationError::UnknownBlankSymbol("b".into()))
        );
    }

    #[test]
    fn test_unknown_start_state() {
        let mut def = two_state_def();
        def.start_state = "missing".into();

        assert_eq!(
            analyze(&def),
            Err(ValidationError::UnknownStartState("missing".into()))
        );
    }

    #[test]
    fn test_accept_equals_reject() {
        let mut def = two_state_def();
        def.reject_state = "yes".into();

        assert_eq!(
            analyze(&def),
            Err(ValidationError::AcceptEqualsReject("yes".into()))
        );
    }

    #[test]
    fn test_transition_from_halting_state() {
        let mut def = two_state_def();
        def.delta.push((
            ("yes".into(), "a".into()),
            ("yes".into(), "a".into(), "_".into()),
        ));

        assert_eq!(
            analyze(&def),
            Err(ValidationError::TransitionFromHaltingState("yes".into()))
        );
    }

    #[test]
    fn test_transition_to_unknown_state() {
        let mut def = two_state_def();
        def.delta[0].1 .0 = "missing".into();

        assert_eq!(
            analyze(&def),
            Err(ValidationError::TransitionToUnknownState("missing".into()))
        );
    }

    #[test]
    fn test_unsupported_direction_token() {
        let mut def = two_state_def();
        def.delta[0].1 .2 = "R".into();

        assert_eq!(
            analyze(&def),
            Err(ValidationError::UnsupportedDirection("R".into()))
        );
    }

    #[test]
    fn test_duplicate_transition() {
        let mut def = two_state_def();
        def.delta.push(def.delta[0].clone());

        assert_eq!(
            analyze(&def),
            Err(ValidationError::DuplicateTransition {
                state: "go".into(),
                symbol: 'a',
            })
        );
    }

    #[test]
    fn test_missing_transition() {
        let mut def = two_state_def();
        def.delta.pop();

        assert_eq!(
            analyze(&def),
            Err(ValidationError::MissingTransition {
                state: "go".into(),
                symbol: '_',
            })
        );
    }

    #[test]
    fn test_all_halting_states_need_no_delta() {
        // start == accept is legal; with only halting states the table is
        // total over nothing and may be empty.
        let def = MachineDef {
            name: String::new(),
            states: vec!["done".into(), "no".into()],
            symbols: vec!["x".into()],
            blank_symbol: "x".into(),
            start_state: "done".into(),
            accept_state: "done".into(),
            reject_state: "no".into(),
            delta: Vec::new(),
        };

        let machine = analyze(&def).unwrap();
        assert!(machine.delta.is_empty());
        assert_eq!(machine.non_halting_states().count(), 0);
    }

    #[test]
    fn test_tape_check() {
        let machine = analyze(&two_state_def()).unwrap();

        assert!(machine.check_tape("aaa").is_ok());
        assert!(machine.check_tape("").is_ok());
        assert_eq!(
            machine.check_tape("ab"),
            Err(ValidationError::UnknownTapeSymbol('b'))
        );
    }
}
