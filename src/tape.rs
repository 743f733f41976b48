//! This module encodes the machine's bi-infinite tape as two Tracery binding
//! stacks and defines the rule-name scheme the rest of the compiler builds
//! on.
//!
//! The head symbol is the top of the `*right*` stack; cells to the left of
//! the head sit on `*left*`, nearest first. A cell holding symbol `c` is
//! stored as the deferred template `#*c*#`: because the runtime keeps
//! binding values unexpanded until they are referenced, what a cell *does*
//! is decided by whichever `*c*` bindings are live at the moment it is
//! expanded. Dispatch rules bind the cells to transition rules before
//! peeking the head; left moves bind them to shift rules before peeking the
//! left stack. One cell representation, routed by context.
//!
//! Neither stack is ever popped while empty. A peek of an empty stack falls
//! through to the static `*left*`/`*right*` rule, which pushes a single
//! blank cell and peeks again, so an unexplored region of tape reads as
//! blank and the stack is logically empty again once that cell is consumed.
//! Depth is resolved purely by repeated deferred reference at expansion
//! time; nothing about it is bounded at compile time.
//!
//! Generated names all embed a `*`, which identifier validation keeps out of
//! user states and symbols, so generated names cannot collide with each
//! other or shadow anything the user wrote.

use crate::grammar::{GrammarRule, Template};
use crate::types::Machine;

/// Name of the entry rule; Tracery runtimes start expanding here.
pub const ENTRY_RULE: &str = "origin";

/// The binding stack holding the cells left of the head, nearest first.
pub const LEFT_STACK: &str = "*left*";

/// The binding stack holding the head cell and everything right of it.
pub const RIGHT_STACK: &str = "*right*";

/// The continuation slot. Each transition rule stores the next dispatch
/// reference here unexpanded; the enclosing rule dereferences it afterwards.
pub const NEXT_SLOT: &str = "*next*";

/// The two tape stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stack {
    Left,
    Right,
}

impl Stack {
    /// The binding-stack name.
    pub fn name(self) -> &'static str {
        match self {
            Stack::Left => LEFT_STACK,
            Stack::Right => RIGHT_STACK,
        }
    }

    /// The bare side word used inside generated rule names.
    fn side(self) -> &'static str {
        match self {
            Stack::Left => "left",
            Stack::Right => "right",
        }
    }
}

/// The cell (pop) rule name for `symbol`: `*c*`.
pub fn cell_rule(symbol: char) -> String {
    format!("*{symbol}*")
}

/// The push rule name for `symbol` onto `stack`: `*push*left*c*` or
/// `*push*right*c*`.
pub fn push_rule(stack: Stack, symbol: char) -> String {
    format!("*push*{}*{symbol}*", stack.side())
}

/// The shift rule name for `symbol`: `*shift*c*`.
pub fn shift_rule(symbol: char) -> String {
    format!("*shift*{symbol}*")
}

/// The dispatch rule name for `state`: `*s`. Terminal states use the same
/// name shape for their literal rules, so deferring control to a state is
/// uniform whether or not it halts.
pub fn dispatch_rule(state: &str) -> String {
    format!("*{state}")
}

/// The transition rule name for `(state, symbol)`: `*s*c`.
pub fn transition_rule(state: &str, symbol: char) -> String {
    format!("*{state}*{symbol}")
}

/// A cell holding `symbol`, as stored on a stack.
pub fn cell(symbol: char) -> Template {
    Template::new().expand(cell_rule(symbol))
}

/// The tape-support rules for the machine's alphabet: one cell rule, two
/// push rules and one shift rule per symbol, the two stack bottoms, and the
/// continuation-slot default. Emission order follows the alphabet order of
/// the machine description.
pub fn support_rules(machine: &Machine) -> Vec<(String, GrammarRule)> {
    let mut rules = Vec::new();

    // Cell rules double as the no-context fallback: a cell expanded without
    // routing bindings reads back as its symbol.
    for &symbol in &machine.symbols {
        rules.push((
            cell_rule(symbol),
            GrammarRule::literal(symbol.to_string()),
        ));
    }

    for &symbol in &machine.symbols {
        for stack in [Stack::Left, Stack::Right] {
            rules.push((
                push_rule(stack, symbol),
                GrammarRule::single(Template::new().bind(stack.name(), cell(symbol))),
            ));
        }
    }

    // Shift rules move the top cell of the left stack onto the right stack;
    // left-move transitions select one by rebinding the cells.
    for &symbol in &machine.symbols {
        rules.push((
            shift_rule(symbol),
            GrammarRule::single(
                Template::new()
                    .pop(LEFT_STACK)
                    .expand(push_rule(Stack::Right, symbol)),
            ),
        ));
    }

    for stack in [Stack::Left, Stack::Right] {
        rules.push((
            stack.name().to_string(),
            GrammarRule::single(
                Template::new()
                    .bind(stack.name(), cell(machine.blank))
                    .expand(stack.name()),
            ),
        ));
    }

    // Never reached at run time (transitions always bind the slot before it
    // is dereferenced); present so the closure invariant holds statically.
    rules.push((NEXT_SLOT.to_string(), GrammarRule::single(Template::new())));

    rules
}
