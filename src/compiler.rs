//! This module turns a validated machine into a complete Tracery rule set.
//! It emits one transition rule per `(state, symbol)` pair, one dispatch
//! rule per non-halting state, terminal literals for the accept and reject
//! states, and the entry rule that seeds the tape, then assembles them with
//! the tape-support rules into one immutable grammar.
//!
//! Control flow between steps is a trampoline built on deferred expansion.
//! A transition rule never expands its successor inline; it stores the
//! successor's dispatch reference in the `*next*` slot, unexpanded, and the
//! enclosing dispatch rule dereferences the slot after the transition has
//! finished mutating the tape. A runtime that expanded binding values
//! eagerly would recurse forever on the first self-reaching state; the
//! deferred store is exactly what lets the same finite rule fire again on
//! every revisit.

use crate::grammar::{Grammar, GrammarRule, Template};
use crate::tape::{
    self, cell_rule, dispatch_rule, push_rule, shift_rule, transition_rule, Stack, ENTRY_RULE,
    LEFT_STACK, NEXT_SLOT, RIGHT_STACK,
};
use crate::types::{Action, CompileError, Direction, Error, Machine};

/// Literal the accept state's terminal rule expands to.
pub const ACCEPT_LITERAL: &str = "ACCEPT";

/// Literal the reject state's terminal rule expands to.
pub const REJECT_LITERAL: &str = "REJECT";

/// Compilation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Prefix every transition rule with a newline and its own name, so the
    /// expanded grammar prints the step sequence it takes before the
    /// terminal literal.
    pub trace: bool,
}

/// Compiles `machine` with an optional initial tape and default options.
///
/// The tape's characters become the cells to the right of the head, in
/// order, with the head on the first character; an empty tape starts the
/// machine on all-blank cells.
pub fn compile(machine: &Machine, input: &str) -> Result<Grammar, Error> {
    compile_with(machine, input, Options::default())
}

/// Compiles `machine` with an optional initial tape.
///
/// # Arguments
///
/// * `machine` - The validated machine model.
/// * `input` - Initial tape contents; every character must be a tape symbol.
/// * `options` - Compilation options.
///
/// # Returns
///
/// * `Ok(Grammar)` - The assembled rule set, ready for serialization.
/// * `Err(Error::Validation)` if the initial tape uses an unknown symbol;
///   nothing is emitted in that case.
/// * `Err(Error::Compile)` on an internal emission inconsistency, which is
///   unreachable for validated machines.
pub fn compile_with(machine: &Machine, input: &str, options: Options) -> Result<Grammar, Error> {
    machine.check_tape(input)?;

    let mut grammar = Grammar::new(ENTRY_RULE);
    grammar.insert(ENTRY_RULE, entry(machine, input))?;

    // Dispatch and transition rules are emitted for every non-halting
    // state, reachable or not; reachability is the machine's business.
    for state in &machine.states {
        if machine.is_halting(state) {
            continue;
        }

        grammar.insert(dispatch_rule(state), dispatch(machine, state))?;

        for &symbol in &machine.symbols {
            let action =
                machine
                    .action(state, symbol)
                    .ok_or_else(|| CompileError::UndefinedTransition {
                        state: state.clone(),
                        symbol,
                    })?;
            grammar.insert(
                transition_rule(state, symbol),
                transition(machine, state, symbol, action, options),
            )?;
        }
    }

    grammar.insert(
        dispatch_rule(&machine.accept_state),
        GrammarRule::literal(ACCEPT_LITERAL),
    )?;
    grammar.insert(
        dispatch_rule(&machine.reject_state),
        GrammarRule::literal(REJECT_LITERAL),
    )?;

    for (name, rule) in tape::support_rules(machine) {
        grammar.insert(name, rule)?;
    }

    Ok(grammar)
}

/// The entry rule: seed the right stack from the initial tape, store the
/// start state's dispatch reference in the continuation slot, dereference.
///
/// Characters are pushed right to left so the first character ends up on
/// top, under the head.
fn entry(machine: &Machine, input: &str) -> GrammarRule {
    let mut template = Template::new();
    for symbol in input.chars().rev() {
        template = template.expand(push_rule(Stack::Right, symbol));
    }

    template = template
        .bind(
            NEXT_SLOT,
            Template::new().expand(dispatch_rule(&machine.start_state)),
        )
        .expand(NEXT_SLOT);

    GrammarRule::single(template)
}

/// The dispatch rule for a non-halting state: bind every cell name to this
/// state's transition for that symbol, peek the head, then follow the
/// continuation the transition stored.
///
/// The peek runs the whole transition: the head cell's `#*c*#` resolves to
/// the binding made here, which is the `(state, c)` transition rule. An
/// empty right stack auto-extends with a blank cell first, so the blank
/// transition fires on unexplored tape.
fn dispatch(machine: &Machine, state: &str) -> GrammarRule {
    let mut template = Template::new();
    for &symbol in &machine.symbols {
        template = template.bind(
            cell_rule(symbol),
            Template::new().expand(transition_rule(state, symbol)),
        );
    }

    GrammarRule::single(template.expand(RIGHT_STACK).expand(NEXT_SLOT))
}

/// The transition rule for `(state, symbol)` performing `action`.
///
/// In order: consume the head cell (dispatch guaranteed it exists), write
/// the output symbol onto whichever stack ends up behind the head, move the
/// head for left moves by shifting the top left cell over, and store the
/// successor's dispatch reference in the continuation slot.
fn transition(
    machine: &Machine,
    state: &str,
    symbol: char,
    action: &Action,
    options: Options,
) -> GrammarRule {
    let mut template = Template::new();
    if options.trace {
        template = template.text(format!("\n{} ", transition_rule(state, symbol)));
    }

    template = template.pop(RIGHT_STACK);

    template = match action.direction {
        // The written cell stays at or behind the new head on the right.
        Direction::Stay | Direction::Left => {
            template.expand(push_rule(Stack::Right, action.write))
        }
        // Moving right leaves the written cell behind the head on the left.
        Direction::Right => template.expand(push_rule(Stack::Left, action.write)),
    };

    if action.direction == Direction::Left {
        // Rebind the cells to shift mode, then peek the left stack: its top
        // cell pops itself onto the right stack and becomes the new head.
        for &c in &machine.symbols {
            template = template.bind(cell_rule(c), Template::new().expand(shift_rule(c)));
        }
        template = template.expand(LEFT_STACK);
    }

    template = template.bind(
        NEXT_SLOT,
        Template::new().expand(dispatch_rule(&action.state)),
    );

    GrammarRule::single(template)
}
