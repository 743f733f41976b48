//! This crate compiles single-tape Turing machine descriptions into Tracery
//! grammars. The compiled grammar, expanded by a runtime that stores
//! variable bindings unexpanded until they are referenced, performs exactly
//! the machine's step sequence and halts in a fixed `ACCEPT` or `REJECT`
//! literal. The compiler itself never executes the machine; it only emits
//! the program.

pub mod analyzer;
pub mod compiler;
pub mod encoder;
pub mod grammar;
pub mod loader;
pub mod programs;
pub mod tape;
pub mod types;

/// Re-exports the `analyze` function from the analyzer module.
pub use analyzer::analyze;
/// Re-exports the compilation entry points and options.
pub use compiler::{compile, compile_with, Options, ACCEPT_LITERAL, REJECT_LITERAL};
/// Re-exports the `encode` function from the encoder module.
pub use encoder::encode;
/// Re-exports the grammar rule-set model.
pub use grammar::{Grammar, GrammarRule, Segment, Template};
/// Re-exports the `MachineLoader` struct from the loader module.
pub use loader::MachineLoader;
/// Re-exports `MachineCatalog`, `MachineInfo`, and `MACHINES` from the programs module.
pub use programs::{MachineCatalog, MachineInfo, MACHINES};
/// Re-exports machine model and error types from the types module.
pub use types::{
    CompileError, Direction, Error, Machine, MachineDef, ValidationError, RESERVED_CHARACTERS,
};
