//! This module provides the `MachineLoader` struct, responsible for loading
//! machine descriptions and initial tape files from disk. It is the thin
//! I/O edge of the pipeline: everything past it operates on in-memory
//! values only.

use crate::analyzer::analyze;
use crate::types::{Error, Machine, MachineDef};
use std::fs;
use std::path::Path;

/// `MachineLoader` is a utility struct for reading compiler inputs.
/// It provides methods to load a machine description from a JSON file or
/// string, and to read an optional initial tape file.
pub struct MachineLoader;

impl MachineLoader {
    /// Loads and validates a machine description from the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the JSON description.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` if the file is read, parsed and validated.
    /// * `Err(Error::File)` if the file cannot be read.
    /// * `Err(Error::Json)` if the content is not well-formed JSON.
    /// * `Err(Error::Validation)` if the description violates an invariant.
    pub fn load_machine(path: &Path) -> Result<Machine, Error> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::File(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::load_machine_from_str(&content)
    }

    /// Loads and validates a machine description from string content.
    ///
    /// Useful for descriptions that are not stored in files, e.g. the
    /// embedded catalog.
    pub fn load_machine_from_str(content: &str) -> Result<Machine, Error> {
        let def: MachineDef =
            serde_json::from_str(content).map_err(|e| Error::Json(e.to_string()))?;

        analyze(&def).map_err(Error::from)
    }

    /// Reads an initial tape file.
    ///
    /// The text is taken verbatim except that one trailing line ending is
    /// stripped; a literal newline can never be a tape symbol, and tape
    /// files conventionally end with one. Tape symbols are validated later,
    /// against the machine the tape is compiled with.
    pub fn load_tape(path: &Path) -> Result<String, Error> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::File(format!("failed to read {}: {}", path.display(), e))
        })?;

        let content = content.strip_suffix('\n').unwrap_or(&content);
        let content = content.strip_suffix('\r').unwrap_or(content);
        Ok(content.to_string())
    }
}
