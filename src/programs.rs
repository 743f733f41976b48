use crate::loader::MachineLoader;
use crate::types::{Error, Machine};

use std::sync::RwLock;

// Default embedded machines
const MACHINE_TEXTS: [&str; 2] = [
    include_str!("../demos/even-ones.json"),
    include_str!("../demos/binary-increment.json"),
];

lazy_static::lazy_static! {
    pub static ref MACHINES: RwLock<Vec<Machine>> = RwLock::new(Vec::new());
}

/// Summary of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInfo {
    pub index: usize,
    pub name: String,
    pub start_state: String,
    pub state_count: usize,
    pub symbol_count: usize,
    pub transition_count: usize,
}

pub struct MachineCatalog;

impl MachineCatalog {
    /// Initialize the catalog from the embedded machine descriptions
    pub fn load() -> Result<(), Error> {
        let mut machines = Vec::new();

        for text in MACHINE_TEXTS {
            if let Ok(machine) = MachineLoader::load_machine_from_str(text) {
                machines.push(machine);
            } else {
                eprintln!("Failed to load embedded machine");
            }
        }

        if let Ok(mut write_guard) = MACHINES.write() {
            *write_guard = machines;
        } else {
            return Err(Error::File("Failed to acquire write lock".to_string()));
        }

        Ok(())
    }

    /// Get the number of embedded machines
    pub fn count() -> usize {
        // Initialize with the embedded machines if not already initialized
        let _ = Self::load();

        MACHINES.read().map(|machines| machines.len()).unwrap_or(0)
    }

    /// Get a machine by its index
    pub fn by_index(index: usize) -> Result<Machine, Error> {
        let _ = Self::load();

        MACHINES
            .read()
            .map_err(|_| Error::File("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| Error::File(format!("Machine index {} out of range", index)))
    }

    /// Get a machine by its name
    pub fn by_name(name: &str) -> Result<Machine, Error> {
        let _ = Self::load();

        MACHINES
            .read()
            .map_err(|_| Error::File("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|machine| machine.name == name)
            .cloned()
            .ok_or_else(|| Error::File(format!("Machine '{}' not found", name)))
    }

    /// List all machine names
    pub fn names() -> Vec<String> {
        let _ = Self::load();

        MACHINES
            .read()
            .map(|machines| machines.iter().map(|m| m.name.clone()).collect())
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get summary information about a machine by its index
    pub fn info(index: usize) -> Result<MachineInfo, Error> {
        let machine = Self::by_index(index)?;

        Ok(MachineInfo {
            index,
            name: machine.name.clone(),
            start_state: machine.start_state.clone(),
            state_count: machine.states.len(),
            symbol_count: machine.symbols.len(),
            transition_count: machine.delta.len(),
        })
    }
}
