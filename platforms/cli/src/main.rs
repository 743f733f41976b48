use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tmtracery::compiler::{compile_with, Options};
use tmtracery::encoder::encode;
use tmtracery::loader::MachineLoader;
use tmtracery::programs::MachineCatalog;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a machine description into a Tracery grammar program
    Compile {
        /// The machine description file to compile
        #[clap(required_unless_present = "program")]
        machine: Option<PathBuf>,

        /// Compile an embedded demonstration machine instead of a file
        #[clap(short, long, conflicts_with = "machine")]
        program: Option<String>,

        /// Optional initial tape file for the machine
        #[clap(short, long)]
        input: Option<PathBuf>,

        /// Output file (defaults to the machine file with ".tracery.json" appended)
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Make the compiled grammar print each step it takes
        #[clap(short, long)]
        verbose: bool,
    },
    /// List the embedded demonstration machines
    Programs,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Compile {
            machine,
            program,
            input,
            output,
            verbose,
        } => compile_command(
            machine.as_deref(),
            program.as_deref(),
            input.as_deref(),
            output,
            verbose,
        ),
        Command::Programs => list_programs(),
    }
}

fn compile_command(
    machine_path: Option<&Path>,
    program: Option<&str>,
    input: Option<&Path>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let machine = match (machine_path, program) {
        (Some(path), None) => MachineLoader::load_machine(path)?,
        (None, Some(name)) => MachineCatalog::by_name(name)?,
        _ => return Err("either a machine file or --program is required".into()),
    };

    let tape = match input {
        Some(path) => MachineLoader::load_tape(path)?,
        None => String::new(),
    };

    let grammar = compile_with(&machine, &tape, Options { trace: verbose })?;
    let text = encode(&grammar)?;

    let out_path = output
        .or_else(|| machine_path.map(default_output_path))
        .ok_or("--output is required when compiling an embedded machine")?;

    // The file is written only after the whole pipeline has succeeded.
    fs::write(&out_path, text)
        .map_err(|e| format!("failed to write {}: {}", out_path.display(), e))?;

    println!("wrote {} rules to {}", grammar.len(), out_path.display());
    Ok(())
}

fn default_output_path(machine: &Path) -> PathBuf {
    let mut name = machine.as_os_str().to_os_string();
    name.push(".tracery.json");
    PathBuf::from(name)
}

fn list_programs() -> Result<(), Box<dyn std::error::Error>> {
    for index in 0..MachineCatalog::count() {
        let info = MachineCatalog::info(index)?;
        println!(
            "{}: {} ({} states, {} symbols, {} transitions, starts in {})",
            info.index,
            info.name,
            info.state_count,
            info.symbol_count,
            info.transition_count,
            info.start_state
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("machines/parity.json")),
            PathBuf::from("machines/parity.json.tracery.json")
        );
    }

    #[test]
    fn test_compile_command_writes_grammar() {
        let dir = tempdir().unwrap();
        let machine_path = dir.path().join("m.json");
        let mut file = fs::File::create(&machine_path).unwrap();
        file.write_all(
            br#"{
                "states": ["s", "yes", "no"],
                "symbols": ["x"],
                "blank_symbol": "x",
                "start_state": "s",
                "accept_state": "yes",
                "reject_state": "no",
                "delta": [[["s", "x"], ["yes", "x", "_"]]]
            }"#,
        )
        .unwrap();

        compile_command(Some(&machine_path), None, None, None, false).unwrap();

        let out_path = dir.path().join("m.json.tracery.json");
        let text = fs::read_to_string(out_path).unwrap();
        assert!(text.contains("\"origin\""));
    }

    #[test]
    fn test_failed_compilation_writes_nothing() {
        let dir = tempdir().unwrap();
        let machine_path = dir.path().join("broken.json");
        fs::write(&machine_path, "{\"states\": []}").unwrap();

        let out_path = dir.path().join("out.json");
        let result = compile_command(
            Some(&machine_path),
            None,
            None,
            Some(out_path.clone()),
            false,
        );

        assert!(result.is_err());
        assert!(!out_path.exists());
    }
}
