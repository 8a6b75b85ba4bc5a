//! Multi-core RV32I emulator CLI.
//!
//! This binary is the single entry point for running guest programs. It
//! performs:
//! 1. **Configuration:** Built-in defaults, optionally overridden by a JSON
//!    machine description.
//! 2. **Loading:** Reads the guest ELF and populates memory through the
//!    loader.
//! 3. **Execution:** Runs every core to completion and exits with the guest
//!    exit code.

use clap::{Parser, Subcommand};
use std::{fs, process};

use rv32mc_core::sim::Simulator;
use rv32mc_core::Config;

#[derive(Parser, Debug)]
#[command(
    name = "rv32mc",
    author,
    version,
    about = "Multi-core RISC-V RV32I emulator",
    long_about = "Run a 32-bit RISC-V ELF on N emulated cores sharing one bus.\n\nExamples:\n  rv32mc run program.elf\n  rv32mc run --config machine.json --cores 4 program.elf"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a RISC-V ELF executable until the guest exits.
    Run {
        /// The RV32 ELF file to execute.
        file: String,

        /// JSON machine description; missing fields use built-in defaults.
        #[arg(short, long)]
        config: Option<String>,

        /// Override the number of cores.
        #[arg(long)]
        cores: Option<u32>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            file,
            config,
            cores,
        } => {
            let code = cmd_run(&file, config.as_deref(), cores);
            process::exit(code);
        }
    }
}

/// Loads the configuration and guest image, runs the machine, and returns
/// the guest exit code.
fn cmd_run(file: &str, config_path: Option<&str>, cores: Option<u32>) -> i32 {
    let mut config = match config_path {
        Some(path) => {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(err) => {
                    eprintln!("error: cannot read config '{path}': {err}");
                    return 1;
                }
            };
            match serde_json::from_str::<Config>(&text) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("error: invalid config '{path}': {err}");
                    return 1;
                }
            }
        }
        None => Config::default(),
    };
    if let Some(cores) = cores {
        config.cores = cores.max(1);
    }

    let image = match fs::read(file) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("error: cannot read '{file}': {err}");
            return 1;
        }
    };

    let mut simulator = Simulator::new(config);
    if let Err(err) = simulator.load(&image) {
        eprintln!("error: failed to load '{file}': {err}");
        return 1;
    }

    simulator.run()
}
