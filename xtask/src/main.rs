// Desktop/tooling crate — unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod doc;
mod emulate;
mod flash;
mod step;
mod test;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Chip name passed to probe-rs.
pub const CHIP: &str = "STM32H743ZITx";
/// Cross-compilation target for the camera module.
pub const TARGET: &str = "thumbv7em-none-eabihf";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Camera module development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flash firmware to STM32H7 hardware via probe-rs
    Flash {
        /// Build and flash release version
        #[arg(short, long)]
        release: bool,
    },
    /// Run the host capture emulator
    Emulate {
        /// tracing filter passed as RUST_LOG
        #[arg(long, default_value = "info")]
        log: String,
    },
    /// Check firmware builds for both hardware and emulator targets
    Check,
    /// Run the test suites
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration and property tests
        #[arg(long)]
        integration: bool,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Flash { release } => flash::run(release),
        Commands::Emulate { log } => emulate::run(&log),
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::Doc { open } => doc::run(open),
    }
}
