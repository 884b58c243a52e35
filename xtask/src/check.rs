use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, OnFailure};
use crate::TARGET;

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking camera firmware builds...".cyan().bold());
    println!();
    let start = Instant::now();

    cargo(
        "Hardware target (STM32H7)",
        &["check", "-p", "firmware", "--target", TARGET, "--features", "hardware"],
        OnFailure::Fail,
    )?;
    cargo(
        "Emulator target (host)",
        &["check", "-p", "firmware", "--features", "emulator", "--examples"],
        OnFailure::Fail,
    )?;
    // The capture core must stay no_std with either logging backend off.
    for krate in ["platform", "capture"] {
        cargo(
            &format!("{krate} crate (no_std)"),
            &["check", "-p", krate, "--target", TARGET, "--no-default-features"],
            OnFailure::Fail,
        )?;
    }
    cargo(
        "Clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        OnFailure::Warn,
    )?;
    cargo("Formatting", &["fmt", "--all", "--check"], OnFailure::Warn)?;

    println!(
        "{}",
        format!("✓ All checks completed in {:.2}s", start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();
    Ok(())
}
