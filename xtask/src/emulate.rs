use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;

pub fn run(log: &str) -> Result<()> {
    println!();
    println!("{}", "📷 Starting capture emulator...".cyan().bold());
    println!();

    let status = Command::new("cargo")
        .args([
            "run",
            "-p",
            "firmware",
            "--example",
            "capture_emulator",
            "--features",
            "emulator",
        ])
        .env("RUST_LOG", log)
        .status()
        .context("Failed to start the capture emulator")?;

    if !status.success() {
        anyhow::bail!("Capture emulator exited with {status}");
    }
    Ok(())
}
