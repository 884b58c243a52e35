use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

use crate::step::{cargo, OnFailure};
use crate::{CHIP, TARGET};

pub fn run(release: bool) -> Result<()> {
    let mode = if release { "release" } else { "debug" };
    println!();
    println!("{}", format!("🔨 Building firmware ({mode} mode)...").cyan().bold());
    println!();

    let mut args = vec!["build", "-p", "firmware", "--target", TARGET, "--features", "hardware"];
    if release {
        args.push("--release");
    }
    cargo("Firmware build", &args, OnFailure::Fail)?;

    let binary = format!("target/{TARGET}/{mode}/firmware");
    show_binary_size(&binary);

    println!("{}", "📡 Flashing to STM32H7...".cyan().bold());
    println!("   {}", "Connecting to probe...".dimmed());
    let start = Instant::now();
    // probe-rs run stays attached and streams defmt RTT output.
    let status = Command::new("probe-rs")
        .args(["run", &binary, "--chip", CHIP, "--probe-index", "0"])
        .status()
        .context("Failed to run probe-rs. Is probe-rs installed? (cargo install probe-rs-tools)")?;

    if !status.success() {
        anyhow::bail!("Flash failed - check that the probe is connected and the device is powered");
    }
    println!(
        "{}",
        format!("✓ Session ended after {:.2}s", start.elapsed().as_secs_f64()).green()
    );
    Ok(())
}

fn show_binary_size(binary: &str) {
    let Ok(out) = Command::new("rust-size").args([binary, "-A"]).output() else {
        return;
    };
    if !out.status.success() {
        return;
    }
    println!("{}", "📊 Binary size:".cyan());
    // .axisram holds the frame pool and line buffers (NOLOAD).
    for line in String::from_utf8_lossy(&out.stdout)
        .lines()
        .filter(|l| l.starts_with('.') || l.starts_with("Total"))
    {
        println!("   {}", line.dimmed());
    }
    println!();
}
