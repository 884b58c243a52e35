use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, test_summary, OnFailure};

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();
    let start = Instant::now();

    if !integration_only {
        let output = cargo(
            "Unit tests",
            &["test", "--lib", "-p", "platform", "-p", "capture", "-p", "firmware"],
            OnFailure::Fail,
        )?;
        println!("   {}", test_summary(&output).dimmed());
    }

    if !unit_only {
        // Capture scenarios and the line-copy proptests live in capture/tests.
        for krate in ["platform", "capture", "firmware"] {
            let output = cargo(
                &format!("{krate} integration tests"),
                &["test", "-p", krate, "--tests"],
                OnFailure::Fail,
            )?;
            println!("   {}", test_summary(&output).dimmed());
        }
    }

    cargo("Doc tests", &["test", "--doc", "--workspace"], OnFailure::Warn)?;

    println!(
        "{}",
        format!("✓ All tests completed in {:.2}s", start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();
    Ok(())
}
