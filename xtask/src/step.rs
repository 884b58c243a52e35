//! One cargo invocation with a timed, coloured status line.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output};
use std::time::Instant;

/// How a failing step affects the task.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Abort the task.
    Fail,
    /// Report and keep going.
    Warn,
}

/// Run `cargo <args>` and report it as `label`.
///
/// Returns the captured output so callers can pick out summaries.
pub fn cargo(label: &str, args: &[&str], on_failure: OnFailure) -> Result<Output> {
    println!("{}", format!("  {label}...").cyan());
    let start = Instant::now();
    let output = Command::new("cargo")
        .args(args)
        .output()
        .with_context(|| format!("Failed to run cargo {}", args.join(" ")))?;
    let elapsed = start.elapsed().as_secs_f64();

    if output.status.success() {
        println!("{}", format!("  ✓ {label} passed in {elapsed:.2}s").green());
    } else if on_failure == OnFailure::Warn {
        eprintln!("{}", format!("  ⚠ {label} reported problems").yellow().bold());
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
    } else {
        eprintln!("{}", format!("  ✗ {label} failed").red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stdout));
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("{label} failed");
    }
    println!();
    Ok(output)
}

/// The `test result:` tail of libtest output, summed over all binaries.
pub fn test_summary(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let (mut passed, mut failed) = (0u64, 0u64);
    for line in stdout.lines().filter(|l| l.contains("test result:")) {
        passed = passed.saturating_add(count_before(line, " passed"));
        failed = failed.saturating_add(count_before(line, " failed"));
    }
    format!("({passed} passed, {failed} failed)")
}

fn count_before(line: &str, word: &str) -> u64 {
    line.split(';')
        .find(|part| part.contains(word))
        .and_then(|part| part.split_whitespace().rev().nth(1))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}
