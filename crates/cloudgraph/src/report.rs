// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion lines printed after a successful command.

use std::io::IsTerminal;

use cloudgraph_pipeline::{RunSummary, SchemaPushOutcome};

/// Print the completion lines for `command`, colored on a terminal.
pub fn print_summary(command: &str, summary: &RunSummary) {
    let use_color = std::io::stdout().is_terminal();
    for line in summary_lines(command, summary, use_color) {
        println!("{line}");
    }
}

fn summary_lines(command: &str, summary: &RunSummary, use_color: bool) -> Vec<String> {
    use colored::Colorize;

    let providers = summary.providers.join(" | ");
    let mut lines = Vec::new();

    if command == "scan" {
        for path in &summary.artifacts {
            lines.push(format!("Saved scan data to {}", path.display()));
        }
    }

    if let SchemaPushOutcome::Failed(message) = &summary.schema {
        let line = format!("Schema push to {} failed: {message}", summary.host);
        lines.push(if use_color { line.yellow().to_string() } else { line });
    }

    if summary.stored {
        let line = format!(
            "Your data for {providers} is now being served at {}",
            summary.host
        );
        lines.push(if use_color { line.green().to_string() } else { line });
    } else {
        let line = format!(
            "Storage at {} was unavailable, run `cg load {}` once it is up",
            summary.host,
            summary.providers.join(" ")
        );
        lines.push(if use_color { line.yellow().to_string() } else { line });
    }
    lines
}
