// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive choice between several saved scans of one provider.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use cloudgraph_core::CloudGraphError;
use cloudgraph_graph::{resolve_selection, ArtifactCandidate};
use cloudgraph_pipeline::{ArtifactSelector, NewestArtifact};
use tracing::info;

/// Prompts on a terminal; otherwise takes the newest artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptSelector;

impl ArtifactSelector for PromptSelector {
    fn select(&self, provider: &str, candidates: &[ArtifactCandidate]) -> Result<PathBuf, CloudGraphError> {
        if !io::stdin().is_terminal() {
            info!(provider, "stdin is not a terminal, skipping the prompt");
            return NewestArtifact.select(provider, candidates);
        }
        prompt(provider, candidates, &mut io::stdin().lock(), &mut io::stderr())
    }
}

/// Show a numbered list and read a choice. Empty input or end of input picks
/// the newest entry.
fn prompt<R, W>(
    provider: &str,
    candidates: &[ArtifactCandidate],
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf, CloudGraphError>
where
    R: BufRead,
    W: Write,
{
    let io_err = |e: io::Error| CloudGraphError::Internal(format!("prompt failed: {e}"));

    writeln!(output, "Select saved data to load for {provider}:").map_err(io_err)?;
    for (index, candidate) in candidates.iter().enumerate() {
        writeln!(output, "  {}) {}", index + 1, candidate.label()).map_err(io_err)?;
    }

    loop {
        write!(output, "choice [1]: ").map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return NewestArtifact.select(provider, candidates);
        }

        let choice = match line.trim() {
            "" => Some(1),
            text => text.parse::<usize>().ok(),
        };
        match choice.and_then(|n| n.checked_sub(1)).and_then(|i| candidates.get(i)) {
            Some(candidate) => return resolve_selection(candidates, &candidate.label()),
            None => writeln!(output, "enter a number between 1 and {}", candidates.len()).map_err(io_err)?,
        }
    }
}
