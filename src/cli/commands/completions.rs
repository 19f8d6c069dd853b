//! Shell completions command implementation.
//!
//! Writes the completion script for the requested shell to stdout, e.g.
//! `boardsync completions zsh > ~/.zfunc/_boardsync`.

use crate::cli::{Cli, Shell};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};
use std::io;

/// Generate a completion script for the specified shell.
pub fn execute(shell: &Shell) -> Result<()> {
    let target = match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    let mut cmd = Cli::command();
    generate(target, &mut cmd, "boardsync", &mut io::stdout());
    Ok(())
}
