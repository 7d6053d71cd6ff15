//! # Shell Completion Module
//!
//! Generates completion scripts for the mpdrandom flags via clap_complete.
//!
//! ```bash
//! mpdrandom --completions bash > ~/.local/share/bash-completion/completions/mpdrandom
//! mpdrandom --completions fish > ~/.config/fish/completions/mpdrandom.fish
//! ```

use crate::cli::Shell;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::{self, Write};

/// Write completions for `cmd` to `out`.
pub fn write_completions<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

/// Print completions for `cmd` to stdout.
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    write_completions(gen, cmd, &mut io::stdout());
}

/// Convert our Shell enum to clap_complete's Shell enum
pub fn shell_to_completion_shell(shell: &Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::CommandFactory;

    fn render(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_completions(shell_to_completion_shell(&shell), &mut Args::command(), &mut buf);
        String::from_utf8(buf).expect("completion scripts are UTF-8")
    }

    #[test]
    fn test_bash_completion_mentions_flags() {
        let script = render(Shell::Bash);
        assert!(script.contains("mpdrandom"));
        assert!(script.contains("--daemon"));
        assert!(script.contains("--shuffle"));
    }

    #[test]
    fn test_every_shell_generates_output() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            assert!(!render(shell).is_empty(), "{shell:?} produced nothing");
        }
    }
}
