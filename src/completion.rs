//! # Shell Completion Module
//!
//! ```bash
//! # Generate bash completions
//! scrobbletime completion bash > ~/.local/share/bash-completion/completions/scrobbletime
//!
//! # Generate zsh completions
//! scrobbletime completion zsh > ~/.config/zsh/completions/_scrobbletime
//! ```

use crate::cli::Shell;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::{self, Write};

/// Writes completions for `cmd` to `out`.
pub fn write_completions<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

/// Generate shell completions for the given shell on stdout
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    write_completions(gen, cmd, &mut io::stdout());
}

/// Convert our Shell enum to clap_complete's Shell enum
pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
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

    #[test]
    fn test_bash_completion_mentions_commands() {
        let mut cmd = Args::command();
        let mut out = Vec::new();
        write_completions(shell_to_completion_shell(Shell::Bash), &mut cmd, &mut out);

        let script = String::from_utf8(out).expect("utf-8 script");
        assert!(script.contains("_scrobbletime"));
        assert!(script.contains("import-catalog"));
        assert!(script.contains("seasonal"));
    }
}
