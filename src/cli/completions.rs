//! Shell completions generation.

use clap::Args;
use clap_complete::Shell;

/// Generate shell completions
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> crate::error::Result<()> {
    let mut cmd = <super::Cli as clap::CommandFactory>::command();
    write_completions(args.shell, &mut cmd, &mut std::io::stdout());
    Ok(())
}

fn write_completions(shell: Shell, cmd: &mut clap::Command, out: &mut dyn std::io::Write) {
    clap_complete::generate(shell, cmd, "palspr", out);
}
