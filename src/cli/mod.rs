pub mod completions;
pub mod convert;

use clap::{Parser, Subcommand};

/// palspr - Palette-indexed sprite converter
#[derive(Parser, Debug)]
#[command(name = "palspr")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert images into sprite data and table files
    Convert(convert::ConvertArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["palspr", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions(_)));
    }
}
