use std::process::ExitCode;

use clap::Parser;
use palspr::cli::{Cli, Commands};
use palspr::error::{Stage, StageExt, OPTIONS_EXIT_CODE};
use palspr::output::Printer;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(OPTIONS_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let printer = Printer::new();
    let result = match cli.command {
        Commands::Convert(args) => palspr::cli::convert::run(args, &printer),
        Commands::Completions(args) => palspr::cli::completions::run(args).stage(Stage::Options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            printer.error("Failed", &format!("{}", err.stage));
            eprintln!("{:?}", miette::Report::new(err.error));
            ExitCode::from(err.stage.exit_code())
        }
    }
}
