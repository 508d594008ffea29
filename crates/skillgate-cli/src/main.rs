//! skillgate CLI entry point.
//!
//! Binary name: `skillgate`
//!
//! Exit codes: 0 accept, 1 reject (or commit message rejected), 2 usage or
//! configuration error.

mod cli;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use console::style;

use cli::{Cli, Commands, ReportCommand};
use skillgate_observe::tracing_setup::{default_filter, init_tracing};

const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_ERROR)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = init_tracing(default_filter(cli.verbose, cli.quiet), cli.log_json) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", style("error:").red().bold());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Check { scan, fail_fast } => {
            cli::check::check(&scan, fail_fast, cli.json, cli.quiet)
        }

        Commands::Report { kind } => {
            match kind {
                ReportCommand::Budget { scan } => cli::report::budget(&scan, cli.json)?,
                ReportCommand::ContextLoad { scan } => cli::report::context_load(&scan, cli.json)?,
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::CommitMsg { file } => cli::commit_msg::commit_msg(&file, cli.json),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "skillgate", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}
