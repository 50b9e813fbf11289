use clap::Parser;
use std::io::{self, IsTerminal};
use tailbench::cli::commands;
use tailbench::cli::{Cli, Commands};
use tailbench::logging::init_logging;
use tailbench::{StructuredError, TailbenchError};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, None) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let config_path = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Merge(args) => commands::merge::execute(args, cli.json, cli.quiet, config_path),
        Commands::Report(args) => commands::report::execute(args, cli.json, cli.quiet, config_path),
        Commands::Run(args) => commands::run::execute(args, cli.json, cli.quiet, config_path),
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::Version => commands::version::execute(cli.json),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &TailbenchError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}
