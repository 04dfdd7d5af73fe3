//! pipesh - a small pipeline shell
//!
//! Usage:
//!   pipesh              Start interactive shell
//!   pipesh -c "cmd"     Execute a single line
//!   pipesh script       Execute each line of a file

mod cli;
mod rcfile;
mod repl;

use pipesh::Config;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let cli = cli::parse_args(&args);

    if cli.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = Config::from_process_env();
    cli::init_logging(config.log_level);

    if let Some(cmd) = cli.command {
        return cli::execute_command(&cmd);
    }

    if let Some(script) = cli.script {
        return cli::execute_script(&script);
    }

    match repl::run_repl(&config) {
        Ok(code) => cli::to_exit_code(code),
        Err(e) => {
            eprintln!("pipesh: {}", e);
            ExitCode::FAILURE
        }
    }
}
