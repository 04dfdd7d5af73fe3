use pipesh::{LineOutcome, Shell};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs;
use std::process::ExitCode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command-line arguments
#[derive(Debug, Default, PartialEq)]
pub(crate) struct CliArgs {
    pub(crate) command: Option<String>,
    pub(crate) script: Option<String>,
    pub(crate) help: bool,
    pub(crate) version: bool,
}

/// Parse command-line arguments
pub(crate) fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs::default();

    let mut i = 1; // Skip program name
    while i < args.len() {
        match args[i].as_str() {
            "-c" => {
                // Everything after -c is the command
                if i + 1 < args.len() {
                    cli.command = Some(args[i + 1..].join(" "));
                    break;
                }
            }
            "--help" | "-h" => {
                cli.help = true;
            }
            "--version" | "-V" => {
                cli.version = true;
            }
            path => {
                // Assume it's a script file if not a flag
                if !path.starts_with('-') {
                    cli.script = Some(path.to_string());
                }
            }
        }
        i += 1;
    }

    cli
}

pub(crate) fn print_help() {
    println!(
        r#"pipesh {} - a small pipeline shell

USAGE:
    pipesh                  Start interactive shell
    pipesh -c <command>     Execute a single line
    pipesh <script>         Execute each line of a file
    pipesh --help           Show this help message
    pipesh --version        Show version

SYNTAX:
    cmd arg "quoted arg"    Run a program found on $PATH
    cmd1 | cmd2 | cmd3      Pipe stdout of each into stdin of the next
    cmd < file              Read stdin from file (first command only)
    cmd > file              Write stdout to file, truncating (last command only)
    cmd &                   Run in the background
    cd [dir]                Change directory ($HOME if omitted)
    exit                    Leave the shell

ENVIRONMENT:
    PS1                     Prompt (default "$ ")
    PIPESH_LOG              Log level: off, error, warn, info, debug, trace
    PIPESH_RC               Startup file (default ~/.pipeshrc)
    PIPESH_BANNER           Show a banner on interactive start
"#,
        VERSION
    );
}

pub(crate) fn print_version() {
    println!("pipesh {}", VERSION);
}

/// Send `log` output to stderr at the configured level
pub(crate) fn init_logging(level: log::LevelFilter) {
    if level == log::LevelFilter::Off {
        return;
    }

    let config = ConfigBuilder::new().set_time_level(log::LevelFilter::Off).build();
    if let Err(e) = WriteLogger::init(level, config, std::io::stderr()) {
        eprintln!("Warning: cannot initialise logging: {}", e);
    }
}

/// Map a shell status onto a process exit code
pub(crate) fn to_exit_code(code: i32) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}

/// Execute a single line
pub(crate) fn execute_command(cmd: &str) -> ExitCode {
    let mut shell = Shell::new();

    let code = match shell.execute_line(cmd) {
        Ok(_) => shell.state.last_status.code(),
        Err(e) => {
            eprintln!("pipesh: {}", e);
            e.exit_code()
        }
    };

    shell.shutdown();
    to_exit_code(code)
}

/// Execute a script file, one line at a time
pub(crate) fn execute_script(path: &str) -> ExitCode {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("pipesh: {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let mut shell = Shell::new();
    let mut code = 0;

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        shell.reap_jobs();
        match shell.execute_line(trimmed) {
            Ok(LineOutcome::Exit) => break,
            Ok(_) => code = shell.state.last_status.code(),
            Err(e) => {
                eprintln!("pipesh: {} line {}: {}", path, line_num + 1, e);
                code = e.exit_code();
            }
        }
    }

    shell.shutdown();
    to_exit_code(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_command_flag() {
        let cli = parse_args(&args(&["pipesh", "-c", "echo", "hi", "|", "cat"]));
        assert_eq!(cli.command.as_deref(), Some("echo hi | cat"));
    }

    #[test]
    fn parse_script_and_flags() {
        let cli = parse_args(&args(&["pipesh", "--help", "run.psh"]));
        assert!(cli.help);
        assert_eq!(cli.script.as_deref(), Some("run.psh"));
    }

    #[test]
    fn parse_nothing() {
        assert_eq!(parse_args(&args(&["pipesh"])), CliArgs::default());
    }
}
