use pipesh::{signals, Config, LineOutcome, Shell};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::rcfile::load_rc;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the interactive read loop. Returns the status the shell exits with.
pub(crate) fn run_repl(config: &Config) -> rustyline::Result<i32> {
    if let Err(e) = signals::install_interrupt_guard() {
        log::warn!("cannot install interrupt handler: {}", e);
    }

    let mut rl = DefaultEditor::new()?;
    let mut shell = Shell::new();

    if let Some(path) = &config.rc_path {
        load_rc(&mut shell, path);
    }

    if config.banner {
        println!("pipesh {} - type 'exit' or Ctrl-D to quit", VERSION);
    }

    loop {
        // Collect finished background jobs before showing the prompt
        shell.reap_jobs();

        let prompt = shell.state.prompt().to_string();
        match rl.readline(&prompt) {
            Ok(line) => {
                let result = shell.execute_line(&line);
                if signals::take_interrupt() {
                    log::debug!("foreground job interrupted");
                }

                match result {
                    Ok(LineOutcome::Exit) => break,
                    Ok(_) => {}
                    Err(e) => eprintln!("pipesh: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C at the prompt: drop the line, keep going
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D - exit
                println!();
                break;
            }
            Err(err) => {
                eprintln!("pipesh: {:?}", err);
                break;
            }
        }
    }

    shell.shutdown();
    Ok(shell.state.last_status.code())
}
