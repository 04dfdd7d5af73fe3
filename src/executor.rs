//! Executor: launches pipelines as child processes
//!
//! For a pipeline of `n` segments, segment `i` is spawned with:
//! - stdin from the read end of the pipe created for segment `i - 1`
//!   (or the terminal / `/dev/null` for segment 0)
//! - stdout to the write end of a fresh pipe (or the terminal for the last)
//! - then any `<` / `>` file replacing those
//!
//! Each pipe end is moved into exactly one child's `Stdio` and the spawning
//! `Command` is dropped right after spawn, so the shell never holds a write
//! end that would keep a downstream reader from seeing end-of-input. Pipes
//! are created close-on-exec, so unrelated children never inherit them.
//!
//! A segment that cannot start (missing executable, unopenable file, spawn
//! failure) is reported on stderr and recorded with a status (127 for
//! not found, 1 otherwise); its pipe ends are dropped so neighbours see
//! end-of-input or a broken pipe, and the rest of the pipeline still runs.

use crate::ast::{Command as Segment, Pipeline};
use crate::jobs::{Job, Process, ProcessStatus};
use crate::resolver::ExecutableResolver;
use crate::state::ShellState;
use std::fs::File;
use std::io::{self, PipeReader};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Status of a segment whose command could not be found
pub const STATUS_NOT_FOUND: i32 = 127;
/// Status of a segment that failed to redirect or spawn
pub const STATUS_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] io::Error),
    #[error("wait failed: {0}")]
    Wait(#[source] io::Error),
}

/// Start every segment of `pipeline`. Does not wait.
///
/// If a pipe cannot be created the launch stops; the segments already
/// running are handed to the job tracker so they are still reaped.
pub fn launch(pipeline: &Pipeline, state: &mut ShellState) -> Result<Job, ExecError> {
    let resolver = ExecutableResolver::from_search_path(state.search_path());
    let last = pipeline.len().saturating_sub(1);
    let mut processes = Vec::with_capacity(pipeline.len());
    let mut upstream: Option<PipeReader> = None;

    for (index, segment) in pipeline.commands.iter().enumerate() {
        let (next_upstream, stdout) = if index < last {
            match io::pipe() {
                Ok((reader, writer)) => (Some(reader), Stdio::from(writer)),
                Err(e) => {
                    drop(upstream);
                    let partial = Job::new(pipeline.to_string(), true, processes);
                    track_unfinished(partial, state);
                    return Err(ExecError::Pipe(e));
                }
            }
        } else {
            (None, Stdio::inherit())
        };

        let stdin = match upstream.take() {
            Some(reader) => Stdio::from(reader),
            None if pipeline.background => Stdio::null(),
            None => Stdio::inherit(),
        };

        processes.push(spawn_segment(segment, &resolver, state, stdin, stdout));
        upstream = next_upstream;
    }

    Ok(Job::new(pipeline.to_string(), pipeline.background, processes))
}

/// Hand a job that still has running processes to the tracker so they
/// are reaped later. Returns the tracker id, or `None` if nothing is left.
pub(crate) fn track_unfinished(job: Job, state: &mut ShellState) -> Option<usize> {
    if job.is_finished() {
        return None;
    }
    log::warn!("tracking {:?} ({}) for reaping", job.pids(), job.command);
    Some(state.jobs.register(job))
}

/// Wire up and spawn one segment. Never fails: problems become a status.
fn spawn_segment(
    segment: &Segment,
    resolver: &ExecutableResolver,
    state: &ShellState,
    stdin: Stdio,
    stdout: Stdio,
) -> Process {
    let name = segment.name().to_string();

    let stdin = match &segment.redirect.input {
        Some(path) => match File::open(path) {
            Ok(file) => Stdio::from(file),
            Err(e) => {
                eprintln!("pipesh: {}: {}", path.display(), e);
                return Process::failed(name, ProcessStatus::Exited(STATUS_FAILURE));
            }
        },
        None => stdin,
    };

    let stdout = match &segment.redirect.output {
        Some(path) => match File::create(path) {
            Ok(file) => Stdio::from(file),
            Err(e) => {
                eprintln!("pipesh: {}: {}", path.display(), e);
                return Process::failed(name, ProcessStatus::Exited(STATUS_FAILURE));
            }
        },
        None => stdout,
    };

    let Some(program) = resolver.resolve(&name) else {
        eprintln!("{}: command not found", name);
        return Process::failed(name, ProcessStatus::Exited(STATUS_NOT_FOUND));
    };

    let mut command = Command::new(&program);
    command
        .args(segment.args())
        .env_clear()
        .envs(state.env())
        .stdin(stdin)
        .stdout(stdout);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.arg0(&name);
    }

    match command.spawn() {
        Ok(child) => {
            log::debug!("spawned {} as pid {}", program.display(), child.id());
            Process::spawned(name, child)
        }
        Err(e) => {
            eprintln!("pipesh: {}: {}", name, e);
            Process::failed(name, ProcessStatus::Exited(STATUS_FAILURE))
        }
    }
}

/// Block on a foreground job and return its status (the last segment's)
///
/// If a wait fails, the processes not yet collected go to the job tracker.
pub fn wait_foreground(
    mut job: Job,
    state: &mut ShellState,
) -> Result<ProcessStatus, ExecError> {
    match job.wait() {
        Ok(status) => Ok(status),
        Err(e) => {
            track_unfinished(job, state);
            Err(ExecError::Wait(e))
        }
    }
}

/// The line shown for a finished foreground job, if any.
/// Success is silent.
pub fn status_message(status: ProcessStatus) -> Option<String> {
    if status.success() {
        None
    } else {
        Some(format!("Program terminated with exit code {}.", status.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, Instant};

    fn run(line: &str, state: &mut ShellState) -> ProcessStatus {
        let pipeline = parse_line(line).unwrap();
        let job = launch(&pipeline, state).unwrap();
        wait_foreground(job, state).unwrap()
    }

    fn quoted(path: &Path) -> String {
        format!("'{}'", path.display())
    }

    #[test]
    fn single_command_status() {
        let mut state = ShellState::from_process_env();
        assert_eq!(run("true", &mut state), ProcessStatus::Exited(0));
        assert_eq!(run("sh -c 'exit 3'", &mut state), ProcessStatus::Exited(3));
    }

    #[test]
    fn signal_status() {
        let mut state = ShellState::from_process_env();
        let status = run("sh -c 'kill -KILL $$'", &mut state);
        assert_eq!(status, ProcessStatus::Signaled(9));
        assert_eq!(status.code(), 137);
    }

    #[test]
    fn pipeline_spawns_one_process_per_segment() {
        let mut state = ShellState::from_process_env();
        let pipeline = parse_line("true | true | true").unwrap();
        let job = launch(&pipeline, &mut state).unwrap();
        assert_eq!(job.pids().len(), 3);
        assert_eq!(
            wait_foreground(job, &mut state).unwrap(),
            ProcessStatus::Exited(0)
        );
    }

    #[test]
    fn pipeline_status_is_last_segment() {
        let mut state = ShellState::from_process_env();
        // First segment exits non-zero and later than the last one
        let status = run("sh -c 'sleep 0.2; exit 7' | sh -c 'exit 0'", &mut state);
        assert_eq!(status, ProcessStatus::Exited(0));

        let status = run("true | sh -c 'exit 5'", &mut state);
        assert_eq!(status, ProcessStatus::Exited(5));
    }

    #[test]
    fn pipe_carries_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let mut state = ShellState::from_process_env();

        let line = format!(
            "printf 'hello\\nworld\\n' | cat | tr a-z A-Z > {}",
            quoted(&out)
        );
        assert_eq!(run(&line, &mut state), ProcessStatus::Exited(0));
        assert_eq!(fs::read_to_string(&out).unwrap(), "HELLO\nWORLD\n");
    }

    #[test]
    fn input_and_output_redirection() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let out = dir.path().join("out.txt");
        fs::write(&input, "b\na\nc\n").unwrap();
        let mut state = ShellState::from_process_env();

        let line = format!("sort < {} > {}", quoted(&input), quoted(&out));
        assert_eq!(run(&line, &mut state), ProcessStatus::Exited(0));
        assert_eq!(fs::read_to_string(&out).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn output_redirection_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        fs::write(&out, "a much longer previous content\n").unwrap();
        let mut state = ShellState::from_process_env();

        run(&format!("echo hi > {}", quoted(&out)), &mut state);
        assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
    }

    #[test]
    fn command_not_found_is_127() {
        let mut state = ShellState::from_process_env();
        let pipeline = parse_line("pipesh-no-such-command-xyz arg").unwrap();
        let job = launch(&pipeline, &mut state).unwrap();
        assert!(job.pids().is_empty());
        assert_eq!(
            wait_foreground(job, &mut state).unwrap(),
            ProcessStatus::Exited(127)
        );
    }

    #[test]
    fn missing_middle_segment_does_not_stop_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let mut state = ShellState::from_process_env();

        let line = format!(
            "echo hi | pipesh-no-such-command-xyz | cat > {}",
            quoted(&out)
        );
        let pipeline = parse_line(&line).unwrap();
        let job = launch(&pipeline, &mut state).unwrap();
        assert_eq!(job.pids().len(), 2);
        assert_eq!(
            wait_foreground(job, &mut state).unwrap(),
            ProcessStatus::Exited(0)
        );
        assert_eq!(fs::read_to_string(&out).unwrap(), "");
    }

    #[test]
    fn missing_last_segment_reports_127() {
        let mut state = ShellState::from_process_env();
        let status = run("echo hi | pipesh-no-such-command-xyz", &mut state);
        assert_eq!(status, ProcessStatus::Exited(127));
    }

    #[test]
    fn unreadable_input_file_fails_segment() {
        let mut state = ShellState::from_process_env();
        let status = run("cat < /nonexistent/pipesh/input", &mut state);
        assert_eq!(status, ProcessStatus::Exited(STATUS_FAILURE));
    }

    #[test]
    fn output_file_created_even_if_command_missing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let mut state = ShellState::from_process_env();

        let line = format!("pipesh-no-such-command-xyz > {}", quoted(&out));
        assert_eq!(run(&line, &mut state), ProcessStatus::Exited(127));
        assert!(out.exists());
    }

    #[test]
    fn children_get_shell_environment() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("env.txt");
        let mut state = ShellState::from_process_env();
        state.set_var("PIPESH_TEST_VALUE", "from-state");

        let line = format!("sh -c 'echo $PIPESH_TEST_VALUE' > {}", quoted(&out));
        run(&line, &mut state);
        assert_eq!(fs::read_to_string(&out).unwrap(), "from-state\n");
    }

    #[test]
    fn search_path_comes_from_state() {
        let mut state = ShellState::from_process_env();
        state.set_var("PATH", "/nonexistent/pipesh/bin");
        assert_eq!(run("true", &mut state), ProcessStatus::Exited(127));
    }

    #[test]
    fn background_launch_returns_immediately() {
        let mut state = ShellState::from_process_env();
        let pipeline = parse_line("sleep 2 &").unwrap();

        let start = Instant::now();
        let job = launch(&pipeline, &mut state).unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(job.background);
        assert_eq!(job.pids().len(), 1);

        state.jobs.register(job);
        while !state.jobs.is_empty() && start.elapsed() < Duration::from_secs(10) {
            state.jobs.reap();
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(state.jobs.is_empty());
    }

    #[test]
    fn status_messages() {
        assert_eq!(status_message(ProcessStatus::Exited(0)), None);
        assert_eq!(
            status_message(ProcessStatus::Exited(2)).as_deref(),
            Some("Program terminated with exit code 2.")
        );
        assert_eq!(
            status_message(ProcessStatus::Signaled(15)).as_deref(),
            Some("Program terminated with exit code 143.")
        );
    }

    #[test]
    fn unfinished_job_goes_to_tracker() {
        let mut state = ShellState::from_process_env();
        let pipeline = parse_line("sleep 0.3 | true").unwrap();
        let job = launch(&pipeline, &mut state).unwrap();

        assert_eq!(track_unfinished(job, &mut state), Some(1));
        assert_eq!(state.jobs.len(), 1);

        let start = Instant::now();
        while !state.jobs.is_empty() && start.elapsed() < Duration::from_secs(5) {
            state.jobs.reap();
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(state.jobs.is_empty());
    }

    #[test]
    fn finished_job_is_not_tracked() {
        let mut state = ShellState::from_process_env();
        let job = Job::new(
            "missing".into(),
            false,
            vec![Process::failed("missing".into(), ProcessStatus::Exited(127))],
        );
        assert_eq!(track_unfinished(job, &mut state), None);
        assert!(state.jobs.is_empty());
    }
}
