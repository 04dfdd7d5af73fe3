//! Jobs and the background job tracker
//!
//! A [`Job`] is one launched pipeline: one [`Process`] per segment, in spawn
//! order. Foreground jobs are waited on directly by the caller and dropped.
//! Background jobs are handed to the [`JobTracker`], which polls them without
//! blocking once per read-loop iteration and hands back whatever finished.

use std::fmt;
use std::io;
use std::process::{Child, ExitStatus};

/// How a process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Normal exit with this code
    Exited(i32),
    /// Killed by this signal number
    Signaled(i32),
}

impl ProcessStatus {
    /// Shell-style numeric status: the exit code, or 128 + signal number
    pub fn code(&self) -> i32 {
        match self {
            ProcessStatus::Exited(code) => *code,
            ProcessStatus::Signaled(sig) => 128 + sig,
        }
    }

    pub fn success(&self) -> bool {
        *self == ProcessStatus::Exited(0)
    }
}

impl From<ExitStatus> for ProcessStatus {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ProcessStatus::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                return ProcessStatus::Signaled(sig);
            }
        }
        ProcessStatus::Exited(-1)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Exited(code) => write!(f, "exited with code {}", code),
            #[cfg(unix)]
            ProcessStatus::Signaled(sig) => match nix::sys::signal::Signal::try_from(*sig) {
                Ok(signal) => write!(f, "killed by {}", signal),
                Err(_) => write!(f, "killed by signal {}", sig),
            },
            #[cfg(not(unix))]
            ProcessStatus::Signaled(sig) => write!(f, "killed by signal {}", sig),
        }
    }
}

#[derive(Debug)]
enum ProcessState {
    Running(Child),
    Finished(ProcessStatus),
}

/// One pipeline segment after launch
#[derive(Debug)]
pub struct Process {
    /// Program name as typed
    pub name: String,
    /// OS process id, absent when the segment failed before spawning
    pub pid: Option<u32>,
    state: ProcessState,
}

impl Process {
    pub(crate) fn spawned(name: String, child: Child) -> Self {
        Process {
            name,
            pid: Some(child.id()),
            state: ProcessState::Running(child),
        }
    }

    /// A segment that never got a process (not found, bad redirect, spawn failure)
    pub(crate) fn failed(name: String, status: ProcessStatus) -> Self {
        Process {
            name,
            pid: None,
            state: ProcessState::Finished(status),
        }
    }

    pub fn status(&self) -> Option<ProcessStatus> {
        match self.state {
            ProcessState::Running(_) => None,
            ProcessState::Finished(status) => Some(status),
        }
    }

    fn wait(&mut self) -> io::Result<ProcessStatus> {
        if let ProcessState::Running(child) = &mut self.state {
            let status = ProcessStatus::from(child.wait()?);
            self.state = ProcessState::Finished(status);
        }
        // Finished either before or just now
        Ok(self.status().unwrap_or(ProcessStatus::Exited(-1)))
    }

    fn try_wait(&mut self) -> bool {
        let ProcessState::Running(child) = &mut self.state else {
            return true;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                self.state = ProcessState::Finished(status.into());
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("failed to poll {} ({:?}): {}", self.name, self.pid, e);
                self.state = ProcessState::Finished(ProcessStatus::Exited(-1));
                true
            }
        }
    }
}

/// A launched pipeline
#[derive(Debug)]
pub struct Job {
    /// Tracker-assigned id; 0 until a background job is registered
    pub id: usize,
    /// The pipeline as text, for messages
    pub command: String,
    pub background: bool,
    processes: Vec<Process>,
}

impl Job {
    pub(crate) fn new(command: String, background: bool, processes: Vec<Process>) -> Self {
        Job {
            id: 0,
            command,
            background,
            processes,
        }
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Process ids of every segment that was actually spawned
    pub fn pids(&self) -> Vec<u32> {
        self.processes.iter().filter_map(|p| p.pid).collect()
    }

    /// Pid of the last spawned segment, used when announcing a background job
    pub fn last_pid(&self) -> Option<u32> {
        self.processes.iter().rev().find_map(|p| p.pid)
    }

    pub fn is_finished(&self) -> bool {
        self.processes.iter().all(|p| p.status().is_some())
    }

    /// Status of the job: the last segment's, once it has finished
    pub fn status(&self) -> Option<ProcessStatus> {
        self.processes.last().and_then(Process::status)
    }

    /// Block until every process has exited, in spawn order.
    ///
    /// Returns the last segment's status regardless of which process finished
    /// first. Every process is waited on even if an earlier wait fails.
    pub fn wait(&mut self) -> io::Result<ProcessStatus> {
        let mut first_error = None;
        let mut last = ProcessStatus::Exited(0);

        for process in &mut self.processes {
            match process.wait() {
                Ok(status) => {
                    log::debug!("{} ({:?}) {}", process.name, process.pid, status);
                    last = status;
                }
                Err(e) => {
                    log::warn!("wait for {} failed: {}", process.name, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(last),
        }
    }

    /// Collect any finished processes without blocking.
    /// Returns true when the whole job is done.
    pub fn try_reap(&mut self) -> bool {
        let mut done = true;
        for process in &mut self.processes {
            done &= process.try_wait();
        }
        done
    }
}

/// Table of background jobs that have not been reaped yet
#[derive(Debug)]
pub struct JobTracker {
    jobs: Vec<Job>,
    next_id: usize,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTracker {
    pub fn new() -> Self {
        JobTracker {
            jobs: Vec::new(),
            next_id: 1,
        }
    }

    /// Take ownership of a background job, returning its id
    pub fn register(&mut self, mut job: Job) -> usize {
        job.id = self.next_id;
        self.next_id += 1;
        log::debug!("job [{}] registered: {} {:?}", job.id, job.command, job.pids());
        let id = job.id;
        self.jobs.push(job);
        id
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Poll every tracked job without blocking.
    ///
    /// Jobs whose processes have all exited are removed and returned with
    /// their statuses filled in; the rest stay tracked for the next call.
    pub fn reap(&mut self) -> Vec<Job> {
        let mut finished = Vec::new();
        let mut i = 0;

        while i < self.jobs.len() {
            if self.jobs[i].try_reap() {
                let job = self.jobs.remove(i);
                if let Some(status) = job.status() {
                    log::info!("job [{}] done ({}): {}", job.id, status, job.command);
                }
                finished.push(job);
            } else {
                i += 1;
            }
        }

        finished
    }

    /// Final non-blocking sweep before the shell exits
    pub fn drain(&mut self) -> Vec<Job> {
        let finished = self.reap();
        if !self.jobs.is_empty() {
            log::debug!("{} background job(s) still running at exit", self.jobs.len());
        }
        finished
    }
}
