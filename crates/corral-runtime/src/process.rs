//! Process spawning inside the container root.
//!
//! The child runs with a clean environment, the launcher's standard
//! streams, `/` as its working directory, and its own mount namespace.

use std::fmt;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use corral_common::error::{CorralError, Result};

/// Outcome of a finished container process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// PID the child ran as.
    pub pid: u32,
    /// How the child terminated.
    pub status: ExitStatus,
}

impl ExitReport {
    /// Returns `exit status N`, or `signal: <description>` for signal
    /// termination (`signal: killed`, `signal: segmentation fault`).
    #[must_use]
    pub fn description(&self) -> String {
        describe_status(self.status)
    }

    /// Returns whether the child exited with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pid, self.description())
    }
}

fn describe_status(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit status {code}");
    }
    match status.signal() {
        Some(signo) => {
            let core = if status.core_dumped() { " (core dumped)" } else { "" };
            format!("signal: {}{core}", signal_description(signo))
        }
        None => status.to_string(),
    }
}

/// Human-readable signal text, as `strsignal(3)` words it.
fn signal_description(signo: i32) -> String {
    use nix::sys::signal::Signal;

    let text = match Signal::try_from(signo) {
        Ok(Signal::SIGHUP) => "hangup",
        Ok(Signal::SIGINT) => "interrupt",
        Ok(Signal::SIGQUIT) => "quit",
        Ok(Signal::SIGILL) => "illegal instruction",
        Ok(Signal::SIGTRAP) => "trace/breakpoint trap",
        Ok(Signal::SIGABRT) => "aborted",
        Ok(Signal::SIGBUS) => "bus error",
        Ok(Signal::SIGFPE) => "floating point exception",
        Ok(Signal::SIGKILL) => "killed",
        Ok(Signal::SIGUSR1) => "user defined signal 1",
        Ok(Signal::SIGSEGV) => "segmentation fault",
        Ok(Signal::SIGUSR2) => "user defined signal 2",
        Ok(Signal::SIGPIPE) => "broken pipe",
        Ok(Signal::SIGALRM) => "alarm clock",
        Ok(Signal::SIGTERM) => "terminated",
        Ok(Signal::SIGCHLD) => "child exited",
        Ok(Signal::SIGCONT) => "continued",
        Ok(Signal::SIGSTOP) => "stopped (signal)",
        Ok(Signal::SIGTSTP) => "stopped",
        Ok(Signal::SIGTTIN) => "stopped (tty input)",
        Ok(Signal::SIGTTOU) => "stopped (tty output)",
        Ok(Signal::SIGURG) => "urgent I/O condition",
        Ok(Signal::SIGXCPU) => "CPU time limit exceeded",
        Ok(Signal::SIGXFSZ) => "file size limit exceeded",
        Ok(Signal::SIGVTALRM) => "virtual timer expired",
        Ok(Signal::SIGPROF) => "profiling timer expired",
        Ok(Signal::SIGWINCH) => "window changed",
        Ok(Signal::SIGIO) => "I/O possible",
        Ok(Signal::SIGSYS) => "bad system call",
        _ => return format!("signal {signo}"),
    };
    text.to_owned()
}

/// Splits `KEY=VALUE` entries for `Command::envs`.
///
/// Entries without `=` cannot be expressed and are skipped with a warning.
fn split_environment(environment: &[String]) -> Vec<(&str, &str)> {
    environment
        .iter()
        .filter_map(|entry| {
            let pair = entry.split_once('=');
            if pair.is_none() {
                tracing::warn!(entry = %entry, "ignoring environment entry without '='");
            }
            pair
        })
        .collect()
}

/// Starts `program` with `argv = entrypoint` inside a new mount namespace.
///
/// Must be called after the launcher has been confined: `program` is
/// interpreted relative to the current root.
///
/// # Errors
///
/// Returns `CorralError::Launch` if the process cannot be started.
pub fn spawn_container_process(
    program: &Path,
    entrypoint: &[String],
    environment: &[String],
) -> Result<Child> {
    let mut command = Command::new(program);
    if let Some((arg0, args)) = entrypoint.split_first() {
        let _ = command.arg0(arg0).args(args);
    }
    let _ = command
        .env_clear()
        .envs(split_environment(environment))
        .current_dir("/")
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    // SAFETY: the hook only calls unshare(2), which is async-signal-safe,
    // and touches no memory shared with the parent.
    unsafe {
        let _ = command.pre_exec(corral_core::namespace::mount::unshare_mount_namespace);
    }

    let child = command.spawn().map_err(|e| CorralError::Launch {
        program: program.display().to_string(),
        source: e,
    })?;
    tracing::info!(pid = child.id(), program = %program.display(), "container process started");
    Ok(child)
}

/// Blocks until `child` exits.
///
/// # Errors
///
/// Returns `CorralError::Wait` if `wait(2)` fails.
pub fn wait_for_exit(child: &mut Child) -> Result<ExitReport> {
    let pid = child.id();
    let status = child
        .wait()
        .map_err(|e| CorralError::Wait { pid, source: e })?;
    let report = ExitReport { pid, status };
    tracing::info!(pid, status = %report.description(), "container process exited");
    Ok(report)
}
