// src/exec/shell.rs

//! Production process backend: runs commands through the platform shell.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

use super::backend::{ChunkHandler, ProcessBackend, ProcessOutcome, ProcessState};

const CHUNK_SIZE: usize = 4096;

type OutputStream = Box<dyn AsyncRead + Unpin + Send>;

/// Runs each command with `sh -c` (`cmd /C` on Windows).
///
/// stdin is inherited so interactive commands keep working. By default
/// stdout and stderr are pipes read in raw chunks as soon as the child
/// produces them. With [`with_pty`](Self::with_pty) both are attached to a
/// pseudo-terminal instead, so programs that only flush per line (or not at
/// all) when writing to a pipe still stream live. A pty translates `\n` to
/// `\r\n`.
///
/// On unix every command runs in its own process group, and a timeout kills
/// the whole group, not just the shell.
#[derive(Debug, Clone, Default)]
pub struct ShellBackend {
    pty: bool,
}

impl ShellBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the command's output to a pseudo-terminal. Unix only; other
    /// platforms fall back to pipes.
    pub fn with_pty(mut self, pty: bool) -> Self {
        self.pty = pty;
        self
    }

    pub fn uses_pty(&self) -> bool {
        self.pty
    }
}

impl ProcessBackend for ShellBackend {
    fn run<'a>(
        &'a mut self,
        command: &'a str,
        timeout: Option<Duration>,
        on_chunk: &'a mut ChunkHandler<'_>,
    ) -> Pin<Box<dyn Future<Output = ProcessOutcome> + Send + 'a>> {
        let pty = self.pty;
        Box::pin(async move {
            match run_inner(command, timeout, pty, on_chunk).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(cmd = %command, error = %err, "process execution error");
                    ProcessOutcome::SpawnFailed(format!("{err:#}"))
                }
            }
        })
    }
}

enum Step {
    Stdout(std::io::Result<usize>),
    Stderr(std::io::Result<usize>),
    Deadline,
}

async fn run_inner(
    command: &str,
    timeout: Option<Duration>,
    pty: bool,
    on_chunk: &mut ChunkHandler<'_>,
) -> Result<ProcessOutcome> {
    info!(cmd = %command, ?timeout, pty, "starting process");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.stdin(Stdio::inherit()).kill_on_drop(true);

    // Own process group, so a timeout can take down everything the command
    // started. If we hold the terminal, the group gets the foreground for as
    // long as it runs, or reading stdin would stop it with SIGTTIN.
    #[cfg(unix)]
    let _terminal = {
        cmd.process_group(0);
        let owns_terminal = unix::stdin_owns_terminal();
        if owns_terminal {
            // Safety: `take_terminal` only calls async-signal-safe functions.
            unsafe {
                cmd.pre_exec(unix::take_terminal);
            }
        }
        owns_terminal.then(unix::TerminalGuard::new)
    };

    let (mut child, mut stdout, mut stderr) = if pty {
        spawn_with_pty(cmd, command)?
    } else {
        spawn_with_pipes(cmd, command)?
    };

    let state = ProcessState::new(command, timeout, child.id());

    let deadline = async {
        match timeout {
            Some(t) => tokio::time::sleep(t).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut out_buf = [0u8; CHUNK_SIZE];
    let mut err_buf = [0u8; CHUNK_SIZE];

    // Forward output until every stream is closed or the deadline hits.
    while stdout.is_some() || stderr.is_some() {
        let step = tokio::select! {
            r = read_chunk(&mut stdout, &mut out_buf), if stdout.is_some() => Step::Stdout(r),
            r = read_chunk(&mut stderr, &mut err_buf), if stderr.is_some() => Step::Stderr(r),
            _ = &mut deadline => Step::Deadline,
        };

        match step {
            Step::Stdout(Ok(0)) => stdout = None,
            Step::Stdout(Ok(n)) => on_chunk(&state, &out_buf[..n]),
            Step::Stderr(Ok(0)) => stderr = None,
            Step::Stderr(Ok(n)) => on_chunk(&state, &err_buf[..n]),
            Step::Stdout(Err(e)) if is_closed_terminal(&e) => stdout = None,
            Step::Stdout(Err(e)) | Step::Stderr(Err(e)) => {
                warn!(cmd = %command, error = %e, "failed to read process output; closing streams");
                stdout = None;
                stderr = None;
            }
            Step::Deadline => return Ok(kill_on_timeout(command, &state, &mut child).await),
        }
    }

    let status = tokio::select! {
        status = child.wait() => status
            .with_context(|| format!("waiting for process of '{command}'"))?,
        _ = &mut deadline => return Ok(kill_on_timeout(command, &state, &mut child).await),
    };

    let code = status.code().unwrap_or(-1);
    info!(
        cmd = %command,
        exit_code = code,
        success = status.success(),
        elapsed_ms = state.elapsed().as_millis() as u64,
        "process exited"
    );

    if status.success() {
        Ok(ProcessOutcome::Success)
    } else {
        Ok(ProcessOutcome::Failed(code))
    }
}

fn spawn_with_pipes(
    mut cmd: Command,
    command: &str,
) -> Result<(Child, Option<OutputStream>, Option<OutputStream>)> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for '{command}'"))?;

    let stdout = child.stdout.take().map(|s| Box::new(s) as OutputStream);
    let stderr = child.stderr.take().map(|s| Box::new(s) as OutputStream);
    Ok((child, stdout, stderr))
}

#[cfg(unix)]
fn spawn_with_pty(
    mut cmd: Command,
    command: &str,
) -> Result<(Child, Option<OutputStream>, Option<OutputStream>)> {
    let (master, slave) = unix::open_pty().context("allocating pseudo-terminal")?;
    let slave_err = slave
        .try_clone()
        .context("duplicating pseudo-terminal descriptor")?;
    cmd.stdout(slave).stderr(slave_err);

    let child = cmd
        .spawn()
        .with_context(|| format!("spawning process for '{command}' on a pty"))?;

    // The parent's copies of the slave side must be closed, or the master
    // never reports end of output.
    drop(cmd);

    let reader = tokio::fs::File::from_std(std::fs::File::from(master));
    Ok((child, Some(Box::new(reader)), None))
}

#[cfg(not(unix))]
fn spawn_with_pty(
    cmd: Command,
    command: &str,
) -> Result<(Child, Option<OutputStream>, Option<OutputStream>)> {
    warn!(cmd = %command, "pty mode is only available on unix; using pipes");
    spawn_with_pipes(cmd, command)
}

#[cfg(unix)]
mod unix {
    use std::io;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

    /// Open a pseudo-terminal pair as `(master, slave)`, both close-on-exec.
    pub(super) fn open_pty() -> io::Result<(OwnedFd, OwnedFd)> {
        let mut master: libc::c_int = -1;
        let mut slave: libc::c_int = -1;

        // Safety: openpty only writes the two descriptors; the name, termios
        // and winsize arguments are optional and passed as null.
        let ret = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }

        // Safety: on success both descriptors are open and owned by nobody else.
        let (master, slave) = unsafe { (OwnedFd::from_raw_fd(master), OwnedFd::from_raw_fd(slave)) };
        set_cloexec(&master)?;
        set_cloexec(&slave)?;
        Ok((master, slave))
    }

    fn set_cloexec(fd: &OwnedFd) -> io::Result<()> {
        // Safety: fcntl on a descriptor we own.
        let ret = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// True if stdin is a terminal whose foreground group is ours.
    pub(super) fn stdin_owns_terminal() -> bool {
        // Safety: plain queries on fd 0.
        unsafe { libc::isatty(libc::STDIN_FILENO) == 1 && libc::tcgetpgrp(libc::STDIN_FILENO) == libc::getpgrp() }
    }

    /// Runs in the child between fork and exec, after it joined its own
    /// process group: make that group the terminal's foreground. A failure
    /// only costs interactivity, so it doesn't abort the spawn.
    pub(super) fn take_terminal() -> io::Result<()> {
        // Safety: getpid is async-signal-safe.
        let pid = unsafe { libc::getpid() };
        let _ = set_foreground(pid);
        Ok(())
    }

    /// Returns the terminal's foreground to our group when dropped.
    pub(super) struct TerminalGuard;

    impl TerminalGuard {
        pub(super) fn new() -> Self {
            Self
        }
    }

    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            // Safety: getpgrp has no preconditions.
            let group = unsafe { libc::getpgrp() };
            if let Err(e) = set_foreground(group) {
                tracing::warn!(error = %e, "failed to take back the terminal");
            }
        }
    }

    fn set_foreground(group: libc::pid_t) -> io::Result<()> {
        // A background group changing the foreground gets SIGTTOU unless it
        // is ignored for the duration of the call.
        // Safety: signal and tcsetpgrp are async-signal-safe and take no
        // pointers.
        let ret = unsafe {
            let previous = libc::signal(libc::SIGTTOU, libc::SIG_IGN);
            let ret = libc::tcsetpgrp(libc::STDIN_FILENO, group);
            libc::signal(libc::SIGTTOU, previous);
            ret
        };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// A pty master reports `EIO` once the last slave descriptor is closed.
fn is_closed_terminal(e: &std::io::Error) -> bool {
    #[cfg(unix)]
    {
        e.raw_os_error() == Some(libc::EIO)
    }
    #[cfg(not(unix))]
    {
        let _ = e;
        false
    }
}

async fn read_chunk<R>(reader: &mut Option<R>, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match reader {
        Some(r) => r.read(buf).await,
        None => std::future::pending().await,
    }
}

async fn kill_on_timeout(command: &str, state: &ProcessState<'_>, child: &mut Child) -> ProcessOutcome {
    info!(
        cmd = %command,
        timeout = ?state.timeout(),
        pid = ?state.pid(),
        "timeout exceeded; killing process"
    );

    #[cfg(unix)]
    if let Some(pid) = state.pid() {
        // The child leads its own process group (see `process_group(0)`), so
        // its pid is the group id.
        // Safety: killpg has no memory-safety preconditions.
        let ret = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if ret != 0 {
            warn!(
                cmd = %command,
                error = %std::io::Error::last_os_error(),
                "failed to kill process group on timeout"
            );
        }
    }

    // Also reaps the shell itself.
    if let Err(e) = child.kill().await {
        warn!(cmd = %command, error = %e, "failed to kill child process on timeout");
    } else {
        debug!(cmd = %command, "child process killed");
    }
    ProcessOutcome::TimedOut
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    async fn run_collect(
        backend: &mut ShellBackend,
        cmd: &str,
        timeout: Option<Duration>,
    ) -> (ProcessOutcome, String) {
        let mut out = Vec::new();
        let outcome = {
            let mut on_chunk = |_: &ProcessState<'_>, chunk: &[u8]| out.extend_from_slice(chunk);
            backend.run(cmd, timeout, &mut on_chunk).await
        };
        (outcome, String::from_utf8_lossy(&out).into_owned())
    }

    const TTY_CHECK: &str = "if [ -t 1 ]; then printf tty; else printf pipe; fi";

    #[tokio::test]
    async fn successful_command_streams_output() {
        let (outcome, out) = run_collect(&mut ShellBackend::new(), "printf foo", None).await;
        assert_eq!(outcome, ProcessOutcome::Success);
        assert_eq!(out, "foo");
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let (outcome, _) = run_collect(&mut ShellBackend::new(), "exit 3", None).await;
        assert_eq!(outcome, ProcessOutcome::Failed(3));
        assert!(!outcome.is_successful());
    }

    #[tokio::test]
    async fn stderr_is_forwarded_too() {
        let (outcome, out) = run_collect(&mut ShellBackend::new(), "printf oops >&2", None).await;
        assert!(outcome.is_successful());
        assert_eq!(out, "oops");
    }

    #[tokio::test]
    async fn timeout_kills_the_process() {
        let started = std::time::Instant::now();
        let (outcome, _) = run_collect(
            &mut ShellBackend::new(),
            "sleep 5",
            Some(Duration::from_millis(100)),
        )
        .await;
        assert_eq!(outcome, ProcessOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn timeout_kills_grandchildren() {
        let dir = tempfile::tempdir().unwrap();
        let sentinel = dir.path().join("sentinel");
        let cmd = format!("(sleep 1; touch '{}'); true", sentinel.display());

        let (outcome, _) = run_collect(
            &mut ShellBackend::new(),
            &cmd,
            Some(Duration::from_millis(200)),
        )
        .await;
        assert_eq!(outcome, ProcessOutcome::TimedOut);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!sentinel.exists());
    }

    #[tokio::test]
    async fn pipes_are_not_terminals() {
        let (_, out) = run_collect(&mut ShellBackend::new(), TTY_CHECK, None).await;
        assert_eq!(out, "pipe");
    }

    #[tokio::test]
    async fn pty_mode_gives_the_command_a_terminal() {
        let mut backend = ShellBackend::new().with_pty(true);
        assert!(backend.uses_pty());

        let (outcome, out) = run_collect(&mut backend, TTY_CHECK, Some(Duration::from_secs(5))).await;
        assert_eq!(outcome, ProcessOutcome::Success);
        assert_eq!(out, "tty");

        let (outcome, out) = run_collect(&mut backend, "printf err >&2; exit 4", None).await;
        assert_eq!(outcome, ProcessOutcome::Failed(4));
        assert_eq!(out, "err");
    }

    #[tokio::test]
    async fn pty_mode_times_out_like_pipes() {
        let mut backend = ShellBackend::new().with_pty(true);
        let (outcome, _) = run_collect(&mut backend, "sleep 5", Some(Duration::from_millis(100))).await;
        assert_eq!(outcome, ProcessOutcome::TimedOut);
    }
}
