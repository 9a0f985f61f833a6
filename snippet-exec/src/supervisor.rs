use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::sys::wait::{waitid, Id, WaitPidFlag};
use nix::unistd::Pid;
use std::process::Stdio;
use std::time::Instant;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::{Child, Command},
    task::{self, JoinHandle},
    time::{self, Duration},
};
use tracing::{debug, warn};

use crate::{
    compiler::{resolve_program, spawn_error},
    error::Error,
    types::{CompilationUnit, ProcessOutcome, ProcessStatus},
};

/// Runs a compiled class under a hard wall-clock deadline
pub struct Supervisor {
    program: String,
    deadline: Duration,
}

impl Supervisor {
    pub fn new(program: impl Into<String>, deadline: Duration) -> Self {
        Self {
            program: program.into(),
            deadline,
        }
    }

    /// Start `<runtime> -cp <dir> <class>` and wait for exit or deadline.
    ///
    /// The deadline bounds both the exit and the draining of its output. On
    /// expiry the child's whole process group gets SIGKILL and the child is
    /// reaped before returning `ProcessStatus::TimedOut`.
    pub async fn run(&self, unit: &CompilationUnit) -> Result<ProcessOutcome, Error> {
        let program = resolve_program(&self.program)?;
        debug!(
            "Running {} from {:?} with {:?}",
            unit.class_name, unit.root_dir, program
        );

        let started = Instant::now();
        let mut child = Command::new(&program)
            .arg("-cp")
            .arg(&unit.root_dir)
            .arg(&unit.class_name)
            .current_dir(&unit.root_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.program, e))?;

        let pid = child.id();
        let mut stdout = spawn_reader(child.stdout.take());
        let mut stderr = spawn_reader(child.stderr.take());

        // The deadline covers draining the streams too: a process that escaped
        // the group can hold a pipe open after the runtime itself has exited.
        let mut reaped = false;
        let finished = time::timeout(self.deadline, async {
            if let Some(pid) = pid {
                // Sweep while the exited leader still pins its pid as the group id.
                wait_unreaped(pid).await?;
                kill_group(pid);
            }
            let status = child.wait().await.map_err(|e| {
                Error::Unexpected(format!("Failed to wait for {}: {}", self.program, e))
            })?;
            reaped = true;
            let stdout = join_reader(&mut stdout).await?;
            let stderr = join_reader(&mut stderr).await?;
            Ok::<_, Error>((status, stdout, stderr))
        })
        .await;

        match finished {
            Ok(Ok((status, stdout, stderr))) => {
                debug!("{} exited with {}", unit.class_name, status);

                Ok(ProcessOutcome {
                    status: ProcessStatus::Exited(status),
                    stdout,
                    stderr,
                    elapsed: started.elapsed(),
                })
            }
            Ok(Err(e)) => {
                if !reaped {
                    terminate(&mut child, pid).await;
                }
                stdout.abort();
                stderr.abort();
                Err(e)
            }
            Err(_) => {
                warn!(
                    "{} exceeded the {}s deadline, killing it",
                    unit.class_name,
                    self.deadline.as_secs_f64()
                );
                // Once reaped, the group was already swept and its id is free for reuse.
                if !reaped {
                    terminate(&mut child, pid).await;
                }
                stdout.abort();
                stderr.abort();

                Ok(ProcessOutcome {
                    status: ProcessStatus::TimedOut,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                    elapsed: started.elapsed(),
                })
            }
        }
    }
}

fn spawn_reader<R>(stream: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            stream.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

async fn join_reader(
    handle: &mut JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<Vec<u8>, Error> {
    let bytes = handle
        .await
        .map_err(|e| Error::Unexpected(format!("Output reader failed: {}", e)))??;
    Ok(bytes)
}

/// Block until `pid` has exited, leaving it unreaped.
async fn wait_unreaped(pid: u32) -> Result<(), Error> {
    let waited = task::spawn_blocking(move || loop {
        match waitid(
            Id::Pid(Pid::from_raw(pid as i32)),
            WaitPidFlag::WEXITED | WaitPidFlag::WNOWAIT,
        ) {
            Err(Errno::EINTR) => continue,
            other => return other.map(drop),
        }
    })
    .await
    .map_err(|e| Error::Unexpected(format!("Exit watcher failed: {}", e)))?;

    waited.map_err(|e| Error::Unexpected(format!("Failed to wait for process {}: {}", pid, e)))
}

/// SIGKILL every process in the group led by `pid`. Returns whether any was signalled.
fn kill_group(pid: u32) -> bool {
    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(e) => {
            warn!("Failed to kill process group {}: {}", pid, e);
            false
        }
    }
}

async fn terminate(child: &mut Child, pid: Option<u32>) {
    let signalled = pid.is_some_and(kill_group);
    if !signalled {
        if let Err(e) = child.start_kill() {
            warn!("Failed to kill child process: {}", e);
        }
    }
    // Reap it so no zombie is left behind.
    if let Err(e) = child.wait().await {
        warn!("Failed to reap child process: {}", e);
    }
}
