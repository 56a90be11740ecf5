//! The real host: `systemctl`, `sysinfo` and spawned commands

use crate::error::{GuardError, Result};
use crate::host::{ActiveState, Enablement, Host, ProcessEntry, UnitState};
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use sysinfo::{Pid, Signal, System};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct SystemHost {
    timeout: Duration,
}

impl SystemHost {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run a command, killing it once the timeout elapses. Both pipes are
    /// drained while it runs so a chatty command cannot block on a full pipe.
    fn exec(&self, program: &str, args: &[&str]) -> Result<Output> {
        tracing::debug!(program, ?args, "running command");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GuardError::SpawnError {
                program: program.to_string(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Output {
                    status,
                    stdout: collect(stdout),
                    stderr: collect(stderr),
                });
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GuardError::CommandTimeout {
                    program: program.to_string(),
                    secs: self.timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn exec_checked(&self, program: &str, args: &[&str]) -> Result<Output> {
        let output = self.exec(program, args)?;
        if !output.status.success() {
            return Err(GuardError::CommandFailed {
                program: format!("{} {}", program, args.join(" ")),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    fn systemctl(&self, args: &[&str]) -> Result<()> {
        self.exec_checked("systemctl", args).map(|_| ())
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl Host for SystemHost {
    fn unit_state(&self, unit: &str) -> Result<UnitState> {
        // Both queries exit non-zero for stopped or disabled units, so only
        // stdout is meaningful here.
        let active = self.exec("systemctl", &["is-active", unit])?;
        let enabled = self.exec("systemctl", &["is-enabled", unit])?;
        Ok(UnitState {
            active: ActiveState::parse(&String::from_utf8_lossy(&active.stdout)),
            enablement: Enablement::parse(&String::from_utf8_lossy(&enabled.stdout)),
        })
    }

    fn stop_unit(&self, unit: &str) -> Result<()> {
        self.systemctl(&["stop", unit])
    }

    fn start_unit(&self, unit: &str) -> Result<()> {
        self.systemctl(&["start", unit])
    }

    fn restart_unit(&self, unit: &str) -> Result<()> {
        self.systemctl(&["restart", unit])
    }

    fn disable_unit(&self, unit: &str) -> Result<()> {
        self.systemctl(&["disable", unit])
    }

    fn mask_unit(&self, unit: &str) -> Result<()> {
        self.systemctl(&["mask", unit])
    }

    fn enable_unit(&self, unit: &str) -> Result<()> {
        self.systemctl(&["enable", unit])
    }

    fn daemon_reload(&self) -> Result<()> {
        self.systemctl(&["daemon-reload"])
    }

    fn processes(&self) -> Result<Vec<ProcessEntry>> {
        let mut sys = System::new();
        sys.refresh_processes();

        Ok(sys
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                name: process.name().to_string(),
                cmd: process.cmd().to_vec(),
            })
            .collect())
    }

    fn terminate(&self, pid: u32) -> Result<bool> {
        // Fresh snapshot, the pid may have exited since the scan
        let mut sys = System::new();
        sys.refresh_processes();

        match sys.process(Pid::from_u32(pid)) {
            Some(process) => match process.kill_with(Signal::Term) {
                Some(true) => Ok(true),
                Some(false) => Err(GuardError::PermissionDenied(format!(
                    "could not signal PID {}",
                    pid
                ))),
                None => Err(GuardError::SecurityError(
                    "SIGTERM is not supported on this platform".to_string(),
                )),
            },
            None => Ok(false),
        }
    }

    fn run(&self, program: &str, args: &[String]) -> Result<()> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.exec_checked(program, &args).map(|_| ())
    }
}
