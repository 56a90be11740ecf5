//! Printer process watchdog
//!
//! Re-applies the "terminate printer processes" action on every tick. The
//! installed systemd unit runs this in a loop; a sweep that finds nothing, or
//! fails, is never treated as a reason to exit unsuccessfully.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::engine::actions::process::{sweep, ProcessMatcher, Sweep};
use crate::error::Result;
use crate::host::Host;

/// Granularity at which the loop notices a stop request
const STOP_POLL: Duration = Duration::from_millis(200);

pub struct Watchdog<'a> {
    host: &'a dyn Host,
    matcher: ProcessMatcher,
    interval: Duration,
    dry_run: bool,
    running: Arc<AtomicBool>,
}

impl<'a> Watchdog<'a> {
    pub fn new(host: &'a dyn Host, patterns: &[String], interval: Duration) -> Result<Self> {
        Ok(Self {
            host,
            matcher: ProcessMatcher::new(patterns)?,
            interval,
            dry_run: false,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Flag shared with a signal handler; storing `false` ends the loop
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// One pass over the process table. Errors are logged and folded into
    /// an empty sweep so callers always get a result.
    pub fn tick(&self) -> Sweep {
        match sweep(self.host, &self.matcher, self.dry_run) {
            Ok(sweep) => {
                if !sweep.matched.is_empty() {
                    tracing::info!(
                        matched = sweep.matched.len(),
                        terminated = sweep.terminated.len(),
                        "watchdog sweep"
                    );
                }
                sweep
            }
            Err(e) => {
                tracing::warn!(error = %e, "watchdog sweep failed");
                Sweep {
                    dry_run: self.dry_run,
                    ..Sweep::default()
                }
            }
        }
    }

    /// Sweep until stopped, calling `on_sweep` after each pass that matched
    /// something
    pub fn run<F>(&self, mut on_sweep: F)
    where
        F: FnMut(&Sweep),
    {
        tracing::info!(interval_secs = self.interval.as_secs(), "watchdog started");

        while self.is_running() {
            let sweep = self.tick();
            if !sweep.matched.is_empty() {
                on_sweep(&sweep);
            }
            self.sleep_interval();
        }

        tracing::info!("watchdog stopped");
    }

    fn sleep_interval(&self) {
        let deadline = Instant::now() + self.interval;
        while self.is_running() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(STOP_POLL.min(deadline - now));
        }
    }
}

/// Stop the watchdog on SIGINT or SIGTERM
pub fn install_signal_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|e| {
        crate::error::GuardError::ExecutionError(format!("Failed to set signal handler: {}", e))
    })
}
