//! printguard - keep printer auto-discovery switched off
//!
//! printguard applies a fixed, ordered list of idempotent actions that stop
//! and mask printer discovery services, kill their processes, remove
//! autostart entries, disable udev rules, block D-Bus interfaces, write
//! configuration overrides and pin packages. A watchdog unit keeps killing
//! printer processes that come back.
//!
//! # Example
//!
//! ```no_run
//! use printguard::{printer_policy, Enforcer, PolicyConfig, SystemHost, WatchdogCommand};
//! use printguard::{format_output, Output, OutputFormat};
//!
//! let config = PolicyConfig::default();
//! let policy = printer_policy(&config, &WatchdogCommand::new("/usr/local/bin/printguard"));
//! let host = SystemHost::new(config.command_timeout());
//! let report = Enforcer::new(&host, &config.root_dir).dry_run(true).run(&policy);
//! println!("{}", format_output(&Output::Report(&report), &OutputFormat::Human));
//! ```

pub mod cli;
pub mod engine;
pub mod error;
pub mod host;
pub mod logging;
pub mod output;
pub mod policy;
pub mod security;
pub mod watchdog;

pub use engine::{EnforcementReport, EnforcementResult, Enforcer, Outcome};
pub use error::{GuardError, Result};
pub use host::{Host, SystemHost};
pub use output::{format_output, Output, OutputFormat};
pub use policy::{printer_policy, Action, ActionKind, Policy, PolicyConfig, WatchdogCommand};
pub use watchdog::Watchdog;
