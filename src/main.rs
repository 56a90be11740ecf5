//! printguard CLI - keep printer auto-discovery switched off

use anyhow::Context;
use clap::Parser;
use printguard::cli::{Args, SubCommand};
use printguard::logging::init_logging;
use printguard::security::require_root;
use printguard::watchdog::install_signal_handler;
use printguard::{
    format_output, printer_policy, Enforcer, Output, OutputFormat, Policy, PolicyConfig, SystemHost,
    Watchdog, WatchdogCommand,
};
use std::path::PathBuf;

/// Where the installed watchdog unit points when the running binary cannot
/// be resolved
const FALLBACK_EXE: &str = "/usr/local/bin/printguard";

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let SubCommand::Watchdog { interval, once } = args.command() {
        run_watchdog(&args, interval, once);
        std::process::exit(0);
    }

    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn output_format(args: &Args) -> OutputFormat {
    if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    }
}

fn load_config(args: &Args) -> anyhow::Result<PolicyConfig> {
    let mut config = PolicyConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(root) = &args.root {
        config.root_dir = root.clone();
        config.validate()?;
    }
    Ok(config)
}

fn build_policy(args: &Args, config: &PolicyConfig) -> Policy {
    let exe = std::env::current_exe().unwrap_or_else(|e| {
        tracing::warn!(error = %e, fallback = FALLBACK_EXE, "cannot resolve own executable");
        PathBuf::from(FALLBACK_EXE)
    });
    let config_path = args
        .config
        .as_ref()
        .map(|p| std::fs::canonicalize(p).unwrap_or_else(|_| p.clone()));
    printer_policy(
        config,
        &WatchdogCommand::new(exe).with_config(config_path.as_deref()),
    )
}

fn run(args: &Args) -> anyhow::Result<i32> {
    let config = load_config(args)?;
    let policy = build_policy(args, &config);
    let format = output_format(args);

    let dry_run = match args.command() {
        SubCommand::Plan => {
            println!("{}", format_output(&Output::Plan(&policy), &format));
            return Ok(0);
        }
        SubCommand::Status => true,
        _ => args.dry_run,
    };

    require_root(dry_run)?;

    let host = SystemHost::new(config.command_timeout());
    let report = Enforcer::new(&host, &config.root_dir)
        .dry_run(dry_run)
        .run(&policy);

    println!("{}", format_output(&Output::Report(&report), &format));

    if report.aborted.is_some() {
        return Ok(1);
    }
    if args.strict && report.failed_count() > 0 {
        return Ok(2);
    }
    Ok(0)
}

/// Never fails: setup problems are logged and the defaults are used
fn run_watchdog(args: &Args, interval: Option<u64>, once: bool) {
    let config = match load_config(args) {
        Ok(config) => config,
        Err(e) => {
            let reason = format!("{:#}", e);
            tracing::warn!(error = %reason, "using built-in configuration");
            PolicyConfig::default()
        }
    };
    let format = output_format(args);
    let policy = build_policy(args, &config);
    let host = SystemHost::new(config.command_timeout());
    let interval = interval
        .filter(|secs| *secs > 0)
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.watchdog_interval());

    let watchdog = match Watchdog::new(&host, &policy.process_patterns(), interval) {
        Ok(watchdog) => watchdog.dry_run(args.dry_run),
        Err(e) => {
            tracing::error!(error = %e, "watchdog cannot start");
            return;
        }
    };

    if once {
        let sweep = watchdog.tick();
        println!("{}", format_output(&Output::Sweep(&sweep), &format));
        return;
    }

    if let Err(e) = install_signal_handler(watchdog.stop_handle()) {
        tracing::warn!(error = %e, "continuing without signal handler");
    }

    watchdog.run(|sweep| {
        println!("{}", format_output(&Output::Sweep(sweep), &format));
    });
}
