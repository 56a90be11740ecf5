//! The built-in printer lockdown policy
//!
//! Order matters: services are stopped before their processes are killed,
//! the backup is taken before the browsing configuration is overwritten, and
//! the base print service is started last.

use crate::policy::{Action, ActionKind, Hook, Policy, PolicyConfig, UnitDefinition};
use std::path::{Path, PathBuf};

pub const POLICY_NAME: &str = "printer-lockdown";

pub const WATCHDOG_UNIT: &str = "printguard-watchdog.service";
pub const SYSTEMD_UNIT_DIR: &str = "/etc/systemd/system";

pub const SYSTEM_AUTOSTART_PATTERN: &str = "/etc/xdg/autostart/*print*.desktop";
pub const USER_AUTOSTART_PATTERN: &str = "/home/*/.config/autostart/*print*.desktop";

pub const UDEV_RULES: [&str; 2] = [
    "/lib/udev/rules.d/70-printers.rules",
    "/lib/udev/rules.d/71-ipp-usb.rules",
];

pub const DBUS_POLICY_PATH: &str = "/etc/dbus-1/system.d/printguard-block-printer-config.conf";
pub const CUPS_BROWSED_CONF_PATH: &str = "/etc/cups/cups-browsed.conf";
pub const CUPS_BROWSED_BACKUP_PATH: &str = "/etc/cups/cups-browsed.conf.printguard.bak";
pub const DCONF_OVERRIDE_PATH: &str = "/etc/dconf/db/local.d/00-printguard-print-notifications";
pub const APT_PIN_PATH: &str = "/etc/apt/preferences.d/printguard-printers";

pub const DBUS_POLICY: &str = r#"<!DOCTYPE busconfig PUBLIC "-//freedesktop//DTD D-BUS Bus Configuration 1.0//EN"
 "http://www.freedesktop.org/standards/dbus/1.0/busconfig.dtd">
<!-- Managed by printguard -->
<busconfig>
  <policy context="mandatory">
    <deny own="com.redhat.NewPrinterNotification"/>
    <deny own="com.redhat.PrinterDriversInstaller"/>
    <deny send_destination="com.redhat.NewPrinterNotification"/>
    <deny send_destination="com.redhat.PrinterDriversInstaller"/>
    <deny send_interface="org.fedoraproject.Config.Printing"/>
  </policy>
</busconfig>
"#;

pub const CUPS_BROWSED_CONF: &str = "# Managed by printguard
Browsing Off
BrowseRemoteProtocols none
BrowseProtocols none
CreateIPPPrinterQueues No
";

pub const DCONF_PRINT_NOTIFICATIONS: &str = "# Managed by printguard
[org/gnome/settings-daemon/plugins/print-notifications]
active=false
";

/// How the installed watchdog unit invokes this binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchdogCommand {
    pub exe: PathBuf,
    pub config: Option<PathBuf>,
}

impl WatchdogCommand {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            config: None,
        }
    }

    pub fn with_config(mut self, config: Option<&Path>) -> Self {
        self.config = config.map(Path::to_path_buf);
        self
    }
}

/// Quote one `ExecStart=` word. Specifiers (`%`) and variables (`$`) are
/// doubled; words with whitespace, quotes or backslashes are double-quoted.
fn exec_quote(path: &Path) -> String {
    let word = path
        .to_string_lossy()
        .replace('%', "%%")
        .replace('$', "$$");
    if !word
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ';'))
    {
        return word;
    }
    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\t' => quoted.push_str("\\t"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Render the watchdog service unit
pub fn watchdog_unit(command: &WatchdogCommand, interval_secs: u64) -> String {
    let mut exec = format!(
        "{} watchdog --interval {}",
        exec_quote(&command.exe),
        interval_secs
    );
    if let Some(config) = &command.config {
        exec.push_str(&format!(" --config {}", exec_quote(config)));
    }
    format!(
        "[Unit]\n\
         Description=printguard watchdog: terminate printer auto-configuration processes\n\
         After=multi-user.target\n\
         \n\
         [Service]\n\
         Type=simple\n\
         ExecStart={}\n\
         Restart=always\n\
         RestartSec=5\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        exec
    )
}

/// Render an apt preferences file pinning every package to priority -1
pub fn pin_preferences(packages: &[String]) -> String {
    let mut out = String::from("# Managed by printguard\n");
    for (i, package) in packages.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "Package: {}\nPin: release *\nPin-Priority: -1\n",
            package
        ));
    }
    out
}

fn disabled_path(path: &str) -> PathBuf {
    PathBuf::from(format!("{}.disabled", path))
}

/// Build the printer lockdown policy from configuration
pub fn printer_policy(config: &PolicyConfig, watchdog: &WatchdogCommand) -> Policy {
    let udev_reload = Hook::new("udevadm", &["control", "--reload-rules"]);
    let mut actions = Vec::new();

    for unit in &config.services {
        actions.push(Action::new(
            format!("stop {}", unit),
            ActionKind::StopService { unit: unit.clone() },
        ));
        actions.push(Action::new(
            format!("disable {}", unit),
            ActionKind::DisableService { unit: unit.clone() },
        ));
        actions.push(Action::new(
            format!("mask {}", unit),
            ActionKind::MaskService { unit: unit.clone() },
        ));
    }

    actions.push(Action::new(
        "kill printer processes",
        ActionKind::KillProcess {
            patterns: config.process_patterns.clone(),
        },
    ));

    actions.push(Action::new(
        "remove system autostart entries",
        ActionKind::RemoveFile {
            pattern: SYSTEM_AUTOSTART_PATTERN.to_string(),
        },
    ));
    actions.push(Action::new(
        "remove user autostart entries",
        ActionKind::RemoveFile {
            pattern: USER_AUTOSTART_PATTERN.to_string(),
        },
    ));

    for rule in UDEV_RULES {
        let file_name = Path::new(rule)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| rule.to_string());
        actions.push(
            Action::new(
                format!("disable udev rule {}", file_name),
                ActionKind::RenameFile {
                    from: PathBuf::from(rule),
                    to: disabled_path(rule),
                },
            )
            .notify(udev_reload.clone()),
        );
    }

    actions.push(Action::new(
        "block printer configuration on D-Bus",
        ActionKind::WriteFile {
            path: PathBuf::from(DBUS_POLICY_PATH),
            content: DBUS_POLICY.to_string(),
        },
    ));

    actions.push(Action::new(
        "back up cups-browsed.conf",
        ActionKind::BackupFile {
            source: PathBuf::from(CUPS_BROWSED_CONF_PATH),
            backup: PathBuf::from(CUPS_BROWSED_BACKUP_PATH),
            managed: Some(CUPS_BROWSED_CONF.to_string()),
        },
    ));
    actions.push(Action::new(
        "turn cups-browsed browsing off",
        ActionKind::WriteFile {
            path: PathBuf::from(CUPS_BROWSED_CONF_PATH),
            content: CUPS_BROWSED_CONF.to_string(),
        },
    ));
    actions.push(
        Action::new(
            "disable desktop print notifications",
            ActionKind::WriteFile {
                path: PathBuf::from(DCONF_OVERRIDE_PATH),
                content: DCONF_PRINT_NOTIFICATIONS.to_string(),
            },
        )
        .notify(Hook::new("dconf", &["update"])),
    );

    actions.push(Action::new(
        "pin printer packages",
        ActionKind::PinPackage {
            path: PathBuf::from(APT_PIN_PATH),
            packages: config.pinned_packages.clone(),
        },
    ));

    actions.push(Action::new(
        "install printer watchdog",
        ActionKind::InstallUnit(UnitDefinition {
            name: WATCHDOG_UNIT.to_string(),
            directory: PathBuf::from(SYSTEMD_UNIT_DIR),
            content: watchdog_unit(watchdog, config.watchdog_interval_secs),
            enable: true,
        }),
    ));

    if config.start_cups_after {
        actions.push(Action::new(
            format!("start {} if not running", config.cups_unit),
            ActionKind::StartService {
                unit: config.cups_unit.clone(),
            },
        ));
    }

    Policy {
        name: POLICY_NAME.to_string(),
        actions,
    }
}
