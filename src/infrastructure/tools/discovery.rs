//! # Executable Discovery
//!
//! Locates the command interpreter and the git client.
//! An explicit path from the config always wins; otherwise well-known install locations are
//! probed in order.

use std::path::{Path, PathBuf};

use crate::domain::config::ExecutablesConfig;

#[cfg(windows)]
const GIT_CANDIDATES: &[&str] = &[
    r"C:\Program Files\Git\cmd\git.exe",
    r"C:\Program Files\Git\bin\git.exe",
];
#[cfg(not(windows))]
const GIT_CANDIDATES: &[&str] = &["/usr/bin/git", "/usr/local/bin/git", "/opt/homebrew/bin/git"];

#[cfg(windows)]
const SHELL_CANDIDATES: &[&str] = &[
    r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe",
    "powershell.exe",
];
#[cfg(not(windows))]
const SHELL_CANDIDATES: &[&str] = &[
    "/usr/bin/pwsh",
    "/usr/local/bin/pwsh",
    "/opt/homebrew/bin/pwsh",
    "/bin/sh",
];

/// How a command string is handed to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlavor {
    PowerShell,
    Posix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    pub program: PathBuf,
    pub flavor: ShellFlavor,
}

impl Shell {
    pub fn from_program(program: PathBuf) -> Self {
        let stem = program
            .file_stem()
            .map(|s| s.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let flavor = if stem == "pwsh" || stem == "powershell" {
            ShellFlavor::PowerShell
        } else {
            ShellFlavor::Posix
        };
        Self { program, flavor }
    }

    /// Argument vector that runs `command` as a single script.
    pub fn command_args(&self, command: &str) -> Vec<String> {
        match self.flavor {
            ShellFlavor::PowerShell => vec![
                "-NoProfile".into(),
                "-ExecutionPolicy".into(),
                "Bypass".into(),
                "-Command".into(),
                command.into(),
            ],
            ShellFlavor::Posix => vec!["-c".into(), command.into()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Executables {
    pub shell: Option<Shell>,
    pub git: Option<PathBuf>,
}

impl Executables {
    pub fn discover(config: &ExecutablesConfig) -> Self {
        let shell = config
            .shell
            .clone()
            .or_else(|| first_existing(SHELL_CANDIDATES))
            .map(Shell::from_program);
        let git = config.git.clone().or_else(|| first_existing(GIT_CANDIDATES));

        match &shell {
            Some(shell) => tracing::info!("Command interpreter: {}", shell.program.display()),
            None => tracing::warn!("No command interpreter found"),
        }
        match &git {
            Some(git) => tracing::info!("Git client: {}", git.display()),
            None => tracing::warn!("No git client found"),
        }

        Self { shell, git }
    }
}

fn first_existing(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(Path::new)
        // Bare names (no directory part) are resolved by the OS at spawn time.
        .find(|path| path.exists() || path.parent() == Some(Path::new("")))
        .map(Path::to_path_buf)
}
