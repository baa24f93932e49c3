use crate::backends::AcmeClient;
use crate::error::Error;
use anyhow::{bail, Context};
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable overriding the certbot executable.
pub const CERTBOT_BIN_ENV: &str = "CERTBOT_BIN";
const CERTBOT_DEFAULT: &str = "certbot";

/// Runs a local `certbot` executable as a child process, inheriting stdio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertbotProcess {
    program: PathBuf,
}

impl CertbotProcess {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find certbot using `CERTBOT_BIN`, or `certbot` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCollaborator`] if no executable is found.
    pub fn locate() -> Result<Self, Error> {
        let program = env::var_os(CERTBOT_BIN_ENV)
            .filter(|p| !p.is_empty())
            .map_or_else(|| PathBuf::from(CERTBOT_DEFAULT), PathBuf::from);
        find_executable(&program, env::var_os("PATH").as_deref())
            .map(Self::new)
            .ok_or_else(|| Error::MissingCollaborator(program.display().to_string()))
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl AcmeClient for CertbotProcess {
    fn run(&self, args: &[String]) -> anyhow::Result<()> {
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .with_context(|| format!("failed to start {}", self.program.display()))?;
        if !status.success() {
            bail!("{} exited with {status}", self.program.display());
        }
        Ok(())
    }
}

/// Resolve `program` to an executable path. Bare names are searched for in `path_var`; anything
/// with a directory component is used as is.
#[must_use]
pub fn find_executable(program: &Path, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }
    env::split_paths(path_var?)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
