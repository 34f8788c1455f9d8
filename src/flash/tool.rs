//! External flash tool invocation

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::process::Command;

/// Runs a demo project's flashing script and reports its exit code.
#[cfg_attr(test, mockall::automock)]
pub trait FlashTool {
    /// Runs `script` with `demo_dir` as working directory and the process
    /// environment extended by `env`. Returns the exit code, `-1` when the
    /// tool was killed by a signal.
    fn run(&mut self, script: &Path, demo_dir: &Path, env: &[(String, String)]) -> Result<i32>;
}

/// Runs the flashing script as a blocking subprocess.
#[derive(Debug, Default)]
pub struct ScriptFlasher;

impl ScriptFlasher {
    pub fn new() -> Self {
        Self
    }
}

impl FlashTool for ScriptFlasher {
    fn run(&mut self, script: &Path, demo_dir: &Path, env: &[(String, String)]) -> Result<i32> {
        make_executable(script)?;

        debug!("Running {} in {}", script.display(), demo_dir.display());
        let status = Command::new(script)
            .current_dir(demo_dir)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .with_context(|| format!("Unable to start flash tool: {}", script.display()))?;

        let code = status.code().unwrap_or(-1);
        debug!("Flash tool finished: exit_code={}", code);
        Ok(code)
    }
}

#[cfg(unix)]
fn make_executable(script: &Path) -> Result<()> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(script, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Unable to chmod {}", script.display()))
}

#[cfg(not(unix))]
fn make_executable(_script: &Path) -> Result<()> {
    Ok(())
}
