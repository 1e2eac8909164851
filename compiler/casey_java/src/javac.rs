//! Discovery and invocation of the external `javac` toolchain.
//!
//! The probe order follows the original driver: an explicit `JAVA_HOME`
//! first, then every `PATH` entry. Compilation runs with the generated
//! output root on the classpath and a bounded wait; a hung compiler is
//! killed rather than blocking the pipeline forever.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use thiserror::Error;

#[cfg(windows)]
const JAVAC: &str = "javac.exe";
#[cfg(not(windows))]
const JAVAC: &str = "javac";

/// How long the compiler may run before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Error raised by the toolchain driver.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("no Java compiler found; install a JDK or set JAVA_HOME")]
    ToolchainNotFound,
    #[error("javac exited with status {status}")]
    Failed { status: i32 },
    #[error("javac did not finish within {seconds}s and was killed")]
    Timeout { seconds: u64 },
    #[error("could not run javac: {0}")]
    Io(#[from] std::io::Error),
}

/// Locate a `javac` executable: `$JAVA_HOME/bin/javac`, then `$PATH`.
pub fn find_javac() -> Option<PathBuf> {
    if let Some(home) = env::var_os("JAVA_HOME") {
        let candidate = Path::new(&home).join("bin").join(JAVAC);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(JAVAC))
        .find(|candidate| candidate.is_file())
}

/// Compile the entry source with the output root as classpath.
pub fn compile_project(
    output_root: &Path,
    entry_source: &Path,
    timeout: Duration,
) -> Result<(), CompileError> {
    let javac = find_javac().ok_or(CompileError::ToolchainNotFound)?;
    tracing::debug!(javac = %javac.display(), entry = %entry_source.display(), "invoking javac");
    compile_with(&javac, output_root, entry_source, timeout)
}

/// Compile with an explicit toolchain path.
///
/// stdout/stderr are inherited so toolchain messages reach the user
/// directly; the exit status decides success.
pub fn compile_with(
    javac: &Path,
    output_root: &Path,
    entry_source: &Path,
    timeout: Duration,
) -> Result<(), CompileError> {
    let mut child = Command::new(javac)
        .arg("-cp")
        .arg(output_root)
        .arg(entry_source)
        .spawn()?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait()? {
            Some(status) if status.success() => return Ok(()),
            Some(status) => {
                return Err(CompileError::Failed {
                    status: status.code().unwrap_or(-1),
                })
            }
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CompileError::Timeout {
                    seconds: timeout.as_secs(),
                });
            }
            None => std::thread::sleep(Duration::from_millis(50)),
        }
    }
}
