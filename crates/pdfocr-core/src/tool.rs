//! Running external executables.

use std::env;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::trace;

use crate::error::ToolError;

/// Run `program` with `args`, mapping a missing binary or a non-zero exit to
/// [`ToolError`]. Stdout is discarded; stderr is kept for the error message.
pub(crate) fn run<I, S>(program: &Path, args: I) -> Result<(), ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool = program.display().to_string();
    let mut command = Command::new(program);
    command.args(args);
    trace!("Running {:?}", command);

    let output = command.output().map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ToolError::NotFound { tool: tool.clone() }
        } else {
            ToolError::Spawn {
                tool: tool.clone(),
                source,
            }
        }
    })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(ToolError::Failed {
            tool,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Resolve `program` the way the OS would when spawning it.
///
/// Paths containing a separator are checked directly; bare names are looked
/// up in `PATH`.
pub fn locate(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        let suffix = env::consts::EXE_SUFFIX;
        if suffix.is_empty() {
            return None;
        }
        let mut name = program.as_os_str().to_owned();
        name.push(suffix);
        let candidate = dir.join(name);
        candidate.is_file().then_some(candidate)
    })
}
