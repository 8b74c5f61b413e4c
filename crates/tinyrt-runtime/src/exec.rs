//! Interpreter invocation
//!
//! [`run_script`] materializes the caller's source as a uniquely named file
//! in the scratch area, runs the interpreter on it and removes the file on
//! every exit path. Removal happens explicitly on the normal path and through
//! `Drop` when the future is cancelled; children are killed on drop.

use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tempfile::TempPath;
use tinyrt_core::{Result, RuntimeError};
use tokio::process::Command;

/// Prefix of every script file written to the scratch area
pub const SCRIPT_PREFIX: &str = "tinyrt-";

/// Captured result of one interpreter run
#[derive(Debug, Clone, Serialize)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout of a successful run
    ///
    /// Non-empty stderr is logged as a warning; interpreters write
    /// diagnostics there even when the program succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ScriptFailed` when the process exited unsuccessfully.
    pub fn into_stdout(self, executable: &Path) -> Result<String> {
        if !self.success() {
            let status = match self.exit_code {
                Some(code) => format!("exit code {}", code),
                None => "a signal".to_string(),
            };
            return Err(RuntimeError::ScriptFailed {
                executable: executable.to_path_buf(),
                status,
                stderr: self.stderr.trim_end().to_string(),
            });
        }

        if !self.stderr.is_empty() {
            tracing::warn!(
                "{} wrote to stderr: {}",
                executable.display(),
                self.stderr.trim_end()
            );
        }

        Ok(self.stdout)
    }
}

/// Spawns `executable` with `args`, waits and captures both streams in full
///
/// # Errors
///
/// Returns `Execution` if the process cannot be spawned or waited on.
pub async fn spawn_and_capture<S: AsRef<OsStr>>(
    executable: &Path,
    args: &[S],
) -> Result<ExecOutput> {
    let start = Instant::now();

    let output = Command::new(executable)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| RuntimeError::Execution {
            executable: executable.to_path_buf(),
            source: e,
        })?;

    Ok(ExecOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Script file owned by one execute call, deleted when dropped
#[derive(Debug)]
pub struct TemporaryScript {
    path: TempPath,
}

impl TemporaryScript {
    /// Writes `source` verbatim to a new uniquely named `.<extension>` file in `dir`
    pub async fn create(dir: &Path, extension: &str, source: &str) -> Result<Self> {
        let dir = dir.to_path_buf();
        let suffix = format!(".{}", extension);
        let source = source.to_owned();

        let path = tokio::task::spawn_blocking(move || -> std::io::Result<TempPath> {
            use std::io::Write;

            std::fs::create_dir_all(&dir)?;
            let mut file = tempfile::Builder::new()
                .prefix(SCRIPT_PREFIX)
                .suffix(&suffix)
                .tempfile_in(&dir)?;
            file.write_all(source.as_bytes())?;
            file.flush()?;
            // Close the handle so the interpreter can open the file on every platform
            Ok(file.into_temp_path())
        })
        .await
        .map_err(|e| RuntimeError::io("create script file", std::io::Error::other(e)))?
        .map_err(|e| RuntimeError::io("create script file", e))?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the file, logging instead of failing
    pub async fn remove(self) {
        let script_path = self.path.to_path_buf();
        let path = self.path;

        match tokio::task::spawn_blocking(move || path.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!("failed to remove script {}: {}", script_path.display(), e)
            }
            Err(e) => {
                tracing::warn!("failed to remove script {}: {}", script_path.display(), e)
            }
        }
    }
}

/// Runs `source` with `executable` through a temporary script in `scratch_dir`
pub async fn run_script(
    executable: &Path,
    scratch_dir: &Path,
    extension: &str,
    source: &str,
) -> Result<ExecOutput> {
    let script = TemporaryScript::create(scratch_dir, extension, source).await?;
    tracing::debug!(
        "running {} {}",
        executable.display(),
        script.path().display()
    );

    let result = spawn_and_capture(executable, &[script.path().as_os_str()]).await;
    script.remove().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyrt_testkit::{list_dir, temp_dir_in_workspace};

    #[tokio::test]
    async fn test_temporary_script_lifecycle() {
        let temp = temp_dir_in_workspace();
        let script = TemporaryScript::create(temp.path(), "py", "print('hi')\n")
            .await
            .unwrap();

        let path = script.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "py");
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(SCRIPT_PREFIX)
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print('hi')\n");

        script.remove().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_temporary_script_removed_on_drop() {
        let temp = temp_dir_in_workspace();
        let script = TemporaryScript::create(temp.path(), "js", "1").await.unwrap();
        let path = script.path().to_path_buf();

        drop(script);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_remove_tolerates_missing_file() {
        let temp = temp_dir_in_workspace();
        let script = TemporaryScript::create(temp.path(), "py", "pass").await.unwrap();
        std::fs::remove_file(script.path()).unwrap();

        script.remove().await;
        assert!(list_dir(temp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_script_names_are_unique() {
        let temp = temp_dir_in_workspace();
        let a = TemporaryScript::create(temp.path(), "js", "").await.unwrap();
        let b = TemporaryScript::create(temp.path(), "js", "").await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_spawn_missing_executable() {
        let err = spawn_and_capture(Path::new("/definitely/not/here/node"), &["-v"])
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Execution { .. }));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_run_script_captures_and_cleans_up() {
        let temp = temp_dir_in_workspace();
        let output = run_script(
            Path::new("/bin/sh"),
            temp.path(),
            "sh",
            "echo out\necho err >&2\n",
        )
        .await
        .unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(output.success());
        assert!(list_dir(temp.path()).is_empty());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_run_script_cleans_up_after_spawn_failure() {
        let temp = temp_dir_in_workspace();
        let err = run_script(Path::new("/no/such/interpreter"), temp.path(), "js", "x")
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Execution { .. }));
        assert!(list_dir(temp.path()).is_empty());
    }

    #[test]
    fn test_into_stdout_failure() {
        let output = ExecOutput {
            stdout: "partial".to_string(),
            stderr: "boom\n".to_string(),
            exit_code: Some(3),
            duration_ms: 1,
        };

        let err = output.into_stdout(Path::new("node")).unwrap_err();
        match err {
            RuntimeError::ScriptFailed { status, stderr, .. } => {
                assert_eq!(status, "exit code 3");
                assert_eq!(stderr, "boom");
            }
            other => panic!("Expected ScriptFailed, got: {:?}", other),
        }
    }

    #[test]
    fn test_into_stdout_success_with_stderr() {
        let output = ExecOutput {
            stdout: "42\n".to_string(),
            stderr: "DeprecationWarning".to_string(),
            exit_code: Some(0),
            duration_ms: 1,
        };
        assert_eq!(output.into_stdout(Path::new("node")).unwrap(), "42\n");
    }
}
