//! Subprocess discipline (`exec`): every external-tool call is
//! non-throwing and timeout-bounded. Used by the `diff` and `forest`
//! strategies for `git` and the optional `forest` executable respectively.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `cmd args...` with a timeout; never returns an `Err` for the
/// subprocess itself misbehaving — spawn failures and timeouts both come
/// back as a non-zero synthetic exit code so callers can treat every path
/// uniformly as "did it work".
pub async fn exec(cmd: &str, args: &[&str], cwd: &Path, timeout: Duration) -> ExecOutput {
    let mut command = Command::new(cmd);
    command
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let spawned = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            return ExecOutput {
                exit_code: -1,
                stdout: String::new(),
                stderr: err.to_string(),
            }
        }
    };

    match tokio::time::timeout(timeout, spawned.wait_with_output()).await {
        Ok(Ok(output)) => ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        },
        Ok(Err(err)) => ExecOutput {
            exit_code: -1,
            stdout: String::new(),
            stderr: err.to_string(),
        },
        Err(_) => ExecOutput {
            exit_code: -1,
            stdout: String::new(),
            stderr: format!("{cmd} timed out after {timeout:?}"),
        },
    }
}

/// Returns paths from `git diff --name-only HEAD` and `git diff --name-only
/// --cached`, deduplicated; empty on any error.
pub async fn get_git_diff_paths(root: &Path) -> Vec<String> {
    let timeout = Duration::from_secs(5);
    let (unstaged, staged) = tokio::join!(
        exec("git", &["diff", "--name-only", "HEAD"], root, timeout),
        exec("git", &["diff", "--name-only", "--cached"], root, timeout),
    );

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for output in [unstaged, staged] {
        if output.exit_code != 0 {
            continue;
        }
        for line in output.stdout.lines() {
            let path = line.trim();
            if !path.is_empty() && seen.insert(path.to_string()) {
                out.push(path.to_string());
            }
        }
    }
    out
}

/// True iff an executable named `name` is found on `PATH`.
pub fn on_path(name: &str) -> bool {
    let Some(path_var) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path_var).any(|dir| {
        let candidate = dir.join(name);
        candidate.is_file()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nonexistent_command_never_panics() {
        let out = exec(
            "definitely-not-a-real-binary",
            &[],
            Path::new("."),
            Duration::from_secs(1),
        )
        .await;
        assert_ne!(out.exit_code, 0);
    }

    #[tokio::test]
    async fn diff_paths_empty_outside_a_repo() {
        let dir = tempfile::tempdir().unwrap();
        let paths = get_git_diff_paths(dir.path()).await;
        assert!(paths.is_empty());
    }
}
