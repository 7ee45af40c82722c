//! Git transport: clone, check out a commit, drop the repository metadata

use crate::transport::unsupported;
use crate::{Transport, TransportOptions};
use std::path::{Path, PathBuf};
use stowage_errors::{Error, NetworkError};
use stowage_types::Resolution;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct GitTransport {
    program: PathBuf,
}

impl Default for GitTransport {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl GitTransport {
    /// Use a specific `git` executable
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, repo: &str, cwd: Option<&Path>, args: &[&str]) -> Result<(), Error> {
        let mut command = Command::new(&self.program);
        command.args(args).env("GIT_TERMINAL_PROMPT", "0");
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        let failed = |message: String| NetworkError::GitFailed {
            repo: repo.to_string(),
            command: args.join(" "),
            message,
        };

        let output = command.output().await.map_err(|e| failed(e.to_string()))?;
        if !output.status.success() {
            return Err(failed(String::from_utf8_lossy(&output.stderr).trim().to_string()).into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Transport for GitTransport {
    async fn fetch(
        &self,
        resolution: &Resolution,
        dest: &Path,
        _opts: &TransportOptions,
    ) -> Result<(), Error> {
        let Resolution::Git { repo, commit } = resolution else {
            return Err(unsupported(resolution));
        };

        let dest_arg = dest.to_string_lossy();
        self.run(repo, None, &["clone", "--quiet", repo, &dest_arg])
            .await?;
        self.run(repo, Some(dest), &["checkout", "--quiet", commit])
            .await?;
        stowage_root::remove_all(&dest.join(".git")).await?;

        tracing::debug!(repo = %repo, commit = %commit, dest = %dest.display(), "checked out git package");
        Ok(())
    }
}
