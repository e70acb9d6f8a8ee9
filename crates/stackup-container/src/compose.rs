//! docker compose CLI ラッパー

use crate::error::{PlatformError, Result};
use crate::platform::{DownOptions, UpOptions};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// docker compose CLI
#[derive(Debug, Clone)]
pub struct ComposeCli {
    docker_bin: String,
    project_dir: PathBuf,
    compose_file: String,
}

impl ComposeCli {
    pub fn new(
        docker_bin: impl Into<String>,
        project_dir: impl Into<PathBuf>,
        compose_file: impl Into<String>,
    ) -> Self {
        Self {
            docker_bin: docker_bin.into(),
            project_dir: project_dir.into(),
            compose_file: compose_file.into(),
        }
    }

    /// `up` の引数を組み立てる
    pub fn up_args(services: &[String], options: UpOptions) -> Vec<String> {
        let mut args = vec!["up".to_string()];
        if options.detached {
            args.push("--detach".to_string());
        }
        if options.build {
            args.push("--build".to_string());
        }
        if options.pull {
            args.push("--pull".to_string());
            args.push("always".to_string());
        }
        args.extend(services.iter().cloned());
        args
    }

    /// `down` の引数を組み立てる
    pub fn down_args(options: DownOptions) -> Vec<String> {
        let mut args = vec!["down".to_string(), "--remove-orphans".to_string()];
        if options.volumes {
            args.push("--volumes".to_string());
        }
        args
    }

    pub async fn up(&self, services: &[String], options: UpOptions) -> Result<String> {
        self.run(&Self::up_args(services, options)).await
    }

    pub async fn down(&self, options: DownOptions) -> Result<String> {
        self.run(&Self::down_args(options)).await
    }

    /// compose コマンドを実行して標準出力を返す
    async fn run(&self, args: &[String]) -> Result<String> {
        let compose_file = self.project_dir.join(&self.compose_file);

        let mut cmd = Command::new(&self.docker_bin);
        cmd.arg("compose")
            .arg("--project-directory")
            .arg(&self.project_dir)
            .arg("--file")
            .arg(&compose_file)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(
            "Running: {} compose --file {} {}",
            self.docker_bin,
            compose_file.display(),
            args.join(" ")
        );

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlatformError::ComposeNotFound(self.docker_bin.clone())
            } else {
                PlatformError::Io(e)
            }
        })?;

        if !output.status.success() {
            return Err(PlatformError::RequestFailed {
                request: format!("docker compose {}", args.join(" ")),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
