//! Docker を使ったプラットフォーム実装
//!
//! `up` / `down` は docker compose CLI に、`exec` は Docker Engine API に委譲します。

// Bollard 0.19 の非推奨APIを一時的に使用
#![allow(deprecated)]

use crate::compose::ComposeCli;
use crate::error::{PlatformError, Result};
use crate::platform::{ContainerPlatform, DownOptions, ExecOutput, UpOptions};
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use futures_util::stream::StreamExt;
use stackup_core::StackManifest;

/// Docker接続を初期化（接続テスト付き）
pub async fn connect_docker() -> Result<Docker> {
    let docker = Docker::connect_with_local_defaults()
        .map_err(|e| PlatformError::DockerConnectionFailed(e.to_string()))?;

    docker
        .ping()
        .await
        .map_err(|e| PlatformError::DockerConnectionFailed(e.to_string()))?;

    Ok(docker)
}

/// Docker プラットフォーム
pub struct DockerPlatform {
    docker: Docker,
    compose: ComposeCli,
    manifest: StackManifest,
}

impl DockerPlatform {
    pub fn new(docker: Docker, compose: ComposeCli, manifest: StackManifest) -> Self {
        Self {
            docker,
            compose,
            manifest,
        }
    }

    /// サービス名からコンテナ名を解決
    ///
    /// `container_name` がない場合は compose の命名規則 `{project}-{service}-1`
    pub fn container_name(&self, service: &str) -> Result<String> {
        let definition = self
            .manifest
            .service(service)
            .ok_or_else(|| PlatformError::UnknownService(service.to_string()))?;

        Ok(definition
            .container_name
            .clone()
            .unwrap_or_else(|| format!("{}-{}-1", self.manifest.project, service)))
    }
}

impl ContainerPlatform for DockerPlatform {
    async fn up(&self, services: &[String], options: UpOptions) -> Result<()> {
        for service in services {
            if self.manifest.service(service).is_none() {
                return Err(PlatformError::UnknownService(service.clone()));
            }
        }
        self.compose.up(services, options).await?;
        Ok(())
    }

    async fn exec(
        &self,
        service: &str,
        command: &[String],
        env: &[String],
    ) -> Result<ExecOutput> {
        let container_name = self.container_name(service)?;

        let exec_config = CreateExecOptions {
            cmd: Some(command.to_vec()),
            env: (!env.is_empty()).then(|| env.to_vec()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let message = self.docker.create_exec(&container_name, exec_config).await?;

        let mut output = String::new();
        match self
            .docker
            .start_exec(&message.id, None::<StartExecOptions>)
            .await?
        {
            StartExecResults::Attached {
                output: mut stream, ..
            } => {
                while let Some(msg) = stream.next().await {
                    match msg? {
                        LogOutput::StdOut { message }
                        | LogOutput::StdErr { message }
                        | LogOutput::Console { message } => {
                            output.push_str(&String::from_utf8_lossy(&message));
                        }
                        LogOutput::StdIn { .. } => {}
                    }
                }
            }
            StartExecResults::Detached => {}
        }

        // 終了コードの取得
        let inspect = self.docker.inspect_exec(&message.id).await?;
        let exit_code = inspect.exit_code.unwrap_or(-1);

        tracing::debug!(
            container = %container_name,
            exit_code,
            "Exec finished: {}",
            command.join(" ")
        );

        Ok(ExecOutput { exit_code, output })
    }

    async fn down(&self, options: DownOptions) -> Result<()> {
        self.compose.down(options).await?;
        Ok(())
    }
}
