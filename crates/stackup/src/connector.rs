use colored::Colorize;
use stackup_container::{ComposeCli, ContainerPlatform, DockerPlatform, connect_docker};
use stackup_core::{ProjectLayout, StackManifest};

/// コンテナプラットフォームへの接続
///
/// 接続は事前検証（環境設定・プロジェクト構成）が済んでから行います。
#[allow(async_fn_in_trait)]
pub trait PlatformConnector {
    type Platform: ContainerPlatform;

    async fn connect(
        &self,
        layout: &ProjectLayout,
        manifest: &StackManifest,
    ) -> anyhow::Result<Self::Platform>;
}

/// ローカルの Docker に接続する
#[derive(Debug, Clone)]
pub struct DockerConnector {
    docker_bin: String,
}

impl DockerConnector {
    pub fn new(docker_bin: impl Into<String>) -> Self {
        Self {
            docker_bin: docker_bin.into(),
        }
    }
}

impl PlatformConnector for DockerConnector {
    type Platform = DockerPlatform;

    async fn connect(
        &self,
        layout: &ProjectLayout,
        manifest: &StackManifest,
    ) -> anyhow::Result<DockerPlatform> {
        println!();
        println!("{}", "Dockerに接続中...".blue());

        let docker = match connect_docker().await {
            Ok(docker) => docker,
            Err(e) => {
                eprintln!();
                eprintln!("{}", "✗ Docker接続エラー".red().bold());
                eprintln!();
                eprintln!("{}", "原因:".yellow());
                eprintln!("  {}", e);
                eprintln!();
                eprintln!("{}", "解決方法:".yellow());
                eprintln!("  • Dockerが起動しているか確認してください");
                eprintln!("  • docker compose version が正常に動作するか確認してください");
                return Err(anyhow::anyhow!("Docker接続に失敗しました"));
            }
        };

        let compose = ComposeCli::new(
            self.docker_bin.clone(),
            layout.root(),
            layout.manifest_file(),
        );

        Ok(DockerPlatform::new(docker, compose, manifest.clone()))
    }
}
