//! サービス定義

use serde::{Deserialize, Serialize};

/// サービスのビルド元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSource {
    /// ビルド済みイメージ
    Image(String),
    /// ローカルのビルドコンテキスト（`tag` はビルド結果のイメージ名）
    Build { context: String, tag: String },
}

impl BuildSource {
    pub fn is_local_build(&self) -> bool {
        matches!(self, Self::Build { .. })
    }

    /// 最終的に使われるイメージ名
    pub fn image(&self) -> &str {
        match self {
            Self::Image(image) => image,
            Self::Build { tag, .. } => tag,
        }
    }
}

/// 再起動ポリシー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// 再起動しない（デフォルト）
    #[default]
    No,
    /// 常に再起動
    Always,
    /// 異常終了時のみ再起動
    OnFailure,
    /// 明示的に停止しない限り再起動
    UnlessStopped,
}

/// サービス定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub name: String,
    pub source: BuildSource,
    /// コンテナ名（exec の宛先として使う）
    pub container_name: Option<String>,
    /// このサービスより先に要求されるべきサービス
    pub depends_on: Vec<String>,
    /// `host:container[:mode]` 形式
    pub volumes: Vec<String>,
    /// `host:container` 形式
    pub ports: Vec<String>,
    pub env_files: Vec<String>,
    pub entrypoint: Vec<String>,
    pub restart: RestartPolicy,
}

impl ServiceDefinition {
    pub fn new(name: impl Into<String>, source: BuildSource) -> Self {
        Self {
            name: name.into(),
            source,
            container_name: None,
            depends_on: Vec::new(),
            volumes: Vec::new(),
            ports: Vec::new(),
            env_files: Vec::new(),
            entrypoint: Vec::new(),
            restart: RestartPolicy::No,
        }
    }

    pub fn container_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = Some(name.into());
        self
    }

    pub fn depends_on(mut self, deps: &[&str]) -> Self {
        self.depends_on = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn volume(mut self, volume: impl Into<String>) -> Self {
        self.volumes.push(volume.into());
        self
    }

    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.ports.push(port.into());
        self
    }

    pub fn env_file(mut self, path: impl Into<String>) -> Self {
        self.env_files.push(path.into());
        self
    }

    pub fn entrypoint(mut self, args: &[&str]) -> Self {
        self.entrypoint = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn restart(mut self, policy: RestartPolicy) -> Self {
        self.restart = policy;
        self
    }
}
