//! コンテナプラットフォームのインターフェース
//!
//! オーケストレーターが必要とするのは `up` / `exec` / `down` の3つだけです。
//! すでに起動しているサービスへの `up` はプラットフォーム側で no-op になります。

use crate::error::Result;

/// `up` のオプション
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpOptions {
    /// バックグラウンドで起動
    pub detached: bool,
    /// 起動前にローカルビルドを行う
    pub build: bool,
    /// 起動前に最新イメージを pull する
    pub pull: bool,
}

impl UpOptions {
    pub fn detached() -> Self {
        Self {
            detached: true,
            ..Default::default()
        }
    }

    pub fn with_build(mut self) -> Self {
        self.build = true;
        self
    }

    pub fn with_pull(mut self) -> Self {
        self.pull = true;
        self
    }
}

/// `down` のオプション
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownOptions {
    /// 名前付きボリュームも削除する
    pub volumes: bool,
}

/// `exec` の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i64,
    /// 標準出力と標準エラー出力を結合したもの
    pub output: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// コンテナプラットフォーム
#[allow(async_fn_in_trait)]
pub trait ContainerPlatform {
    /// サービスを起動（依存関係の順序はマニフェストに従う）
    async fn up(&self, services: &[String], options: UpOptions) -> Result<()>;

    /// 起動中のサービスでコマンドを実行
    ///
    /// `env` は `KEY=VALUE` 形式でコマンドの環境変数に追加される。
    async fn exec(&self, service: &str, command: &[String], env: &[String])
    -> Result<ExecOutput>;

    /// スタック全体を停止・削除
    async fn down(&self, options: DownOptions) -> Result<()>;
}
