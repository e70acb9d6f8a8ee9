//! stackup のライフサイクルオーケストレーター
//!
//! 1回の起動で1つのフェーズだけを実行します。フェーズ間で保持する状態はなく、
//! 永続化される状態はファイルシステム上のプロジェクト構成とコンテナプラットフォームだけです。

pub mod commands;
pub mod connector;
pub mod phase;

pub use connector::{DockerConnector, PlatformConnector};
pub use phase::Phase;

use stackup_config::Settings;
use stackup_core::{
    Confirm, EnvConfig, ProjectLayout, ReadinessProbe, ScaffoldVars, StackError,
};
use std::path::PathBuf;

/// 環境設定ファイルの既定名
pub const DEFAULT_ENV_FILE: &str = ".env";

/// 1回の起動で使う入力
#[derive(Debug, Clone)]
pub struct Invocation {
    pub project_dir: PathBuf,
    pub env_file: PathBuf,
    pub settings: Settings,
    /// 破壊的操作の確認を事前に与える（`--yes`）
    pub assume_yes: bool,
}

impl Invocation {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            env_file: project_dir.join(DEFAULT_ENV_FILE),
            project_dir,
            settings: Settings::default(),
            assume_yes: false,
        }
    }

    pub fn with_env_file(mut self, env_file: impl Into<PathBuf>) -> Self {
        self.env_file = env_file.into();
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// 検証済みのプロジェクト配置
    pub fn layout(&self, vars: &ScaffoldVars) -> Result<ProjectLayout, StackError> {
        let layout = ProjectLayout::new(&self.project_dir, vars)
            .with_manifest_file(&self.settings.compose_file);
        layout.validate()?;
        Ok(layout)
    }

    pub fn probe(&self) -> ReadinessProbe {
        ReadinessProbe::new(
            self.settings.probe.interval(),
            self.settings.probe.max_attempts,
        )
    }

    /// 生成時の変数（環境設定ファイルがなければデフォルト値）
    pub fn scaffold_vars(&self) -> Result<ScaffoldVars, StackError> {
        if self.env_file.is_file() {
            Ok(ScaffoldVars::from_env(&EnvConfig::load(&self.env_file)?))
        } else {
            Ok(ScaffoldVars::default())
        }
    }
}

/// フェーズを実行
pub async fn run<C: PlatformConnector>(
    phase: Phase,
    invocation: &Invocation,
    connector: &C,
    confirm: &mut impl Confirm,
) -> anyhow::Result<()> {
    tracing::debug!(?phase, project_dir = %invocation.project_dir.display(), "Running phase");

    match phase {
        Phase::Help => {
            commands::help::handle();
            Ok(())
        }
        Phase::Scaffold => commands::scaffold::handle(invocation, confirm),
        Phase::Start => commands::start::handle(invocation, connector).await,
        Phase::Reboot => commands::reboot::handle(invocation, connector).await,
        Phase::Reset => commands::reset::handle(invocation, connector, confirm).await,
        Phase::Update => commands::update::handle(invocation, connector).await,
    }
}
