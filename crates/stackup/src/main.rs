use clap::{ArgGroup, Parser};
use colored::Colorize;
use stackup::{DockerConnector, Invocation, Phase};
use stackup_core::StdinConfirm;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stackup", version)]
#[command(about = "Webアプリケーションスタックの構築と運用", long_about = None)]
#[command(disable_help_flag = true)]
#[command(group(ArgGroup::new("phase").multiple(false)))]
struct Cli {
    /// プロジェクト構成を生成（初回セットアップ）
    #[arg(long, group = "phase")]
    first_time: bool,
    /// スタックを起動
    #[arg(long, group = "phase")]
    start: bool,
    /// スタックを停止して再起動
    #[arg(long, group = "phase")]
    reboot: bool,
    /// コンテナとボリュームを削除して再生成
    #[arg(long, group = "phase")]
    reset: bool,
    /// 最新イメージで再起動
    #[arg(long, group = "phase")]
    update: bool,
    /// 使い方を表示
    #[arg(short = 'h', long, group = "phase")]
    help: bool,

    /// プロジェクトのディレクトリ
    #[arg(long, env = "STACKUP_PROJECT_DIR", default_value = ".")]
    project_dir: PathBuf,
    /// 環境設定ファイル（デフォルト: <project-dir>/.env）
    #[arg(long, env = "STACKUP_ENV_FILE")]
    env_file: Option<PathBuf>,
    /// 破壊的操作の確認を省略
    #[arg(short = 'y', long)]
    yes: bool,
}

impl Cli {
    fn phase(&self) -> Phase {
        if self.first_time {
            Phase::Scaffold
        } else if self.start {
            Phase::Start
        } else if self.reboot {
            Phase::Reboot
        } else if self.reset {
            Phase::Reset
        } else if self.update {
            Phase::Update
        } else {
            Phase::Help
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let phase = cli.phase();

    // Help は設定ファイル不要
    if phase == Phase::Help {
        stackup::commands::help::handle();
        return Ok(());
    }

    let settings = stackup_config::load_settings()?;
    tracing::debug!(?settings, "Settings loaded");

    let mut invocation = Invocation::new(cli.project_dir)
        .with_settings(settings)
        .assume_yes(cli.yes);
    if let Some(env_file) = cli.env_file {
        invocation = invocation.with_env_file(env_file);
    }

    let connector = DockerConnector::new(invocation.settings.docker_bin.clone());
    let mut confirm = StdinConfirm::stdin();

    stackup::run(phase, &invocation, &connector, &mut confirm).await
}
