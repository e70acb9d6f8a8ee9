pub mod help;
pub mod reboot;
pub mod reset;
pub mod scaffold;
pub mod start;
pub mod update;

use crate::Invocation;
use colored::Colorize;
use stackup_container::{ContainerPlatform, DatabaseHealthCheck, UpOptions};
use stackup_core::embedded::{SECRET_TEMPLATES, secret_output_path};
use stackup_core::topology::{BACKING_SERVICES, DB_SERVICE};
use stackup_core::{EnvConfig, ProjectLayout, StackError, StackManifest, render_secret_file};

/// 事前検証済みの入力
pub(crate) struct Preflight {
    pub env: EnvConfig,
    pub layout: ProjectLayout,
    pub manifest: StackManifest,
}

/// サービスを起動する前の検証
///
/// 環境設定の読み込み、必須キーの検証、プロジェクト構成とマニフェストの確認を行います。
/// ここで失敗した場合はファイルシステムにもコンテナにも一切触れていません。
pub(crate) fn preflight(invocation: &Invocation) -> Result<Preflight, StackError> {
    let env = EnvConfig::load(&invocation.env_file)?.with_defaults();
    env.validate_required()?;
    println!(
        "  {} 環境設定: {}",
        "✓".green(),
        invocation.env_file.display().to_string().cyan()
    );

    let layout = invocation.layout(&stackup_core::ScaffoldVars::from_env(&env))?;
    layout.require_complete()?;

    let manifest = StackManifest::load(&layout.manifest_path())?;
    println!(
        "  {} マニフェスト: {} ({} サービス)",
        "✓".green(),
        layout.manifest_path().display().to_string().cyan(),
        manifest.services.len()
    );

    Ok(Preflight {
        env,
        layout,
        manifest,
    })
}

/// 認証情報を含むテンプレートを展開して 0600 で書き出す
pub(crate) fn render_secrets(layout: &ProjectLayout, env: &EnvConfig) -> Result<(), StackError> {
    println!();
    println!("{}", "🔐 認証情報を展開中...".blue());

    for template in SECRET_TEMPLATES {
        let src = layout.root().join(template);
        let dest = layout.root().join(secret_output_path(template));
        render_secret_file(&src, &dest, env)?;
        println!("  {} {}", "✓".green(), secret_output_path(template));
    }

    Ok(())
}

/// バッキングサービス（データベース・キャッシュ）を起動
pub(crate) async fn start_backing_services(
    platform: &impl ContainerPlatform,
    options: UpOptions,
) -> Result<(), StackError> {
    let services: Vec<String> = BACKING_SERVICES.iter().map(|s| s.to_string()).collect();

    println!();
    println!(
        "{}",
        format!("▶ {} を起動中...", services.join(", ")).green().bold()
    );
    platform.up(&services, options).await?;
    println!("  {} 起動要求完了", "✓".green());

    Ok(())
}

/// データベースが設定された認証情報で接続できるまで待機
pub(crate) async fn wait_for_database(
    platform: &impl ContainerPlatform,
    env: &EnvConfig,
    invocation: &Invocation,
) -> Result<(), StackError> {
    let probe = invocation.probe();
    let check = DatabaseHealthCheck::new(
        platform,
        DB_SERVICE,
        env.get_or_default("DB_USER"),
        env.get_or_default("DB_PASSWORD"),
        env.get_or_default("DB_NAME"),
    );

    println!();
    println!("{}", "⏳ データベースの準備完了を待機中...".blue());

    let max_attempts = probe.max_attempts.max(1);
    let attempts = probe
        .wait_until_ready_with(&check, |attempt, reason| {
            println!(
                "  … 待機中 ({}/{}): {}",
                attempt,
                max_attempts,
                reason.lines().next().unwrap_or_default().dimmed()
            );
        })
        .await?;

    println!("  {} データベース準備完了（{}回目）", "✓".green(), attempts);
    Ok(())
}

/// 依存サービスをまとめて起動
pub(crate) async fn start_services(
    platform: &impl ContainerPlatform,
    services: &[String],
    options: UpOptions,
) -> Result<(), StackError> {
    println!();
    println!("{}", "サービス一覧:".bold());
    for service in services {
        println!("  • {}", service.cyan());
    }

    println!();
    println!("{}", "▶ サービスを起動中...".green().bold());
    platform.up(services, options).await?;
    println!("  {} 起動要求完了", "✓".green());

    Ok(())
}
