use crate::Invocation;
use crate::connector::PlatformConnector;
use colored::Colorize;
use stackup_container::{ContainerPlatform, DownOptions, UpOptions};

/// スタックを停止してビルドし直し、マニフェストのとおりに再起動
///
/// 再起動後の readiness probe は行いません。
pub async fn handle<C: PlatformConnector>(
    invocation: &Invocation,
    connector: &C,
) -> anyhow::Result<()> {
    println!("{}", "スタックを再起動中...".yellow().bold());

    let preflight = super::preflight(invocation)?;
    super::render_secrets(&preflight.layout, &preflight.env)?;

    let platform = connector
        .connect(&preflight.layout, &preflight.manifest)
        .await?;

    println!();
    println!("{}", "■ スタックを停止中...".yellow().bold());
    platform
        .down(DownOptions::default())
        .await
        .map_err(stackup_core::StackError::from)?;
    println!("  {} 停止完了", "✓".green());

    let services = preflight.manifest.startup_order()?;
    super::start_services(&platform, &services, UpOptions::detached().with_build()).await?;

    println!();
    println!("{}", "✓ スタックを再起動しました".green().bold());

    Ok(())
}
