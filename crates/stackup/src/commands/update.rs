use crate::Invocation;
use crate::connector::PlatformConnector;
use colored::Colorize;
use stackup_container::UpOptions;
use stackup_core::topology;

/// 最新イメージで再起動（ボリュームは保持、インストールは行わない）
pub async fn handle<C: PlatformConnector>(
    invocation: &Invocation,
    connector: &C,
) -> anyhow::Result<()> {
    println!("{}", "スタックを更新中...".green().bold());

    let preflight = super::preflight(invocation)?;
    super::render_secrets(&preflight.layout, &preflight.env)?;

    let platform = connector
        .connect(&preflight.layout, &preflight.manifest)
        .await?;

    let options = UpOptions::detached().with_pull().with_build();

    super::start_backing_services(&platform, options).await?;
    super::wait_for_database(&platform, &preflight.env, invocation).await?;

    let dependents = topology::dependent_services(&preflight.manifest)?;
    super::start_services(&platform, &dependents, options).await?;

    println!();
    println!("{}", "✓ スタックを更新しました".green().bold());
    println!("  ℹ データベースと共有ボリュームはそのまま保持されています");

    Ok(())
}
