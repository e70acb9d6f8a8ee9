use crate::Invocation;
use crate::connector::PlatformConnector;
use colored::Colorize;
use stackup_container::{ContainerPlatform, UpOptions};
use stackup_core::topology::{self, APP_SERVICE, INSTALL_COMMAND, INSTALL_DEPS_COMMAND};
use stackup_core::{ProjectLayout, StackError};

pub async fn handle<C: PlatformConnector>(
    invocation: &Invocation,
    connector: &C,
) -> anyhow::Result<()> {
    println!("{}", "スタックを起動中...".green().bold());

    let preflight = super::preflight(invocation)?;
    super::render_secrets(&preflight.layout, &preflight.env)?;

    let platform = connector
        .connect(&preflight.layout, &preflight.manifest)
        .await?;

    super::start_backing_services(&platform, UpOptions::detached()).await?;
    super::wait_for_database(&platform, &preflight.env, invocation).await?;

    install_if_needed(&platform, &preflight.layout).await?;

    let dependents = topology::dependent_services(&preflight.manifest)?;
    super::start_services(&platform, &dependents, UpOptions::detached().with_build()).await?;

    println!();
    println!("{}", "✓ スタックを起動しました".green().bold());
    println!(
        "  ブラウザで http://localhost:{}/ を開いてください",
        preflight.env.get_or_default("HTTP_PORT")
    );

    Ok(())
}

/// アプリケーションが未展開なら一度だけインストールを要求
async fn install_if_needed(
    platform: &impl ContainerPlatform,
    layout: &ProjectLayout,
) -> Result<(), StackError> {
    if layout.app_entry_point_exists() {
        println!();
        println!(
            "  ℹ アプリケーションは展開済みです: {}",
            layout.entry_point().display()
        );
        return Ok(());
    }

    println!();
    println!(
        "{}",
        format!("🔨 {} をビルドしてインストール中...", APP_SERVICE)
            .green()
            .bold()
    );

    platform
        .up(
            &[APP_SERVICE.to_string()],
            UpOptions::detached().with_build(),
        )
        .await?;

    let install = vec![INSTALL_COMMAND.to_string()];
    let output = platform.exec(APP_SERVICE, &install, &[]).await?;
    if !output.success() {
        return Err(StackError::PlatformRequestFailure {
            request: format!("exec {} {}", APP_SERVICE, INSTALL_COMMAND),
            message: format!(
                "終了コード {}\n{}",
                output.exit_code,
                output.output.trim_end()
            ),
        });
    }
    println!("  {} インストール完了", "✓".green());

    install_dependencies(platform).await;

    Ok(())
}

/// 追加アプリの導入（失敗しても起動は続行）
async fn install_dependencies(platform: &impl ContainerPlatform) {
    let command = vec![INSTALL_DEPS_COMMAND.to_string()];
    let reason = match platform.exec(APP_SERVICE, &command, &[]).await {
        Ok(output) if output.success() => {
            println!("  {} 追加アプリの導入完了", "✓".green());
            return;
        }
        Ok(output) => format!("終了コード {}: {}", output.exit_code, output.output.trim_end()),
        Err(e) => e.to_string(),
    };

    tracing::warn!(reason = %reason, "Dependency installation failed");
    println!("  ⚠ 追加アプリの導入に失敗しました（起動は続行します）: {}", reason);
}
