use crate::Invocation;
use crate::connector::PlatformConnector;
use colored::Colorize;
use stackup_container::{ContainerPlatform, DownOptions};
use stackup_core::{Confirm, StackError, StackManifest};

/// コンテナとボリュームを削除してプロジェクト構成を再生成
///
/// 確認を最初に取るため、拒否された場合はコンテナにもファイルにも触れません。
pub async fn handle<C: PlatformConnector>(
    invocation: &Invocation,
    connector: &C,
    confirm: &mut impl Confirm,
) -> anyhow::Result<()> {
    println!("{}", "スタックをリセット中...".red().bold());

    let vars = invocation.scaffold_vars()?;
    let layout = invocation.layout(&vars)?;

    if !invocation.assume_yes {
        println!();
        println!("  ⚠ データベースを含むすべてのボリュームと生成済みファイルが削除されます");
        let question = format!(
            "{} のスタックをリセットしますか？",
            layout.root().display()
        );
        if !confirm.confirm(&question)? {
            tracing::info!("Reset declined by user");
            return Err(StackError::AbortedByUser.into());
        }
    }

    let manifest_path = layout.manifest_path();
    if manifest_path.is_file() {
        let manifest = StackManifest::load(&manifest_path)?;
        let platform = connector.connect(&layout, &manifest).await?;

        println!();
        println!("{}", "■ コンテナとボリュームを削除中...".yellow().bold());
        platform
            .down(DownOptions { volumes: true })
            .await
            .map_err(StackError::from)?;
        println!("  {} 削除完了", "✓".green());
    } else {
        println!();
        println!("  ℹ マニフェストがないためコンテナの削除をスキップします");
    }

    // 確認は取得済み
    super::scaffold::generate(invocation, true, confirm)?;

    Ok(())
}
