use crate::Invocation;
use colored::Colorize;
use stackup_core::{Confirm, ScaffoldReport, Scaffolder};

pub fn handle(invocation: &Invocation, confirm: &mut impl Confirm) -> anyhow::Result<()> {
    println!("{}", "プロジェクト構成を生成中...".green().bold());

    generate(invocation, invocation.assume_yes, confirm)?;

    println!();
    println!("{}", "次のステップ:".bold());
    println!("  1. .env.example を .env にコピーして値を設定してください");
    println!(
        "     {}",
        format!(
            "cp {} {}",
            invocation.project_dir.join(".env.example").display(),
            invocation.env_file.display()
        )
        .cyan()
    );
    println!("  2. スタックを起動してください");
    println!("     {}", "stackup --start".cyan());

    Ok(())
}

/// スキャフォールドを生成して結果を表示
pub(crate) fn generate(
    invocation: &Invocation,
    force_confirm: bool,
    confirm: &mut impl Confirm,
) -> anyhow::Result<ScaffoldReport> {
    let vars = invocation.scaffold_vars()?;
    let layout = invocation.layout(&vars)?;

    let report = Scaffolder::new(&layout, &vars).generate(force_confirm, confirm)?;

    println!();
    if report.replaced {
        println!("  ℹ 既存のプロジェクト構成を置き換えました");
    }
    for file in &report.files {
        println!("  {} {}", "✓".green(), file);
    }
    println!(
        "  {} {}/ (共有ボリューム)",
        "✓".green(),
        vars.web_root
    );

    Ok(report)
}
