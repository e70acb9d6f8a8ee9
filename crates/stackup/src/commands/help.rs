use crate::phase::Phase;
use colored::Colorize;

pub fn handle() {
    println!("{}", "stackup - Webアプリケーションスタックの構築と運用".bold());
    println!();
    println!("{}", "使い方:".bold());
    println!("  stackup [PHASE] [OPTIONS]");
    println!();
    println!("{}", "フェーズ:".bold());
    for phase in Phase::ALL {
        println!(
            "  {} {}",
            format!("{:<14}", phase.flag()).cyan(),
            phase.description()
        );
    }
    println!();
    println!("{}", "オプション:".bold());
    println!(
        "  {} プロジェクトのディレクトリ [env: STACKUP_PROJECT_DIR]",
        format!("{:<26}", "--project-dir <DIR>").cyan()
    );
    println!(
        "  {} 環境設定ファイル（デフォルト: <DIR>/.env） [env: STACKUP_ENV_FILE]",
        format!("{:<26}", "--env-file <FILE>").cyan()
    );
    println!("  {} 破壊的操作の確認を省略", format!("{:<26}", "-y, --yes").cyan());
    println!("  {} バージョンを表示", format!("{:<26}", "-V, --version").cyan());
}
