//! テンプレート展開機能
//!
//! 2種類の展開を扱います。
//!
//! - 実行時展開: `${NAME}` / `$NAME` を環境設定の値で置き換える。
//!   未定義のキーは空文字列になる（シェルの変数展開と同じ挙動）。
//! - 生成時展開: Tera を使ってスキャフォールドの構造的な値
//!   （ポート、パス、プロジェクト名）を埋め込む。

use crate::env::EnvConfig;
use crate::error::{Result, StackError};
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;
use tera::{Context, Tera};
use tracing::debug;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("placeholder pattern is valid")
});

/// 変数を展開する（`${VAR}` / `$VAR` 形式）
///
/// 対応するキーがないプレースホルダーは空文字列に置き換えられます。
pub fn render(template: &str, env: &EnvConfig) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            env.get(name).unwrap_or_default().to_string()
        })
        .into_owned()
}

/// テンプレート内のプレースホルダー名を出現順に列挙（重複なし）
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
            let name = name.as_str().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// 認証情報を含むテンプレートを展開し、所有者のみ読み書き可能なファイルとして書き出す
#[tracing::instrument(skip(env))]
pub fn render_secret_file(src: &Path, dest: &Path, env: &EnvConfig) -> Result<()> {
    let template = std::fs::read_to_string(src).map_err(|e| StackError::io(src, e))?;
    let rendered = render(&template, env);

    write_owner_only(dest, rendered.as_bytes())?;

    debug!(dest = %dest.display(), "Rendered secret file");
    Ok(())
}

/// 作成時点から 0600 で書き込む。既存ファイルも書き込み前に 0600 へ絞る
#[cfg(unix)]
fn write_owner_only(path: &Path, content: &[u8]) -> Result<()> {
    use std::fs::{OpenOptions, Permissions};
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .map_err(|e| StackError::io(path, e))?;
    file.set_permissions(Permissions::from_mode(0o600))
        .map_err(|e| StackError::io(path, e))?;
    file.write_all(content).map_err(|e| StackError::io(path, e))
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, content: &[u8]) -> Result<()> {
    std::fs::write(path, content).map_err(|e| StackError::io(path, e))
}

/// スキャフォールド生成時の構造的な変数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldVars {
    pub project_name: String,
    pub http_port: String,
    pub web_root: String,
}

impl ScaffoldVars {
    pub fn from_env(env: &EnvConfig) -> Self {
        Self {
            project_name: env.get_or_default("PROJECT_NAME").to_string(),
            http_port: env.get_or_default("HTTP_PORT").to_string(),
            web_root: env.get_or_default("WEB_ROOT").to_string(),
        }
    }

    fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("project_name", &self.project_name);
        context.insert("http_port", &self.http_port);
        context.insert("web_root", &self.web_root);
        context
    }
}

impl Default for ScaffoldVars {
    fn default() -> Self {
        Self::from_env(&EnvConfig::default())
    }
}

/// Tera で生成時テンプレートを展開
///
/// `${...}` 形式の実行時プレースホルダーはそのまま残ります。
pub fn render_structural(name: &str, template: &str, vars: &ScaffoldVars) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(name, template)
        .map_err(|e| StackError::TemplateRenderError(format!("{}: {}", name, e)))?;
    tera.render(name, &vars.context())
        .map_err(|e| StackError::TemplateRenderError(format!("{}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_braced_and_bare() {
        let env = EnvConfig::from_pairs([("DB_USER", "app"), ("DB_NAME", "site")]);

        assert_eq!(
            render("user=${DB_USER} db=$DB_NAME", &env),
            "user=app db=site"
        );
    }

    #[test]
    fn test_render_missing_key_becomes_empty() {
        let env = EnvConfig::from_pairs([("A", "alpha")]);

        assert_eq!(render("${A}:${B}", &env), "alpha:");
        assert_eq!(render("[$B]", &env), "[]");
    }

    #[test]
    fn test_render_leaves_non_placeholders() {
        let env = EnvConfig::default();

        assert_eq!(render("price $5 and $ alone", &env), "price $5 and $ alone");
        assert_eq!(render("no variables here", &env), "no variables here");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("${SMTP_HOST}:$SMTP_PORT ${SMTP_HOST}"),
            vec!["SMTP_HOST", "SMTP_PORT"]
        );
    }

    #[test]
    fn test_render_secret_file_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("db.env.tmpl");
        let dest = dir.path().join("db.env");
        std::fs::write(&src, "MARIADB_PASSWORD=${DB_PASSWORD}\n").unwrap();

        let env = EnvConfig::from_pairs([("DB_PASSWORD", "hunter2")]);
        render_secret_file(&src, &dest, &env).unwrap();

        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            "MARIADB_PASSWORD=hunter2\n"
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    /// 既存の 0644 ファイルも 0600 に絞ってから上書きする
    #[cfg(unix)]
    #[test]
    fn test_render_secret_file_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("db.env.tmpl");
        let dest = dir.path().join("db.env");
        std::fs::write(&src, "MARIADB_PASSWORD=${DB_PASSWORD}\n").unwrap();
        std::fs::write(&dest, "MARIADB_PASSWORD=old-and-much-longer\n").unwrap();
        std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o644)).unwrap();

        let env = EnvConfig::from_pairs([("DB_PASSWORD", "hunter2")]);
        render_secret_file(&src, &dest, &env).unwrap();

        let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            "MARIADB_PASSWORD=hunter2\n"
        );
    }

    #[test]
    fn test_render_structural_keeps_runtime_placeholders() {
        let vars = ScaffoldVars {
            project_name: "blog".to_string(),
            http_port: "9000".to_string(),
            web_root: "htdocs".to_string(),
        };

        let rendered = render_structural(
            "test",
            "listen {{ http_port }}; root /{{ web_root }}; user ${DB_USER}",
            &vars,
        )
        .unwrap();

        assert_eq!(rendered, "listen 9000; root /htdocs; user ${DB_USER}");
    }
}
