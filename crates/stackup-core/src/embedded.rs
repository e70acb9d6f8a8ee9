//! 埋め込みテンプレート
//!
//! ビルドレシピと設定テンプレートは `include_str!` でバイナリに埋め込まれ、
//! スキャフォールド生成時に Tera で展開されます。

/// プロジェクトに書き出すテンプレート
#[derive(Debug, Clone, Copy)]
pub struct Artifact {
    /// プロジェクトルートからの相対パス
    pub path: &'static str,
    pub content: &'static str,
    /// 実行権限を付与するか
    pub executable: bool,
}

const fn file(path: &'static str, content: &'static str) -> Artifact {
    Artifact {
        path,
        content,
        executable: false,
    }
}

const fn script(path: &'static str, content: &'static str) -> Artifact {
    Artifact {
        path,
        content,
        executable: true,
    }
}

/// 認証情報を含むテンプレート（`start` 時に展開し 0600 で書き出す）
pub const SECRET_TEMPLATES: &[&str] = &[
    "services/db/db.env.tmpl",
    "services/app/app.env.tmpl",
    "services/mail/mail.env.tmpl",
];

/// マニフェスト以外の生成物
pub const ARTIFACTS: &[Artifact] = &[
    file(".env.example", include_str!("../templates/env.example")),
    file(
        "services/db/db.env.tmpl",
        include_str!("../templates/db/db.env.tmpl"),
    ),
    file(
        "services/app/Dockerfile",
        include_str!("../templates/app/Dockerfile"),
    ),
    file(
        "services/app/app.env.tmpl",
        include_str!("../templates/app/app.env.tmpl"),
    ),
    script(
        "services/app/install.sh",
        include_str!("../templates/app/install.sh"),
    ),
    script(
        "services/app/install-deps.sh",
        include_str!("../templates/app/install-deps.sh"),
    ),
    file(
        "services/proxy/Dockerfile",
        include_str!("../templates/proxy/Dockerfile"),
    ),
    file(
        "services/proxy/nginx.conf",
        include_str!("../templates/proxy/nginx.conf"),
    ),
    file(
        "services/mail/Dockerfile",
        include_str!("../templates/mail/Dockerfile"),
    ),
    script(
        "services/mail/entrypoint.sh",
        include_str!("../templates/mail/entrypoint.sh"),
    ),
    file(
        "services/mail/main.cf",
        include_str!("../templates/mail/main.cf"),
    ),
    file(
        "services/mail/mail.env.tmpl",
        include_str!("../templates/mail/mail.env.tmpl"),
    ),
];

/// `.tmpl` を除いた展開先のパス
pub fn secret_output_path(template: &str) -> &str {
    template.strip_suffix(".tmpl").unwrap_or(template)
}
