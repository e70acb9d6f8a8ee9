use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error(
        "環境設定ファイルが見つかりません: {0}\nヒント: .env.example をコピーして .env を作成してください"
    )]
    MissingConfiguration(PathBuf),

    #[error(
        "必須の設定キーが未設定です: {}\nヒント: .env に上記のキーを追加してください",
        .0.join(", ")
    )]
    MissingConfigurationKeys(Vec<String>),

    #[error("設定値 {key} が不正です: \"{value}\"\n理由: {reason}")]
    InvalidConfiguration {
        key: String,
        value: String,
        reason: String,
    },

    #[error("プロジェクトルートの外側または自身は削除できません: {0}")]
    OutsideProjectRoot(PathBuf),

    #[error("ユーザーによって中断されました")]
    AbortedByUser,

    #[error(
        "サービス '{service}' の準備完了を待機中にタイムアウトしました（{attempts}回試行）\n最後のエラー: {last_error}\n\nヒント:\n  • .env のデータベース認証情報を確認してください\n  • docker compose logs {service} でログを確認してください"
    )]
    ReadinessTimeout {
        service: String,
        attempts: u32,
        last_error: String,
    },

    #[error("コンテナプラットフォームが要求を拒否しました: {request}\n{message}")]
    PlatformRequestFailure { request: String, message: String },

    #[error(
        "プロジェクトが見つかりません: {0}\nヒント: 先に stackup --first-time を実行してください"
    )]
    LayoutNotFound(PathBuf),

    #[error(
        "プロジェクト構成が不完全です（不足: {}）\nヒント: stackup --first-time で再生成してください",
        .missing.join(", ")
    )]
    InconsistentLayout { missing: Vec<String> },

    #[error("サービス '{service}' が存在しないサービス '{dependency}' に依存しています")]
    DanglingDependency { service: String, dependency: String },

    #[error("循環依存が検出されました: {0}")]
    CircularDependency(String),

    #[error("サービス名が重複しています: {0}")]
    DuplicateService(String),

    #[error("テンプレート展開エラー: {0}")]
    TemplateRenderError(String),

    #[error("マニフェストの解析に失敗しました: {0}")]
    ManifestParse(#[from] serde_yaml::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("ファイル操作エラー: {0}")]
    Io(#[from] std::io::Error),
}

impl StackError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        StackError::IoError {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
