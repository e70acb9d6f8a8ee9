use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ファイルが見つかりません: {0}\nヒント: STACKUP_CONFIG_PATH のパスを確認してください")]
    SettingsFileNotFound(PathBuf),

    #[error("設定ファイルの解析に失敗しました: {path}\n理由: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("環境変数 {key} の値が不正です: {value}")]
    InvalidOverride { key: String, value: String },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
