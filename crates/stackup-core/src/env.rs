//! 環境設定ファイル（.env）の読み込み
//!
//! `KEY=VALUE` 形式のファイルを読み込み、1回の実行の間だけ使われる
//! 不変の [`EnvConfig`] を構築します。プロセスの環境変数には書き込みません。

use crate::error::{Result, StackError};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// 下流のテンプレートが必要とするキー（デフォルト値なし）
pub const REQUIRED_KEYS: &[&str] = &[
    "SITE_NAME",
    "ADMIN_USER",
    "ADMIN_PASSWORD",
    "ADMIN_EMAIL",
    "DB_NAME",
    "DB_USER",
    "DB_PASSWORD",
    "SMTP_HOST",
    "SMTP_USER",
    "SMTP_PASSWORD",
];

/// デフォルト値を持つキー
pub const DEFAULTS: &[(&str, &str)] = &[
    ("DB_HOST", "db"),
    ("REDIS_HOST", "cache"),
    ("REDIS_PORT", "6379"),
    ("SMTP_PORT", "587"),
    ("PROJECT_NAME", "stackup"),
    ("HTTP_PORT", "8080"),
    ("WEB_ROOT", "webroot"),
];

/// 環境設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    values: BTreeMap<String, String>,
}

impl EnvConfig {
    /// ファイルから読み込む。ファイルが存在しない場合は `MissingConfiguration`
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(StackError::MissingConfiguration(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| StackError::io(path, e))?;
        let config = Self::parse(&content);

        info!(
            env_file = %path.display(),
            variable_count = config.values.len(),
            "Loaded environment file"
        );

        Ok(config)
    }

    /// .env 形式の文字列をパース
    pub fn parse(content: &str) -> Self {
        let mut values = BTreeMap::new();

        for line in content.lines() {
            let line = line.trim();

            // 空行とコメント行をスキップ
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                debug!(line = %line, "Skipping line without '='");
                continue;
            };

            let key = key.trim();
            if key.is_empty() {
                continue;
            }

            values.insert(key.to_string(), strip_quotes(value.trim()).to_string());
        }

        Self { values }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 値を取得（未設定ならデフォルト値、デフォルトもなければ空文字列）
    pub fn get_or_default(&self, key: &str) -> &str {
        self.get(key)
            .or_else(|| {
                DEFAULTS
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| *v)
            })
            .unwrap_or("")
    }

    /// 指定したキーがすべて設定されているか確認
    pub fn require(&self, keys: &[&str]) -> Result<()> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|key| self.get(key).is_none_or(str::is_empty))
            .map(|key| key.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(StackError::MissingConfigurationKeys(missing))
        }
    }

    /// 必須キーの検証（サービス起動前に呼ぶ）
    pub fn validate_required(&self) -> Result<()> {
        self.require(REQUIRED_KEYS)
    }

    /// デフォルト値を適用したコピーを返す
    pub fn with_defaults(&self) -> Self {
        let mut values = self.values.clone();
        for (key, value) in DEFAULTS {
            values
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// クォートを除去（"value" や 'value' の場合）
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
