//! データベースのヘルスチェック
//!
//! 設定された認証情報でデータベースにログインできるかを `exec` で確認します。

use crate::platform::ContainerPlatform;
use stackup_core::HealthCheck;

/// 認証情報を使ったデータベース疎通確認
pub struct DatabaseHealthCheck<'a, P> {
    platform: &'a P,
    service: String,
    user: String,
    password: String,
    database: String,
}

impl<'a, P: ContainerPlatform> DatabaseHealthCheck<'a, P> {
    pub fn new(
        platform: &'a P,
        service: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            service: service.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// コンテナ内で実行するコマンド
    pub fn command(&self) -> Vec<String> {
        vec![
            "mariadb".to_string(),
            "--host=127.0.0.1".to_string(),
            format!("--user={}", self.user),
            "--execute=SELECT 1".to_string(),
            self.database.clone(),
        ]
    }

    /// コマンドに渡す環境変数（パスワードはコマンドラインに載せない）
    pub fn env(&self) -> Vec<String> {
        vec![format!("MYSQL_PWD={}", self.password)]
    }
}

impl<P: ContainerPlatform> HealthCheck for DatabaseHealthCheck<'_, P> {
    fn target(&self) -> &str {
        &self.service
    }

    async fn check(&self) -> Result<(), String> {
        match self
            .platform
            .exec(&self.service, &self.command(), &self.env())
            .await {
            Ok(output) if output.success() => Ok(()),
            Ok(output) => {
                let detail = output.output.trim();
                if detail.is_empty() {
                    Err(format!("終了コード {}", output.exit_code))
                } else {
                    Err(detail.to_string())
                }
            }
            // コンテナがまだ存在しない場合もリトライ対象
            Err(e) => Err(e.to_string()),
        }
    }
}
