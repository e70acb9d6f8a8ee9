//! 依存サービスの準備完了待機
//!
//! 固定間隔でヘルスチェックを繰り返し、成功するか試行回数の上限に達するまで待ちます。
//! 何をチェックしているかはこのモジュールは知りません。

use crate::error::{Result, StackError};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// 合否だけを返すヘルスチェック
#[allow(async_fn_in_trait)]
pub trait HealthCheck {
    /// チェック対象のサービス名（診断メッセージ用）
    fn target(&self) -> &str;

    /// 失敗時は理由を返す
    async fn check(&self) -> std::result::Result<(), String>;
}

/// Readiness probe の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessProbe {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl ReadinessProbe {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// 準備完了まで待機し、使った試行回数を返す
    ///
    /// `max_attempts` 回連続で失敗すると `ReadinessTimeout` を返します。
    /// 最後の失敗の後には待機しません。
    pub async fn wait_until_ready(&self, check: &impl HealthCheck) -> Result<u32> {
        self.wait_until_ready_with(check, |_, _| {}).await
    }

    /// 失敗のたびに `on_failure(attempt, reason)` を呼ぶ版
    pub async fn wait_until_ready_with(
        &self,
        check: &impl HealthCheck,
        mut on_failure: impl FnMut(u32, &str),
    ) -> Result<u32> {
        let max_attempts = self.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match check.check().await {
                Ok(()) => {
                    debug!(target_service = check.target(), attempt, "Service is ready");
                    return Ok(attempt);
                }
                Err(reason) => {
                    debug!(
                        target_service = check.target(),
                        attempt,
                        reason = %reason,
                        "Service is not ready yet"
                    );
                    on_failure(attempt, &reason);
                    last_error = reason;
                }
            }

            if attempt < max_attempts {
                sleep(self.interval).await;
            }
        }

        Err(StackError::ReadinessTimeout {
            service: check.target().to_string(),
            attempts: max_attempts,
            last_error,
        })
    }
}
