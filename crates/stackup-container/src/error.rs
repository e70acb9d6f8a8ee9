use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error(
        "Dockerに接続できません: {0}\n\nヒント:\n  • Dockerが起動しているか確認してください\n  • docker ps コマンドが正常に動作するか確認してください"
    )]
    DockerConnectionFailed(String),

    #[error(
        "docker compose が見つかりません: {0}\n\nヒント:\n  • Docker Compose v2 がインストールされているか確認してください"
    )]
    ComposeNotFound(String),

    #[error("{request} が失敗しました（終了コード {code}）\n{stderr}")]
    RequestFailed {
        request: String,
        code: i32,
        stderr: String,
    },

    #[error("サービス '{0}' はマニフェストに定義されていません")]
    UnknownService(String),

    #[error("Docker APIエラー: {0}")]
    DockerApiError(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bollard::errors::Error> for PlatformError {
    fn from(err: bollard::errors::Error) -> Self {
        let err_str = err.to_string();
        if err_str.contains("Connection refused") || err_str.contains("No such file or directory")
        {
            PlatformError::DockerConnectionFailed(err_str)
        } else {
            PlatformError::DockerApiError(err_str)
        }
    }
}

impl From<PlatformError> for stackup_core::StackError {
    fn from(err: PlatformError) -> Self {
        let request = match &err {
            PlatformError::RequestFailed { request, .. } => request.clone(),
            PlatformError::DockerConnectionFailed(_) => "Docker接続".to_string(),
            PlatformError::ComposeNotFound(_) => "docker compose".to_string(),
            PlatformError::UnknownService(service) => format!("サービス {}", service),
            PlatformError::DockerApiError(_) | PlatformError::Io(_) => "Docker API".to_string(),
        };
        stackup_core::StackError::PlatformRequestFailure {
            request,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
