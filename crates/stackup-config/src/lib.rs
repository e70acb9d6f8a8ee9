pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "STACKUP_CONFIG_PATH";
pub const PROBE_INTERVAL_ENV: &str = "STACKUP_PROBE_INTERVAL";
pub const PROBE_ATTEMPTS_ENV: &str = "STACKUP_PROBE_ATTEMPTS";

/// 運用者向けの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub probe: ProbeSettings,
    /// docker CLI のパス
    pub docker_bin: String,
    /// マニフェストのファイル名
    pub compose_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            probe: ProbeSettings::default(),
            docker_bin: "docker".to_string(),
            compose_file: "docker-compose.yml".to_string(),
        }
    }
}

/// データベースの readiness probe 設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            interval_secs: 3,
            max_attempts: 10,
        }
    }
}

impl ProbeSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Settings {
    /// YAML ファイルから読み込む
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 環境変数による上書きを適用
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Some(value) = env_override::<u64>(PROBE_INTERVAL_ENV)? {
            self.probe.interval_secs = value;
        }
        if let Some(value) = env_override::<u32>(PROBE_ATTEMPTS_ENV)? {
            self.probe.max_attempts = value;
        }
        Ok(self)
    }
}

fn env_override<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidOverride {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// stackup の設定ディレクトリ（~/.config/stackup）
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stackup"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 STACKUP_CONFIG_PATH (直接パス指定、存在しなければエラー)
/// 2. ~/.config/stackup/config.yaml
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(ConfigError::SettingsFileNotFound(path));
    }

    Ok(get_config_dir()
        .map(|dir| dir.join("config.yaml"))
        .filter(|path| path.is_file()))
}

/// 設定を読み込む（ファイルがなければデフォルト値）
pub fn load_settings() -> Result<Settings> {
    let settings = match find_settings_file()? {
        Some(path) => {
            debug!(path = %path.display(), "Loading settings file");
            Settings::from_file(&path)?
        }
        None => Settings::default(),
    };
    settings.apply_env_overrides()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    const NO_OVERRIDES: [(&str, Option<&str>); 3] = [
        (CONFIG_PATH_ENV, None),
        (PROBE_INTERVAL_ENV, None),
        (PROBE_ATTEMPTS_ENV, None),
    ];

    #[test]
    #[serial]
    fn test_defaults_without_settings_file() {
        let temp_dir = tempfile::tempdir().unwrap();

        temp_env::with_vars(NO_OVERRIDES, || {
            temp_env::with_var("XDG_CONFIG_HOME", Some(temp_dir.path()), || {
                let settings = load_settings().unwrap();
                assert_eq!(settings, Settings::default());
                assert_eq!(settings.probe.interval(), Duration::from_secs(3));
            });
        });
    }

    #[test]
    #[serial]
    fn test_settings_file_in_config_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_dir = temp_dir.path().join("stackup");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("config.yaml"),
            "probe:\n  max_attempts: 4\ndocker_bin: /usr/local/bin/docker\n",
        )
        .unwrap();

        temp_env::with_vars(NO_OVERRIDES, || {
            temp_env::with_var("XDG_CONFIG_HOME", Some(temp_dir.path()), || {
                let settings = load_settings().unwrap();
                assert_eq!(settings.probe.max_attempts, 4);
                // 未指定の項目はデフォルト値
                assert_eq!(settings.probe.interval_secs, 3);
                assert_eq!(settings.docker_bin, "/usr/local/bin/docker");
                assert_eq!(settings.compose_file, "docker-compose.yml");
            });
        });
    }

    #[test]
    #[serial]
    fn test_config_path_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "compose_file: stack.yml\n").unwrap();

        temp_env::with_vars(NO_OVERRIDES, || {
            temp_env::with_var(CONFIG_PATH_ENV, Some(&config_path), || {
                assert_eq!(find_settings_file().unwrap(), Some(config_path.clone()));
                assert_eq!(load_settings().unwrap().compose_file, "stack.yml");
            });
        });
    }

    #[test]
    #[serial]
    fn test_config_path_env_var_missing_file() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/nonexistent/stackup.yaml"), || {
            assert!(matches!(
                find_settings_file(),
                Err(ConfigError::SettingsFileNotFound(_))
            ));
        });
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let temp_dir = tempfile::tempdir().unwrap();

        temp_env::with_vars(NO_OVERRIDES, || {
            temp_env::with_vars(
                [
                    ("XDG_CONFIG_HOME", Some(temp_dir.path().to_str().unwrap())),
                    (PROBE_INTERVAL_ENV, Some("0")),
                    (PROBE_ATTEMPTS_ENV, Some("2")),
                ],
                || {
                    let settings = load_settings().unwrap();
                    assert_eq!(settings.probe.interval_secs, 0);
                    assert_eq!(settings.probe.max_attempts, 2);
                },
            );
        });
    }

    #[test]
    #[serial]
    fn test_invalid_env_override() {
        temp_env::with_vars(
            [(CONFIG_PATH_ENV, None), (PROBE_ATTEMPTS_ENV, Some("many"))],
            || {
                assert!(matches!(
                    Settings::default().apply_env_overrides(),
                    Err(ConfigError::InvalidOverride { .. })
                ));
            },
        );
    }
}
