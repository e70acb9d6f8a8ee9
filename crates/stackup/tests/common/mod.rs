#![allow(dead_code)]

use stackup::{Invocation, PlatformConnector};
use stackup_config::{ProbeSettings, Settings};
use stackup_container::{
    ContainerPlatform, DownOptions, ExecOutput, PlatformError, Result, UpOptions,
};
use stackup_core::topology::{DB_SERVICE, INSTALL_COMMAND, INSTALL_DEPS_COMMAND};
use stackup_core::{AssumeYes, ProjectLayout, ScaffoldVars, Scaffolder, StackManifest};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const PROBE_ATTEMPTS: u32 = 3;

pub const FULL_ENV: &str = "\
# test stack
SITE_NAME=Test Site
ADMIN_USER=admin
ADMIN_PASSWORD=admin-secret
ADMIN_EMAIL=admin@example.com
DB_NAME=site
DB_USER=site
DB_PASSWORD=db-secret
SMTP_HOST=smtp.example.com
SMTP_USER=mailer
SMTP_PASSWORD=mail-secret
";

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// 待機なしの probe 設定を使う起動入力
    pub fn invocation(&self) -> Invocation {
        Invocation::new(self.path()).with_settings(Settings {
            probe: ProbeSettings {
                interval_secs: 0,
                max_attempts: PROBE_ATTEMPTS,
            },
            ..Settings::default()
        })
    }

    pub fn write_env(&self, content: &str) {
        fs::write(self.root.path().join(".env"), content).unwrap();
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(self.path(), &ScaffoldVars::default())
    }

    pub fn scaffold(&self) {
        let layout = self.layout();
        Scaffolder::new(&layout, &ScaffoldVars::default())
            .generate(false, &mut AssumeYes)
            .unwrap();
    }

    /// アプリケーションが共有ボリュームに展開済みの状態にする
    pub fn install_app(&self) {
        fs::write(self.layout().entry_point(), "<?php\n").unwrap();
    }

    pub fn manifest(&self) -> StackManifest {
        StackManifest::load(&self.layout().manifest_path()).unwrap()
    }

    /// 全ファイルの内容（比較用）
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        collect(self.root.path(), self.root.path(), &mut files);
        files
    }
}

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.insert(path.strip_prefix(root).unwrap().to_path_buf(), Vec::new());
            collect(root, &path, files);
        } else {
            files.insert(
                path.strip_prefix(root).unwrap().to_path_buf(),
                fs::read(&path).unwrap(),
            );
        }
    }
}

/// プラットフォームへの要求の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Up {
        services: Vec<String>,
        options: UpOptions,
    },
    Exec {
        service: String,
        command: Vec<String>,
        env: Vec<String>,
    },
    Down(DownOptions),
}

/// 要求を記録し、スクリプトどおりに応答するプラットフォーム
#[derive(Debug, Clone, Default)]
pub struct FakePlatform {
    pub calls: Arc<Mutex<Vec<Call>>>,
    /// データベースのヘルスチェックが成功するまでの失敗回数
    pub db_failures: u32,
    pub install_exit: i64,
    pub deps_exit: i64,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn db_never_ready(mut self) -> Self {
        self.db_failures = u32::MAX;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ups(&self) -> Vec<(Vec<String>, UpOptions)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Up { services, options } => Some((services, options)),
                _ => None,
            })
            .collect()
    }

    pub fn execs(&self, service: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Exec {
                    service: s,
                    command,
                    ..
                } if s == service => Some(command),
                _ => None,
            })
            .collect()
    }

    /// サービスごとの exec に渡された環境変数
    pub fn exec_envs(&self, service: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Exec { service: s, env, .. } if s == service => Some(env),
                _ => None,
            })
            .collect()
    }

    pub fn exec_count(&self, service: &str, program: &str) -> usize {
        self.execs(service)
            .iter()
            .filter(|command| command.first().map(String::as_str) == Some(program))
            .count()
    }
}

impl ContainerPlatform for FakePlatform {
    async fn up(&self, services: &[String], options: UpOptions) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Up {
            services: services.to_vec(),
            options,
        });
        Ok(())
    }

    async fn exec(
        &self,
        service: &str,
        command: &[String],
        env: &[String],
    ) -> Result<ExecOutput> {
        let previous_db_checks = self.exec_count(DB_SERVICE, "mariadb") as u32;
        self.calls.lock().unwrap().push(Call::Exec {
            service: service.to_string(),
            command: command.to_vec(),
            env: env.to_vec(),
        });

        let exit_code = match command.first().map(String::as_str) {
            Some("mariadb") if previous_db_checks < self.db_failures => 1,
            Some("mariadb") => 0,
            Some(INSTALL_COMMAND) => self.install_exit,
            Some(INSTALL_DEPS_COMMAND) => self.deps_exit,
            _ => return Err(PlatformError::UnknownService(service.to_string())),
        };

        Ok(ExecOutput {
            exit_code,
            output: if exit_code == 0 {
                String::new()
            } else {
                format!("{} failed\n", command[0])
            },
        })
    }

    async fn down(&self, options: DownOptions) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Down(options));
        Ok(())
    }
}

/// 常に同じ FakePlatform を返すコネクタ
pub struct FakeConnector {
    pub platform: FakePlatform,
    pub connects: Cell<u32>,
}

impl FakeConnector {
    pub fn new(platform: FakePlatform) -> Self {
        Self {
            platform,
            connects: Cell::new(0),
        }
    }
}

impl PlatformConnector for FakeConnector {
    type Platform = FakePlatform;

    async fn connect(
        &self,
        _layout: &ProjectLayout,
        _manifest: &StackManifest,
    ) -> anyhow::Result<FakePlatform> {
        self.connects.set(self.connects.get() + 1);
        Ok(self.platform.clone())
    }
}
