//! プロジェクト構成（ディスク上の生成物）の検出

use crate::embedded::ARTIFACTS;
use crate::error::{Result, StackError};
use crate::template::ScaffoldVars;
use std::path::{Component, Path, PathBuf};

/// マニフェストのデフォルトファイル名
pub const DEFAULT_MANIFEST_FILE: &str = "docker-compose.yml";
/// サービスごとのビルドレシピを置くディレクトリ
pub const SERVICES_DIR: &str = "services";
/// アプリケーションのエントリーポイント（web root からの相対パス）
pub const ENTRY_POINT: &str = "index.php";
/// インストーラーが書き込む完了マーカー（web root からの相対パス）
pub const INSTALL_MARKER: &str = ".stackup-installed";
/// 利用者が管理する環境設定ファイル（生成・削除の対象外）
pub const ENV_FILE: &str = ".env";

/// プロジェクト構成の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutState {
    /// 生成物が1つもない
    Absent,
    /// すべて揃っている
    Complete,
    /// 一部だけ存在する（不足しているパス）
    Partial(Vec<String>),
}

/// プロジェクトルートと生成物のパス
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    manifest_file: String,
    web_root: String,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>, vars: &ScaffoldVars) -> Self {
        Self {
            root: root.into(),
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            web_root: vars.web_root.clone(),
        }
    }

    pub fn with_manifest_file(mut self, name: impl Into<String>) -> Self {
        self.manifest_file = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest_file)
    }

    pub fn services_dir(&self) -> PathBuf {
        self.root.join(SERVICES_DIR)
    }

    pub fn web_root(&self) -> PathBuf {
        self.root.join(&self.web_root)
    }

    pub fn entry_point(&self) -> PathBuf {
        self.web_root().join(ENTRY_POINT)
    }

    pub fn install_marker(&self) -> PathBuf {
        self.web_root().join(INSTALL_MARKER)
    }

    /// 生成物のパスがプロジェクトルート配下に収まっているか検証
    ///
    /// web root とマニフェストはルート直下の相対パスで、
    /// 他の生成物や `.env` と重ならないこと。
    pub fn validate(&self) -> Result<()> {
        check_relative("compose_file", &self.manifest_file)?;
        if Path::new(&self.manifest_file).components().count() != 1 {
            return Err(invalid(
                "compose_file",
                &self.manifest_file,
                "プロジェクトルート直下のファイル名を指定してください",
            ));
        }
        if reserved_names(None).contains(&self.manifest_file.as_str()) {
            return Err(invalid(
                "compose_file",
                &self.manifest_file,
                "プロジェクトの他のファイルと重複します",
            ));
        }

        check_relative("WEB_ROOT", &self.web_root)?;
        let first = first_component(&self.web_root);
        if reserved_names(Some(&self.manifest_file)).contains(&first) {
            return Err(invalid(
                "WEB_ROOT",
                &self.web_root,
                &format!("{} はプロジェクトの他の生成物と重複します", first),
            ));
        }

        Ok(())
    }

    /// ルート配下（ルート自身は含まない）のパスか
    pub fn contains(&self, path: &Path) -> bool {
        match path.strip_prefix(&self.root) {
            Ok(rel) => {
                rel.components().next().is_some()
                    && rel.components().all(|c| matches!(c, Component::Normal(_)))
            }
            Err(_) => false,
        }
    }

    /// 存在を判定する最上位の生成物
    pub fn top_level_paths(&self) -> Vec<PathBuf> {
        vec![self.manifest_path(), self.services_dir(), self.web_root()]
    }

    /// 構成が揃っているかの判定に使うすべてのパス
    fn expected_paths(&self) -> Vec<(String, PathBuf)> {
        let mut paths = vec![
            (self.manifest_file.clone(), self.manifest_path()),
            (SERVICES_DIR.to_string(), self.services_dir()),
            (self.web_root.clone(), self.web_root()),
        ];
        paths.extend(
            ARTIFACTS
                .iter()
                .map(|a| (a.path.to_string(), self.root.join(a.path))),
        );
        paths
    }

    pub fn exists(&self) -> bool {
        self.top_level_paths().iter().any(|p| p.exists())
    }

    pub fn state(&self) -> LayoutState {
        if !self.exists() {
            return LayoutState::Absent;
        }

        let missing: Vec<String> = self
            .expected_paths()
            .into_iter()
            .filter(|(_, path)| !path.exists())
            .map(|(name, _)| name)
            .collect();

        if missing.is_empty() {
            LayoutState::Complete
        } else {
            LayoutState::Partial(missing)
        }
    }

    /// 構成がすべて揃っていることを要求
    pub fn require_complete(&self) -> Result<()> {
        match self.state() {
            LayoutState::Complete => Ok(()),
            LayoutState::Absent => Err(StackError::LayoutNotFound(self.root.clone())),
            LayoutState::Partial(missing) => Err(StackError::InconsistentLayout { missing }),
        }
    }

    /// アプリケーションが共有ボリュームに展開済みか
    pub fn app_entry_point_exists(&self) -> bool {
        self.entry_point().is_file()
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> StackError {
    StackError::InvalidConfiguration {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// 空・絶対パス・`.` / `..` を含むパスを拒否
fn check_relative(key: &str, value: &str) -> Result<()> {
    let path = Path::new(value);
    if value.trim().is_empty() {
        return Err(invalid(key, value, "空にはできません"));
    }
    if path.has_root() || path.is_absolute() {
        return Err(invalid(
            key,
            value,
            "プロジェクトルートからの相対パスを指定してください",
        ));
    }
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(invalid(key, value, "`.` や `..` は使えません"));
    }
    Ok(())
}

fn first_component(value: &str) -> &str {
    Path::new(value)
        .components()
        .next()
        .and_then(|c| c.as_os_str().to_str())
        .unwrap_or(value)
}

/// ルート直下で予約されている名前
fn reserved_names(manifest_file: Option<&str>) -> Vec<&str> {
    let mut names = vec![SERVICES_DIR, ENV_FILE];
    names.extend(ARTIFACTS.iter().map(|a| first_component(a.path)));
    names.extend(manifest_file);
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_layout() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path(), &ScaffoldVars::default());

        assert!(!layout.exists());
        assert_eq!(layout.state(), LayoutState::Absent);
        assert!(matches!(
            layout.require_complete(),
            Err(StackError::LayoutNotFound(_))
        ));
    }

    #[test]
    fn test_partial_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_MANIFEST_FILE), "name: x\n").unwrap();
        let layout = ProjectLayout::new(dir.path(), &ScaffoldVars::default());

        match layout.state() {
            LayoutState::Partial(missing) => {
                assert!(missing.contains(&"services".to_string()));
                assert!(missing.contains(&"webroot".to_string()));
                assert!(!missing.contains(&DEFAULT_MANIFEST_FILE.to_string()));
            }
            other => panic!("unexpected state: {:?}", other),
        }
        assert!(matches!(
            layout.require_complete(),
            Err(StackError::InconsistentLayout { .. })
        ));
    }

    fn layout_with_web_root(root: &Path, web_root: &str) -> ProjectLayout {
        let vars = ScaffoldVars {
            web_root: web_root.to_string(),
            ..ScaffoldVars::default()
        };
        ProjectLayout::new(root, &vars)
    }

    #[test]
    fn test_validate_accepts_default_and_nested_web_root() {
        let dir = tempfile::tempdir().unwrap();

        assert!(layout_with_web_root(dir.path(), "webroot").validate().is_ok());
        assert!(layout_with_web_root(dir.path(), "public/html").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unsafe_web_root() {
        let dir = tempfile::tempdir().unwrap();

        for web_root in [
            "",
            " ",
            ".",
            "..",
            "../outside",
            "public/../..",
            "./webroot",
            "/var/www",
            "services",
            "services/www",
            DEFAULT_MANIFEST_FILE,
            ".env",
            ".env.example",
        ] {
            let result = layout_with_web_root(dir.path(), web_root).validate();
            assert!(
                matches!(
                    result,
                    Err(StackError::InvalidConfiguration { ref key, .. }) if key == "WEB_ROOT"
                ),
                "WEB_ROOT={:?} should be rejected, got {:?}",
                web_root,
                result
            );
        }
    }

    #[test]
    fn test_validate_rejects_web_root_matching_custom_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let layout =
            layout_with_web_root(dir.path(), "stack.yml").with_manifest_file("stack.yml");

        assert!(matches!(
            layout.validate(),
            Err(StackError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unsafe_manifest_file() {
        let dir = tempfile::tempdir().unwrap();

        for manifest in [
            "",
            "..",
            "../compose.yml",
            "/etc/compose.yml",
            "sub/compose.yml",
            ".env",
            "services",
        ] {
            let layout = ProjectLayout::new(dir.path(), &ScaffoldVars::default())
                .with_manifest_file(manifest);
            assert!(
                matches!(
                    layout.validate(),
                    Err(StackError::InvalidConfiguration { ref key, .. }) if key == "compose_file"
                ),
                "compose_file={:?} should be rejected",
                manifest
            );
        }
    }

    #[test]
    fn test_contains_only_paths_below_root() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path(), &ScaffoldVars::default());

        assert!(layout.contains(&dir.path().join("services")));
        assert!(layout.contains(&dir.path().join("webroot/index.php")));
        assert!(!layout.contains(dir.path()));
        assert!(!layout.contains(&dir.path().join(".")));
        assert!(!layout.contains(&dir.path().join("..")));
        assert!(!layout.contains(&dir.path().join("webroot/../..")));
        assert!(!layout.contains(Path::new("/tmp")));
    }

    #[test]
    fn test_entry_point_detection() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path(), &ScaffoldVars::default());

        assert!(!layout.app_entry_point_exists());
        std::fs::create_dir_all(layout.web_root()).unwrap();
        std::fs::write(layout.entry_point(), "<?php\n").unwrap();
        assert!(layout.app_entry_point_exists());
    }
}
