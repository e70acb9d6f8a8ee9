//! スキャフォールド生成
//!
//! プロジェクト構成（マニフェスト、ビルドレシピ、設定テンプレート）を
//! 固定テンプレートから決定的に生成します。既存の構成がある場合は確認を取り、
//! 拒否されたときはファイルシステムに一切触れません。

use crate::embedded::ARTIFACTS;
use crate::error::{Result, StackError};
use crate::layout::{ENV_FILE, ProjectLayout};
use crate::prompt::Confirm;
use crate::template::{ScaffoldVars, render_structural};
use crate::topology;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 生成結果
#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    /// 書き出したファイル（プロジェクトルートからの相対パス）
    pub files: Vec<String>,
    /// 既存の構成を置き換えたか
    pub replaced: bool,
}

/// メモリ上で展開済みのファイル
struct RenderedFile {
    path: String,
    content: String,
    executable: bool,
}

pub struct Scaffolder<'a> {
    layout: &'a ProjectLayout,
    vars: &'a ScaffoldVars,
}

impl<'a> Scaffolder<'a> {
    pub fn new(layout: &'a ProjectLayout, vars: &'a ScaffoldVars) -> Self {
        Self { layout, vars }
    }

    /// プロジェクト構成を生成
    ///
    /// 既存の構成があり `force_confirm` が `false` の場合は `confirm` で確認し、
    /// 拒否されると `AbortedByUser` を返します。
    #[tracing::instrument(skip(self, confirm), fields(root = %self.layout.root().display()))]
    pub fn generate(&self, force_confirm: bool, confirm: &mut impl Confirm) -> Result<ScaffoldReport> {
        self.layout.validate()?;
        let replaced = self.layout.exists();

        if replaced && !force_confirm {
            let question = format!(
                "既存のプロジェクト構成 ({}) を削除して再生成しますか？",
                self.layout.root().display()
            );
            if !confirm.confirm(&question)? {
                info!("Scaffold declined by user");
                return Err(StackError::AbortedByUser);
            }
        }

        // 削除前にすべて展開しておく（失敗時に中途半端な状態を残さない）
        let rendered = self.render_all()?;

        if replaced {
            self.remove_existing()?;
        }

        self.write_all(&rendered)?;

        info!(file_count = rendered.len(), replaced, "Scaffold generated");

        Ok(ScaffoldReport {
            files: rendered.into_iter().map(|f| f.path).collect(),
            replaced,
        })
    }

    fn render_all(&self) -> Result<Vec<RenderedFile>> {
        let manifest = topology::stack_manifest(self.vars);
        manifest.validate()?;

        let mut files = vec![RenderedFile {
            path: self.layout.manifest_file().to_string(),
            content: manifest.to_yaml()?,
            executable: false,
        }];

        for artifact in ARTIFACTS {
            files.push(RenderedFile {
                path: artifact.path.to_string(),
                content: render_structural(artifact.path, artifact.content, self.vars)?,
                executable: artifact.executable,
            });
        }

        Ok(files)
    }

    /// 生成物の最上位パス（`.env` など利用者のファイルは含まない）
    fn managed_roots(&self) -> BTreeSet<PathBuf> {
        let mut roots: BTreeSet<PathBuf> = self.layout.top_level_paths().into_iter().collect();
        for artifact in ARTIFACTS {
            if let Some(first) = Path::new(artifact.path).components().next() {
                roots.insert(self.layout.root().join(first));
            }
        }
        roots
    }

    fn remove_existing(&self) -> Result<()> {
        let roots = self.managed_roots();
        // 1つでも範囲外なら何も削除しない
        let env_file = self.layout.root().join(ENV_FILE);
        if let Some(outside) = roots
            .iter()
            .find(|path| !self.layout.contains(path) || **path == env_file)
        {
            return Err(StackError::OutsideProjectRoot(outside.clone()));
        }

        for path in roots {
            let Ok(metadata) = std::fs::symlink_metadata(&path) else {
                continue;
            };

            debug!(path = %path.display(), "Removing previous artifact");
            let removed = if metadata.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            removed.map_err(|e| StackError::io(&path, e))?;
        }
        Ok(())
    }

    fn write_all(&self, files: &[RenderedFile]) -> Result<()> {
        let root = self.layout.root();
        std::fs::create_dir_all(root).map_err(|e| StackError::io(root, e))?;

        let web_root = self.layout.web_root();
        std::fs::create_dir_all(&web_root).map_err(|e| StackError::io(&web_root, e))?;

        for file in files {
            let path = root.join(&file.path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| StackError::io(parent, e))?;
            }
            std::fs::write(&path, &file.content).map_err(|e| StackError::io(&path, e))?;
            if file.executable {
                make_executable(&path)?;
            }
            debug!(path = %path.display(), "Wrote artifact");
        }

        Ok(())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .map_err(|e| StackError::io(path, e))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).map_err(|e| StackError::io(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
