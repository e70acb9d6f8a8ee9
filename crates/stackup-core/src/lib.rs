//! stackup のコア機能
//!
//! 環境設定の読み込み、テンプレート展開、スタックマニフェスト、
//! スキャフォールド生成、readiness probe を提供します。

pub mod embedded;
pub mod env;
pub mod error;
pub mod layout;
pub mod model;
pub mod probe;
pub mod prompt;
pub mod scaffold;
pub mod template;
pub mod topology;

pub use env::EnvConfig;
pub use error::*;
pub use layout::{LayoutState, ProjectLayout};
pub use model::*;
pub use probe::{HealthCheck, ReadinessProbe};
pub use prompt::{AssumeYes, Confirm, LineConfirm, StdinConfirm};
pub use scaffold::{ScaffoldReport, Scaffolder};
pub use template::{ScaffoldVars, render, render_secret_file};
