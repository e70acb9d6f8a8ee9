//! モデル定義
//!
//! スタックを構成するサービス定義とマニフェストを定義します。

mod manifest;
mod service;

// Re-exports
pub use manifest::*;
pub use service::*;
