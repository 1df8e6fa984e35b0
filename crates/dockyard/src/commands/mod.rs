pub mod build;
pub mod validate;

use dockyard_build::BuildError;
use dockyard_config::ConfigError;
use std::path::{Path, PathBuf};

/// 設定ファイルを決定（明示指定 > 自動検出）
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => dockyard_config::find_config_file(),
    }
}

/// エラー行の後に表示する補足説明
///
/// 1行目の診断と同じ内容になる場合は None。
pub fn hint(err: &anyhow::Error) -> Option<String> {
    let message = if let Some(e) = err.downcast_ref::<BuildError>() {
        e.user_message()
    } else if let Some(e) = err.downcast_ref::<ConfigError>() {
        e.user_message()
    } else {
        return None;
    };

    (message != err.to_string()).then_some(message)
}
