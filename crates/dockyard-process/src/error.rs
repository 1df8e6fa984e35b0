//! プロセス実行のエラー型

use thiserror::Error;

/// 子プロセス起動後に発生する失敗
///
/// 起動そのものに失敗した場合はここではエラーにせず、
/// [`crate::ProcessResult::spawn_error`] で報告する。
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to read output of `{command}`: {source}")]
    Capture {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stream} pipe not available for `{command}`")]
    PipeUnavailable {
        command: String,
        stream: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ProcessError>;
