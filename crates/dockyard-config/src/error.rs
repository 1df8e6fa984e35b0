use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error while loading the config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file not found")]
    NotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Parse { path, source } => {
                format!(
                    "設定ファイルの読み込みに失敗しました: {}\n    {}",
                    path.display(),
                    source
                )
            }
            ConfigError::NotFound => "設定ファイルが見つかりません。以下の場所を確認してください:\n\
                 - 環境変数 DOCKYARD_CONFIG\n\
                 - カレントディレクトリ: dockyard.yml, dockyard.yaml, .dockyard.yml\n\
                 - ~/.config/dockyard/dockyard.yml\n\
                 または --config で直接指定できます"
                .to_string(),
            _ => format!("{}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
