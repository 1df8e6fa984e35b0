use dockyard_process::ProcessError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// ビルドツールの呼び出し種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Build,
    Tag,
    Login,
    Push,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Build => "docker build",
            Step::Tag => "docker tag",
            Step::Login => "docker login",
            Step::Push => "docker push",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Missing folder {0}")]
    MissingImageDir(PathBuf),

    #[error("Failed to start {step} for {image}: {message}")]
    Spawn {
        step: Step,
        image: String,
        message: String,
    },

    #[error("{step} failed for {image} ({target}), exit code {exit_code}")]
    StepFailed {
        step: Step,
        image: String,
        target: String,
        exit_code: i32,
    },

    #[error("No image id found in docker build output for {image}")]
    ArtifactIdNotFound { image: String },

    #[error("Invalid registry index ({index}) - only {count} registries defined")]
    RegistryIndex { index: usize, count: usize },

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::MissingImageDir(path) => {
                format!(
                    "イメージディレクトリが見つかりません: {}\n\
                     \n\
                     設定ファイルの containers を確認してください。",
                    path.display()
                )
            }
            BuildError::Spawn { step, message, .. } => {
                format!(
                    "{} を起動できませんでした: {}\n\
                     \n\
                     docker がインストールされているか、--docker の指定を確認してください。",
                    step, message
                )
            }
            BuildError::ArtifactIdNotFound { image } => {
                format!(
                    "{} のビルドは終了コード 0 でしたが、イメージIDを取得できませんでした。\n\
                     \n\
                     docker build の出力に \"Successfully built <id>\" が含まれている必要があります。",
                    image
                )
            }
            BuildError::StepFailed {
                step: Step::Login,
                target,
                ..
            } => {
                format!(
                    "レジストリ {} へのログインに失敗しました。\n\
                     \n\
                     設定ファイルの username / password / email を確認してください。",
                    target
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failed_message_is_single_line() {
        let err = BuildError::StepFailed {
            step: Step::Push,
            image: "web".to_string(),
            target: "bobcorp/web".to_string(),
            exit_code: 1,
        };
        let message = err.to_string();
        assert_eq!(message, "docker push failed for web (bobcorp/web), exit code 1");
        assert!(!message.contains('\n'));
    }

    #[test]
    fn test_registry_index_message() {
        let err = BuildError::RegistryIndex { index: 5, count: 3 };
        assert_eq!(
            err.to_string(),
            "Invalid registry index (5) - only 3 registries defined"
        );
    }

    #[test]
    fn test_login_user_message_names_registry() {
        let err = BuildError::StepFailed {
            step: Step::Login,
            image: "web".to_string(),
            target: "hub.example.com".to_string(),
            exit_code: 1,
        };
        assert!(err.user_message().contains("hub.example.com"));
    }
}
