//! `docker build` の出力からイメージIDを取り出す

use std::fmt;

/// イメージ完成時に docker が出力する行の先頭
pub const SUCCESS_MARKER: &str = "Successfully built";

/// ビルドされたイメージの識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// 空または空白のみの ID は `None`
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// ビルド出力からイメージIDを抽出
///
/// `Successfully built <id>` で始まる行の3番目のトークンを使う。
/// 該当行が複数ある場合は最後の行が優先される（マルチステージビルド）。
pub fn extract_artifact_id(stdout: &str) -> Option<ArtifactId> {
    stdout
        .lines()
        .filter(|line| line.starts_with(SUCCESS_MARKER))
        .filter_map(|line| line.split_whitespace().nth(2))
        .filter_map(ArtifactId::new)
        .last()
}
