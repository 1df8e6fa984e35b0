use crate::error::{BuildError, Result};
use dockyard_config::RegistryConfig;
use std::ops::Range;

/// レジストリの位置からタグプレフィックスを解決
///
/// 位置 0 はビルド時に自動でタグ付けされるレジストリ、
/// 位置 1 以降は明示的な `docker tag` が必要なセカンダリレジストリ。
pub struct RegistryResolver<'a> {
    registries: &'a [RegistryConfig],
}

impl<'a> RegistryResolver<'a> {
    pub fn new(registries: &'a [RegistryConfig]) -> Self {
        Self { registries }
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }

    /// `username/` を返す。範囲外ならエラー
    pub fn try_prefix(&self, index: usize) -> Result<String> {
        self.registries
            .get(index)
            .map(|registry| format!("{}/", registry.username))
            .ok_or(BuildError::RegistryIndex {
                index,
                count: self.registries.len(),
            })
    }

    /// `try_prefix` の寛容版
    ///
    /// 範囲外の場合は診断を出して空文字列を返す。パイプラインは停止しない。
    pub fn prefix(&self, index: usize) -> String {
        match self.try_prefix(index) {
            Ok(prefix) => prefix,
            Err(e) => {
                tracing::warn!("{}", e);
                String::new()
            }
        }
    }

    /// レジストリ修飾済みのイメージ名
    pub fn qualified(&self, index: usize, image: &str) -> String {
        format!("{}{}", self.prefix(index), image)
    }

    /// 明示的なタグ付けが必要なレジストリの位置
    pub fn secondary_indices(&self) -> Range<usize> {
        1..self.registries.len().max(1)
    }
}
