use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// ログインも認証情報も不要なレジストリを表すホスト名
pub const LOCAL_REGISTRY: &str = "local";

/// `registries` の1エントリ
///
/// レジストリは位置で識別される。先頭はビルド時にタグ付けされるレジストリ、
/// 2番目以降はセカンダリレジストリ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// レジストリのホスト名、または `local`
    #[serde(rename = "registry")]
    pub host: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl RegistryConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: None,
            email: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_local(&self) -> bool {
        self.host == LOCAL_REGISTRY
    }
}

/// dockyard.yml の内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registries: Vec<RegistryConfig>,
    /// イメージのディレクトリ（この順にビルドされる）
    #[serde(default)]
    pub containers: Vec<String>,
}

impl Config {
    /// 致命的ではない設定の問題を列挙
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut seen = HashSet::new();
        for container in &self.containers {
            if !seen.insert(container.as_str()) {
                warnings.push(format!("container '{}' is listed more than once", container));
            }
        }

        for (index, registry) in self.registries.iter().enumerate() {
            if registry.is_local() {
                continue;
            }
            if registry.password.is_none() {
                warnings.push(format!(
                    "registry #{} ({}) has no password; docker login will likely fail",
                    index, registry.host
                ));
            }
        }

        if self.registries.is_empty() && !self.containers.is_empty() {
            warnings.push("no registries defined; images will be tagged without a prefix".to_string());
        }

        warnings
    }
}
