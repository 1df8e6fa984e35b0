pub mod error;
pub mod model;

pub use error::*;
pub use model::*;

use std::path::{Path, PathBuf};

/// 設定ファイルパスを直接指定する環境変数
pub const CONFIG_ENV: &str = "DOCKYARD_CONFIG";

const CANDIDATES: [&str; 3] = ["dockyard.yml", "dockyard.yaml", ".dockyard.yml"];

/// YAML文字列から設定をパース
pub fn parse_config(content: &str, path: &Path) -> Result<Config> {
    // 空ファイルは registries / containers なしとして扱う
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 設定ファイルを読み込み
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = parse_config(&content, path)?;
    tracing::debug!(
        "Loaded {} registries and {} containers from {}",
        config.registries.len(),
        config.containers.len(),
        path.display()
    );
    Ok(config)
}

/// dockyard の設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 DOCKYARD_CONFIG (直接パス指定)
/// 2. カレントディレクトリ: dockyard.yml, dockyard.yaml, .dockyard.yml
/// 3. ~/.config/dockyard/dockyard.yml (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::debug!("{} points to a missing file: {}", CONFIG_ENV, path.display());
    }

    // 2. カレントディレクトリで検索
    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("dockyard").join("dockyard.yml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    const SAMPLE: &str = r#"
registries:
  - registry: local
    username: alice
  - registry: hub.example.com
    username: bobcorp
    password: s3cret
    email: ops@bobcorp.example
containers:
  - web
  - worker
"#;

    #[test]
    fn test_parse_config() {
        let config = parse_config(SAMPLE, Path::new("dockyard.yml")).unwrap();

        assert_eq!(config.registries.len(), 2);
        assert_eq!(config.registries[0], RegistryConfig::new("local", "alice"));
        assert_eq!(config.registries[1].host, "hub.example.com");
        assert_eq!(config.registries[1].password.as_deref(), Some("s3cret"));
        assert_eq!(
            config.registries[1].email.as_deref(),
            Some("ops@bobcorp.example")
        );
        assert_eq!(config.containers, vec!["web", "worker"]);
    }

    #[test]
    fn test_parse_missing_sections_default_to_empty() {
        let config = parse_config("containers: [api]\n", Path::new("x.yml")).unwrap();
        assert!(config.registries.is_empty());
        assert_eq!(config.containers, vec!["api"]);

        let config = parse_config("", Path::new("x.yml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let err = parse_config("registries: [\n  - {", Path::new("broken.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.yml"));
        assert!(err.user_message().contains("broken.yml"));
    }

    #[test]
    fn test_parse_registry_without_username() {
        let err = parse_config("registries:\n  - registry: local\n", Path::new("x.yml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = load_config(&temp_dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("dockyard.yml");
        fs::write(&path, SAMPLE).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.containers.len(), 2);
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("dockyard.yaml"), "containers: []").unwrap();
        fs::write(temp_dir.path().join(".dockyard.yml"), "containers: []").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = temp_env::with_var_unset(CONFIG_ENV, find_config_file);
        std::env::set_current_dir(original_dir).unwrap();

        // dockyard.yaml が .dockyard.yml より優先される
        assert!(result.unwrap().ends_with("dockyard.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yml");
        fs::write(&config_path, "containers: []").unwrap();

        let result = temp_env::with_var(CONFIG_ENV, Some(config_path.as_os_str()), || {
            find_config_file()
        });
        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    #[serial]
    fn test_find_config_file_ignores_missing_env_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("dockyard.yml"), "containers: []").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = temp_env::with_var(CONFIG_ENV, Some("/nonexistent/dockyard.yml"), || {
            find_config_file()
        });
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("dockyard.yml"));
    }
}
