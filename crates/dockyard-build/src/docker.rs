//! docker CLI の引数組み立て
//!
//! 引数の表記（`--tag="..."` の引用符を含む）は既存の docker ラッパーと
//! 互換にするため、このまま維持すること。

use dockyard_config::RegistryConfig;
use dockyard_process::CommandLine;

pub const DEFAULT_DOCKER_BIN: &str = "docker";

#[derive(Debug, Clone)]
pub struct DockerCli {
    bin: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_BIN)
    }
}

impl DockerCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// `docker build --rm=true --no-cache=<bool> --tag="<tag>" <dir>`
    pub fn build(&self, dir: &str, tag: &str, no_cache: bool) -> CommandLine {
        CommandLine::new(&self.bin)
            .arg("build")
            .arg("--rm=true")
            .arg(format!("--no-cache={}", no_cache))
            .arg(format!("--tag=\"{}\"", tag))
            .arg(dir)
    }

    /// `docker tag -f <id> <target>`
    pub fn tag(&self, artifact_id: &str, target: &str) -> CommandLine {
        CommandLine::new(&self.bin)
            .arg("tag")
            .arg("-f")
            .arg(artifact_id)
            .arg(target)
    }

    /// `docker login --email="" --username="" --password="" <host>`
    ///
    /// 未設定の email / password は空文字列として渡す。
    pub fn login(&self, registry: &RegistryConfig) -> CommandLine {
        let email = registry.email.as_deref().unwrap_or_default();
        let password = registry.password.as_deref().unwrap_or_default();

        CommandLine::new(&self.bin)
            .arg("login")
            .arg(format!("--email=\"{}\"", email))
            .arg(format!("--username=\"{}\"", registry.username))
            .secret_arg(format!("--password=\"{}\"", password))
            .arg(&registry.host)
    }

    /// `docker push <target>`
    pub fn push(&self, target: &str) -> CommandLine {
        CommandLine::new(&self.bin).arg("push").arg(target)
    }
}
