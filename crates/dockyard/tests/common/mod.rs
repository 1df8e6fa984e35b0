use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// 引数を記録するだけの docker の代用スクリプト
///
/// - `FAKE_DOCKER_LOG`: 呼び出しごとに引数を1行で追記
/// - `FAKE_DOCKER_FAIL`: 指定したサブコマンドで終了コード1
/// - `FAKE_DOCKER_SILENT`: build で "Successfully built" を出力しない
const SCRIPT: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_DOCKER_LOG"
if [ "$1" = "$FAKE_DOCKER_FAIL" ]; then
  echo "fake docker: $1 failed" 1>&2
  exit 1
fi
if [ "$1" = "build" ]; then
  echo "Step 1/1 : FROM scratch"
  echo " ---> Using cache" 1>&2
  if [ -z "$FAKE_DOCKER_SILENT" ]; then
    echo "Successfully built 4e38e38c8ce0"
  fi
fi
exit 0
"#;

pub struct FakeDocker {
    pub root: TempDir,
}

impl FakeDocker {
    pub fn new(config: &str, containers: &[&str]) -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("dockyard.yml"), config).unwrap();
        for container in containers {
            fs::create_dir_all(root.path().join(container)).unwrap();
        }

        let script = root.path().join("fake-docker.sh");
        fs::write(&script, SCRIPT).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        Self { root }
    }

    pub fn root(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn script(&self) -> PathBuf {
        self.root.path().join("fake-docker.sh")
    }

    pub fn log(&self) -> PathBuf {
        self.root.path().join("docker.log")
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.log())
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
