//! 外部コマンドの実行

use crate::command::CommandLine;
use crate::error::{ProcessError, Result};
use crate::mux::{MultiplexerOptions, StreamMultiplexer};
use crate::sink::{ConsoleSink, EchoSink};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// 外部コマンド1回分の実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout_lines: Vec<String>,
    pub stderr_lines: Vec<String>,
    /// 起動できなかった場合のみ設定される
    pub spawn_error: Option<String>,
}

impl ProcessResult {
    /// 実行され `exit_code` で終了したプロセスの結果
    pub fn exited(exit_code: i32, stdout_lines: Vec<String>, stderr_lines: Vec<String>) -> Self {
        Self {
            exit_code,
            stdout_lines,
            stderr_lines,
            spawn_error: None,
        }
    }

    /// 起動できなかったプロセスの結果
    ///
    /// 終了コード 1、stderr には OS のエラーメッセージ1行のみ。
    pub fn spawn_failed(error: impl ToString) -> Self {
        let message = error.to_string();
        Self {
            exit_code: 1,
            stdout_lines: Vec::new(),
            stderr_lines: vec![message.clone()],
            spawn_error: Some(message),
        }
    }

    pub fn success(&self) -> bool {
        self.spawn_error.is_none() && self.exit_code == 0
    }

    pub fn stdout(&self) -> String {
        self.stdout_lines.join("\n")
    }

    pub fn stderr(&self) -> String {
        self.stderr_lines.join("\n")
    }
}

/// パイプラインから外部コマンドを実行するためのトレイト
#[async_trait]
pub trait CommandRunner: Send {
    async fn run(&mut self, command: &CommandLine) -> Result<ProcessResult>;
}

/// 実プロセスを起動し、出力を sink へ流す
pub struct ProcessRunner<S = ConsoleSink> {
    multiplexer: StreamMultiplexer,
    sink: S,
}

impl ProcessRunner<ConsoleSink> {
    pub fn new() -> Self {
        Self::with_sink(ConsoleSink)
    }
}

impl Default for ProcessRunner<ConsoleSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EchoSink> ProcessRunner<S> {
    pub fn with_sink(sink: S) -> Self {
        Self {
            multiplexer: StreamMultiplexer::new(),
            sink,
        }
    }

    pub fn with_options(mut self, options: MultiplexerOptions) -> Self {
        self.multiplexer = StreamMultiplexer::with_options(options);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// `command` を終了まで実行
    ///
    /// 0 以外の終了コードも通常の結果として返す。起動できない場合は
    /// [`ProcessResult::spawn_failed`] で報告し、起動後の I/O 失敗のみエラーとする。
    /// 途中で打ち切られた場合（エラーや Future の破棄）子プロセスは kill される。
    pub async fn execute(&mut self, command: &CommandLine) -> Result<ProcessResult> {
        let rendered = command.to_string();
        tracing::debug!("Running: {}", rendered);

        let mut cmd = Command::new(command.program());
        cmd.args(command.get_args());
        if let Some(dir) = command.get_current_dir() {
            cmd.current_dir(dir);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!("Failed to start {}: {}", command.program(), e);
                return Ok(ProcessResult::spawn_failed(e));
            }
        };

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProcessError::PipeUnavailable {
                command: rendered.clone(),
                stream: "stdout",
            })?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProcessError::PipeUnavailable {
                command: rendered.clone(),
                stream: "stderr",
            })?;

        let captured = self
            .multiplexer
            .capture(stdout, stderr, &mut self.sink)
            .await
            .map_err(|source| ProcessError::Capture {
                command: rendered.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| ProcessError::Wait {
            command: rendered.clone(),
            source,
        })?;

        let exit_code = exit_code(status);
        tracing::debug!("{} exited with {}", command.program(), exit_code);

        Ok(ProcessResult::exited(
            exit_code,
            captured.stdout_lines,
            captured.stderr_lines,
        ))
    }
}

#[async_trait]
impl<S: EchoSink> CommandRunner for ProcessRunner<S> {
    async fn run(&mut self, command: &CommandLine) -> Result<ProcessResult> {
        self.execute(command).await
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| -signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, NullSink};
    use std::time::Duration;

    fn sh(script: &str) -> CommandLine {
        CommandLine::new("sh").arg("-c").arg(script)
    }

    #[tokio::test]
    async fn test_run_captures_both_streams() {
        let mut runner = ProcessRunner::with_sink(MemorySink::new());
        let result = runner
            .run(&sh("echo one; echo two 1>&2; echo three"))
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout_lines, vec!["one", "three"]);
        assert_eq!(result.stderr_lines, vec!["two"]);
        assert_eq!(result.stdout(), "one\nthree");
        assert_eq!(runner.sink().stdout_lines(), vec!["one", "three"]);
        assert_eq!(runner.sink().stderr_lines(), vec!["two"]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_an_error() {
        let mut runner = ProcessRunner::with_sink(NullSink);
        let result = runner.run(&sh("echo failing 1>&2; exit 3")).await.unwrap();

        assert!(!result.success());
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.spawn_error, None);
        assert_eq!(result.stderr(), "failing");
    }

    #[tokio::test]
    async fn test_spawn_failure_reported_in_result() {
        let mut runner = ProcessRunner::with_sink(NullSink);
        let result = runner
            .run(&CommandLine::from("dockyard-definitely-not-installed"))
            .await
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(result.stdout_lines.is_empty());
        assert!(result.spawn_error.is_some());
        assert_eq!(result.stderr_lines.len(), 1);
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_signal_exit_is_negative() {
        let mut runner = ProcessRunner::with_sink(NullSink);
        let result = runner.run(&sh("kill -9 $$")).await.unwrap();
        assert_eq!(result.exit_code, -9);
    }

    #[tokio::test]
    async fn test_large_interleaved_output_does_not_deadlock() {
        let script = "i=0; while [ $i -lt 3000 ]; do \
                      echo \"stdout line $i\"; echo \"stderr line $i\" 1>&2; \
                      i=$((i+1)); done";
        let mut runner = ProcessRunner::with_sink(NullSink);
        let result = runner.run(&sh(script)).await.unwrap();

        assert!(result.success());
        assert_eq!(result.stdout_lines.len(), 3000);
        assert_eq!(result.stderr_lines.len(), 3000);
        assert_eq!(result.stdout_lines[2999], "stdout line 2999");
        assert_eq!(result.stderr_lines[0], "stderr line 0");
    }

    #[tokio::test]
    async fn test_runs_in_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here\n").unwrap();

        let mut runner = ProcessRunner::with_sink(NullSink);
        let result = runner
            .run(&CommandLine::new("cat").arg("marker.txt").current_dir(dir.path()))
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout_lines, vec!["here"]);
    }

    #[tokio::test]
    async fn test_trailing_fragment_dropped_by_default() {
        let mut runner = ProcessRunner::with_sink(MemorySink::new());
        let result = runner.run(&sh("echo done; printf partial")).await.unwrap();

        assert_eq!(result.stdout_lines, vec!["done"]);
        assert_eq!(runner.sink().stdout_lines(), vec!["done"]);
    }

    #[tokio::test]
    async fn test_trailing_fragment_kept_with_options() {
        let options = MultiplexerOptions {
            keep_trailing_fragment: true,
            ..MultiplexerOptions::default()
        };
        let mut runner = ProcessRunner::with_sink(MemorySink::new()).with_options(options);
        let result = runner.run(&sh("echo done; printf partial")).await.unwrap();

        assert_eq!(result.stdout_lines, vec!["done", "partial"]);
        assert_eq!(runner.sink().stdout_lines(), vec!["done", "partial"]);
    }

    /// 実行が途中で打ち切られたら子プロセスも終了する
    #[tokio::test]
    async fn test_abandoned_run_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let script = format!("sleep 1; touch '{}'", marker.display());

        let mut runner = ProcessRunner::with_sink(NullSink);
        let command = sh(&script);
        let outcome = tokio::time::timeout(Duration::from_millis(200), runner.run(&command)).await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }
}
