//! stdout / stderr の多重化
//!
//! 子プロセスの両パイプを1つのタスクで読み切る。各反復では読み取り可能に
//! なったパイプを待ち、上限付きの読み取りを1回行い、そのパイプの
//! [`LineBuffer`] へ渡す。片方を待っている間にもう片方が満杯になって
//! 子プロセスが止まることはない。

use crate::sink::{EchoSink, StreamKind};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

/// 1回の読み取りの上限バイト数
pub const READ_CHUNK_SIZE: usize = 4096;

/// 1回の待機の上限。超えたら再度待つ
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct MultiplexerOptions {
    pub poll_interval: Duration,
    pub chunk_size: usize,
    /// 終端時に改行のない最後の断片も行として出力する
    ///
    /// デフォルトは無効（改行で終わらない断片は捨てる）。
    pub keep_trailing_fragment: bool,
}

impl Default for MultiplexerOptions {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            chunk_size: READ_CHUNK_SIZE,
            keep_trailing_fragment: false,
        }
    }
}

/// 1本のパイプのバイト列を溜め、完成した行を取り出す
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// チャンクを追加し、それによって完成した行を返す
    ///
    /// 行末の `\n` は含まない。最後の改行以降のバイトは次のチャンクまで保持する。
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..complete.len() - 1]
            .split(|b| *b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    /// 最後の改行以降に残っている断片を取り出す
    pub fn take_fragment(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let fragment = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&fragment).into_owned())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// 両パイプからキャプチャした行（それぞれ出力順）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout_lines: Vec<String>,
    pub stderr_lines: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct StreamMultiplexer {
    options: MultiplexerOptions,
}

impl StreamMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MultiplexerOptions) -> Self {
        Self { options }
    }

    /// 両パイプが終端に達するまで読み続ける
    ///
    /// 完成した行は次の読み取りの前に `sink` へ渡される。
    /// 2つのストリーム間の順序は保証しない。
    pub async fn capture<O, E, S>(
        &self,
        mut stdout: O,
        mut stderr: E,
        sink: &mut S,
    ) -> std::io::Result<CapturedOutput>
    where
        O: AsyncRead + Unpin,
        E: AsyncRead + Unpin,
        S: EchoSink + ?Sized,
    {
        let chunk_size = self.options.chunk_size.max(1);
        let mut out_buf = vec![0u8; chunk_size];
        let mut err_buf = vec![0u8; chunk_size];
        let mut out_lines = LineBuffer::new();
        let mut err_lines = LineBuffer::new();
        let mut out_open = true;
        let mut err_open = true;
        let mut captured = CapturedOutput::default();

        while out_open || err_open {
            let ready = tokio::time::timeout(self.options.poll_interval, async {
                tokio::select! {
                    read = stdout.read(&mut out_buf), if out_open => (StreamKind::Stdout, read),
                    read = stderr.read(&mut err_buf), if err_open => (StreamKind::Stderr, read),
                }
            })
            .await;

            let (stream, read) = match ready {
                Ok(ready) => ready,
                Err(_) => {
                    tracing::trace!(
                        "no output within {:?}, polling again",
                        self.options.poll_interval
                    );
                    continue;
                }
            };

            let n = read?;

            let (open, buffer, chunk, lines) = match stream {
                StreamKind::Stdout => (
                    &mut out_open,
                    &mut out_lines,
                    &out_buf,
                    &mut captured.stdout_lines,
                ),
                StreamKind::Stderr => (
                    &mut err_open,
                    &mut err_lines,
                    &err_buf,
                    &mut captured.stderr_lines,
                ),
            };

            if n == 0 {
                *open = false;
                if self.options.keep_trailing_fragment {
                    if let Some(fragment) = buffer.take_fragment() {
                        sink.echo(stream, &fragment);
                        lines.push(fragment);
                    }
                } else if buffer.pending_len() > 0 {
                    tracing::debug!(
                        "dropping {} bytes of unterminated {} output",
                        buffer.pending_len(),
                        stream.as_str()
                    );
                }
                tracing::trace!("{} reached end of stream", stream.as_str());
                continue;
            }

            for line in buffer.push(&chunk[..n]) {
                sink.echo(stream, &line);
                lines.push(line);
            }
        }

        Ok(captured)
    }
}
