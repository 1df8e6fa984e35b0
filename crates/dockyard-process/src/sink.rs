//! キャプチャした行のライブ出力先

use std::fmt;
use std::io::Write;

/// 標準出力へ1行書き出す
///
/// `println!` と違い、パイプが閉じられていても panic しない。
/// 書き込みエラーは無視される。
pub fn write_stdout_line(args: fmt::Arguments<'_>) {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", args).ok();
    out.flush().ok();
}

/// [`write_stdout_line`] を `println!` と同じ書式で呼び出す
#[macro_export]
macro_rules! outln {
    () => {
        $crate::sink::write_stdout_line(::std::format_args!(""))
    };
    ($($arg:tt)*) => {
        $crate::sink::write_stdout_line(::std::format_args!($($arg)*))
    };
}

/// 行がどちらのパイプから来たか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

/// 完成した行をキャプチャ直後に受け取る
pub trait EchoSink: Send {
    fn echo(&mut self, stream: StreamKind, line: &str);
}

/// 自プロセスの stdout / stderr へそのまま流す
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl EchoSink for ConsoleSink {
    fn echo(&mut self, stream: StreamKind, line: &str) {
        // 出力先が閉じていてもビルドは止めない
        match stream {
            StreamKind::Stdout => write_stdout_line(format_args!("{}", line)),
            StreamKind::Stderr => {
                let mut err = std::io::stderr().lock();
                writeln!(err, "{}", line).ok();
            }
        }
    }
}

/// すべて捨てる
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EchoSink for NullSink {
    fn echo(&mut self, _stream: StreamKind, _line: &str) {}
}

/// 受け取った行を到着順にメモリへ保持
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub lines: Vec<(StreamKind, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout_lines(&self) -> Vec<&str> {
        self.filtered(StreamKind::Stdout)
    }

    pub fn stderr_lines(&self) -> Vec<&str> {
        self.filtered(StreamKind::Stderr)
    }

    fn filtered(&self, kind: StreamKind) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(stream, _)| *stream == kind)
            .map(|(_, line)| line.as_str())
            .collect()
    }
}

impl EchoSink for MemorySink {
    fn echo(&mut self, stream: StreamKind, line: &str) {
        self.lines.push((stream, line.to_string()));
    }
}

impl<S: EchoSink + ?Sized> EchoSink for &mut S {
    fn echo(&mut self, stream: StreamKind, line: &str) {
        (**self).echo(stream, line);
    }
}

impl<S: EchoSink + ?Sized> EchoSink for Box<S> {
    fn echo(&mut self, stream: StreamKind, line: &str) {
        (**self).echo(stream, line);
    }
}
