//! dockyard 外部プロセス実行
//!
//! 外部ビルドツールを1回ずつ起動し、子プロセスの stdout / stderr を
//! 1つの待機ループで多重化して読み取る。どちらかのパイプが詰まって
//! 子プロセスが止まることはない。キャプチャした各行は [`EchoSink`] へ
//! ライブ出力され、[`ProcessResult`] として返される。

pub mod command;
pub mod error;
pub mod mux;
pub mod runner;
pub mod sink;

pub use command::CommandLine;
pub use error::{ProcessError, Result};
pub use mux::{CapturedOutput, LineBuffer, MultiplexerOptions, StreamMultiplexer};
pub use runner::{CommandRunner, ProcessResult, ProcessRunner};
pub use sink::{ConsoleSink, EchoSink, MemorySink, NullSink, StreamKind, write_stdout_line};
