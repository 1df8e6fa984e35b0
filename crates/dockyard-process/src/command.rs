//! コマンドラインの表現
//!
//! コマンドは常にプログラムと順序付きの引数列。文字列をそのまま渡した場合は
//! 1トークンとして扱い、空白で分割したりシェルに渡したりはしない。

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

const REDACTED: &str = "****";

/// 外部コマンド1回分のプログラムと引数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    secret_args: BTreeSet<usize>,
    current_dir: Option<PathBuf>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret_args: BTreeSet::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// ログや表示されるコマンドラインに出してはいけない引数を追加
    ///
    /// プロセスにはそのまま渡され、`Display` でのみ伏せ字になる。
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_args.insert(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// プログラムを含む全引数（伏せ字なし）
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    fn display_arg(&self, index: usize, arg: &str) -> String {
        if !self.secret_args.contains(&index) {
            return arg.to_string();
        }
        // --password="secret" はフラグ部分を残して値だけ伏せる
        match arg.split_once('=') {
            Some((flag, _)) if flag.starts_with('-') => format!("{}=\"{}\"", flag, REDACTED),
            _ => REDACTED.to_string(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for (index, arg) in self.args.iter().enumerate() {
            write!(f, " {}", self.display_arg(index, arg))?;
        }
        Ok(())
    }
}

impl From<&str> for CommandLine {
    fn from(program: &str) -> Self {
        Self::new(program)
    }
}

impl From<String> for CommandLine {
    fn from(program: String) -> Self {
        Self::new(program)
    }
}

impl From<Vec<String>> for CommandLine {
    fn from(argv: Vec<String>) -> Self {
        let mut parts = argv.into_iter();
        let program = parts.next().unwrap_or_default();
        Self::new(program).args(parts)
    }
}

impl From<&[&str]> for CommandLine {
    fn from(argv: &[&str]) -> Self {
        argv.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()
    }
}

impl<const N: usize> From<[&str; N]> for CommandLine {
    fn from(argv: [&str; N]) -> Self {
        Self::from(&argv[..])
    }
}
