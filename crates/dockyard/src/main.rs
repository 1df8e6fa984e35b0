mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use dockyard_process::outln;
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dockyard")]
#[command(about = "Dockerイメージをビルドし、複数のレジストリへタグ付け・プッシュする", long_about = None)]
struct Cli {
    /// デバッグログを表示
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// イメージをビルドしてレジストリにプッシュ
    Build {
        /// ビルド対象のディレクトリ（省略時は設定ファイルの containers）
        containers: Vec<String>,
        /// 設定ファイルのパス（省略時は DOCKYARD_CONFIG → カレントディレクトリ → ~/.config/dockyard）
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// キャッシュを使用しない
        #[arg(long)]
        no_cache: bool,
        /// レジストリへのプッシュをスキップ
        #[arg(long)]
        no_push: bool,
        /// docker コマンドのパス
        #[arg(long, env = "DOCKYARD_DOCKER", default_value = "docker")]
        docker: String,
    },
    /// 設定を検証
    Validate {
        /// 設定ファイルのパス
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout はビルド出力のミラーに使うので、ログは stderr へ
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build {
            containers,
            config,
            no_cache,
            no_push,
            docker,
        } => {
            let args = commands::build::BuildArgs {
                containers,
                config,
                no_cache,
                no_push,
                docker,
            };
            commands::build::handle(args).await?;
        }
        Commands::Validate { config } => {
            commands::validate::handle(config.as_deref())?;
        }
        Commands::Version => {
            outln!("dockyard {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(hint) = commands::hint(&e) {
            eprintln!();
            eprintln!("{}", hint.yellow());
        }
        std::process::exit(1);
    }
}
