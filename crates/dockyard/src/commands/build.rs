use colored::Colorize;
use dockyard_build::{Pipeline, PipelineConfig, PipelineFlags};
use dockyard_process::{ProcessRunner, outln};
use std::path::PathBuf;

pub struct BuildArgs {
    pub containers: Vec<String>,
    pub config: Option<PathBuf>,
    pub no_cache: bool,
    pub no_push: bool,
    pub docker: String,
}

/// ビルドコマンドを処理
pub async fn handle(args: BuildArgs) -> anyhow::Result<()> {
    let config_path = super::resolve_config_path(args.config.as_deref())?;
    let config = dockyard_config::load_config(&config_path)?;

    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    let flags = PipelineFlags {
        skip_cache: args.no_cache,
        skip_push: args.no_push,
    };
    let pipeline_config = PipelineConfig::from_config(&config, args.containers)
        .with_flags(flags)
        .with_docker_bin(args.docker);

    outln!("{}", "Dockerイメージをビルド中...".green());
    outln!("設定ファイル: {}", config_path.display().to_string().cyan());

    if pipeline_config.images.is_empty() {
        outln!(
            "{}",
            "ビルド対象のイメージがありません（containers の設定が必要です）".yellow()
        );
        return Ok(());
    }

    outln!();
    outln!(
        "{}",
        format!("ビルド対象 ({} 個):", pipeline_config.images.len()).bold()
    );
    for image in &pipeline_config.images {
        outln!("  • {}", image.cyan());
    }
    if flags.skip_push {
        outln!("{}", "プッシュはスキップされます (--no-push)".yellow());
    }
    outln!();

    let mut pipeline = Pipeline::new(pipeline_config, ProcessRunner::new());
    let report = pipeline.run().await?;

    outln!();
    if flags.skip_push {
        outln!("{}", "✓ すべてのイメージがビルドされました！".green().bold());
    } else {
        outln!(
            "{}",
            "✓ すべてのイメージがビルド＆プッシュされました！"
                .green()
                .bold()
        );
    }

    outln!();
    outln!("{}", "結果サマリー:".bold());
    for image in &report.images {
        let artifact = image
            .artifact_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();
        outln!(
            "  {} {}: {} → {}",
            "✓".green(),
            image.image,
            artifact,
            image.tags.join(", ").cyan()
        );
    }

    Ok(())
}
