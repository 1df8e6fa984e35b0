//! ビルド → タグ → プッシュのパイプライン
//!
//! イメージごとの状態遷移:
//! `Pending → Building → Built → Tagging(i)… → Tagged → Pushing(i)… → Done`
//! どのステップが失敗しても `Failed` となり、後続のイメージも含めて
//! 実行全体が停止する。

use crate::artifact::{ArtifactId, extract_artifact_id};
use crate::docker::{DEFAULT_DOCKER_BIN, DockerCli};
use crate::error::{BuildError, Result, Step};
use crate::resolver::RegistryResolver;
use colored::Colorize;
use dockyard_config::{Config, RegistryConfig};
use dockyard_process::{CommandLine, CommandRunner, ProcessResult, outln};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineFlags {
    /// `--no-cache=true` でビルド
    pub skip_cache: bool,
    /// login / push を行わない
    pub skip_push: bool,
}

/// 1回の実行に必要な設定（実行中は不変）
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub registries: Vec<RegistryConfig>,
    pub images: Vec<String>,
    pub flags: PipelineFlags,
    /// イメージディレクトリの基準となるディレクトリ
    pub root: PathBuf,
    pub docker_bin: String,
}

impl PipelineConfig {
    pub fn new(registries: Vec<RegistryConfig>, images: Vec<String>) -> Self {
        Self {
            registries,
            images,
            flags: PipelineFlags::default(),
            root: PathBuf::from("."),
            docker_bin: DEFAULT_DOCKER_BIN.to_string(),
        }
    }

    /// 設定ファイルから作成
    ///
    /// `images` が空でなければ設定ファイルの containers より優先される。
    pub fn from_config(config: &Config, images: Vec<String>) -> Self {
        let images = if images.is_empty() {
            config.containers.clone()
        } else {
            images
        };
        Self::new(config.registries.clone(), images)
    }

    pub fn with_flags(mut self, flags: PipelineFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_docker_bin(mut self, docker_bin: impl Into<String>) -> Self {
        self.docker_bin = docker_bin.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    Pending,
    Building,
    Built,
    Tagging(usize),
    Tagged,
    Pushing(usize),
    Done,
    Failed,
}

/// 1イメージ分の実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReport {
    pub image: String,
    pub artifact_id: Option<ArtifactId>,
    /// 付与したレジストリ修飾名（位置 0 を含む）
    pub tags: Vec<String>,
    pub pushed: Vec<String>,
    pub states: Vec<ImageState>,
}

impl ImageReport {
    fn new(image: &str) -> Self {
        Self {
            image: image.to_string(),
            artifact_id: None,
            tags: Vec::new(),
            pushed: Vec::new(),
            states: vec![ImageState::Pending],
        }
    }

    pub fn state(&self) -> &ImageState {
        // states は常に Pending から始まる
        self.states.last().unwrap_or(&ImageState::Pending)
    }

    fn transition(&mut self, state: ImageState) {
        tracing::debug!("{}: {:?} -> {:?}", self.image, self.state(), state);
        self.states.push(state);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub images: Vec<ImageReport>,
}

pub struct Pipeline<R> {
    config: PipelineConfig,
    docker: DockerCli,
    runner: R,
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn new(config: PipelineConfig, runner: R) -> Self {
        let docker = DockerCli::new(config.docker_bin.clone());
        Self {
            config,
            docker,
            runner,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// 全イメージをリスト順に処理。最初の失敗で停止する
    pub async fn run(&mut self) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();
        let images = self.config.images.clone();

        for image in &images {
            let image_report = self.run_image(image).await?;
            report.images.push(image_report);
        }

        Ok(report)
    }

    /// 1イメージをビルド・タグ付け・プッシュ
    pub async fn run_image(&mut self, image: &str) -> Result<ImageReport> {
        let mut report = ImageReport::new(image);

        match self.drive(&mut report).await {
            Ok(()) => {
                report.transition(ImageState::Done);
                Ok(report)
            }
            Err(e) => {
                report.transition(ImageState::Failed);
                tracing::debug!("{}: {}", image, e);
                Err(e)
            }
        }
    }

    async fn drive(&mut self, report: &mut ImageReport) -> Result<()> {
        let artifact_id = self.build(report).await?;
        self.tag(report, &artifact_id).await?;
        if self.config.flags.skip_push {
            tracing::debug!("{}: push skipped", report.image);
        } else {
            self.push(report).await?;
        }
        Ok(())
    }

    async fn build(&mut self, report: &mut ImageReport) -> Result<ArtifactId> {
        let image = report.image.clone();
        let dir = self.config.root.join(&image);
        if !dir.exists() {
            return Err(BuildError::MissingImageDir(dir));
        }

        report.transition(ImageState::Building);

        let tag = RegistryResolver::new(&self.config.registries).qualified(0, &image);
        let command = self
            .docker
            .build(&image, &tag, self.config.flags.skip_cache)
            .current_dir(&self.config.root);

        tracing::info!("Building image: {}", tag);
        let result = self.step(Step::Build, &image, &tag, &command).await?;

        let artifact_id = extract_artifact_id(&result.stdout())
            .ok_or_else(|| BuildError::ArtifactIdNotFound {
                image: image.clone(),
            })?;

        tracing::info!("Successfully built {}: {}", tag, artifact_id);
        report.artifact_id = Some(artifact_id.clone());
        report.tags.push(tag);
        report.transition(ImageState::Built);
        Ok(artifact_id)
    }

    async fn tag(&mut self, report: &mut ImageReport, artifact_id: &ArtifactId) -> Result<()> {
        let image = report.image.clone();
        let targets: Vec<(usize, String)> = {
            let resolver = RegistryResolver::new(&self.config.registries);
            resolver
                .secondary_indices()
                .map(|index| (index, resolver.qualified(index, &image)))
                .collect()
        };

        for (index, target) in targets {
            report.transition(ImageState::Tagging(index));
            let command = self.docker.tag(artifact_id.as_str(), &target);
            self.step(Step::Tag, &image, &target, &command).await?;
            report.tags.push(target);
        }

        report.transition(ImageState::Tagged);
        Ok(())
    }

    async fn push(&mut self, report: &mut ImageReport) -> Result<()> {
        let image = report.image.clone();
        let plan: Vec<(usize, Option<(String, CommandLine)>, String)> = {
            let resolver = RegistryResolver::new(&self.config.registries);
            self.config
                .registries
                .iter()
                .enumerate()
                .map(|(index, registry)| {
                    let login = (!registry.is_local())
                        .then(|| (registry.host.clone(), self.docker.login(registry)));
                    (index, login, resolver.qualified(index, &image))
                })
                .collect()
        };

        for (index, login, target) in plan {
            report.transition(ImageState::Pushing(index));

            if let Some((host, command)) = login {
                self.step(Step::Login, &image, &host, &command).await?;
            }

            let command = self.docker.push(&target);
            self.step(Step::Push, &image, &target, &command).await?;
            report.pushed.push(target);
        }

        Ok(())
    }

    /// コマンドを表示して実行し、失敗を BuildError に変換
    async fn step(
        &mut self,
        step: Step,
        image: &str,
        target: &str,
        command: &CommandLine,
    ) -> Result<ProcessResult> {
        outln!("  {} {}", "→".blue(), command.to_string().cyan());

        let result = self.runner.run(command).await?;

        if let Some(message) = result.spawn_error.clone() {
            return Err(BuildError::Spawn {
                step,
                image: image.to_string(),
                message,
            });
        }

        if result.exit_code != 0 {
            return Err(BuildError::StepFailed {
                step,
                image: image.to_string(),
                target: target.to_string(),
                exit_code: result.exit_code,
            });
        }

        Ok(result)
    }
}
