//! dockyard イメージパイプライン
//!
//! イメージディレクトリごとに、先頭レジストリ向けのタグで `docker build`、
//! セカンダリレジストリごとに `docker tag`、その後レジストリごとに
//! `docker login` と `docker push` を行う。最初に失敗したステップで実行全体が停止する。

pub mod artifact;
pub mod docker;
pub mod error;
pub mod pipeline;
pub mod resolver;

pub use artifact::{ArtifactId, SUCCESS_MARKER, extract_artifact_id};
pub use docker::DockerCli;
pub use error::{BuildError, Result, Step};
pub use pipeline::{
    ImageReport, ImageState, Pipeline, PipelineConfig, PipelineFlags, PipelineReport,
};
pub use resolver::RegistryResolver;
