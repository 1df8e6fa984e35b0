use colored::Colorize;
use dockyard_build::RegistryResolver;
use dockyard_process::outln;
use std::path::Path;

pub fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    let config_path = super::resolve_config_path(config)?;
    let config = dockyard_config::load_config(&config_path)?;

    outln!("{}", "設定を検証中...".green());
    outln!("設定ファイル: {}", config_path.display().to_string().cyan());

    outln!();
    outln!(
        "{}",
        format!("レジストリ ({} 個):", config.registries.len()).bold()
    );
    let resolver = RegistryResolver::new(&config.registries);
    for (index, registry) in config.registries.iter().enumerate() {
        let role = if index == 0 { "build" } else { "tag" };
        let login = if registry.is_local() {
            "login なし"
        } else {
            "login あり"
        };
        outln!(
            "  {}. {} ({}, {}) prefix: {}",
            index,
            registry.host.cyan(),
            role,
            login,
            resolver.prefix(index).cyan()
        );
    }

    outln!();
    outln!(
        "{}",
        format!("コンテナ ({} 個):", config.containers.len()).bold()
    );
    for container in &config.containers {
        if Path::new(container).exists() {
            outln!("  {} {}", "✓".green(), container);
        } else {
            outln!("  {} {} (ディレクトリが見つかりません)", "⚠".yellow(), container);
        }
    }

    let warnings = config.validate();
    if !warnings.is_empty() {
        outln!();
        for warning in &warnings {
            outln!("  {} {}", "⚠".yellow(), warning);
        }
    }

    outln!();
    outln!("{}", "✓ 設定は有効です".green().bold());
    Ok(())
}
