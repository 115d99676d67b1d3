//! plughost CLI - Main entry point

mod builtin;
mod init;

use anyhow::Context;
use clap::{Parser, Subcommand};
use plughost_core::{
    BatchResult, DirectoryLocator, ManifestLoader, PluginManager, PluginManagerConfig,
};
use plughost_foundation::{load_config_from_file, ConfigLoader, HostConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// plughost - discover, activate and deactivate plugins from a namespace directory
#[derive(Parser, Debug)]
#[command(name = "plughost")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Settings file to use instead of the layered .plughost/settings.json lookup
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plugin root directory (overrides pluginDir)
    #[arg(long)]
    plugin_dir: Option<PathBuf>,

    /// Namespace to scan; repeatable (overrides namespaces)
    #[arg(short, long = "namespace")]
    namespaces: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create .plughost/settings.json and an example namespace
    Init {
        /// Force reinitialization even if already initialized
        #[arg(short, long)]
        force: bool,
    },
    /// Discover plugins and print the registry
    List,
    /// Discover and activate plugins, then deactivate them on Ctrl-C
    Run {
        /// Deactivate immediately instead of waiting for Ctrl-C
        #[arg(long)]
        no_wait: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let working_dir = std::env::current_dir().context("cannot determine working directory")?;

    let run_mode = match args.command {
        Command::Init { force } => return init::init_project(&working_dir, force),
        Command::List => None,
        Command::Run { no_wait } => Some(no_wait),
    };

    let config = load_config(&args, &working_dir)?;

    // Initialize logging
    let log_level = if args.debug { "debug" } else { config.log_level.as_str() };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    debug!("Effective config: {:?}", config);

    let mut manager = build_manager(&config);

    let discovered = manager.discover_configured().await;
    print_batch("Discover", &discovered);

    match run_mode {
        None => {
            print_registry(&manager);
        }
        Some(no_wait) => {
            let activated = manager.activate_all().await?;
            print_batch("Activate", &activated);

            if !no_wait {
                println!("\n{} - press Ctrl-C to stop", manager.summary());
                tokio::signal::ctrl_c()
                    .await
                    .context("failed to listen for Ctrl-C")?;
                info!("Shutdown requested");
            }

            let deactivated = manager.shutdown().await?;
            print_batch("Deactivate", &deactivated);
        }
    }

    Ok(())
}

/// 설정 로드 (`--config` 또는 계층별 settings.json) 후 CLI 옵션 적용
fn load_config(args: &Args, working_dir: &Path) -> anyhow::Result<HostConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ConfigLoader::new(working_dir).load_all(),
    };

    if let Some(dir) = &args.plugin_dir {
        config.plugin_dir = Some(dir.clone());
    }

    if !args.namespaces.is_empty() {
        config.namespaces = args.namespaces.clone();
    }

    config.validate().context("invalid command line options")?;
    Ok(config)
}

fn build_manager(config: &HostConfig) -> PluginManager {
    let root = config.plugin_dir_or_default();
    info!("Plugin root: {}", root.display());

    let locator = DirectoryLocator::new(root, config.module_extension.clone());
    let loader = ManifestLoader::for_locator(&locator, builtin::plugin_types());

    PluginManager::with_config(
        Arc::new(locator),
        Arc::new(loader),
        PluginManagerConfig::from_host_config(config),
    )
}

fn print_batch(title: &str, result: &BatchResult) {
    println!("{}: {}", title, result);
    for failure in &result.failed {
        println!("  ✗ {}: {}", failure.subject, failure.error);
    }
}

fn print_registry(manager: &PluginManager) {
    let records = manager.all();
    if records.is_empty() {
        println!("No plugins registered.");
        return;
    }

    println!("\n{:<24} {:<14} {}", "NAME", "STATE", "MODULE");
    for record in records {
        println!(
            "{:<24} {:<14} {}",
            record.name(),
            record.state().to_string(),
            record.module_id().unwrap_or("-")
        );
    }
}
