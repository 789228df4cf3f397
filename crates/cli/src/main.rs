use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use orchestrator::{
    BoundedExecutor, CommandRunner, CompilerInstaller, FsJsonReader, PackageCatalog, ProcessRunner,
    Selection, TestRunner, TesterConfig,
};
use tester_core::TesterOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "typings-tester")]
#[command(about = "Test typings packages changed since the base ref, or those matching a pattern", long_about = None)]
#[command(version)]
struct Cli {
    /// Regular expression matched against package names
    pattern: Option<String>,

    /// Test every package in the catalog
    #[arg(long)]
    all: bool,

    /// Maximum number of packages processed at once
    #[arg(long, alias = "nProcesses")]
    n_processes: Option<usize>,

    /// Use the current directory as the DefinitelyTyped checkout
    #[arg(long, alias = "runFromDefinitelyTyped")]
    run_from_definitely_typed: bool,

    /// Path to a typings-tester.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Assume every TypeScript version is already installed
    #[arg(long)]
    skip_compiler_install: bool,
}

impl Cli {
    fn selection(&self) -> Result<Selection> {
        if self.all {
            return Ok(Selection::All);
        }
        match &self.pattern {
            Some(pattern) => Ok(Selection::pattern(pattern)?),
            None => Ok(Selection::Affected),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let config = match &cli.config {
        Some(path) => TesterConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TesterConfig::load_or_default(&cwd).await?,
    };

    let options = if cli.run_from_definitely_typed {
        TesterOptions::from_working_dir(&cwd)
    } else {
        TesterOptions::default()
    };
    let options = options.with_data_dir(config.data_dir.clone());

    let executor = BoundedExecutor::new(cli.n_processes.unwrap_or_else(default_concurrency))
        .context("Invalid --n-processes")?;
    let selection = cli.selection()?;

    tracing::info!("DefinitelyTyped: {}", options.root().display());

    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);
    let compilers = Arc::new(
        CompilerInstaller::new(&config.compiler_install_root, Arc::clone(&runner))
            .with_npm(config.npm.clone()),
    );
    if !cli.skip_compiler_install {
        compilers
            .install_all()
            .await
            .context("Failed to install TypeScript versions")?;
    }

    let catalog = PackageCatalog::read(&options)
        .await
        .context("Failed to read package catalog")?;

    let tester = TestRunner::new(
        options,
        config,
        executor,
        runner,
        Arc::new(FsJsonReader),
        compilers,
    );
    tester.run_selection(&catalog, &selection).await?;

    Ok(())
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "typings_tester=info,orchestrator=info".into()),
        )
        .init();
}
