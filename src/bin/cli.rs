use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use autoqliq::prelude::*;
use autoqliq::repository::{FileCredentialRepository, FileTemplateStore};
use autoqliq::workflow::DriverKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "autoqliq")]
#[command(about = "Run browser automation workflows", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single workflow file
    Run {
        /// Path to the workflow JSON or YAML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to runner.yaml config file (default: runner.yaml next to FILE)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Error strategy: stop, continue or retry (overrides config)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Retries per failing action when the strategy is retry
        #[arg(long)]
        max_retries: Option<u32>,

        /// Browser driver: playwright or selenium (overrides config)
        #[arg(short, long)]
        driver: Option<String>,

        /// Directory of template files (overrides config)
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// Credentials file (overrides config)
        #[arg(long)]
        credentials: Option<PathBuf>,

        /// Print the execution report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List workflows in a directory
    List {
        /// Path to the workflows directory
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Validate workflow files without running them
    Validate {
        /// Path to workflow file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

struct RunOptions {
    file: PathBuf,
    config: Option<PathBuf>,
    strategy: Option<String>,
    max_retries: Option<u32>,
    driver: Option<String>,
    templates: Option<PathBuf>,
    credentials: Option<PathBuf>,
    json: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "autoqliq=debug"
    } else {
        "autoqliq=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Run {
            file,
            config,
            strategy,
            max_retries,
            driver,
            templates,
            credentials,
            json,
        } => {
            run_single(RunOptions {
                file,
                config,
                strategy,
                max_retries,
                driver,
                templates,
                credentials,
                json,
            })
            .await
        }
        Commands::List { dir } => list_workflows(dir),
        Commands::Validate { path } => validate(path),
    }
}

/// Load the runner config and apply command-line overrides
fn resolve_config(options: &RunOptions) -> anyhow::Result<RunnerConfig> {
    let default_path = options
        .file
        .parent()
        .map(|dir| dir.join("runner.yaml"))
        .filter(|p| p.is_file());

    let mut config = match options.config.as_ref().or(default_path.as_ref()) {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };

    if let Some(name) = &options.strategy {
        config.error_handling = ErrorStrategyConfig::from_name(name, options.max_retries)
            .ok_or_else(|| anyhow::anyhow!("Unknown strategy '{}' (expected stop, continue or retry)", name))?;
    } else if let Some(retries) = options.max_retries {
        config.error_handling = ErrorStrategyConfig::retry(retries);
    }

    if let Some(name) = &options.driver {
        config.driver.kind = DriverKind::parse(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown driver '{}' (expected playwright or selenium)", name))?;
    }
    if options.templates.is_some() {
        config.templates_dir = options.templates.clone();
    }
    if options.credentials.is_some() {
        config.credentials_file = options.credentials.clone();
    }

    Ok(config)
}

async fn run_single(options: RunOptions) -> anyhow::Result<bool> {
    if !options.file.exists() {
        anyhow::bail!("Workflow file not found: {}", options.file.display());
    }

    let workflow = WorkflowLoader::load_file(&options.file)?;
    workflow.validate()?;

    let config = resolve_config(&options)?;

    let credentials: Arc<dyn CredentialRepository> = match &config.credentials_file {
        Some(path) => Arc::new(FileCredentialRepository::load(path)?),
        None => Arc::new(MemoryCredentialRepository::new()),
    };

    let driver = Arc::new(LazyDriver::new(config.driver.clone()));
    let mut runner = WorkflowRunner::from_config(&config, driver.clone(), credentials);
    if let Some(dir) = &config.templates_dir {
        runner = runner.with_template_store(Arc::new(FileTemplateStore::new(dir)));
    }

    let stop_signal = runner.stop_signal();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current action");
            stop_signal.stop();
        }
    });

    let report = runner.run_workflow(&workflow).await;
    ctrl_c.abort();

    if let Err(e) = driver.quit().await {
        tracing::warn!(error = %e, "Failed to shut down browser driver");
    }

    if options.json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }

    Ok(report.is_success())
}

fn list_workflows(dir: PathBuf) -> anyhow::Result<bool> {
    if !dir.exists() {
        anyhow::bail!("Directory not found: {}", dir.display());
    }

    let workflows = WorkflowLoader::load_directory(&dir)?;

    if workflows.is_empty() {
        println!("No workflows found in: {}", dir.display());
        return Ok(true);
    }

    println!("Workflows in {}:\n", dir.display());
    for w in &workflows {
        println!(
            "  {} ({} top-level actions, {} total)",
            w.name,
            w.actions.len(),
            w.action_count()
        );
    }

    Ok(true)
}

fn validate(path: PathBuf) -> anyhow::Result<bool> {
    if !path.exists() {
        anyhow::bail!("Path not found: {}", path.display());
    }

    if path.is_dir() {
        let workflows = WorkflowLoader::load_directory(&path)?;
        if workflows.is_empty() {
            println!("No workflows found in: {}", path.display());
            return Ok(true);
        }

        let mut all_valid = true;
        for workflow in &workflows {
            if let Err(e) = workflow.validate() {
                println!("✗ {}: {}", workflow.name, e);
                all_valid = false;
            }
        }
        if all_valid {
            println!("✓ {} workflows validated", workflows.len());
        }
        Ok(all_valid)
    } else {
        validate_file(&path)
    }
}

fn validate_file(path: &Path) -> anyhow::Result<bool> {
    let workflow = WorkflowLoader::load_file(path)?;
    match workflow.validate() {
        Ok(()) => {
            println!("✓ {} is valid", path.display());
            Ok(true)
        }
        Err(e) => {
            println!("✗ {}: {}", path.display(), e);
            Ok(false)
        }
    }
}

fn print_report(report: &ExecutionReport) {
    println!("\n=== Execution Report ===\n");
    println!("Workflow: {}", report.workflow_name);
    println!("Status: {}", report.final_status);
    println!("Run ID: {}", report.run_id);
    println!("Duration: {:.2}s\n", report.duration_seconds);

    for (i, result) in report.action_results.iter().enumerate() {
        let status = if result.is_success() { "✓" } else { "✗" };
        println!("{} {}. {}", status, i + 1, result.message());
    }

    println!(
        "\n{} actions: {} succeeded, {} failed",
        report.summary.total_actions, report.summary.success_count, report.summary.failure_count
    );
    if let Some(err) = &report.error_message {
        println!("Error: {}", err);
    }
}
