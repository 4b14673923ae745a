//! Label sync CLI - keeps repository labels in sync with a YAML file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use label_sync::config::DEFAULT_INTERVAL_SECS;
use label_sync::reconcile::DEFAULT_CONCURRENCY;
use label_sync::{
    DesiredState, Fingerprint, GitHubLabelClient, LabelAccessor, LabelFileOption, LabelSyncer,
    PassOutcome, Reconciler, SyncConfig,
};

/// Label sync CLI - create missing repository labels from a desired-state file.
#[derive(Parser)]
#[command(name = "label-sync")]
#[command(about = "Keep repository labels in sync with a YAML file")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that talk to GitHub.
#[derive(clap::Args)]
struct RepoArgs {
    /// Path to the file containing the list of labels
    #[arg(long, env = "LABEL_SYNC_LABEL_FILE")]
    label_file: PathBuf,

    /// Repository in owner/repo format
    #[arg(short, long, env = "LABEL_SYNC_REPO")]
    repo: String,

    /// GitHub API root
    #[arg(long, env = "LABEL_SYNC_API_URL", default_value = label_sync::github::DEFAULT_API_URL)]
    api_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing labels, once per interval
    Run {
        #[command(flatten)]
        repo: RepoArgs,

        /// Seconds between sync passes
        #[arg(long, env = "LABEL_SYNC_INTERVAL", default_value_t = DEFAULT_INTERVAL_SECS)]
        interval: u64,

        /// Label creations in flight at once
        #[arg(long, env = "LABEL_SYNC_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Run a single pass and exit (for CronJob use)
        #[arg(long)]
        once: bool,
    },

    /// Show the labels the next pass would create
    Plan {
        #[command(flatten)]
        repo: RepoArgs,
    },

    /// Parse the label file without contacting GitHub
    Validate {
        /// Path to the file containing the list of labels
        #[arg(long, env = "LABEL_SYNC_LABEL_FILE")]
        label_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("label_sync=debug,info")
        } else {
            EnvFilter::new("label_sync=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            repo,
            interval,
            concurrency,
            once,
        } => {
            let config = SyncConfig::new(repo.label_file, &repo.repo)?
                .with_api_url(repo.api_url)
                .with_interval(Duration::from_secs(interval))
                .with_concurrency(concurrency);
            config.validate()?;

            info!(
                label_file = %config.label_file.display(),
                repository = %format!("{}/{}", config.owner, config.repo),
                interval_secs = interval,
                concurrency,
                once,
                "Starting label sync"
            );
            run_sync(config, once).await
        }
        Commands::Plan { repo } => {
            let config =
                SyncConfig::new(repo.label_file, &repo.repo)?.with_api_url(repo.api_url);
            run_plan(config).await
        }
        Commands::Validate { label_file } => run_validate(label_file).await,
    }
}

fn build_syncer(config: &SyncConfig) -> Result<LabelSyncer<GitHubLabelClient>> {
    let label_file = LabelFileOption::new(&config.label_file)?;
    let client = GitHubLabelClient::new(
        config.token.clone(),
        config.owner.clone(),
        config.repo.clone(),
    )?
    .with_base_url(config.api_url.as_str());

    Ok(LabelSyncer::new(
        label_file,
        client,
        Reconciler::new(config.concurrency),
    ))
}

async fn run_sync(config: SyncConfig, once: bool) -> Result<()> {
    let mut syncer = build_syncer(&config)?;

    if once {
        let outcome = syncer.run_once().await?;
        log_outcome(&outcome);
        return Ok(());
    }

    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => run_pass(&mut syncer).await,
        }
    }

    info!("Label sync stopped");
    Ok(())
}

/// Run one pass; failures are logged and retried on the next tick.
async fn run_pass<A: LabelAccessor>(syncer: &mut LabelSyncer<A>) {
    match syncer.run_once().await {
        Ok(outcome) => log_outcome(&outcome),
        Err(e) => error!(kind = e.kind(), error = %e, "Label sync pass failed"),
    }
}

fn log_outcome(outcome: &PassOutcome) {
    match outcome {
        PassOutcome::Unchanged => debug!("Label file unchanged"),
        PassOutcome::Reconciled(report) => {
            debug!(
                created = report.created.len(),
                failed = report.failed.len(),
                "Label sync pass finished"
            );
        }
    }
}

async fn run_plan(config: SyncConfig) -> Result<()> {
    let syncer = build_syncer(&config)?;
    let missing = syncer.plan().await?;

    if missing.is_empty() {
        println!("All labels in {} already exist", config.label_file.display());
        return Ok(());
    }

    println!("Labels to create on {}/{}:\n", config.owner, config.repo);
    for label in &missing {
        let color = label
            .color
            .as_deref()
            .map(|c| format!(" (#{})", c.trim_start_matches('#')))
            .unwrap_or_default();
        let description = label
            .description
            .as_deref()
            .map(|d| format!(" {d}"))
            .unwrap_or_default();
        println!("  + {}{color}{description}", label.name);
    }
    println!("\nTotal: {} labels", missing.len());

    Ok(())
}

async fn run_validate(label_file: PathBuf) -> Result<()> {
    LabelFileOption::new(&label_file)?;

    let contents = tokio::fs::read(&label_file)
        .await
        .with_context(|| format!("Failed to read {}", label_file.display()))?;
    let desired = DesiredState::from_yaml(&contents)?;

    println!("✅ {} is valid", label_file.display());
    println!("   Labels: {}", desired.len());
    println!("   Fingerprint: {}", Fingerprint::of(&contents));

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
