use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use git_release_flow::cli::{run_docker_export, run_release_workflow, ReleaseWorkflowArgs};
use git_release_flow::config;
use git_release_flow::git::SystemGit;

#[derive(Parser)]
#[command(
    name = "git-release-flow",
    version,
    about = "Cut a patch release from develop: bump package.json, update CHANGELOG.md, merge, tag and push"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = ".",
        help = "Project root containing the manifest and changelog"
    )]
    dir: PathBuf,

    #[arg(short, long, global = true, help = "Show every git command that runs")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Perform a full release from the integration branch
    Release {
        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
    },
    /// Generate the reduced dependency manifest for Docker builds
    DockerDeps,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = config::load_config(args.config.as_deref(), &args.dir)
        .context("Failed to load configuration")?;

    match args.command {
        Command::Release { dry_run } => {
            let git = SystemGit::open(&args.dir).context("Git repository error")?;
            let workflow_args = ReleaseWorkflowArgs {
                project_root: git.dir().to_path_buf(),
                release_date: chrono::Local::now().date_naive(),
                dry_run,
            };

            let outcome = run_release_workflow(&git, &config, &workflow_args)
                .context("Release aborted; repository may be partially updated")?;
            if outcome.dry_run {
                println!(
                    "Dry run complete: {} -> {}",
                    outcome.previous_version, outcome.version
                );
            }
        }
        Command::DockerDeps => {
            run_docker_export(&config, &args.dir)
                .context("Failed to generate Docker dependency manifest")?;
        }
    }

    Ok(())
}
