use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use git_automaton::cli::{run_workflow, WorkflowArgs};
use git_automaton::config::{load_config, resolve_config};
use git_automaton::domain::VersionPart;
use git_automaton::git::Git2Repository;
use git_automaton::resolver::ResolutionMode;
use git_automaton::ui;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Increment {
    Major,
    Minor,
    Patch,
}

impl From<Increment> for VersionPart {
    fn from(value: Increment) -> Self {
        match value {
            Increment::Major => VersionPart::Major,
            Increment::Minor => VersionPart::Minor,
            Increment::Patch => VersionPart::Patch,
        }
    }
}

#[derive(clap::Parser)]
#[command(
    name = "git-automaton",
    version,
    about = "Pin git submodules to the active ticket and bump version strings"
)]
struct Args {
    #[arg(short, long, default_value = ".", help = "Repository path")]
    repo: PathBuf,

    #[arg(short, long, help = "Configuration file (default: gitauto.yaml in the repository)")]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "default", help = "Configuration profile")]
    profile: String,

    #[arg(
        short,
        long,
        help = "Search ticket feature branches instead of the default branch"
    )]
    feature_branch: bool,

    #[arg(short = 'i', long, value_enum, help = "Increment the version string")]
    increment_version: Option<Increment>,

    #[arg(long, help = "Only bump the version, leave submodules alone")]
    no_submodules: bool,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(long, help = "Enable debug logging")]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    if !args.repo.is_dir() {
        anyhow::bail!("Repository path {} is not a directory", args.repo.display());
    }
    ui::display_status(&format!("Opening path: {}", args.repo.display()));

    let data = load_config(args.config.as_deref(), &args.repo)?;
    let config = resolve_config(&data, &args.profile, &args.repo)?;
    log::debug!("Resolved profile '{}': {:?}", args.profile, config);

    let repo = Git2Repository::open(&args.repo)
        .with_context(|| format!("Not a git repository: {}", args.repo.display()))?;

    let workflow_args = WorkflowArgs {
        increment: args.increment_version.map(VersionPart::from),
        mode: if args.feature_branch {
            ResolutionMode::FeatureBranch
        } else {
            ResolutionMode::DefaultBranch
        },
        sync_submodules: !args.no_submodules,
        dry_run: args.dry_run,
    };

    let result = run_workflow(&workflow_args, &repo, &config)?;

    let created = result
        .submodules
        .iter()
        .filter(|outcome| outcome.commit_created.is_some())
        .count();
    if args.dry_run {
        ui::display_status("Dry run: no files or commits were written");
    } else if result.ticket.is_some() {
        ui::display_success(&format!(
            "{} of {} submodule(s) updated",
            created,
            result.submodules.len()
        ));
    }

    Ok(())
}
