//! Main workflow orchestration logic
//!
//! Runs one pass over a superproject: validate the remote, extract the ticket,
//! bump the version file, then resolve and pin every submodule in order. This
//! module is independent of clap so the workflow can be driven programmatically
//! and tested against a mock repository.

use git2::Oid;

use crate::config::RepoConfig;
use crate::domain::{extract_ticket, TicketId, VersionPart};
use crate::error::{GitAutomatonError, Result};
use crate::git::Repository;
use crate::resolver::{ResolutionMode, SubmoduleResolver, UpdateDecision};
use crate::ui;
use crate::version_file::{VersionBumper, VersionChange};

/// Arguments for the workflow
///
/// Mirrors the CLI Args in a form suitable for orchestration logic.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowArgs {
    /// Component to increment in the version file, if any
    pub increment: Option<VersionPart>,

    /// How submodule commits are searched
    pub mode: ResolutionMode,

    /// Resolve and pin submodules; requires a ticket branch
    pub sync_submodules: bool,

    /// Compute and print everything, write nothing
    pub dry_run: bool,
}

impl Default for WorkflowArgs {
    fn default() -> Self {
        WorkflowArgs {
            increment: None,
            mode: ResolutionMode::DefaultBranch,
            sync_submodules: true,
            dry_run: false,
        }
    }
}

/// What happened to one submodule
#[derive(Debug, Clone, PartialEq)]
pub struct SubmoduleOutcome {
    pub name: String,
    pub decision: UpdateDecision,
    /// Superproject commit created for the update (None when up to date or dry run)
    pub commit_created: Option<Oid>,
}

/// Result of a successful workflow
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowResult {
    pub ticket: Option<TicketId>,
    pub version_changes: Vec<VersionChange>,
    /// Whether the version file was written
    pub version_written: bool,
    pub submodules: Vec<SubmoduleOutcome>,
}

/// Verify that the configured remote exists in the superproject
pub fn check_remote<R: Repository>(repo: &R, config: &RepoConfig) -> Result<()> {
    let remotes = repo.remote_names()?;
    if remotes.iter().any(|name| *name == config.remote) {
        Ok(())
    } else {
        Err(GitAutomatonError::unknown_remote(&config.remote, &remotes))
    }
}

/// Extract the ticket of the active branch, failing when there is none
///
/// # Returns
/// * `Ok((branch, ticket))` - Active branch and its ticket id
/// * `Err` - Branch unreadable, or no ticket in its name
pub fn require_ticket<R: Repository>(repo: &R, config: &RepoConfig) -> Result<(String, TicketId)> {
    let branch = repo.active_branch()?;
    match extract_ticket(&config.ticket_structure, &branch) {
        Some(ticket) => Ok((branch, ticket)),
        None => Err(GitAutomatonError::MissingTicket { branch }),
    }
}

/// Main workflow
///
/// 1. When syncing submodules: check remote, extract ticket (fail fast, nothing written yet)
/// 2. Bump the version file if requested
/// 3. Resolve and pin each submodule in order; the first error stops the run
pub fn run_workflow<R: Repository>(
    args: &WorkflowArgs,
    repo: &R,
    config: &RepoConfig,
) -> Result<WorkflowResult> {
    let mut result = WorkflowResult::default();

    if args.sync_submodules {
        check_remote(repo, config)?;
        let (branch, ticket) = require_ticket(repo, config)?;
        ui::display_context(&config.remote, &branch, ticket.as_str());
        result.ticket = Some(ticket);
    }

    if let Some(part) = args.increment {
        let bumper = VersionBumper::new(&config.version_config);
        if args.dry_run {
            result.version_changes = bumper.preview(part)?;
        } else {
            result.version_changes = bumper.apply(part)?;
            result.version_written = true;
        }
        ui::display_version_changes(
            &config.version_config.file.display().to_string(),
            &result.version_changes,
            args.dry_run,
        );
    }

    if let Some(ticket) = &result.ticket {
        result.submodules = sync_submodules(args, repo, config, ticket)?;
    }

    Ok(result)
}

fn sync_submodules<R: Repository>(
    args: &WorkflowArgs,
    repo: &R,
    config: &RepoConfig,
    ticket: &TicketId,
) -> Result<Vec<SubmoduleOutcome>> {
    let resolver = SubmoduleResolver::new(repo, config, args.mode);
    let mut outcomes = Vec::new();

    for submodule in repo.submodules()? {
        let decision = resolver.resolve(&submodule, ticket)?;
        ui::display_decision(&submodule.name, &decision, args.dry_run);

        let commit_created = if args.dry_run {
            None
        } else {
            resolver.apply(&submodule, &decision)?
        };
        if let Some(commit) = commit_created {
            ui::display_pinned(&submodule.name, decision.commit(), commit);
        }

        outcomes.push(SubmoduleOutcome {
            name: submodule.name,
            decision,
            commit_created,
        });
    }

    if outcomes.is_empty() {
        log::info!("No submodules registered, nothing to pin");
    }
    Ok(outcomes)
}
