//! Submodule resolution: find the commit each submodule should be pinned to
//! for the active ticket and decide whether the pin has to move.

use git2::Oid;

use crate::config::RepoConfig;
use crate::domain::{select_latest, SubmoduleCandidate, TicketId};
use crate::error::{GitAutomatonError, Result};
use crate::git::{Repository, SubmoduleInfo};

/// Which remote refs are searched for ticket commits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMode {
    /// Refs whose name contains the ticket id
    FeatureBranch,
    /// Refs whose name ends with the configured default branch
    DefaultBranch,
}

/// Outcome of resolving one submodule
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateDecision {
    UpToDate {
        commit: Oid,
    },
    Update {
        commit: Oid,
        source_ref: String,
        message: String,
    },
}

impl UpdateDecision {
    pub fn commit(&self) -> Oid {
        match self {
            UpdateDecision::UpToDate { commit } | UpdateDecision::Update { commit, .. } => *commit,
        }
    }

    pub fn needs_update(&self) -> bool {
        matches!(self, UpdateDecision::Update { .. })
    }
}

pub struct SubmoduleResolver<'a, R: Repository> {
    repo: &'a R,
    config: &'a RepoConfig,
    mode: ResolutionMode,
}

impl<'a, R: Repository> SubmoduleResolver<'a, R> {
    pub fn new(repo: &'a R, config: &'a RepoConfig, mode: ResolutionMode) -> Self {
        SubmoduleResolver { repo, config, mode }
    }

    /// Collect the nearest-to-tip ticket commit of every matching ref across all
    /// remotes of `submodule`
    ///
    /// Each remote is fetched before its refs are read.
    pub fn collect_candidates(
        &self,
        submodule: &SubmoduleInfo,
        ticket: &TicketId,
    ) -> Result<Vec<SubmoduleCandidate>> {
        let mut candidates = Vec::new();

        for remote in self.repo.submodule_remotes(submodule)? {
            log::debug!("Updating submodule {} from remote {}", submodule.name, remote);
            self.repo.fetch_submodule_remote(submodule, &remote)?;

            let refs = self.repo.submodule_remote_refs(submodule, &remote)?;
            for ref_name in self.refs_to_scan(&refs, ticket)? {
                if let Some(candidate) = self.scan_ref(submodule, ref_name, ticket)? {
                    log::debug!(
                        "Found ticket {} in {} at {}",
                        ticket,
                        candidate.source_ref,
                        candidate.commit
                    );
                    candidates.push(candidate);
                }
            }
        }

        Ok(candidates)
    }

    /// Decide whether `submodule` has to be re-pinned for `ticket`
    ///
    /// # Returns
    /// * `Ok(UpdateDecision)` - Latest candidate compared to the pinned commit
    /// * `Err` - Unknown default branch, git failure, or no candidate at all
    pub fn resolve(&self, submodule: &SubmoduleInfo, ticket: &TicketId) -> Result<UpdateDecision> {
        let candidates = self.collect_candidates(submodule, ticket)?;

        let latest =
            select_latest(&candidates).ok_or_else(|| GitAutomatonError::TicketNotFound {
                ticket: ticket.to_string(),
                submodule: submodule.name.clone(),
            })?;

        if submodule.pinned == Some(latest.commit) {
            return Ok(UpdateDecision::UpToDate {
                commit: latest.commit,
            });
        }

        Ok(UpdateDecision::Update {
            commit: latest.commit,
            source_ref: latest.source_ref.clone(),
            message: self.config.commit_messages.render_update_submodule(ticket),
        })
    }

    /// Carry out a decision; only an update touches the repository
    ///
    /// # Returns
    /// * `Ok(Some(oid))` - Id of the commit that pins the submodule
    /// * `Ok(None)` - Submodule was already up to date
    pub fn apply(&self, submodule: &SubmoduleInfo, decision: &UpdateDecision) -> Result<Option<Oid>> {
        match decision {
            UpdateDecision::UpToDate { .. } => Ok(None),
            UpdateDecision::Update {
                commit, message, ..
            } => {
                let id = self.repo.pin_submodule(submodule, *commit, message)?;
                Ok(Some(id))
            }
        }
    }

    fn refs_to_scan<'r>(&self, refs: &'r [String], ticket: &TicketId) -> Result<Vec<&'r String>> {
        match self.mode {
            ResolutionMode::FeatureBranch => Ok(refs
                .iter()
                .filter(|name| ticket.is_mentioned_in(name))
                .collect()),
            ResolutionMode::DefaultBranch => {
                let default_refs: Vec<&String> = refs
                    .iter()
                    .filter(|name| name.ends_with(&self.config.default_branch))
                    .collect();
                if default_refs.is_empty() {
                    return Err(GitAutomatonError::unknown_default_branch(
                        &self.config.default_branch,
                        refs,
                    ));
                }
                Ok(default_refs)
            }
        }
    }

    fn scan_ref(
        &self,
        submodule: &SubmoduleInfo,
        ref_name: &str,
        ticket: &TicketId,
    ) -> Result<Option<SubmoduleCandidate>> {
        let found = self.repo.find_first_commit(submodule, ref_name, &mut |commit| {
            ticket.is_mentioned_in(&commit.message)
        })?;

        Ok(found.map(|commit| SubmoduleCandidate {
            commit: commit.id,
            commit_time: commit.commit_time,
            source_ref: ref_name.to_string(),
        }))
    }
}
