//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations the
//! submodule resolver needs, allowing for a real libgit2-backed implementation
//! and an in-memory mock for testing.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! Code that makes decisions should depend on the [Repository] trait rather than
//! on a concrete implementation.
//!
//! ```rust
//! # use git_automaton::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> git_automaton::Result<()> {
//! for submodule in repo.submodules()? {
//!     for remote in repo.submodule_remotes(&submodule)? {
//!         repo.fetch_submodule_remote(&submodule, &remote)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// Commit information needed for ticket matching
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub id: Oid,
    /// Full commit message
    pub message: String,
    /// Committer time, seconds since epoch
    pub commit_time: i64,
}

/// A submodule registered in the superproject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleInfo {
    pub name: String,
    /// Path relative to the superproject root
    pub path: String,
    /// Commit currently recorded for the submodule in the superproject HEAD tree
    pub pinned: Option<Oid>,
}

/// Common git operation trait for abstraction
///
/// Single-threaded by contract: each submodule's fetch, scan and pin complete before
/// the next submodule is touched.
pub trait Repository {
    /// Name of the checked-out branch of the superproject
    ///
    /// # Returns
    /// * `Ok(String)` - Branch name, e.g. "feature/ABC-123-thing"
    /// * `Err` - If HEAD is detached or unreadable
    fn active_branch(&self) -> Result<String>;

    /// Names of the superproject's remotes
    fn remote_names(&self) -> Result<Vec<String>>;

    /// Submodules registered in the superproject, in configuration order
    fn submodules(&self) -> Result<Vec<SubmoduleInfo>>;

    /// Names of the remotes configured inside a submodule
    fn submodule_remotes(&self, submodule: &SubmoduleInfo) -> Result<Vec<String>>;

    /// Refresh a submodule's remote-tracking refs from `remote`
    fn fetch_submodule_remote(&self, submodule: &SubmoduleInfo, remote: &str) -> Result<()>;

    /// Remote-tracking refs of `remote` inside a submodule, as short names
    /// (e.g. "origin/feature/ABC-123"). Symbolic refs such as "origin/HEAD" are skipped.
    fn submodule_remote_refs(&self, submodule: &SubmoduleInfo, remote: &str)
        -> Result<Vec<String>>;

    /// Walk the history of `ref_name` from its tip and return the first commit
    /// accepted by `matches`
    ///
    /// The walk stops at the first match; the rest of the history is never read.
    fn find_first_commit(
        &self,
        submodule: &SubmoduleInfo,
        ref_name: &str,
        matches: &mut dyn FnMut(&CommitInfo) -> bool,
    ) -> Result<Option<CommitInfo>>;

    /// Pin a submodule to `commit` and record the change as exactly one commit
    ///
    /// # Returns
    /// * `Ok(Oid)` - Id of the created superproject commit
    /// * `Err` - If the commit is unknown to the submodule or the commit fails
    fn pin_submodule(&self, submodule: &SubmoduleInfo, commit: Oid, message: &str) -> Result<Oid>;
}
