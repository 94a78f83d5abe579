use git2::Oid;

/// Commit found on a remote ref that mentions the active ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleCandidate {
    pub commit: Oid,
    /// Commit time (not author time), seconds since epoch
    pub commit_time: i64,
    /// Remote ref the commit was found on, e.g. "origin/feature/ABC-123"
    pub source_ref: String,
}

/// Pick the candidate with the latest commit time
///
/// On equal commit times the candidate found first wins.
pub fn select_latest(candidates: &[SubmoduleCandidate]) -> Option<&SubmoduleCandidate> {
    candidates.iter().reduce(|best, candidate| {
        if candidate.commit_time > best.commit_time {
            candidate
        } else {
            best
        }
    })
}
