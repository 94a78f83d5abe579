use crate::error::{GitAutomatonError, Result};
use crate::git::{CommitInfo, Repository, SubmoduleInfo};
use git2::Oid;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// A pin request recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq)]
pub struct PinRecord {
    pub submodule: String,
    pub commit: Oid,
    pub message: String,
}

#[derive(Debug, Default)]
struct MockSubmodule {
    info: Option<SubmoduleInfo>,
    remotes: Vec<String>,
    /// remote name -> ref short names
    refs: HashMap<String, Vec<String>>,
    /// ref short name -> history, tip first
    histories: HashMap<String, Vec<CommitInfo>>,
}

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    active_branch: String,
    remotes: Vec<String>,
    submodule_order: Vec<String>,
    submodules: HashMap<String, MockSubmodule>,
    fetches: RefCell<Vec<(String, String)>>,
    commits_scanned: Cell<usize>,
    pins: RefCell<Vec<PinRecord>>,
}

impl MockRepository {
    /// Create a new empty mock repository on branch `active_branch`
    pub fn new(active_branch: impl Into<String>) -> Self {
        MockRepository {
            active_branch: active_branch.into(),
            remotes: Vec::new(),
            submodule_order: Vec::new(),
            submodules: HashMap::new(),
            fetches: RefCell::new(Vec::new()),
            commits_scanned: Cell::new(0),
            pins: RefCell::new(Vec::new()),
        }
    }

    /// Add a superproject remote
    pub fn add_remote(&mut self, name: impl Into<String>) {
        self.remotes.push(name.into());
    }

    /// Register a submodule pinned at `pinned`
    pub fn add_submodule(&mut self, name: impl Into<String>, pinned: Option<Oid>) {
        let name = name.into();
        let entry = self.submodules.entry(name.clone()).or_default();
        entry.info = Some(SubmoduleInfo {
            name: name.clone(),
            path: name.clone(),
            pinned,
        });
        self.submodule_order.push(name);
    }

    /// Add a remote ref to a submodule with its history, tip first
    ///
    /// `ref_name` is the short name, e.g. "origin/feature/ABC-1"; its remote is
    /// the part before the first '/'.
    pub fn add_remote_ref(
        &mut self,
        submodule: &str,
        ref_name: impl Into<String>,
        history: Vec<CommitInfo>,
    ) {
        let ref_name = ref_name.into();
        let remote = ref_name
            .split_once('/')
            .map(|(remote, _)| remote.to_string())
            .unwrap_or_else(|| ref_name.clone());

        let entry = self.submodules.entry(submodule.to_string()).or_default();
        if !entry.remotes.contains(&remote) {
            entry.remotes.push(remote.clone());
        }
        entry.refs.entry(remote).or_default().push(ref_name.clone());
        entry.histories.insert(ref_name, history);
    }

    /// (submodule, remote) pairs fetched so far
    pub fn fetches(&self) -> Vec<(String, String)> {
        self.fetches.borrow().clone()
    }

    /// Number of commits handed to a match predicate so far
    pub fn commits_scanned(&self) -> usize {
        self.commits_scanned.get()
    }

    /// Pin requests recorded so far
    pub fn pins(&self) -> Vec<PinRecord> {
        self.pins.borrow().clone()
    }

    fn submodule(&self, submodule: &SubmoduleInfo) -> Result<&MockSubmodule> {
        self.submodules.get(&submodule.name).ok_or_else(|| {
            GitAutomatonError::config(format!("Unknown submodule: {}", submodule.name))
        })
    }
}

impl Repository for MockRepository {
    fn active_branch(&self) -> Result<String> {
        Ok(self.active_branch.clone())
    }

    fn remote_names(&self) -> Result<Vec<String>> {
        Ok(self.remotes.clone())
    }

    fn submodules(&self) -> Result<Vec<SubmoduleInfo>> {
        Ok(self
            .submodule_order
            .iter()
            .filter_map(|name| self.submodules.get(name))
            .filter_map(|sub| sub.info.clone())
            .collect())
    }

    fn submodule_remotes(&self, submodule: &SubmoduleInfo) -> Result<Vec<String>> {
        Ok(self.submodule(submodule)?.remotes.clone())
    }

    fn fetch_submodule_remote(&self, submodule: &SubmoduleInfo, remote: &str) -> Result<()> {
        self.fetches
            .borrow_mut()
            .push((submodule.name.clone(), remote.to_string()));
        Ok(())
    }

    fn submodule_remote_refs(
        &self,
        submodule: &SubmoduleInfo,
        remote: &str,
    ) -> Result<Vec<String>> {
        Ok(self
            .submodule(submodule)?
            .refs
            .get(remote)
            .cloned()
            .unwrap_or_default())
    }

    fn find_first_commit(
        &self,
        submodule: &SubmoduleInfo,
        ref_name: &str,
        matches: &mut dyn FnMut(&CommitInfo) -> bool,
    ) -> Result<Option<CommitInfo>> {
        let history = self
            .submodule(submodule)?
            .histories
            .get(ref_name)
            .ok_or_else(|| GitAutomatonError::config(format!("Unknown ref: {}", ref_name)))?;

        for commit in history {
            self.commits_scanned.set(self.commits_scanned.get() + 1);
            if matches(commit) {
                return Ok(Some(commit.clone()));
            }
        }
        Ok(None)
    }

    fn pin_submodule(&self, submodule: &SubmoduleInfo, commit: Oid, message: &str) -> Result<Oid> {
        self.pins.borrow_mut().push(PinRecord {
            submodule: submodule.name.clone(),
            commit,
            message: message.to_string(),
        });
        Ok(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(byte: u8, message: &str) -> CommitInfo {
        CommitInfo {
            id: Oid::from_bytes(&[byte; 20]).unwrap(),
            message: message.to_string(),
            commit_time: byte as i64,
        }
    }

    #[test]
    fn test_mock_repository_refs_by_remote() {
        let mut repo = MockRepository::new("feature/ABC-1");
        repo.add_submodule("libs/core", None);
        repo.add_remote_ref("libs/core", "origin/develop", vec![commit(1, "init")]);
        repo.add_remote_ref("libs/core", "upstream/develop", vec![commit(2, "init")]);

        let sub = repo.submodules().unwrap().remove(0);
        assert_eq!(
            repo.submodule_remotes(&sub).unwrap(),
            vec!["origin".to_string(), "upstream".to_string()]
        );
        assert_eq!(
            repo.submodule_remote_refs(&sub, "origin").unwrap(),
            vec!["origin/develop".to_string()]
        );
        assert!(repo.submodule_remote_refs(&sub, "other").unwrap().is_empty());
    }

    #[test]
    fn test_mock_repository_find_first_commit_counts_scans() {
        let mut repo = MockRepository::new("main");
        repo.add_submodule("sub", None);
        repo.add_remote_ref(
            "sub",
            "origin/main",
            vec![commit(3, "c"), commit(2, "b"), commit(1, "a")],
        );
        let sub = repo.submodules().unwrap().remove(0);

        let found = repo
            .find_first_commit(&sub, "origin/main", &mut |c| c.message == "b")
            .unwrap();
        assert_eq!(found.unwrap().commit_time, 2);
        assert_eq!(repo.commits_scanned(), 2);
    }

    #[test]
    fn test_mock_repository_records_pins() {
        let mut repo = MockRepository::new("main");
        repo.add_submodule("sub", None);
        let sub = repo.submodules().unwrap().remove(0);
        let oid = Oid::from_bytes(&[9; 20]).unwrap();

        repo.pin_submodule(&sub, oid, "X-1: update").unwrap();

        assert_eq!(
            repo.pins(),
            vec![PinRecord {
                submodule: "sub".to_string(),
                commit: oid,
                message: "X-1: update".to_string(),
            }]
        );
    }
}
