use crate::error::{GitAutomatonError, Result};
use crate::git::{CommitInfo, SubmoduleInfo};
use git2::{IndexEntry, IndexTime, Oid, ReferenceType, Repository as Git2Repo, Signature, Sort};
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn open_submodule(&self, submodule: &SubmoduleInfo) -> Result<Git2Repo> {
        let handle = self.repo.find_submodule(&submodule.name)?;
        let repo = handle.open().map_err(|e| {
            GitAutomatonError::config(format!(
                "Submodule '{}' is not checked out: {}",
                submodule.name, e
            ))
        })?;
        Ok(repo)
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(signature) => Ok(signature),
            Err(e) => {
                log::warn!("No git identity configured ({}), using fallback signature", e);
                Ok(Signature::now("git-automaton", "git-automaton@localhost")?)
            }
        }
    }
}

/// Index entry recording a submodule at `commit`
fn gitlink_entry(path: &str, commit: Oid) -> IndexEntry {
    IndexEntry {
        ctime: IndexTime::new(0, 0),
        mtime: IndexTime::new(0, 0),
        dev: 0,
        ino: 0,
        mode: 0o160000,
        uid: 0,
        gid: 0,
        file_size: 0,
        id: commit,
        flags: 0,
        flags_extended: 0,
        path: path.as_bytes().to_vec(),
    }
}

/// Fetch options with SSH agent / key file authentication
fn fetch_options<'a>() -> git2::FetchOptions<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }

            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }
        }

        git2::Cred::default()
    });

    let mut options = git2::FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

impl super::Repository for Git2Repository {
    fn active_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(GitAutomatonError::Git(git2::Error::from_str(
                "HEAD is detached, check out a branch first",
            )));
        }

        head.shorthand().map(|name| name.to_string()).ok_or_else(|| {
            GitAutomatonError::Git(git2::Error::from_str("Branch name is not valid UTF-8"))
        })
    }

    fn remote_names(&self) -> Result<Vec<String>> {
        let remotes = self.repo.remotes()?;

        Ok(remotes.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn submodules(&self) -> Result<Vec<SubmoduleInfo>> {
        let submodules = self.repo.submodules()?;

        Ok(submodules
            .iter()
            .map(|sub| {
                let path = sub.path().to_string_lossy().to_string();
                SubmoduleInfo {
                    name: sub.name().map(|n| n.to_string()).unwrap_or_else(|| path.clone()),
                    path,
                    pinned: sub.head_id().or_else(|| sub.index_id()),
                }
            })
            .collect())
    }

    fn submodule_remotes(&self, submodule: &SubmoduleInfo) -> Result<Vec<String>> {
        let repo = self.open_submodule(submodule)?;
        let remotes = repo.remotes()?;

        Ok(remotes.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn fetch_submodule_remote(&self, submodule: &SubmoduleInfo, remote: &str) -> Result<()> {
        let repo = self.open_submodule(submodule)?;
        let mut remote_handle = repo.find_remote(remote)?;

        let refspec = format!("+refs/heads/*:refs/remotes/{}/*", remote);
        remote_handle
            .fetch(&[refspec.as_str()], Some(&mut fetch_options()), None)
            .map_err(|e| {
                GitAutomatonError::Git(git2::Error::from_str(&format!(
                    "Failed to fetch '{}' in submodule '{}': {}",
                    remote, submodule.name, e
                )))
            })?;

        Ok(())
    }

    fn submodule_remote_refs(
        &self,
        submodule: &SubmoduleInfo,
        remote: &str,
    ) -> Result<Vec<String>> {
        let repo = self.open_submodule(submodule)?;
        let mut refs = Vec::new();

        for reference in repo.references_glob(&format!("refs/remotes/{}/*", remote))? {
            let reference = reference?;
            if reference.kind() == Some(ReferenceType::Symbolic) {
                continue;
            }
            if let Some(name) = reference.shorthand() {
                refs.push(name.to_string());
            }
        }

        Ok(refs)
    }

    fn find_first_commit(
        &self,
        submodule: &SubmoduleInfo,
        ref_name: &str,
        matches: &mut dyn FnMut(&CommitInfo) -> bool,
    ) -> Result<Option<CommitInfo>> {
        let repo = self.open_submodule(submodule)?;
        let tip = repo
            .find_reference(&format!("refs/remotes/{}", ref_name))?
            .peel_to_commit()?
            .id();

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(tip)?;

        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            let info = CommitInfo {
                id: commit.id(),
                message: String::from_utf8_lossy(commit.message_bytes()).to_string(),
                commit_time: commit.time().seconds(),
            };

            if matches(&info) {
                return Ok(Some(info));
            }
        }

        Ok(None)
    }

    fn pin_submodule(&self, submodule: &SubmoduleInfo, commit: Oid, message: &str) -> Result<Oid> {
        // Only the gitlink in the superproject index moves; the submodule worktree is left alone
        let mut index = self.repo.index()?;
        index.add(&gitlink_entry(&submodule.path, commit))?;
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let id = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        log::debug!("Created commit {} pinning {} to {}", id, submodule.path, commit);
        Ok(id)
    }
}
