// tests/git2_submodule_test.rs
//
// Builds a real superproject with one submodule in temporary directories and
// runs the workflow against libgit2.
use git2::{Oid, Repository, Signature, Time};
use git_automaton::cli::{run_workflow, WorkflowArgs};
use git_automaton::config::{CommitMessages, RepoConfig, VersionConfig};
use git_automaton::git::{Git2Repository, Repository as _};
use git_automaton::resolver::{ResolutionMode, UpdateDecision};
use std::path::Path;
use tempfile::TempDir;

fn signature(seconds: i64) -> Signature<'static> {
    Signature::new("Test User", "test@example.com", &Time::new(seconds, 0)).unwrap()
}

fn commit_on(
    repo: &Repository,
    refname: &str,
    parent: Option<Oid>,
    message: &str,
    seconds: i64,
) -> Oid {
    let sig = signature(seconds);
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parents: Vec<git2::Commit> = parent
        .map(|id| repo.find_commit(id).unwrap())
        .into_iter()
        .collect();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some(refname), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

struct Fixture {
    _dir: TempDir,
    super_path: std::path::PathBuf,
    root: Oid,
    ticket_commit: Oid,
    merge_commit: Oid,
}

/// upstream: root -> develop: "Merge ABC-123"; feature/ABC-123: "ABC-123: parser" -> "polish"
/// superproject on feature/ABC-123-thing, submodule libs/core pinned at root
fn build_fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let upstream_path = dir.path().join("upstream");
    let super_path = dir.path().join("super");

    let upstream = Repository::init(&upstream_path).unwrap();
    let root = commit_on(&upstream, "HEAD", None, "root", 1_000);
    let ticket_commit = commit_on(
        &upstream,
        "refs/heads/feature/ABC-123",
        Some(root),
        "ABC-123: parser",
        2_000,
    );
    commit_on(
        &upstream,
        "refs/heads/feature/ABC-123",
        Some(ticket_commit),
        "polish",
        3_000,
    );
    let merge_commit = commit_on(
        &upstream,
        "refs/heads/develop",
        Some(root),
        "Merge ABC-123 into develop",
        2_500,
    );

    let superproject = Repository::init(&super_path).unwrap();
    {
        let mut config = superproject.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    superproject
        .remote("origin", "https://example.com/super.git")
        .unwrap();
    let initial = commit_on(&superproject, "HEAD", None, "initial", 1_000);

    let mut submodule = superproject
        .submodule(
            upstream_path.to_str().unwrap(),
            Path::new("libs/core"),
            true,
        )
        .unwrap();
    submodule.clone(None).unwrap();
    submodule.add_finalize().unwrap();
    let with_submodule = commit_on(
        &superproject,
        "HEAD",
        Some(initial),
        "add libs/core",
        1_500,
    );

    let head = superproject.find_commit(with_submodule).unwrap();
    superproject
        .branch("feature/ABC-123-thing", &head, false)
        .unwrap();
    superproject
        .set_head("refs/heads/feature/ABC-123-thing")
        .unwrap();

    Fixture {
        _dir: dir,
        super_path,
        root,
        ticket_commit,
        merge_commit,
    }
}

fn repo_config() -> RepoConfig {
    RepoConfig {
        remote: "origin".to_string(),
        ticket_structure: r"feature/(\w+-\d+)".to_string(),
        default_branch: "develop".to_string(),
        version_config: VersionConfig {
            version_string_match: r#"version = "([\d.]+)""#.to_string(),
            file: "unused".into(),
        },
        commit_messages: CommitMessages {
            update_submodule: "{ticket_id}: update submodule".to_string(),
        },
    }
}

fn pinned_in_head(super_path: &Path) -> Oid {
    let repo = Repository::open(super_path).unwrap();
    let tree = repo.head().unwrap().peel_to_tree().unwrap();
    tree.get_path(Path::new("libs/core")).unwrap().id()
}

#[test]
fn test_git2_lists_submodule_and_remote_refs() {
    let fixture = build_fixture();
    let repo = Git2Repository::open(&fixture.super_path).unwrap();

    assert_eq!(repo.active_branch().unwrap(), "feature/ABC-123-thing");

    let submodules = repo.submodules().unwrap();
    assert_eq!(submodules.len(), 1);
    assert_eq!(submodules[0].path, "libs/core");
    assert_eq!(submodules[0].pinned, Some(fixture.root));

    repo.fetch_submodule_remote(&submodules[0], "origin").unwrap();
    let refs = repo.submodule_remote_refs(&submodules[0], "origin").unwrap();
    assert!(refs.contains(&"origin/develop".to_string()));
    assert!(refs.contains(&"origin/feature/ABC-123".to_string()));
    assert!(!refs.iter().any(|name| name.ends_with("/HEAD")));
}

#[test]
fn test_feature_branch_mode_pins_nearest_ticket_commit() {
    let fixture = build_fixture();
    let repo = Git2Repository::open(&fixture.super_path).unwrap();
    let config = repo_config();
    let args = WorkflowArgs {
        mode: ResolutionMode::FeatureBranch,
        ..WorkflowArgs::default()
    };

    let result = run_workflow(&args, &repo, &config).unwrap();

    assert_eq!(result.submodules.len(), 1);
    assert_eq!(result.submodules[0].decision.commit(), fixture.ticket_commit);
    assert!(result.submodules[0].commit_created.is_some());
    assert_eq!(pinned_in_head(&fixture.super_path), fixture.ticket_commit);

    let raw = Repository::open(&fixture.super_path).unwrap();
    let head = raw.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.message(), Some("ABC-123: update submodule"));
    assert_eq!(head.parent_count(), 1);

    // Second run finds the pin already in place and commits nothing.
    let again = run_workflow(&args, &repo, &config).unwrap();
    assert_eq!(
        again.submodules[0].decision,
        UpdateDecision::UpToDate {
            commit: fixture.ticket_commit
        }
    );
    let head_after = raw.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head_after.id(), head.id());
}

#[test]
fn test_default_branch_mode_pins_ticket_commit_on_develop() {
    let fixture = build_fixture();
    let repo = Git2Repository::open(&fixture.super_path).unwrap();
    let config = repo_config();

    let result = run_workflow(&WorkflowArgs::default(), &repo, &config).unwrap();

    assert_eq!(result.submodules[0].decision.commit(), fixture.merge_commit);
    assert_eq!(pinned_in_head(&fixture.super_path), fixture.merge_commit);
}

#[test]
fn test_pinning_leaves_dirty_submodule_worktree_alone() {
    let fixture = build_fixture();
    let sub_path = fixture.super_path.join("libs/core");
    std::fs::write(sub_path.join("lib.txt"), "work in progress\n").unwrap();
    {
        let sub_repo = Repository::open(&sub_path).unwrap();
        let mut index = sub_repo.index().unwrap();
        index.add_path(Path::new("lib.txt")).unwrap();
        index.write().unwrap();
    }

    let repo = Git2Repository::open(&fixture.super_path).unwrap();
    let args = WorkflowArgs {
        mode: ResolutionMode::FeatureBranch,
        ..WorkflowArgs::default()
    };
    let result = run_workflow(&args, &repo, &repo_config()).unwrap();

    assert!(result.submodules[0].commit_created.is_some());
    assert_eq!(pinned_in_head(&fixture.super_path), fixture.ticket_commit);

    // The submodule checkout is exactly as the user left it
    assert_eq!(
        std::fs::read_to_string(sub_path.join("lib.txt")).unwrap(),
        "work in progress\n"
    );
    let sub_repo = Repository::open(&sub_path).unwrap();
    assert_eq!(sub_repo.head().unwrap().target(), Some(fixture.root));
    assert!(sub_repo
        .index()
        .unwrap()
        .get_path(Path::new("lib.txt"), 0)
        .is_some());
}
