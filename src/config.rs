use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::TicketId;
use crate::error::{GitAutomatonError, Result};

/// File names looked up in the repository root when no config path is given.
pub const REPO_CONFIG_FILES: [&str; 3] = ["gitauto.yaml", "gitauto.yml", "gitauto.toml"];

/// Placeholder substituted with the ticket id in commit message templates.
pub const TICKET_PLACEHOLDER: &str = "{ticket_id}";

/// Represents a complete configuration file: one entry per profile.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub config: BTreeMap<String, ProfileData>,
}

/// Raw, unvalidated settings of a single profile as written in the file.
#[derive(Debug, Deserialize, Clone)]
pub struct ProfileData {
    #[serde(default)]
    pub remote: String,

    #[serde(default)]
    pub ticket_structure: String,

    #[serde(default = "default_branch")]
    pub default_branch: String,

    #[serde(default)]
    pub versioning: VersioningData,

    #[serde(default)]
    pub commit_messages: CommitMessagesData,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct VersioningData {
    #[serde(default)]
    pub file: String,

    #[serde(default)]
    pub version_string_match: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommitMessagesData {
    #[serde(default = "default_update_submodule_message")]
    pub update_submodule: String,
}

impl Default for CommitMessagesData {
    fn default() -> Self {
        CommitMessagesData {
            update_submodule: default_update_submodule_message(),
        }
    }
}

fn default_branch() -> String {
    "develop".to_string()
}

fn default_update_submodule_message() -> String {
    format!("{}: update submodule", TICKET_PLACEHOLDER)
}

/// Resolved configuration of the active profile.
///
/// Immutable once resolved; every field is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoConfig {
    pub remote: String,
    pub ticket_structure: String,
    pub default_branch: String,
    pub version_config: VersionConfig,
    pub commit_messages: CommitMessages,
}

/// Where the version string lives and how to find it.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionConfig {
    /// Pattern whose first capture group holds the dotted version
    pub version_string_match: String,
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitMessages {
    pub update_submodule: String,
}

impl CommitMessages {
    /// Render the submodule update message for `ticket`
    pub fn render_update_submodule(&self, ticket: &TicketId) -> String {
        self.update_submodule
            .replace(TICKET_PLACEHOLDER, ticket.as_str())
    }
}

/// Resolves the configuration of `profile` from loaded file data.
///
/// Pure: no I/O. The version file path is joined onto `repo_path`.
///
/// # Returns
/// * `Ok(RepoConfig)` - Profile exists and all required fields are non-empty
/// * `Err` - Unknown profile or an empty required field
pub fn resolve_config(data: &ConfigFile, profile: &str, repo_path: &Path) -> Result<RepoConfig> {
    let profile_data = data.config.get(profile).ok_or_else(|| {
        let available: Vec<String> = data.config.keys().cloned().collect();
        GitAutomatonError::unknown_profile(profile, &available)
    })?;

    let required = [
        ("remote", &profile_data.remote),
        ("ticket_structure", &profile_data.ticket_structure),
        ("default_branch", &profile_data.default_branch),
        ("versioning.file", &profile_data.versioning.file),
        (
            "versioning.version_string_match",
            &profile_data.versioning.version_string_match,
        ),
        (
            "commit_messages.update_submodule",
            &profile_data.commit_messages.update_submodule,
        ),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(GitAutomatonError::config(format!(
                "Profile '{}' is missing required field '{}'",
                profile, field
            )));
        }
    }

    Ok(RepoConfig {
        remote: profile_data.remote.clone(),
        ticket_structure: profile_data.ticket_structure.clone(),
        default_branch: profile_data.default_branch.clone(),
        version_config: VersionConfig {
            version_string_match: profile_data.versioning.version_string_match.clone(),
            file: repo_path.join(&profile_data.versioning.file),
        },
        commit_messages: CommitMessages {
            update_submodule: profile_data.commit_messages.update_submodule.clone(),
        },
    })
}

/// Parses configuration text; TOML when `path` ends in `.toml`, YAML otherwise.
pub fn parse_config(contents: &str, path: &Path) -> Result<ConfigFile> {
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let config = if is_toml {
        toml::from_str(contents)?
    } else {
        serde_yaml::from_str(contents)?
    };
    Ok(config)
}

/// Locates the configuration file to use.
///
/// Lookup order:
/// 1. Custom path provided as parameter
/// 2. `gitauto.yaml`, `gitauto.yml` or `gitauto.toml` in the repository root
/// 3. `git-automaton/config.yaml` in the user config directory
pub fn find_config_path(config_path: Option<&Path>, repo_path: &Path) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    if let Some(found) = REPO_CONFIG_FILES
        .iter()
        .map(|name| repo_path.join(name))
        .find(|candidate| candidate.is_file())
    {
        return Some(found);
    }

    dirs::config_dir()
        .map(|dir| dir.join("git-automaton").join("config.yaml"))
        .filter(|candidate| candidate.is_file())
}

/// Loads the configuration file.
///
/// # Returns
/// * `Ok(ConfigFile)` - Parsed configuration
/// * `Err` - No file found, or the file cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, repo_path: &Path) -> Result<ConfigFile> {
    let path = find_config_path(config_path, repo_path).ok_or_else(|| {
        GitAutomatonError::config(format!(
            "No configuration file found (looked for {} in {})",
            REPO_CONFIG_FILES.join(", "),
            repo_path.display()
        ))
    })?;

    log::debug!("Loading configuration from {}", path.display());
    let contents = fs::read_to_string(&path)?;
    parse_config(&contents, &path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
config:
  default:
    remote: origin
    ticket_structure: 'feature/(\w+-\d+)'
    default_branch: develop
    versioning:
      file: conanfile.py
      version_string_match: 'version = "(\d+\.\d+\.\d+)"'
    commit_messages:
      update_submodule: '{ticket_id}: update submodule'
  release:
    remote: upstream
    ticket_structure: 'release/(\d+)'
    versioning:
      file: VERSION
      version_string_match: '(\d+\.\d+)'
"#;

    fn yaml_config() -> ConfigFile {
        parse_config(YAML, Path::new("gitauto.yaml")).unwrap()
    }

    #[test]
    fn test_resolve_default_profile() {
        let config = resolve_config(&yaml_config(), "default", Path::new("/repo")).unwrap();
        assert_eq!(config.remote, "origin");
        assert_eq!(config.ticket_structure, r"feature/(\w+-\d+)");
        assert_eq!(config.default_branch, "develop");
        assert_eq!(
            config.version_config.file,
            PathBuf::from("/repo/conanfile.py")
        );
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let config = resolve_config(&yaml_config(), "release", Path::new("/repo")).unwrap();
        assert_eq!(config.default_branch, "develop");
        assert_eq!(
            config.commit_messages.update_submodule,
            "{ticket_id}: update submodule"
        );
    }

    #[test]
    fn test_resolve_unknown_profile() {
        let err = resolve_config(&yaml_config(), "nightly", Path::new("/repo")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nightly"));
        assert!(msg.contains("default, release"));
    }

    #[test]
    fn test_resolve_rejects_empty_field() {
        let mut data = yaml_config();
        data.config.get_mut("default").unwrap().remote = "  ".to_string();

        let err = resolve_config(&data, "default", Path::new("/repo")).unwrap_err();
        assert!(err.to_string().contains("'remote'"));
    }

    #[test]
    fn test_render_update_submodule() {
        let messages = CommitMessages {
            update_submodule: "{ticket_id}: bump deps ({ticket_id})".to_string(),
        };
        assert_eq!(
            messages.render_update_submodule(&TicketId::new("ABC-1")),
            "ABC-1: bump deps (ABC-1)"
        );
    }

    #[test]
    fn test_parse_toml() {
        let toml_content = r#"
[config.default]
remote = "origin"
ticket_structure = 'feature/(\w+-\d+)'

[config.default.versioning]
file = "Cargo.toml"
version_string_match = '^version = "([\d.]+)"'
"#;
        let data = parse_config(toml_content, Path::new("gitauto.toml")).unwrap();
        let config = resolve_config(&data, "default", Path::new(".")).unwrap();
        assert_eq!(config.remote, "origin");
        assert_eq!(config.version_config.file, PathBuf::from("./Cargo.toml"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(parse_config("config: [unclosed", Path::new("x.yaml")).is_err());
    }
}
