use std::path::PathBuf;

use thiserror::Error;

/// Maximum number of alternatives listed in a diagnostic.
pub const MAX_LISTED_NAMES: usize = 5;

/// Unified error type for git-automaton operations
#[derive(Error, Debug)]
pub enum GitAutomatonError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("There is no profile called '{name}', possible values are: {}", list_names(.available))]
    UnknownProfile { name: String, available: Vec<String> },

    #[error("There is no remote called '{name}', possible values are: {}", list_names(.available))]
    UnknownRemote { name: String, available: Vec<String> },

    #[error("There is no default branch with the name '{name}', possible branches are: {}", list_names(.available))]
    UnknownDefaultBranch { name: String, available: Vec<String> },

    #[error("Branch '{branch}' is not a feature branch or the ticket structure is invalid")]
    MissingTicket { branch: String },

    #[error("No branch or commit found for ticket '{ticket}' in submodule '{submodule}'")]
    TicketNotFound { ticket: String, submodule: String },

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Version format error: {0}")]
    VersionFormat(String),

    #[error("error writing file {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in git-automaton
pub type Result<T> = std::result::Result<T, GitAutomatonError>;

impl GitAutomatonError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitAutomatonError::Config(msg.into())
    }

    /// Create a version format error with context
    pub fn version_format(msg: impl Into<String>) -> Self {
        GitAutomatonError::VersionFormat(msg.into())
    }

    pub fn unknown_remote(name: impl Into<String>, available: &[String]) -> Self {
        GitAutomatonError::UnknownRemote {
            name: name.into(),
            available: first_names(available),
        }
    }

    pub fn unknown_default_branch(name: impl Into<String>, available: &[String]) -> Self {
        GitAutomatonError::UnknownDefaultBranch {
            name: name.into(),
            available: first_names(available),
        }
    }

    pub fn unknown_profile(name: impl Into<String>, available: &[String]) -> Self {
        GitAutomatonError::UnknownProfile {
            name: name.into(),
            available: first_names(available),
        }
    }
}

fn first_names(names: &[String]) -> Vec<String> {
    names.iter().take(MAX_LISTED_NAMES).cloned().collect()
}

fn list_names(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
