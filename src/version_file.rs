//! Transactional version bump inside a tracked file.
//!
//! The file is read completely, every line is transformed in memory, and only then
//! is the result written back through a temporary file that replaces the target in
//! one rename. Any failure after the read restores the original content, so an
//! aborted run never leaves a half-written file behind.

use regex::Regex;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::VersionConfig;
use crate::domain::{DottedVersion, VersionPart};
use crate::error::{GitAutomatonError, Result};

/// One replaced version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    /// 1-based line number
    pub line: usize,
    pub old: String,
    pub new: String,
}

/// Bumps the version string configured in a [VersionConfig]
pub struct VersionBumper<'a> {
    config: &'a VersionConfig,
}

impl<'a> VersionBumper<'a> {
    pub fn new(config: &'a VersionConfig) -> Self {
        VersionBumper { config }
    }

    /// Compute the changes a bump would make without touching the file
    pub fn preview(&self, part: VersionPart) -> Result<Vec<VersionChange>> {
        let original = read_file(&self.config.file)?;
        let (_, changes) = rewrite_versions(&original, &self.config.version_string_match, part)?;
        Ok(changes)
    }

    /// Increment `part` of every matching version string and write the file back
    ///
    /// A file without any match is written back unchanged.
    ///
    /// # Returns
    /// * `Ok(true)` - File written
    /// * `Err` - Regex, version format or I/O error; the file content is unchanged
    pub fn bump(&self, part: VersionPart) -> Result<bool> {
        self.apply(part).map(|_| true)
    }

    /// Same as [VersionBumper::bump], returning the replaced version strings
    pub fn apply(&self, part: VersionPart) -> Result<Vec<VersionChange>> {
        let mut transaction = FileTransaction::begin(&self.config.file)?;

        let rewritten =
            rewrite_versions(transaction.original(), &self.config.version_string_match, part);
        let (content, changes) = match rewritten {
            Ok(result) => result,
            Err(e) => {
                transaction.rollback();
                return Err(e);
            }
        };

        transaction.commit(&content)?;

        if changes.is_empty() {
            log::info!(
                "No version string matched in {}",
                self.config.file.display()
            );
        }
        for change in &changes {
            log::info!(
                "{}:{}: {} -> {}",
                self.config.file.display(),
                change.line,
                change.old,
                change.new
            );
        }
        Ok(changes)
    }
}

/// Rewrite every line whose first match of `pattern` captures a dotted version
///
/// Only the captured substring is replaced; the rest of the line and its line
/// terminator are kept byte for byte.
pub fn rewrite_versions(
    content: &str,
    pattern: &str,
    part: VersionPart,
) -> Result<(String, Vec<VersionChange>)> {
    let regex = Regex::new(pattern)?;
    if regex.captures_len() < 2 {
        return Err(GitAutomatonError::version_format(format!(
            "Version pattern '{}' has no capture group",
            pattern
        )));
    }

    let mut output = String::with_capacity(content.len());
    let mut changes = Vec::new();

    for (index, raw_line) in content.split_inclusive('\n').enumerate() {
        let (line, ending) = split_line_ending(raw_line);

        match regex.captures(line).and_then(|caps| caps.get(1)) {
            Some(version) => {
                let bumped = DottedVersion::parse(version.as_str())?.bump(part)?.to_string();
                output.push_str(&line[..version.start()]);
                output.push_str(&bumped);
                output.push_str(&line[version.end()..]);
                changes.push(VersionChange {
                    line: index + 1,
                    old: version.as_str().to_string(),
                    new: bumped,
                });
            }
            None => output.push_str(line),
        }
        output.push_str(ending);
    }

    Ok((output, changes))
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(stripped) = line.strip_suffix("\r\n") {
        (stripped, "\r\n")
    } else if let Some(stripped) = line.strip_suffix('\n') {
        (stripped, "\n")
    } else {
        (line, "")
    }
}

/// Replace `path` with `content` via a sibling temp file and a rename
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content.as_bytes())?;
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| GitAutomatonError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Read-all / write-all transaction over a single file
struct FileTransaction {
    path: PathBuf,
    original: String,
    dirty: bool,
}

impl FileTransaction {
    /// Read the full original content; a failed read leaves nothing to restore
    fn begin(path: &Path) -> Result<Self> {
        let original = read_file(path)?;
        Ok(FileTransaction {
            path: path.to_path_buf(),
            original,
            dirty: false,
        })
    }

    fn original(&self) -> &str {
        &self.original
    }

    fn commit(&mut self, content: &str) -> Result<()> {
        self.commit_with(content, write_atomic)
    }

    fn commit_with<W>(&mut self, content: &str, write: W) -> Result<()>
    where
        W: FnOnce(&Path, &str) -> io::Result<()>,
    {
        self.dirty = true;
        if let Err(source) = write(&self.path, content) {
            self.rollback();
            return Err(GitAutomatonError::FileWrite {
                path: self.path.clone(),
                source,
            });
        }
        self.dirty = false;
        Ok(())
    }

    /// Restore the original content if a write was attempted
    fn rollback(&mut self) {
        if !self.dirty {
            log::debug!("{} untouched, nothing to restore", self.path.display());
            return;
        }

        match write_atomic(&self.path, &self.original) {
            Ok(()) => {
                self.dirty = false;
                log::warn!("Restored original content of {}", self.path.display());
            }
            Err(e) => log::error!(
                "Failed to restore original content of {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
