use crate::error::{GitAutomatonError, Result};
use std::fmt;

/// Component of a dotted version to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPart {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionPart::Major => "major",
            VersionPart::Minor => "minor",
            VersionPart::Patch => "patch",
        };
        f.write_str(name)
    }
}

/// Dotted numeric version with one to three components ("3", "3.3", "3.3.1")
///
/// Absent trailing components stay absent when the version is bumped and printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DottedVersion {
    pub major: Option<u32>,
    pub minor: Option<u32>,
    pub patch: Option<u32>,
}

impl DottedVersion {
    /// Parse a captured version string
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() > 3 {
            return Err(GitAutomatonError::version_format(format!(
                "Invalid version format: '{}' - expected at most three components",
                text
            )));
        }

        let mut components = [None; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            let value = part.parse::<u32>().map_err(|_| {
                GitAutomatonError::version_format(format!(
                    "Invalid version component '{}' in '{}'",
                    part, text
                ))
            })?;
            *slot = Some(value);
        }

        Ok(DottedVersion {
            major: components[0],
            minor: components[1],
            patch: components[2],
        })
    }

    /// Increment exactly one component by 1
    ///
    /// Lower-order components are left as they are.
    pub fn bump(&self, part: VersionPart) -> Result<Self> {
        let mut bumped = *self;
        let slot = match part {
            VersionPart::Major => &mut bumped.major,
            VersionPart::Minor => &mut bumped.minor,
            VersionPart::Patch => &mut bumped.patch,
        };

        let current = slot.ok_or_else(|| {
            GitAutomatonError::version_format(format!(
                "Version '{}' has no {} component",
                self, part
            ))
        })?;
        let next = current.checked_add(1).ok_or_else(|| {
            GitAutomatonError::version_format(format!(
                "Cannot bump {} component of '{}': overflow",
                part, self
            ))
        })?;
        *slot = Some(next);

        Ok(bumped)
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present: Vec<String> = [self.major, self.minor, self.patch]
            .iter()
            .flatten()
            .map(|c| c.to_string())
            .collect();
        f.write_str(&present.join("."))
    }
}
