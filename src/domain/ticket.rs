use regex::Regex;
use std::fmt;

/// Ticket identifier extracted from a branch name (e.g. "ABC-123")
///
/// Opaque: the only operation the resolver needs is substring containment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketId(String);

impl TicketId {
    pub fn new(id: impl Into<String>) -> Self {
        TicketId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether `text` mentions this ticket
    pub fn is_mentioned_in(&self, text: &str) -> bool {
        text.contains(&self.0)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts ticket ids from branch names using the configured ticket structure
#[derive(Debug, Clone)]
pub struct TicketExtractor {
    regex: Regex,
}

impl TicketExtractor {
    /// Compile a ticket structure pattern
    ///
    /// # Returns
    /// * `Ok(TicketExtractor)` - Pattern compiled successfully
    /// * `Err` - If the pattern is not a valid regular expression
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(TicketExtractor {
            regex: Regex::new(pattern)?,
        })
    }

    /// Return the first capture group of the first match in `branch`
    ///
    /// `None` means "not on a ticket branch", which is an expected outcome.
    /// A pattern without capture groups never yields a ticket.
    pub fn extract(&self, branch: &str) -> Option<TicketId> {
        self.regex
            .captures(branch)
            .and_then(|caps| caps.get(1))
            .map(|m| TicketId::new(m.as_str()))
    }
}

/// Extract a ticket id from `branch` with the given pattern
///
/// An invalid pattern yields `None` just like a non-matching branch; callers that
/// require a ticket decide whether absence is fatal.
pub fn extract_ticket(pattern: &str, branch: &str) -> Option<TicketId> {
    match TicketExtractor::new(pattern) {
        Ok(extractor) => extractor.extract(branch),
        Err(e) => {
            log::warn!("Ticket structure '{}' is not a valid pattern: {}", pattern, e);
            None
        }
    }
}
