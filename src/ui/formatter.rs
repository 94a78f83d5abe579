//! Pure formatting functions for UI output.
//!
//! Status lines are advisory text for humans; nothing here is meant to be parsed.

use console::style;
use git2::Oid;

use crate::resolver::UpdateDecision;
use crate::version_file::VersionChange;

/// Shorten a commit id for display.
pub fn short_id(oid: Oid) -> String {
    let full = oid.to_string();
    full[..7.min(full.len())].to_string()
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print the remote in use and the branch/ticket pair.
pub fn display_context(remote: &str, branch: &str, ticket: &str) {
    display_status(&format!("Using remote: {}", style(remote).cyan()));
    display_status(&format!(
        "Current Branch: {}, ticket: {}",
        style(branch).bold(),
        style(ticket).bold()
    ));
}

/// Format the decision taken for one submodule.
pub fn format_decision(submodule: &str, decision: &UpdateDecision) -> String {
    match decision {
        UpdateDecision::UpToDate { .. } => {
            format!("Submodule {} is already up to date", submodule)
        }
        UpdateDecision::Update {
            commit, source_ref, ..
        } => format!(
            "Updating submodule {} to SHA: {} (from {})",
            submodule,
            short_id(*commit),
            source_ref
        ),
    }
}

/// Print the decision taken for one submodule.
///
/// # Arguments
/// * `submodule` - Submodule name
/// * `decision` - Resolved decision
/// * `dry_run` - Whether the update is only previewed
pub fn display_decision(submodule: &str, decision: &UpdateDecision, dry_run: bool) {
    let line = format_decision(submodule, decision);
    if !decision.needs_update() {
        display_success(&line);
    } else if dry_run {
        display_status(&format!("[dry run] {}", line));
    } else {
        display_status(&line);
    }
}

/// Format the confirmation for a pin commit that was created.
pub fn format_pinned(submodule: &str, pinned: Oid, commit: Oid) -> String {
    format!(
        "Pinned submodule {} at {} in commit {}",
        submodule,
        short_id(pinned),
        short_id(commit)
    )
}

/// Print the confirmation once the pin commit exists.
pub fn display_pinned(submodule: &str, pinned: Oid, commit: Oid) {
    display_success(&format_pinned(submodule, pinned, commit));
}

/// Print version string changes.
pub fn display_version_changes(file: &str, changes: &[VersionChange], dry_run: bool) {
    if changes.is_empty() {
        display_status(&format!("No version string found in {}", file));
        return;
    }

    let prefix = if dry_run { "[dry run] " } else { "" };
    for change in changes {
        println!(
            "  {}{}:{}  {} -> {}",
            prefix,
            file,
            change.line,
            style(&change.old).red(),
            style(&change.new).green()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        let oid = Oid::from_str("0123456789abcdef0123456789abcdef01234567").unwrap();
        assert_eq!(short_id(oid), "0123456");
    }

    #[test]
    fn test_format_decision() {
        let oid = Oid::from_str("abcdef0123456789abcdef0123456789abcdef01").unwrap();
        let update = UpdateDecision::Update {
            commit: oid,
            source_ref: "origin/feature/ABC-1".to_string(),
            message: "ABC-1: update submodule".to_string(),
        };
        assert_eq!(
            format_decision("libs/core", &update),
            "Updating submodule libs/core to SHA: abcdef0 (from origin/feature/ABC-1)"
        );

        let same = UpdateDecision::UpToDate { commit: oid };
        assert_eq!(
            format_decision("libs/core", &same),
            "Submodule libs/core is already up to date"
        );
    }

    #[test]
    fn test_format_pinned() {
        let pinned = Oid::from_str("abcdef0123456789abcdef0123456789abcdef01").unwrap();
        let commit = Oid::from_str("1234567890abcdef1234567890abcdef12345678").unwrap();
        assert_eq!(
            format_pinned("libs/core", pinned, commit),
            "Pinned submodule libs/core at abcdef0 in commit 1234567"
        );
    }

    #[test]
    fn test_display_error() {
        // Visual verification test - output is printed to stderr
        display_error("test error");
    }
}
