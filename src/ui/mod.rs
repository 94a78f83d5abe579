//! User interface module - console output for the run.
//!
//! All output goes through `formatter`; the tool never prompts.

pub mod formatter;

pub use formatter::{
    display_context, display_decision, display_error, display_pinned, display_status,
    display_success, display_version_changes, format_decision, format_pinned, short_id,
};
