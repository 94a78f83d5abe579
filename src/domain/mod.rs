//! Domain logic - pure rules independent of git operations

pub mod candidate;
pub mod ticket;
pub mod version;

pub use candidate::{select_latest, SubmoduleCandidate};
pub use ticket::{extract_ticket, TicketExtractor, TicketId};
pub use version::{DottedVersion, VersionPart};
