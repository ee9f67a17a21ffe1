//! Outcomes the storage layer reports as values rather than errors.
//! Errors are reserved for faults: I/O, corrupt rows, poisoned locks.

use squawk_types::models::{User, Vote};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(User),
    UsernameTaken,
    EmailTaken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded(Vote),
    AlreadyVoted,
    UnknownPost,
}
