//! Subcommand implementations.

pub mod completion;
pub mod extract;
pub mod list;
pub mod verify;
