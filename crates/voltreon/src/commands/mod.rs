//! Command implementations that work outside an opened workspace.

pub mod init;
