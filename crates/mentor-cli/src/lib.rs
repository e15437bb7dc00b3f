//! HackMentor command-line client.
//!
//! `mentor serve` runs the API; the other subcommands talk to it.

pub mod cli;
pub mod commands;
pub mod watch;
