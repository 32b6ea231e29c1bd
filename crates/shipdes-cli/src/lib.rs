//! Ship design CLI library.
//!
//! Subcommand handlers, output formatting and terminal styling for the
//! `shipdes` binary.

pub mod commands;
pub mod logging;
pub mod output;
pub mod terminal;
