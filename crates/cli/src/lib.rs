//! `lkns`: config-driven entity resolution (dedup + record linkage).
//!
//! The binary is a thin shell over [`run`]: all command logic lives in the
//! library so integration tests can drive it directly.

pub mod exit_codes;
pub mod run;

pub use run::{cmd_run, cmd_validate, CliError};
