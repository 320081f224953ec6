//! Conversion orchestration for RGSS game projects: project directory
//! layout, staleness checks, batch backup/rollback and the CLI commands
//! built on top of the codec crates.

pub mod batch;
pub mod commands;
pub mod convert;
pub mod project;
