//! CLI command implementations

pub mod exec;
pub mod install;
pub mod ready;
pub mod resolve;
pub mod status;
