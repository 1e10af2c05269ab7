//! CLI command implementations.

mod build;
mod serve;

pub(crate) use build::BuildArgs;
pub(crate) use serve::ServeArgs;
