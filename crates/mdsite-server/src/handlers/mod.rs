//! HTTP request handlers.

pub(crate) mod assets;
pub(crate) mod docs;
pub(crate) mod manifest;
