//! `${VAR}` expansion for configuration strings.
//!
//! Only braced references are recognized: `${VAR}` errors when unset,
//! `${VAR:-default}` falls back. Bare `$VAR` and plain strings pass through
//! untouched.

use std::env::VarError;

use crate::ConfigError;

/// Expand environment variable references in a config value.
///
/// `field` names the originating config key so the error points at the right
/// line of the file.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded =
        shellexpand::env_with_context(value, lookup).map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("environment variable {} is not set", e.var_name),
        })?;
    Ok(expanded.into_owned())
}

fn lookup(var: &str) -> Result<Option<String>, VarError> {
    std::env::var(var).map(Some)
}
