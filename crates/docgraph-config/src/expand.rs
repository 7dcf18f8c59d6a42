//! `${VAR}` expansion for configuration strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Reads variables from the process environment.
pub(crate) fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Marker cause for a variable the lookup does not know.
struct Unset;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// Strings without `${` are returned as is, so a bare `$` in a path is never
/// treated as a reference. `field` names the config key in errors. Variables
/// are resolved through `lookup`.
pub(crate) fn expand_vars<F>(value: &str, field: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| lookup(var).map(Some).ok_or(Unset))
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}
