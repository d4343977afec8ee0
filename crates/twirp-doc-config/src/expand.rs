//! `${VAR}` references in `docs.base_url`.

use std::env;

use crate::ConfigError;

/// Substitute `${VAR}` and `${VAR:-default}` in `value`.
///
/// Strings without `${` are returned as is, so a `$` inside a URL path
/// needs no escaping.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |var: &str| env::var(var).map(Some);
    match shellexpand::env_with_context(value, lookup) {
        Ok(expanded) => Ok(expanded.into_owned()),
        Err(err) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}}: {}", err.var_name, err.cause),
        }),
    }
}
