//! `${VAR}` expansion for string values read from `cad.toml`.
//!
//! Credentials are usually kept out of the config file, so every string
//! field of the `[intuit]` section goes through [`expand_env`] after parsing.

use crate::ConfigError;

/// Variable that was referenced but is not set in the environment.
struct UnsetVar(String);

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// A bare `$VAR` is left untouched, which keeps literal dollar signs in
/// secrets intact. `field` names the config key for error reporting.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| -> Result<Option<String>, UnsetVar> {
        std::env::var(name)
            .map(Some)
            .map_err(|_| UnsetVar(name.to_owned()))
    };

    match shellexpand::env_with_context(value, lookup) {
        Ok(expanded) => Ok(expanded.into_owned()),
        Err(err) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} is not set", err.cause.0),
        }),
    }
}
