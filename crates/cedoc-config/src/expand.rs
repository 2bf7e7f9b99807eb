//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Values without `${` are returned unchanged, so bare `$` in URLs survives.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        std::env::var(var).map(Some).map_err(|_| LookupError {
            var_name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_origin_with_port() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CEDOC_TEST_HOST", "docs.local");
            std::env::set_var("CEDOC_TEST_PORT", "8080");
        }
        let result = expand_env("http://${CEDOC_TEST_HOST}:${CEDOC_TEST_PORT}", "site.origin");
        assert_eq!(result.unwrap(), "http://docs.local:8080");
        unsafe {
            std::env::remove_var("CEDOC_TEST_HOST");
            std::env::remove_var("CEDOC_TEST_PORT");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CEDOC_TEST_UNSET");
        }
        let result = expand_env("${CEDOC_TEST_UNSET:-https://godbolt.org}", "explorer.url");
        assert_eq!(result.unwrap(), "https://godbolt.org");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CEDOC_TEST_MISSING");
        }
        let err = expand_env("${CEDOC_TEST_MISSING}", "site.origin").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("CEDOC_TEST_MISSING"));
        assert!(err.to_string().contains("site.origin"));
    }

    #[test]
    fn test_bare_dollar_unchanged() {
        let result = expand_env("https://godbolt.org/$share", "explorer.url").unwrap();
        assert_eq!(result, "https://godbolt.org/$share");
    }
}
