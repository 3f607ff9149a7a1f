//! Environment configuration helpers
//!
//! API keys and model names live in a `.env` file next to the binary, the
//! same file the crew reads. These helpers load it once and read typed
//! values with defaults.

use std::str::FromStr;

/// Load variables from a `.env` file in the working directory or its parents
///
/// Returns `true` when a file was found. A missing file is not an error:
/// the process environment alone is a valid configuration.
pub fn load_env() -> bool {
    match dotenv::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env file");
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "no .env file loaded");
            false
        }
    }
}

/// Read an environment variable, falling back to `default` when unset or blank
pub fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Read and parse an environment variable
///
/// Returns `Ok(None)` when the variable is unset or blank, and `Err` with a
/// readable message when it is set but does not parse.
pub fn env_parse<T>(key: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("{key}={value:?} is invalid: {e}")),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable name; tests run in parallel threads.

    #[test]
    fn test_env_or_default_when_unset() {
        assert_eq!(env_or("AGENT_UTILS_TEST_UNSET_VAR", "fallback"), "fallback");
    }

    #[test]
    fn test_env_parse_unset_is_none() {
        let parsed: Result<Option<u32>, String> = env_parse("AGENT_UTILS_TEST_UNSET_NUMBER");
        assert_eq!(parsed, Ok(None));
    }

    #[test]
    fn test_env_parse_invalid_reports_key() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("AGENT_UTILS_TEST_BAD_NUMBER", "abc") };
        let parsed: Result<Option<u32>, String> = env_parse("AGENT_UTILS_TEST_BAD_NUMBER");
        let err = parsed.unwrap_err();
        assert!(err.contains("AGENT_UTILS_TEST_BAD_NUMBER"));
    }

    #[test]
    fn test_env_parse_valid() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("AGENT_UTILS_TEST_GOOD_NUMBER", " 42 ") };
        let parsed: Result<Option<u32>, String> = env_parse("AGENT_UTILS_TEST_GOOD_NUMBER");
        assert_eq!(parsed, Ok(Some(42)));
    }
}
