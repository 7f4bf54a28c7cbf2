//! Retry classification for failed operations.
//!
//! This only answers "may the caller try again". Attempt counting and backoff
//! belong to the caller, bounded by [`MongoConfig::max_retry`](crate::MongoConfig::max_retry).
//!
//! ```rust
//! use mongokit_config::{MongoError, should_retry};
//!
//! assert!(!should_retry(&MongoError::command(13, "Unauthorized", "not authorized")));
//! assert!(should_retry(&MongoError::command(11600, "InterruptedAtShutdown", "shutting down")));
//! assert!(should_retry(&MongoError::Timeout(5000)));
//! ```

use mongodb::error::ErrorKind;

use crate::error::MongoError;

/// Server code for `Unauthorized`.
pub const UNAUTHORIZED: i32 = 13;

/// Server code for `AuthenticationFailed`.
pub const AUTHENTICATION_FAILED: i32 = 18;

/// Command codes that no amount of retrying will fix.
pub const FATAL_CODES: [i32; 2] = [UNAUTHORIZED, AUTHENTICATION_FAILED];

/// Whether a server command code marks a permanent failure.
pub fn is_fatal_code(code: i32) -> bool {
    FATAL_CODES.contains(&code)
}

/// Decide whether the operation that failed with `err` may be retried.
///
/// Command errors are retryable unless their code is fatal. Every other error
/// shape (network, timeout, driver internals) is treated as retryable.
pub fn should_retry(err: &MongoError) -> bool {
    match err {
        MongoError::Command { code, .. } => !is_fatal_code(*code),
        MongoError::Driver(inner) => should_retry_driver(inner),
        _ => true,
    }
}

/// Same as [`should_retry`], for callers holding a raw driver error.
pub fn should_retry_driver(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Command(cmd) => !is_fatal_code(cmd.code),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, from_document};
    use mongodb::error::CommandError;

    fn driver_command_error(code: i32, code_name: &str) -> mongodb::error::Error {
        let cmd: CommandError = from_document(doc! {
            "code": code,
            "codeName": code_name,
            "errmsg": "command failed",
        })
        .unwrap();
        mongodb::error::Error::from(ErrorKind::Command(cmd))
    }

    fn driver_timeout_error() -> mongodb::error::Error {
        std::io::Error::new(std::io::ErrorKind::TimedOut, "connection timed out").into()
    }

    #[test]
    fn test_fatal_codes_not_retried() {
        assert!(!should_retry(&MongoError::command(
            UNAUTHORIZED,
            "Unauthorized",
            "not authorized on admin"
        )));
        assert!(!should_retry(&MongoError::command(
            AUTHENTICATION_FAILED,
            "AuthenticationFailed",
            "auth failed"
        )));
    }

    #[test]
    fn test_other_codes_retried() {
        for code in [0, 6, 89, 91, 11600, 11602, -1] {
            let err = MongoError::command(code, "Other", "transient");
            assert!(should_retry(&err), "code {code} should be retryable");
        }
    }

    #[test]
    fn test_non_command_errors_retried() {
        assert!(should_retry(&MongoError::Timeout(5000)));
        assert!(should_retry(&MongoError::connection("connection reset by peer")));
        assert!(should_retry(&MongoError::config("database is required")));
    }

    #[test]
    fn test_is_retryable_matches_classifier() {
        let err = MongoError::command(18, "AuthenticationFailed", "auth failed");
        assert_eq!(err.is_retryable(), should_retry(&err));
        assert!(MongoError::Timeout(100).is_retryable());
    }

    #[test]
    fn test_is_fatal_code() {
        assert!(is_fatal_code(13));
        assert!(is_fatal_code(18));
        assert!(!is_fatal_code(11600));
    }

    #[test]
    fn test_driver_network_error_retried() {
        let err = driver_timeout_error();
        assert!(should_retry_driver(&err));

        let lifted = MongoError::from(err);
        assert!(matches!(lifted, MongoError::Driver(_)));
        assert_eq!(lifted.command_code(), None);
        assert!(should_retry(&lifted));
    }

    #[test]
    fn test_driver_command_error_lifted() {
        let err = driver_command_error(UNAUTHORIZED, "Unauthorized");
        assert!(!should_retry_driver(&err));

        let lifted = MongoError::from(err);
        assert_eq!(lifted.command_code(), Some(UNAUTHORIZED));
        assert!(matches!(
            &lifted,
            MongoError::Command { code_name, .. } if code_name == "Unauthorized"
        ));
        assert!(!should_retry(&lifted));
    }

    #[test]
    fn test_driver_command_error_other_code_retried() {
        let err = driver_command_error(11600, "InterruptedAtShutdown");
        assert!(should_retry_driver(&err));
        assert!(should_retry(&MongoError::from(err)));

        let err = driver_command_error(AUTHENTICATION_FAILED, "AuthenticationFailed");
        assert!(!should_retry_driver(&err));
        assert!(!should_retry(&MongoError::from(err)));
    }
}
