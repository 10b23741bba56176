//! Raw completion signals normalized into one result shape
//!
//! Helper binaries report structured failure through a text convention on
//! stdout (`ERROR:<message>`) because they run as best-effort one-shot
//! subprocesses; HTTP endpoints report through status codes; processes report
//! through exit codes. This module is the single place that absorbs the
//! impedance mismatch so every handler downstream sees one uniform shape.

use super::CommandResult;

/// Reserved prefix a helper uses to signal failure on stdout
pub const FAILURE_SENTINEL: &str = "ERROR:";

const DEFAULT_SUCCESS: &str = "Command completed";
const DEFAULT_FAILURE: &str = "Command failed";

/// Raw completion signal from one external invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSignal {
    /// Exited subprocess with captured streams
    Process {
        /// Exit status was zero
        success: bool,
        stdout: String,
        stderr: String,
    },
    /// Completed HTTP or WebSocket exchange
    Network {
        /// Response status was in the success range
        success: bool,
        body: String,
    },
}

/// Map a raw signal onto the uniform result shape.
///
/// Priority order: the failure sentinel wins over any exit code or status;
/// then the exit code / status decides; empty output falls back to a generic
/// description either way.
pub fn normalize(raw: RawSignal) -> CommandResult {
    match raw {
        RawSignal::Process {
            success,
            stdout,
            stderr,
        } => {
            let stdout = stdout.trim();
            if let Some(rest) = stdout.strip_prefix(FAILURE_SENTINEL) {
                return CommandResult::failure(rest.trim());
            }
            if success {
                CommandResult::success(if stdout.is_empty() {
                    DEFAULT_SUCCESS
                } else {
                    stdout
                })
            } else {
                let stderr = stderr.trim();
                CommandResult::failure(if stderr.is_empty() {
                    DEFAULT_FAILURE
                } else {
                    stderr
                })
            }
        }
        RawSignal::Network { success, body } => {
            let body = body.trim();
            if let Some(rest) = body.strip_prefix(FAILURE_SENTINEL) {
                return CommandResult::failure(rest.trim());
            }
            if success {
                CommandResult::success(if body.is_empty() { DEFAULT_SUCCESS } else { body })
            } else {
                CommandResult::failure(if body.is_empty() { DEFAULT_FAILURE } else { body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sentinel_overrides_successful_exit() {
        let result = normalize(RawSignal::Process {
            success: true,
            stdout: "ERROR:Chromecast not found at 10.0.0.5".to_string(),
            stderr: String::new(),
        });
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Chromecast not found at 10.0.0.5")
        );
    }

    #[test]
    fn test_successful_exit_with_output() {
        let result = normalize(RawSignal::Process {
            success: true,
            stdout: "  Casting started\n".to_string(),
            stderr: String::new(),
        });
        assert!(result.success);
        assert_eq!(result.message, "Casting started");
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_successful_exit_empty_output_uses_fallback() {
        let result = normalize(RawSignal::Process {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        });
        assert!(result.success);
        assert_eq!(result.message, DEFAULT_SUCCESS);
    }

    #[test]
    fn test_nonzero_exit_uses_stderr() {
        let result = normalize(RawSignal::Process {
            success: false,
            stdout: String::new(),
            stderr: "device unreachable\n".to_string(),
        });
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("device unreachable"));
    }

    #[test]
    fn test_nonzero_exit_empty_stderr_uses_fallback() {
        let result = normalize(RawSignal::Process {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
        });
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(DEFAULT_FAILURE));
    }

    #[test]
    fn test_http_success_carries_body() {
        let result = normalize(RawSignal::Network {
            success: true,
            body: "{\"ok\":true}".to_string(),
        });
        assert!(result.success);
        assert_eq!(result.message, "{\"ok\":true}");
    }

    #[test]
    fn test_http_failure_carries_body() {
        let result = normalize(RawSignal::Network {
            success: false,
            body: "application not installed".to_string(),
        });
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("application not installed"));
    }

    #[test]
    fn test_sentinel_in_http_body() {
        let result = normalize(RawSignal::Network {
            success: true,
            body: "ERROR: device busy".to_string(),
        });
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("device busy"));
    }
}
