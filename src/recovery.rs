//! Recovery strategies for irregular RIS input.
//!
//! Parsing never rejects a line: anything that is not tagged is a
//! continuation. The one structural irregularity left is a stream that ends
//! in the middle of an entry, without its `ER` line. [`RecoveryMode`] decides
//! what happens to that trailing entry, and [`RecoveryContext`] collects the
//! diagnostics produced along the way so callers can report them after a run.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RisError};

/// Strategy for handling an unterminated trailing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryMode {
    /// Strict mode: fail with [`RisError::UnterminatedEntry`].
    Strict,
    /// Lenient mode: drop the partial entry and record a diagnostic (default)
    #[default]
    Lenient,
    /// Permissive mode: emit the partial entry as it was read
    Permissive,
}

impl std::str::FromStr for RecoveryMode {
    type Err = RisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(RecoveryMode::Strict),
            "lenient" => Ok(RecoveryMode::Lenient),
            "permissive" => Ok(RecoveryMode::Permissive),
            other => Err(RisError::Config(format!(
                "unknown recovery mode {other:?} (expected strict, lenient or permissive)"
            ))),
        }
    }
}

/// Recovery context for handling irregular data
#[derive(Debug, Default)]
pub struct RecoveryContext {
    /// Current recovery mode
    pub mode: RecoveryMode,
    /// Whether warnings/recoveries were needed
    pub has_errors: bool,
    /// List of recovery messages
    pub recovery_messages: Vec<String>,
}

impl RecoveryContext {
    /// Create a new recovery context with the given mode
    #[must_use]
    pub fn new(mode: RecoveryMode) -> Self {
        RecoveryContext {
            mode,
            has_errors: false,
            recovery_messages: Vec::new(),
        }
    }

    /// Record a recovery message and log it.
    pub fn add_message(&mut self, message: String) {
        tracing::warn!("{message}");
        self.has_errors = true;
        self.recovery_messages.push(message);
    }

    /// Try to recover from an error based on the recovery mode
    ///
    /// # Errors
    ///
    /// Returns an error if in strict mode, otherwise records the error and returns Ok(None).
    pub fn recover<T>(&mut self, error: RisError, context: &str) -> Result<Option<T>> {
        match self.mode {
            RecoveryMode::Strict => Err(error),
            RecoveryMode::Lenient | RecoveryMode::Permissive => {
                self.add_message(format!("{context}: {error}"));
                Ok(None)
            },
        }
    }

    /// Move every message out of the context.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.recovery_messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_context_default() {
        let ctx = RecoveryContext::default();
        assert_eq!(ctx.mode, RecoveryMode::Lenient);
        assert!(!ctx.has_errors);
        assert!(ctx.recovery_messages.is_empty());
    }

    #[test]
    fn test_recovery_mode_lenient() {
        let mut ctx = RecoveryContext::new(RecoveryMode::Lenient);
        let error = RisError::UnterminatedEntry("test".to_string());
        let result: Result<Option<()>> = ctx.recover(error, "test context");
        assert!(result.is_ok());
        assert!(ctx.has_errors);
        assert_eq!(ctx.take_messages().len(), 1);
        assert!(ctx.recovery_messages.is_empty());
    }

    #[test]
    fn test_recovery_mode_strict() {
        let mut ctx = RecoveryContext::new(RecoveryMode::Strict);
        let error = RisError::UnterminatedEntry("test".to_string());
        let result: Result<Option<()>> = ctx.recover(error, "test context");
        assert!(result.is_err());
        assert!(!ctx.has_errors);
    }

    #[test]
    fn test_recovery_mode_parse() {
        assert_eq!("Strict".parse::<RecoveryMode>().unwrap(), RecoveryMode::Strict);
        assert_eq!(
            "permissive".parse::<RecoveryMode>().unwrap(),
            RecoveryMode::Permissive
        );
        assert!("sloppy".parse::<RecoveryMode>().is_err());
    }
}
