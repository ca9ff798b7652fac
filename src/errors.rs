/*!
 * Error types for the tesstrain pipeline.
 *
 * Every failure in a training run is fatal. These variants classify what went
 * wrong so the operator (and the tests) can tell a bad configuration apart
 * from a broken tool or a missing artifact.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a training run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing required input or conflicting flags
    #[error("Configuration error: {0}")]
    Config(String),

    /// Language code not present in the parameter table
    #[error("Unknown language code: {0}")]
    UnknownLanguage(String),

    /// Two fonts normalise to the same output base name
    #[error("Fonts '{first}' and '{second}' both map to output name '{fontname}'")]
    FontNameCollision {
        /// First font in list order
        first: String,
        /// Font that collided with it
        second: String,
        /// Shared normalised name
        fontname: String,
    },

    /// Character/box-level training was requested
    #[error("Only line-level training is implemented; rerun with --linedata-only")]
    LegacyModeUnsupported,

    /// An input expected before a phase starts is missing or unreadable
    #[error("Required file '{path}' is not readable: {reason}")]
    Precondition {
        /// Offending path
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },

    /// An external tool could not be located
    #[error("{0} not found")]
    ToolNotFound(String),

    /// An external tool exited with a non-zero status
    #[error("Program {tool} failed with {status}. Abort.")]
    ToolFailed {
        /// Tool name as requested
        tool: String,
        /// Exit status description
        status: String,
        /// Combined stdout/stderr capture
        output: String,
    },

    /// An external tool ran past the configured timeout
    #[error("Program {tool} timed out after {secs}s")]
    ToolTimedOut {
        /// Tool name as requested
        tool: String,
        /// Configured limit
        secs: u64,
    },

    /// A tool exited cleanly but did not produce a documented output
    #[error("Expected output '{0}' does not exist")]
    MissingOutput(PathBuf),

    /// A recorded artifact exists but has no content
    #[error("Expected output '{0}' is empty")]
    EmptyOutput(PathBuf),
}

impl PipelineError {
    /// Shorthand for configuration errors
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error was detected before any phase ran
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::UnknownLanguage(_)
                | Self::FontNameCollision { .. }
                | Self::LegacyModeUnsupported
        )
    }
}
