use std::fmt;

use crate::guidance::{GuidanceError, UNAVAILABLE_MESSAGE};

/// Custom error type that includes exit codes
#[derive(Debug)]
pub enum FormaidError {
    /// Control found but no question could be reconstructed (exit code 2)
    NotInterpretable(String),
    /// Selector matched no eligible control (exit code 3)
    ControlNotFound(String),
    /// Guidance backend missing, unreachable or failing (exit code 4)
    BackendUnavailable(String),
    /// Operation timeout (exit code 5)
    Timeout(String),
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl FormaidError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FormaidError::NotInterpretable(_) => 2,
            FormaidError::ControlNotFound(_) => 3,
            FormaidError::BackendUnavailable(_) => 4,
            FormaidError::Timeout(_) => 5,
            FormaidError::Other(_) => 1,
        }
    }
}

impl fmt::Display for FormaidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormaidError::NotInterpretable(selector) => {
                write!(f, "Could not interpret the field matching: {}", selector)
            }
            FormaidError::ControlNotFound(selector) => {
                write!(f, "No form control found matching selector: {}", selector)
            }
            FormaidError::BackendUnavailable(msg) => {
                write!(f, "{}: {}", UNAVAILABLE_MESSAGE, msg)
            }
            FormaidError::Timeout(msg) => {
                write!(f, "Operation timed out: {}", msg)
            }
            FormaidError::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FormaidError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormaidError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for FormaidError {
    fn from(err: anyhow::Error) -> Self {
        // Typed errors first, then fall back to message matching
        if let Some(guidance) = err.downcast_ref::<GuidanceError>() {
            return match guidance {
                GuidanceError::Timeout(_) => FormaidError::Timeout(guidance.to_string()),
                _ => FormaidError::BackendUnavailable(guidance.to_string()),
            };
        }

        let msg = err.to_string();
        if msg.contains("No form control found matching selector") {
            FormaidError::ControlNotFound(msg)
        } else if msg.contains("Could not interpret the field") {
            FormaidError::NotInterpretable(msg)
        } else if msg.contains("timeout") || msg.contains("timed out") {
            FormaidError::Timeout(msg)
        } else {
            FormaidError::Other(err)
        }
    }
}
