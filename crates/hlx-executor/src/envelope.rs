//! Uniform result document written to stdout.

use serde_json::{json, Value};

use crate::error::ExecutorError;

/// Outcome of one dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultEnvelope {
    /// Exchange response, passed through untouched.
    Success(Value),
    /// `{"status":"error","message":...}`. `kind` is for diagnostics only.
    Failure { kind: &'static str, message: String },
}

impl ResultEnvelope {
    pub fn failure(error: &ExecutorError) -> Self {
        Self::Failure {
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Process exit code: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Success(native) => native.clone(),
            Self::Failure { message, .. } => json!({
                "status": "error",
                "message": message,
            }),
        }
    }

    /// Compact single-line JSON.
    pub fn to_json(&self) -> String {
        match self {
            Self::Success(native) => native.to_string(),
            Self::Failure { .. } => self.to_value().to_string(),
        }
    }
}

impl From<ExecutorError> for ResultEnvelope {
    fn from(error: ExecutorError) -> Self {
        Self::failure(&error)
    }
}
