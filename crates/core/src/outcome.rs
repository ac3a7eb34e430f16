//! Response classification shared by every provisioning step.

use serde::Serialize;

/// Status code and body of one administrative API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOutcome {
    pub status: u16,
    pub body: String,
}

impl HttpOutcome {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_status(self.status)
    }

    pub fn is_success(&self) -> bool {
        self.outcome() == Outcome::Success
    }

    /// First 200 characters of the body, for log lines.
    pub fn body_excerpt(&self) -> String {
        self.body.trim().chars().take(200).collect()
    }
}

/// The three response classes a step distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Any 2xx status.
    Success,
    /// 409 Conflict: the resource is already there.
    AlreadyExists,
    /// Everything else.
    Failed,
}

impl Outcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Outcome::Success,
            409 => Outcome::AlreadyExists,
            _ => Outcome::Failed,
        }
    }

    /// Success or already-exists.
    pub fn is_ok(&self) -> bool {
        !matches!(self, Outcome::Failed)
    }
}

/// Finer classification of hard failures on prerequisite steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 401 or 403.
    Unauthorized,
    /// 400 or 422.
    Rejected,
    NotFound,
    /// 5xx.
    ServerError,
    Unexpected,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => FailureKind::Unauthorized,
            400 | 422 => FailureKind::Rejected,
            404 => FailureKind::NotFound,
            500..=599 => FailureKind::ServerError,
            _ => FailureKind::Unexpected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::Rejected => "rejected",
            FailureKind::NotFound => "not found",
            FailureKind::ServerError => "server error",
            FailureKind::Unexpected => "unexpected status",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
