//! Types for the provisioning run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::admin_api::AdminApiError;
use crate::outcome::FailureKind;
use crate::xml::XmlError;

/// One step of the provisioning sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Readiness,
    Workspace,
    Datastore,
    Discovery,
    Publish,
    StyleDefinition,
    StyleUpload,
    LayerGroup,
    ServiceTuning,
}

/// Whether a hard failure in a step ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// Later steps depend on this one; failure aborts the run.
    Fatal,
    /// Failure is reported and the run continues.
    BestEffort,
}

impl Step {
    /// All steps in execution order.
    pub const ALL: [Step; 9] = [
        Step::Readiness,
        Step::Workspace,
        Step::Datastore,
        Step::Discovery,
        Step::Publish,
        Step::StyleDefinition,
        Step::StyleUpload,
        Step::LayerGroup,
        Step::ServiceTuning,
    ];

    pub fn policy(&self) -> StepPolicy {
        match self {
            Step::Readiness | Step::Workspace | Step::Datastore | Step::Discovery => {
                StepPolicy::Fatal
            }
            Step::Publish
            | Step::StyleDefinition
            | Step::StyleUpload
            | Step::LayerGroup
            | Step::ServiceTuning => StepPolicy::BestEffort,
        }
    }

    /// Returns the label used in log lines and errors.
    pub fn label(&self) -> &'static str {
        match self {
            Step::Readiness => "readiness wait",
            Step::Workspace => "workspace creation",
            Step::Datastore => "datastore creation",
            Step::Discovery => "feature type discovery",
            Step::Publish => "feature type publication",
            Step::StyleDefinition => "style definition",
            Step::StyleUpload => "style upload",
            Step::LayerGroup => "layer group creation",
            Step::ServiceTuning => "service memory tuning",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Done,
    /// The server answered 409: the resource was already there.
    AlreadyExists,
    /// The step did not run (e.g., no style file, tuning disabled).
    Skipped,
    Failed,
}

/// Record of one step for the final report.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Result of a run that was not aborted.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    /// Attempt on which the server answered the readiness check.
    pub ready_after_attempts: u32,
    /// Feature type names returned by discovery.
    pub discovered: Vec<String>,
    /// Feature types published, including ones that already existed.
    pub published: usize,
    /// Feature types the server refused.
    pub failed: usize,
    pub steps: Vec<StepRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ProvisionReport {
    /// Status of the last record for `step`, if it ran.
    pub fn status_of(&self, step: Step) -> Option<StepStatus> {
        self.steps
            .iter()
            .rev()
            .find(|r| r.step == step)
            .map(|r| r.status)
    }

    /// Best-effort steps that ended in failure.
    pub fn soft_failures(&self) -> Vec<&StepRecord> {
        self.steps
            .iter()
            .filter(|r| r.status == StepStatus::Failed)
            .collect()
    }

    pub fn summary_line(&self) -> String {
        format!("published: {}, failed: {}", self.published, self.failed)
    }
}

/// Errors that abort a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Server not ready after {attempts} attempts")]
    ServerNotReady { attempts: u32 },

    #[error("{step} failed with HTTP {status} ({kind}): {body}")]
    StepFailed {
        step: Step,
        status: u16,
        kind: FailureKind,
        body: String,
    },

    #[error("{step} failed: {source}")]
    Transport {
        step: Step,
        #[source]
        source: AdminApiError,
    },

    #[error("{step} returned an unreadable document: {source}")]
    InvalidResponse {
        step: Step,
        #[source]
        source: XmlError,
    },
}

impl ProvisionError {
    /// The step that aborted the run.
    pub fn step(&self) -> Step {
        match self {
            ProvisionError::ServerNotReady { .. } => Step::Readiness,
            ProvisionError::StepFailed { step, .. }
            | ProvisionError::Transport { step, .. }
            | ProvisionError::InvalidResponse { step, .. } => *step,
        }
    }
}
