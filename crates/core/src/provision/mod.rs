//! Provisioning run.
//!
//! The `Provisioner` executes the fixed, ordered sequence of setup steps
//! against an administrative API. Each step carries an explicit policy:
//! prerequisite steps abort the run on hard failure, convenience steps are
//! best-effort and only reported.

mod runner;
mod types;

pub use runner::Provisioner;
pub use types::{ProvisionError, ProvisionReport, Step, StepPolicy, StepRecord, StepStatus};
