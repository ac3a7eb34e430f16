//! The provisioning runbook.
//!
//! Steps run strictly in order:
//! readiness -> workspace -> datastore -> discovery -> publish -> style -> layer group -> tuning
//!
//! Fatal steps return a [`ProvisionError`]; best-effort steps record a
//! failed [`StepRecord`] and the run moves on.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::admin_api::{AdminApi, AdminApiError, StyleDefinition};
use crate::config::Config;
use crate::outcome::{FailureKind, HttpOutcome, Outcome};
use crate::xml;

use super::types::{ProvisionError, ProvisionReport, Step, StepPolicy, StepRecord, StepStatus};

/// Drives one provisioning run against an [`AdminApi`].
pub struct Provisioner {
    config: Config,
    api: Arc<dyn AdminApi>,
}

impl Provisioner {
    pub fn new(config: Config, api: Arc<dyn AdminApi>) -> Self {
        Self { config, api }
    }

    /// Run every step. Returns the report unless a fatal step failed.
    pub async fn run(&self) -> Result<ProvisionReport, ProvisionError> {
        let started_at = Utc::now();
        let workspace = self.config.workspace.name.as_str();
        let store = self.config.datastore.name.as_str();
        let mut steps = Vec::new();

        info!(
            backend = self.api.name(),
            url = %self.config.server.url,
            workspace,
            store,
            "Starting provisioning"
        );

        let ready_after_attempts = self.wait_until_ready().await?;
        steps.push(record(
            Step::Readiness,
            StepStatus::Done,
            Some(format!("ready after {} attempt(s)", ready_after_attempts)),
        ));

        let result = self.api.create_workspace(workspace).await;
        steps.push(prerequisite(Step::Workspace, result)?);

        let result = self
            .api
            .create_datastore(workspace, &self.config.datastore)
            .await;
        steps.push(prerequisite(Step::Datastore, result)?);

        let discovered = self.discover_feature_types().await?;
        steps.push(record(
            Step::Discovery,
            StepStatus::Done,
            Some(format!("{} feature type(s) available", discovered.len())),
        ));

        let (published, failed) = self.publish_feature_types(&discovered).await;
        steps.push(if failed == 0 {
            record(
                Step::Publish,
                StepStatus::Done,
                Some(format!("{} published", published)),
            )
        } else {
            record(
                Step::Publish,
                StepStatus::Failed,
                Some(format!("{} of {} failed", failed, discovered.len())),
            )
        });

        let style_created = self.provision_style(&mut steps).await;
        steps.push(self.create_layer_group(style_created).await);
        steps.push(self.tune_service().await);

        let report = ProvisionReport {
            ready_after_attempts,
            discovered,
            published,
            failed,
            steps,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            published = report.published,
            failed = report.failed,
            soft_failures = report.soft_failures().len(),
            "Provisioning finished"
        );

        Ok(report)
    }

    /// Poll the version endpoint until it answers 2xx or the attempt budget runs out.
    async fn wait_until_ready(&self) -> Result<u32, ProvisionError> {
        let max_attempts = self.config.readiness.max_attempts;
        let interval = Duration::from_millis(self.config.readiness.interval_ms);

        for attempt in 1..=max_attempts {
            match self.api.server_version().await {
                Ok(outcome) if outcome.is_success() => {
                    info!(attempt, "Server is ready");
                    return Ok(attempt);
                }
                Ok(outcome) => {
                    info!(
                        attempt,
                        max_attempts,
                        status = outcome.status,
                        "Server not ready yet"
                    );
                }
                Err(e) => {
                    info!(attempt, max_attempts, error = %e, "Server not reachable yet");
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        error!(max_attempts, "Server did not become ready, giving up");
        Err(ProvisionError::ServerNotReady {
            attempts: max_attempts,
        })
    }

    async fn discover_feature_types(&self) -> Result<Vec<String>, ProvisionError> {
        let step = Step::Discovery;
        let outcome = self
            .api
            .list_available_feature_types(
                &self.config.workspace.name,
                &self.config.datastore.name,
            )
            .await
            .map_err(|source| transport(step, source))?;

        if !outcome.is_success() {
            return Err(hard_failure(step, &outcome));
        }

        let names = xml::parse_feature_type_names(&outcome.body).map_err(|source| {
            error!(step = %step, error = %source, "Unreadable feature type listing");
            ProvisionError::InvalidResponse { step, source }
        })?;

        if names.is_empty() {
            warn!(step = %step, "No unpublished feature types found");
        } else {
            info!(step = %step, count = names.len(), names = ?names, "Discovered feature types");
        }
        Ok(names)
    }

    /// Publish each name; a refused item is counted and the loop continues.
    async fn publish_feature_types(&self, names: &[String]) -> (usize, usize) {
        let workspace = self.config.workspace.name.as_str();
        let store = self.config.datastore.name.as_str();
        let mut published = 0;
        let mut failed = 0;

        for name in names {
            match self.api.publish_feature_type(workspace, store, name).await {
                Ok(outcome) => match outcome.outcome() {
                    Outcome::Success => {
                        published += 1;
                        info!(feature_type = %name, "Published feature type");
                    }
                    Outcome::AlreadyExists => {
                        published += 1;
                        info!(feature_type = %name, "Feature type already published");
                    }
                    Outcome::Failed => {
                        failed += 1;
                        warn!(
                            feature_type = %name,
                            status = outcome.status,
                            body = %outcome.body_excerpt(),
                            "Failed to publish feature type"
                        );
                    }
                },
                Err(e) => {
                    failed += 1;
                    warn!(feature_type = %name, error = %e, "Failed to publish feature type");
                }
            }
        }

        (published, failed)
    }

    /// Create the style and upload its body. Returns whether the style exists on the server.
    async fn provision_style(&self, steps: &mut Vec<StepRecord>) -> bool {
        let workspace = self.config.workspace.name.as_str();
        let style = &self.config.style;
        let definition = StyleDefinition {
            name: style.name.clone(),
            format: style.format,
        };

        let result = self.api.create_style(workspace, &definition).await;
        let definition_record = best_effort(Step::StyleDefinition, result);
        let created = matches!(
            definition_record.status,
            StepStatus::Done | StepStatus::AlreadyExists
        );
        steps.push(definition_record);

        if !created {
            steps.push(record(
                Step::StyleUpload,
                StepStatus::Skipped,
                Some("style was not created".to_string()),
            ));
            return false;
        }

        let content = match tokio::fs::read(&style.file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    step = %Step::StyleUpload,
                    path = %style.file.display(),
                    "Style file not found, skipping upload"
                );
                steps.push(record(
                    Step::StyleUpload,
                    StepStatus::Skipped,
                    Some(format!("style file {} not found", style.file.display())),
                ));
                return true;
            }
            Err(e) => {
                warn!(
                    step = %Step::StyleUpload,
                    path = %style.file.display(),
                    error = %e,
                    "Failed to read style file"
                );
                steps.push(record(
                    Step::StyleUpload,
                    StepStatus::Failed,
                    Some(format!("failed to read {}: {}", style.file.display(), e)),
                ));
                return true;
            }
        };

        let result = self
            .api
            .upload_style_content(workspace, &style.name, style.format.content_type(), content)
            .await;
        steps.push(best_effort(Step::StyleUpload, result));
        true
    }

    async fn create_layer_group(&self, style_created: bool) -> StepRecord {
        let style = style_created.then_some(self.config.style.name.as_str());
        let result = self
            .api
            .create_layer_group(&self.config.workspace.name, &self.config.layer_group, style)
            .await;
        best_effort(Step::LayerGroup, result)
    }

    /// Read the service settings, set the memory limit field, write them back.
    async fn tune_service(&self) -> StepRecord {
        let step = Step::ServiceTuning;
        let tuning = &self.config.tuning;
        if !tuning.enabled {
            info!(step = %step, "Service tuning disabled");
            return record(step, StepStatus::Skipped, Some("disabled".to_string()));
        }

        let current = match self.api.service_settings(&tuning.service).await {
            Ok(outcome) if outcome.is_success() => outcome.body,
            Ok(outcome) => {
                warn!(step = %step, status = outcome.status, "Could not read service settings");
                return record(
                    step,
                    StepStatus::Failed,
                    Some(format!("settings retrieval returned HTTP {}", outcome.status)),
                );
            }
            Err(e) => {
                warn!(step = %step, error = %e, "Could not read service settings");
                return record(step, StepStatus::Failed, Some(e.to_string()));
            }
        };

        let updated = match xml::set_element_text(&current, &tuning.field, &tuning.value) {
            Ok(updated) => updated,
            Err(e) => {
                warn!(step = %step, error = %e, "Could not rewrite service settings");
                return record(step, StepStatus::Failed, Some(e.to_string()));
            }
        };

        let result = self
            .api
            .update_service_settings(&tuning.service, updated)
            .await;
        let mut outcome = best_effort(step, result);
        if outcome.status == StepStatus::Done {
            info!(
                service = %tuning.service,
                field = %tuning.field,
                value = %tuning.value,
                "Service settings updated"
            );
            outcome.detail = Some(format!("{} set to {}", tuning.field, tuning.value));
        }
        outcome
    }
}

fn record(step: Step, status: StepStatus, detail: Option<String>) -> StepRecord {
    StepRecord {
        step,
        status,
        detail,
    }
}

fn transport(step: Step, source: AdminApiError) -> ProvisionError {
    error!(step = %step, error = %source, "Request failed");
    ProvisionError::Transport { step, source }
}

fn hard_failure(step: Step, outcome: &HttpOutcome) -> ProvisionError {
    let kind = FailureKind::from_status(outcome.status);
    error!(
        step = %step,
        status = outcome.status,
        kind = %kind,
        body = %outcome.body_excerpt(),
        "Step failed"
    );
    ProvisionError::StepFailed {
        step,
        status: outcome.status,
        kind,
        body: outcome.body_excerpt(),
    }
}

/// Classify a fatal step: 2xx and 409 pass, anything else aborts.
fn prerequisite(
    step: Step,
    result: Result<HttpOutcome, AdminApiError>,
) -> Result<StepRecord, ProvisionError> {
    debug_assert_eq!(step.policy(), StepPolicy::Fatal);
    let outcome = result.map_err(|source| transport(step, source))?;
    match outcome.outcome() {
        Outcome::Success => {
            info!(step = %step, status = outcome.status, "Step succeeded");
            Ok(record(step, StepStatus::Done, None))
        }
        Outcome::AlreadyExists => {
            warn!(step = %step, "Already exists, continuing");
            Ok(record(step, StepStatus::AlreadyExists, None))
        }
        Outcome::Failed => Err(hard_failure(step, &outcome)),
    }
}

/// Classify a best-effort step: failures become a `Failed` record.
fn best_effort(step: Step, result: Result<HttpOutcome, AdminApiError>) -> StepRecord {
    debug_assert_eq!(step.policy(), StepPolicy::BestEffort);
    match result {
        Ok(outcome) => match outcome.outcome() {
            Outcome::Success => {
                info!(step = %step, status = outcome.status, "Step succeeded");
                record(step, StepStatus::Done, None)
            }
            Outcome::AlreadyExists => {
                warn!(step = %step, "Already exists, continuing");
                record(step, StepStatus::AlreadyExists, None)
            }
            Outcome::Failed => {
                warn!(
                    step = %step,
                    status = outcome.status,
                    body = %outcome.body_excerpt(),
                    "Step failed, continuing"
                );
                record(
                    step,
                    StepStatus::Failed,
                    Some(format!("HTTP {}: {}", outcome.status, outcome.body_excerpt())),
                )
            }
        },
        Err(e) => {
            warn!(step = %step, error = %e, "Step failed, continuing");
            record(step, StepStatus::Failed, Some(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerequisite_success_and_conflict() {
        let done = prerequisite(Step::Workspace, Ok(HttpOutcome::new(201, ""))).unwrap();
        assert_eq!(done.status, StepStatus::Done);

        let exists = prerequisite(Step::Workspace, Ok(HttpOutcome::new(409, "exists"))).unwrap();
        assert_eq!(exists.status, StepStatus::AlreadyExists);
    }

    #[test]
    fn test_prerequisite_hard_failure_carries_kind() {
        let err = prerequisite(Step::Datastore, Ok(HttpOutcome::new(403, "forbidden"))).unwrap_err();
        match err {
            ProvisionError::StepFailed {
                step, status, kind, ..
            } => {
                assert_eq!(step, Step::Datastore);
                assert_eq!(status, 403);
                assert_eq!(kind, FailureKind::Unauthorized);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_prerequisite_transport_error() {
        let err = prerequisite(Step::Workspace, Err(AdminApiError::Timeout)).unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Transport {
                step: Step::Workspace,
                ..
            }
        ));
    }

    #[test]
    fn test_best_effort_never_errors() {
        let failed = best_effort(Step::LayerGroup, Ok(HttpOutcome::new(500, "boom")));
        assert_eq!(failed.status, StepStatus::Failed);
        assert_eq!(failed.detail.as_deref(), Some("HTTP 500: boom"));

        let exists = best_effort(Step::LayerGroup, Ok(HttpOutcome::new(409, "")));
        assert_eq!(exists.status, StepStatus::AlreadyExists);

        let transport = best_effort(
            Step::StyleUpload,
            Err(AdminApiError::ConnectionFailed("refused".to_string())),
        );
        assert_eq!(transport.status, StepStatus::Failed);
    }
}
