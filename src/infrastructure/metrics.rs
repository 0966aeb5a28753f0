use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::domain::account_deletion::ports::CascadeObserver;
use crate::domain::account_deletion::value_objects::CleanupStep;
use crate::domain::banking::value_objects::ExternalResourceKind;

/// Prometheus counters for the deletion cascade
#[derive(Clone)]
pub struct DeletionMetrics {
  registry: Registry,
  cascades: IntCounterVec,
  steps: IntCounterVec,
  external_failures: IntCounterVec,
}

impl DeletionMetrics {
  pub fn new() -> Result<Self, prometheus::Error> {
    let registry = Registry::new();

    let cascades = IntCounterVec::new(
      Opts::new(
        "equater_deletion_cascades_total",
        "Account deletion cascades by outcome",
      ),
      &["outcome"],
    )?;
    let steps = IntCounterVec::new(
      Opts::new(
        "equater_deletion_steps_total",
        "Account deletion cascade steps by step and outcome",
      ),
      &["step", "outcome"],
    )?;
    let external_failures = IntCounterVec::new(
      Opts::new(
        "equater_deletion_external_failures_total",
        "Provider resources that could not be revoked",
      ),
      &["resource"],
    )?;

    registry.register(Box::new(cascades.clone()))?;
    registry.register(Box::new(steps.clone()))?;
    registry.register(Box::new(external_failures.clone()))?;

    Ok(Self {
      registry,
      cascades,
      steps,
      external_failures,
    })
  }

  /// Renders every metric in the Prometheus text format
  pub fn render(&self) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
  }
}

impl CascadeObserver for DeletionMetrics {
  fn step_completed(&self, step: CleanupStep) {
    self
      .steps
      .with_label_values(&[step.as_str(), "completed"])
      .inc();
  }

  fn step_failed(&self, step: CleanupStep) {
    self.steps.with_label_values(&[step.as_str(), "failed"]).inc();
  }

  fn cascade_completed(&self) {
    self.cascades.with_label_values(&["completed"]).inc();
  }

  fn cascade_failed(&self) {
    self.cascades.with_label_values(&["failed"]).inc();
  }

  fn external_failure(&self, resource: ExternalResourceKind) {
    self
      .external_failures
      .with_label_values(&[resource.as_str()])
      .inc();
  }
}
