//! Builder for a [`Scheduler`] from validated configuration.

use crate::config::{ConfigError, QueueConfig};
use crate::core::{AuditSink, MachineCost, Scheduler, Surcharge};

/// Build a scheduler from configuration, validating it first.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the configuration fails validation.
pub fn build_scheduler(cfg: &QueueConfig) -> Result<Scheduler, ConfigError> {
    SchedulerBuilder::new(cfg.clone()).build()
}

/// Assembles a scheduler with optional audit sink and surcharge policy.
pub struct SchedulerBuilder {
    config: QueueConfig,
    audit: Option<Box<dyn AuditSink>>,
    surcharge: Option<Box<dyn Surcharge>>,
    seed: Option<u64>,
}

impl SchedulerBuilder {
    /// Start from `config`.
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            audit: None,
            surcharge: None,
            seed: None,
        }
    }

    /// Configuration being built.
    #[must_use]
    pub const fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Mirror decisions into `audit`.
    #[must_use]
    pub fn audit(mut self, audit: impl AuditSink + 'static) -> Self {
        self.audit = Some(Box::new(audit));
        self
    }

    /// Use a custom surcharge policy instead of the configured machine cost.
    #[must_use]
    pub fn surcharge(mut self, surcharge: impl Surcharge + 'static) -> Self {
        self.surcharge = Some(Box::new(surcharge));
        self
    }

    /// Seed the machine-cost generator, for reproducible runs.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and build.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration fails validation.
    pub fn build(self) -> Result<Scheduler, ConfigError> {
        let machine_cost = self.config.machine_cost;
        let mut scheduler = Scheduler::try_new(self.config)?;
        let surcharge: Box<dyn Surcharge> = match (self.surcharge, self.seed) {
            (Some(custom), _) => custom,
            (None, Some(seed)) => Box::new(MachineCost::seeded(machine_cost, seed)),
            (None, None) => Box::new(MachineCost::new(machine_cost)),
        };
        scheduler = scheduler.with_surcharge(surcharge);
        if let Some(audit) = self.audit {
            scheduler = scheduler.with_audit(audit);
        }
        Ok(scheduler)
    }
}
