use std::sync::Arc;

use futures::future::join_all;

use crate::domain::health::ports::HealthProbe;

/// Outcome of one healthcheck run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HealthReport {
    /// One entry per unreachable dependency, in probe order.
    pub errors: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Pings every registered dependency.
///
/// Probes run concurrently and independently: one failure never prevents
/// the others from being checked.
#[derive(Clone, Default)]
pub struct HealthService {
    probes: Vec<Arc<dyn HealthProbe>>,
}

impl HealthService {
    pub fn new(probes: Vec<Arc<dyn HealthProbe>>) -> Self {
        Self { probes }
    }

    pub async fn check(&self) -> HealthReport {
        let results = join_all(self.probes.iter().map(|probe| async move {
            probe.ping().await.map_err(|e| {
                tracing::error!(dependency = probe.name(), error = %e, "Healthcheck ping failed");
                format!("Unable to ping {}", probe.name())
            })
        }))
        .await;

        HealthReport {
            errors: results.into_iter().filter_map(Result::err).collect(),
        }
    }
}
