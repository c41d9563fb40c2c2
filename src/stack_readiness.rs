use async_trait::async_trait;
use futures_util::future::join_all;

use crate::{container_probe::ContainerProbe, service_probe::ServiceProbe, ServiceStatus};

#[async_trait]
pub(crate) trait ReadinessCheck: Send + Sync {
    async fn check(&self) -> ServiceStatus;
}

/// Runs every container probe and the service probe concurrently and
/// folds them into one [`ServiceStatus`].
pub(crate) struct ReadinessAggregator<C, S> {
    containers: Vec<String>,
    container_probe: C,
    service_probe: S,
}

impl<C, S> ReadinessAggregator<C, S>
where
    C: ContainerProbe,
    S: ServiceProbe,
{
    pub(crate) fn new(containers: Vec<String>, container_probe: C, service_probe: S) -> Self {
        Self {
            containers,
            container_probe,
            service_probe,
        }
    }
}

#[async_trait]
impl<C, S> ReadinessCheck for ReadinessAggregator<C, S>
where
    C: ContainerProbe,
    S: ServiceProbe,
{
    async fn check(&self) -> ServiceStatus {
        let container_checks = join_all(
            self.containers
                .iter()
                .map(|name| self.container_probe.is_running(name)),
        );
        let (container_results, service_accessible) =
            tokio::join!(container_checks, self.service_probe.is_accessible());

        let status = combine_probe_results(&container_results, service_accessible);
        tracing::debug!(
            containers_running = status.containers_running,
            service_accessible = status.service_accessible,
            "readiness probe cycle finished"
        );
        status
    }
}

/// Vacuously true for zero containers.
pub(crate) fn combine_probe_results(
    container_results: &[bool],
    service_accessible: bool,
) -> ServiceStatus {
    let containers_running = container_results.iter().all(|running| *running);
    ServiceStatus::new(containers_running, service_accessible)
}
