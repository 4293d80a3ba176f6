use async_trait::async_trait;

/// A dependency whose reachability is reported by the healthcheck.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    /// Short dependency name used in failure reports, e.g. `postgres`.
    fn name(&self) -> &'static str;

    /// Round-trip to the dependency.
    ///
    /// # Errors
    /// Any failure to reach the dependency
    async fn ping(&self) -> anyhow::Result<()>;
}
