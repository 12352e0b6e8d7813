// Store trait for environment readings
use crate::domain::error::GraphError;
use crate::domain::reading::{Sample, TimeSeries};
use crate::domain::window::WindowSpec;
use async_trait::async_trait;

#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Check the store is reachable
    async fn ping(&self) -> Result<(), GraphError>;

    /// All samples inside the window, oldest first.
    ///
    /// Fails with `StoreUnavailable` when the store cannot be reached and with
    /// `EmptyResult` when the window holds no rows.
    async fn fetch(&self, window: &WindowSpec) -> Result<TimeSeries, GraphError>;

    /// Append a single reading
    async fn record(&self, sample: &Sample) -> Result<(), GraphError>;
}
