// Query service - realtime and history views over the reading store
use crate::application::reading_store::{ReadingStore, StoreError};
use crate::application::scheduler::Scheduler;
use crate::domain::reading::{Reading, ReadingId};
use std::sync::Arc;

pub const MAX_REALTIME_WINDOW: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationStatus {
    pub running: bool,
    pub battery_level: f64,
    pub area_covered: f64,
    pub stored_readings: usize,
}

#[derive(Clone)]
pub struct QueryService {
    repository: Arc<dyn ReadingStore>,
    realtime_window: usize,
}

impl QueryService {
    pub fn new(repository: Arc<dyn ReadingStore>, realtime_window: usize) -> Self {
        Self {
            repository,
            realtime_window,
        }
    }

    /// Most recent readings in ascending timestamp order
    pub async fn realtime(&self, limit: Option<usize>) -> Result<Vec<Reading>, QueryError> {
        let n = limit.unwrap_or(self.realtime_window);
        if n == 0 || n > MAX_REALTIME_WINDOW {
            return Err(QueryError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_REALTIME_WINDOW
            )));
        }
        Ok(self.repository.latest(n).await?)
    }

    /// Every reading, newest first
    pub async fn history(&self) -> Result<Vec<Reading>, QueryError> {
        Ok(self.repository.all().await?)
    }

    pub async fn delete_one(&self, id: &ReadingId) -> Result<bool, QueryError> {
        let deleted = self.repository.delete_one(id).await?;
        if !deleted {
            tracing::debug!("Delete requested for unknown reading {}", id);
        }
        Ok(deleted)
    }

    pub async fn delete_all(&self) -> Result<usize, QueryError> {
        let deleted = self.repository.delete_all().await?;
        tracing::info!("Deleted {} readings from history", deleted);
        Ok(deleted)
    }

    pub async fn status(&self, scheduler: &Scheduler) -> Result<SimulationStatus, QueryError> {
        let state = scheduler.engine().state().await;
        Ok(SimulationStatus {
            running: scheduler.is_running().await,
            battery_level: state.battery_level(),
            area_covered: state.area_covered(),
            stored_readings: self.repository.len().await?,
        })
    }
}
