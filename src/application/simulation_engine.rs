// Simulation engine - the single writer of simulation state
use crate::application::reading_store::{ReadingStore, StoreError};
use crate::domain::reading::Reading;
use crate::domain::sampler::Sampler;
use crate::domain::simulation::{SimulationProfile, SimulationState};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("reading was generated but could not be persisted: {0}")]
    Persistence(#[from] StoreError),
}

struct SimulationCore {
    state: SimulationState,
    sampler: Box<dyn Sampler>,
}

pub struct SimulationEngine {
    core: Mutex<SimulationCore>,
    profile: SimulationProfile,
    store: Arc<dyn ReadingStore>,
}

impl SimulationEngine {
    pub fn new(
        profile: SimulationProfile,
        sampler: Box<dyn Sampler>,
        store: Arc<dyn ReadingStore>,
    ) -> Self {
        Self {
            core: Mutex::new(SimulationCore {
                state: SimulationState::new(),
                sampler,
            }),
            profile,
            store,
        }
    }

    /// Produce one reading and append it to the store.
    ///
    /// The state lock is held across the append so ticks are serialized and
    /// readings reach the store in the order their state was advanced. The
    /// state advances even when the append fails; the error only reports it.
    pub async fn tick(&self) -> Result<Reading, TickError> {
        let mut core = self.core.lock().await;
        let SimulationCore { state, sampler } = &mut *core;
        let step = state.advance(&self.profile, sampler.as_mut(), Utc::now());
        let reading = step.reading;

        tracing::debug!(
            id = %reading.id,
            battery = reading.metrics.battery_level,
            area = reading.metrics.area_covered,
            obstacle = reading.metrics.obstacle_detected,
            "Generated reading"
        );
        if step.drained {
            tracing::info!("Battery drained, resetting to 100% and clearing covered area");
        }

        if let Err(e) = self.store.append(reading.clone()).await {
            tracing::warn!("Failed to persist reading {}: {}", reading.id, e);
            return Err(TickError::Persistence(e));
        }

        Ok(reading)
    }

    pub async fn state(&self) -> SimulationState {
        self.core.lock().await.state.clone()
    }
}
