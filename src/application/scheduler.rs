// Scheduler - drives the simulation engine on a fixed cadence
use crate::application::simulation_engine::{SimulationEngine, TickError};
use crate::domain::reading::Reading;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("data generation is already running")]
    AlreadyRunning,
    #[error("data generation is not running")]
    NotRunning,
}

struct RunningTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct Scheduler {
    engine: Arc<SimulationEngine>,
    period: Duration,
    task: Mutex<Option<RunningTask>>,
}

impl Scheduler {
    pub fn new(engine: Arc<SimulationEngine>, period: Duration) -> Self {
        Self {
            engine,
            period,
            task: Mutex::new(None),
        }
    }

    /// Begin periodic generation; the first tick fires immediately
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut task = self.task.lock().await;
        if task.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_periodic(self.engine.clone(), self.period, shutdown_rx));
        *task = Some(RunningTask { shutdown, handle });

        tracing::info!("Started data generation every {:?}", self.period);
        Ok(())
    }

    /// Stop periodic generation.
    ///
    /// Returns once the periodic task has exited, so a tick that was in flight
    /// has completed and no further tick will run.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let mut task = self.task.lock().await;
        let Some(RunningTask { shutdown, handle }) = task.take() else {
            return Err(SchedulerError::NotRunning);
        };

        let _ = shutdown.send(());
        if let Err(e) = handle.await {
            tracing::error!("Data generation task ended abnormally: {}", e);
        }

        tracing::info!("Stopped data generation");
        Ok(())
    }

    /// Generate one reading now, whether or not periodic generation is running
    pub async fn generate_once(&self) -> Result<Reading, TickError> {
        self.engine.tick().await
    }

    pub async fn is_running(&self) -> bool {
        self.task.lock().await.is_some()
    }

    pub fn engine(&self) -> &Arc<SimulationEngine> {
        &self.engine
    }
}

async fn run_periodic(
    engine: Arc<SimulationEngine>,
    period: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                if let Err(e) = engine.tick().await {
                    tracing::warn!("Scheduled tick failed: {}", e);
                }
            }
        }
    }
}
