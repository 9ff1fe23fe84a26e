// Application state for HTTP handlers
use crate::application::query_service::QueryService;
use crate::application::scheduler::Scheduler;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub query_service: QueryService,
    pub scheduler: Arc<Scheduler>,
}
