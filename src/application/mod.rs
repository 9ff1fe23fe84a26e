// Application layer - use cases over the domain and the store
pub mod query_service;
pub mod reading_store;
pub mod scheduler;
pub mod simulation_engine;
