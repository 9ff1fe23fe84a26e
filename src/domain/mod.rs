// Domain layer - readings and the simulation model that produces them
pub mod reading;
pub mod sampler;
pub mod simulation;
