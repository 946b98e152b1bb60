pub mod brain;
pub mod cancel;
pub mod config;
pub mod evolution;
pub mod server;
pub mod simulation;
pub mod stats;
pub mod world;
