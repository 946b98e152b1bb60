pub mod metrics;

pub use metrics::GenerationStats;
