mod analytics;
mod graph;

pub use analytics::InMemoryAnalytics;
pub use graph::InMemoryGraphStore;
