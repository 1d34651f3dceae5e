// Data models for the counter API and downloadable resources

pub mod counter;
pub mod resource;

// Re-export commonly used types
pub use counter::{CounterRequest, CounterResponse};
pub use resource::{default_resources, ResourceSpec};
