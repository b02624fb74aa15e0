//! Capability workers and their registry.

pub mod registry;
pub mod worker;

pub use registry::CapabilityRegistry;
pub use worker::{DomainWorker, Worker};
