//! Shared utilities for the equity research pipeline

pub mod logging;

pub use logging::init_tracing;
