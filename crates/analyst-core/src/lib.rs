//! Core abstractions for the equity research pipeline
//!
//! This crate defines the fundamental traits and types shared by the
//! workflow engine and the stage executors.

pub mod error;
pub mod stage;
pub mod state;

pub use error::{Error, Result};
pub use stage::Stage;
pub use state::AnalysisState;
