//! Core Stage trait definition

use crate::Result;
use async_trait::async_trait;

/// Capability implemented by every unit of pipeline work
///
/// A stage consumes the shared state by value, performs its work (usually
/// one collaborator round trip), and returns the extended state. The
/// workflow engine grants each stage exclusive access to the state for the
/// duration of its invocation, so implementations never need interior
/// mutability for the state itself.
///
/// The trait is generic over the state type so the engine carries no
/// knowledge of any particular pipeline's fields.
#[async_trait]
pub trait Stage<S>: Send + Sync {
    /// Apply this stage to the state and return the updated state
    ///
    /// A returned error propagates unmodified through the workflow stream
    /// and aborts the run. Stages that recover locally (sentinel
    /// substitution) must catch before returning.
    async fn apply(&self, state: S) -> Result<S>;

    /// Get the stage's name
    fn name(&self) -> &str;
}
