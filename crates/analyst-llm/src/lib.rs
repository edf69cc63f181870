//! Language model collaborator layer for the equity research pipeline
//!
//! This crate provides the narrow prompt-in/text-out abstraction the
//! pipeline's stages depend on, plus a concrete OpenAI-compatible provider:
//!
//! - [`ChatModel`] trait for single-turn completions
//! - [`LLMError`] taxonomy for provider failures
//! - [`providers::OpenAiChat`] implementation over reqwest

pub mod chat;
pub mod error;
pub mod providers;

// Re-export main types
pub use chat::ChatModel;
pub use error::{LLMError, Result};
pub use providers::{OpenAiChat, OpenAiConfig};
