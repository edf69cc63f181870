//! Concrete language model providers

pub mod openai;

pub use openai::{OpenAiChat, OpenAiConfig};
