// Multi-provider LLM layer
//
// This module provides:
// - Provider identity resolution with per-provider defaults
// - A gateway exposing one generate() contract over all backends
// - Per-provider transport adapters with typed response shapes

pub mod gateway;
pub mod provider;
pub mod transport;

// Re-export commonly used types
pub use gateway::{GenerationRequest, LlmGateway, NormalizedReply};
pub use provider::ProviderIdentity;
