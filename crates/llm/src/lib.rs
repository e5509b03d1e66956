pub mod client;
pub mod provider;
pub mod providers;

pub use client::{GenerateParameters, GenerateRequest, GenerateResponse, LlmClient};
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
