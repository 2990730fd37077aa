pub mod anthropic;
pub mod openai;
pub mod prompt;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use provider::{ChatRequest, ChatResponse, LlmProvider, Message, ProviderError, Role};
