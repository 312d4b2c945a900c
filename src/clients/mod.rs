pub mod llm_client;
pub mod mock_client;

pub use llm_client::{
    initialize, Completion, CompletionProvider, CompletionRequest, OpenAiClient, ProviderHandle,
};
pub use mock_client::MockProvider;
