pub mod factory;
pub mod openai;
pub mod sse;
pub mod traits;

pub use factory::create_provider;
pub use openai::OpenAiCompatibleProvider;
pub use traits::{ChatMessage, ChatRole, ModelSettings, Provider, TextStream};
