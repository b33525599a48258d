use crate::llm::TextStream;
use crate::messages::Message;
use std::future::Future;
use std::pin::Pin;

/// Produces the raw plan text for one round, as it is generated.
pub trait Planner: Send + Sync {
    fn plan<'a>(
        &'a self,
        history: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<TextStream>> + Send + 'a>>;
}
