use super::types::JoinDecision;
use crate::messages::Message;
use std::future::Future;
use std::pin::Pin;

/// Chooses between finishing and replanning, given the recent history.
pub trait Decider: Send + Sync {
    fn decide<'a>(
        &'a self,
        window: &'a [Message],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<JoinDecision>> + Send + 'a>>;
}
